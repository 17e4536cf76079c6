//! Block segmentation.

use crate::types::{Block, Line, LineType};

/// Split typed lines into blocks at `Blank` lines.
///
/// Blank lines are dropped. Runs of blanks, and blanks at either end, never
/// produce empty blocks.
pub fn segment(lines: Vec<Line>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();

    for line in lines {
        if line.kind == LineType::Blank {
            if !current.is_empty() {
                blocks.push(Block::from_lines(std::mem::take(&mut current)));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(Block::from_lines(current));
    }

    tracing::debug!("Segmented song into {} blocks", blocks.len());
    blocks
}

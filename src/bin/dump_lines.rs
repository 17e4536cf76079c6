//! Dump line classification and block sections of a song file.
//!
//! Usage: cargo run --bin dump_lines -- <song.txt>

use anyhow::{Context, Result};

use songsheet::sheet::{detect_section, resolve_line_types, segment, HeuristicTagger, LineTagger};
use songsheet::{Diagnostics, Line};

fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: dump_lines <song.txt>")?;
    let source = fs_err::read_to_string(&path)?;

    let tagger = HeuristicTagger::default();
    let texts: Vec<&str> = source.lines().collect();
    let rankings = tagger.rank_types(&texts);
    let mut diags = Diagnostics::new();
    let types = resolve_line_types(&rankings, &mut diags);

    println!("=== Lines ({}) ===", texts.len());
    for (nr, ((text, ranking), kind)) in texts.iter().zip(&rankings).zip(&types).enumerate() {
        let candidates = ranking
            .iter()
            .map(|c| c.map_or_else(|| "?".to_string(), |t| t.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        println!("{nr:>3} [{kind:<14}] ({candidates:<22}) {text}");
    }

    let lines = texts.iter().zip(types).map(|(text, kind)| Line::new(*text, kind)).collect();
    let blocks = segment(lines);

    println!("\n=== Blocks ({}) ===", blocks.len());
    for (nr, block) in blocks.iter().enumerate() {
        let section = detect_section(block.lines());
        let label = section
            .label
            .map(|l| format!(" label {:?} on line {}", l.text, l.line))
            .unwrap_or_default();
        println!("--- block {nr}: {}{label} ---", section.kind);
        println!("{block}");
    }

    if !diags.is_empty() {
        println!("\n=== Warnings ({}) ===", diags.warnings().len());
        for warning in diags.warnings() {
            println!("  {warning}");
        }
    }
    Ok(())
}

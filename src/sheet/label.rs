//! Section label removal.
//!
//! Removing `1. ` from a lyric line shifts its text left. The chord line
//! above must shift by the same amount or the chords land on the wrong
//! syllables, so the removed width is taken out of the preceding line's
//! indentation where possible and given back as indentation otherwise.

use crate::types::Block;

use super::classify::SectionLabel;

/// Strip `label` from its line and re-flow the line above.
///
/// Returns the labeled line's index alongside the updated block. Without a
/// label the block comes back unchanged.
pub fn strip_label(mut block: Block, label: Option<&SectionLabel>) -> (Option<usize>, Block) {
    let Some(label) = label else {
        return (None, block);
    };
    let index = label.line;
    let lines = block.lines_mut();
    let Some(labeled) = lines.get(index) else {
        tracing::debug!("Label line {index} is outside a block of {} lines", lines.len());
        return (None, block);
    };

    let Some(matched) = label.kind.find(&labeled.text) else {
        return (Some(index), block);
    };
    let cut = matched.len();
    let width = matched.chars().count();
    let mut stripped = labeled.text[cut..].to_string();

    if let Some(previous) = index.checked_sub(1).and_then(|i| lines.get_mut(i)) {
        let indent = previous.text.chars().take_while(|&c| c == ' ').count();
        let trimmed = indent.min(width);
        previous.text.replace_range(..trimmed, "");
        stripped.insert_str(0, &" ".repeat(width - trimmed));
    }

    lines[index].text = stripped;
    (Some(index), block)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::sheet::classify::detect_section;
    use crate::types::{Line, LineType};

    fn block(lines: &[(&str, LineType)]) -> Block {
        Block::from_lines(lines.iter().map(|(t, k)| Line::new(*t, *k)).collect())
    }

    fn strip(b: Block) -> (Option<usize>, Block) {
        let section = detect_section(b.lines());
        strip_label(b, section.label.as_ref())
    }

    #[test]
    fn first_line_label_is_removed() {
        let (index, out) = strip(block(&[("1. Hello world", LineType::Lyric)]));
        assert_eq!(index, Some(0));
        assert_eq!(out.texts(), vec!["Hello world"]);
    }

    #[test]
    fn chord_line_loses_indentation() {
        let (index, out) = strip(block(&[
            ("   C       G", LineType::Chord),
            ("1. Shine on me now", LineType::Lyric),
        ]));
        assert_eq!(index, Some(1));
        assert_eq!(out.texts(), vec!["C       G", "Shine on me now"]);
    }

    #[test]
    fn missing_indentation_indents_the_labeled_line() {
        let (_, out) = strip(block(&[
            (" C  G", LineType::Chord),
            ("10. Hi there", LineType::Lyric),
        ]));
        assert_eq!(out.texts(), vec!["C  G", "   Hi there"]);
    }

    #[test]
    fn length_difference_to_previous_line_is_kept() {
        let cases: &[&[&str]] = &[
            &["     D    A", "Ref.: Glory be"],
            &["G", "2) Amazing grace"],
            &["  e   C", "@info: soft"],
            &["Über   Ä", "3. Grüße an alle"],
        ];
        for lines in cases {
            let input = block(&[(lines[0], LineType::Chord), (lines[1], LineType::Lyric)]);
            let (_, out) = strip(input);
            let texts = out.texts();
            let width = |s: &str| s.chars().count();
            assert_eq!(
                width(lines[1]) + width(texts[0]),
                width(texts[1]) + width(lines[0]),
                "{lines:?} became {texts:?}"
            );
        }
    }

    #[test]
    fn no_label_means_no_change() {
        let input = block(&[("C", LineType::Chord), ("Hello", LineType::Lyric)]);
        let (index, out) = strip(input.clone());
        assert_eq!(index, None);
        assert_eq!(out, input);
    }
}

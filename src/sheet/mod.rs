//! Song-sheet analysis: line tagging, block classification, label handling
//! and chord/lyric alignment.

pub mod align;
pub mod classify;
pub mod label;
pub mod notation;
pub mod replace;
pub mod segment;
pub mod spacing;
pub mod tagger;

pub use align::{align, format_chord_only, merge_chord_and_lyric, replace_lyric_text};
pub use classify::{classify, detect_section, resolve_line_types, LabelKind, Section, SectionLabel};
pub use label::strip_label;
pub use notation::normalize_chord_spelling;
pub use replace::{Replacement, ReplacementRule, ReplacementTable};
pub use segment::segment;
pub use spacing::convert_spacing;
pub use tagger::{HeuristicTagger, LineTagger, Ranking};

use crate::types::NotationStyle;

/// Knobs for turning chord/lyric pairs into markup.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// How chord names are spelled in the output.
    pub notation: NotationStyle,
    /// Substitutions applied to chord and lyric lines before overlay.
    pub replacements: ReplacementTable,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            notation: NotationStyle::Compact,
            replacements: ReplacementTable::songs_defaults(),
        }
    }
}

impl ConvertOptions {
    /// Default substitutions with the given chord spelling.
    pub fn with_notation(notation: NotationStyle) -> Self {
        Self { notation, ..Self::default() }
    }
}

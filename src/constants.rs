//! Application constants.
//!
//! Centralizes thresholds, markup fragments and defaults.

/// Line tagger heuristics.
pub mod heuristics {
    /// Chord-like character share at or above which a line is confidently a chord line.
    pub const CHORD_CONFIDENT_MIN: f64 = 0.75;

    /// Chord-like character share at or above which an ambiguous line leans towards chords.
    pub const CHORD_LEANING_MIN: f64 = 0.5;

    /// Chord-like character share below which a line is confidently a lyric line.
    pub const CHORD_AMBIGUOUS_MIN: f64 = 0.34;
}

/// Markup emitted for the LaTeX `songs` package.
pub mod markup {
    /// Opens a chord marker.
    pub const CHORD_OPEN: &str = r"\[";

    /// Closes a chord marker.
    pub const CHORD_CLOSE: &str = "]";

    /// Opens a chord line that has no lyrics beneath it.
    pub const NO_LYRICS_OPEN: &str = r"{\nolyrics ";

    /// Closes a chord line that has no lyrics beneath it.
    pub const NO_LYRICS_CLOSE: &str = "}";

    /// Spaces per em when converting space runs.
    pub const SPACES_PER_EM: f64 = 3.0;

    /// Wraps a lone chorus label.
    pub const TEXT_NOTE: &str = r"\textnote";
}

/// Template and output defaults.
pub mod template {
    /// Name of the built-in template.
    pub const BUILTIN_NAME: &str = "builtin";

    /// Extension of template files in search directories.
    pub const TEMPLATE_EXTENSION: &str = "tex";

    /// Extension of generated documents.
    pub const OUTPUT_EXTENSION: &str = "tex";

    /// Extension of song sheet inputs picked up from directories.
    pub const INPUT_EXTENSION: &str = "txt";
}

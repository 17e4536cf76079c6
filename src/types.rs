//! Core type definitions shared across the conversion pipeline.
//!
//! A song is a sequence of [`Line`]s, each tagged with a [`LineType`]. Blank
//! lines split it into [`Block`]s, and each block resolves to a [`SectionKind`].

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Content type of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LineType {
    /// Whitespace only. Separates blocks.
    Blank,
    /// Song title, the first line of the first block.
    Title,
    /// `key: value` line in the title block.
    Metadata,
    /// Chords only, aligned above a lyric line.
    Chord,
    /// Plain lyric text.
    Lyric,
    /// Line opened by a numbered verse label (`1.`, `2)`).
    VerseLabel,
    /// Line opened by a chorus label (`Ref.`, `Refrain:`).
    ChorusLabel,
    /// A chorus label standing alone as its own block.
    ChorusRepeatMarker,
    /// Line opened by an info label (`@info:`).
    Info,
    /// Chord line merged into the lyric line below it.
    AnnotatedLyric,
}

impl LineType {
    /// Returns the human-readable name of this line type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blank => "Blank",
            Self::Title => "Title",
            Self::Metadata => "Metadata",
            Self::Chord => "Chord",
            Self::Lyric => "Lyric",
            Self::VerseLabel => "VerseLabel",
            Self::ChorusLabel => "ChorusLabel",
            Self::ChorusRepeatMarker => "ChorusRepeatMarker",
            Self::Info => "Info",
            Self::AnnotatedLyric => "AnnotatedLyric",
        }
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Resolved kind of a block (one song section).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionKind {
    /// Title and metadata block.
    Title,
    /// Numbered verse.
    Verse,
    /// Verse without a label.
    VerseVariant,
    /// Chorus with lyrics.
    Chorus,
    /// Lone chorus label meaning "sing the chorus again".
    ChorusRepeat,
    /// Informational text.
    Info,
    /// Anything that could not be placed.
    Fallback,
}

impl SectionKind {
    /// Returns all section kinds in display order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Title,
            Self::Verse,
            Self::VerseVariant,
            Self::Chorus,
            Self::ChorusRepeat,
            Self::Info,
            Self::Fallback,
        ]
    }

    /// Returns the human-readable name of this section kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Verse => "verse",
            Self::VerseVariant => "verse*",
            Self::Chorus => "chorus",
            Self::ChorusRepeat => "chorus-repeat",
            Self::Info => "info",
            Self::Fallback => "fallback",
        }
    }

    /// Whether chord lines in this section are merged into their lyrics.
    #[must_use]
    pub const fn aligns_chords(self) -> bool {
        matches!(self, Self::Verse | Self::VerseVariant | Self::Chorus)
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Chord spelling convention applied to every chord token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NotationStyle {
    /// Keep chords exactly as written.
    Verbatim,
    /// Lower-case root means minor: `a7` becomes `Am7`.
    #[default]
    Compact,
    /// Minor marker becomes a lower-case root: `Am7` becomes `a7`.
    Suffix,
}

impl NotationStyle {
    /// Returns all notation styles.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Verbatim, Self::Compact, Self::Suffix]
    }

    /// Returns the configuration name of this style.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Verbatim => "verbatim",
            Self::Compact => "compact",
            Self::Suffix => "suffix",
        }
    }
}

impl fmt::Display for NotationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for NotationStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|style| style.name() == wanted)
            .ok_or_else(|| {
                Error::config(
                    format!("Unknown notation style '{s}'"),
                    "Use one of: verbatim, compact, suffix",
                )
            })
    }
}

/// A line of input text and its assigned type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    /// Text without the line terminator.
    pub text: String,
    /// Assigned content type.
    pub kind: LineType,
}

impl Line {
    /// Create a new line.
    pub fn new(text: impl Into<String>, kind: LineType) -> Self {
        Self { text: text.into(), kind }
    }
}

/// A blank-free run of lines forming one song section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    lines: Vec<Line>,
}

impl Block {
    /// Create a block. Callers guarantee no line is `Blank`.
    pub(crate) const fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    /// Lines in order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Mutable access for in-place text edits.
    pub(crate) fn lines_mut(&mut self) -> &mut [Line] {
        &mut self.lines
    }

    /// Consume the block.
    pub fn into_lines(self) -> Vec<Line> {
        self.lines
    }

    /// Line texts in order.
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    /// Whether any line has the given type.
    pub fn contains(&self, kind: LineType) -> bool {
        self.lines.iter().any(|l| l.kind == kind)
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.texts().join("\n"))
    }
}

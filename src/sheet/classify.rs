//! Section labels and line-type resolution.
//!
//! Blocks are classified by the first section label found in them: a chorus
//! label, a numbered verse label, or an info label. Line types come from a
//! [`LineTagger`](super::LineTagger) ranking and are resolved here.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Diagnostics, Warning};
use crate::types::{Line, LineType, SectionKind};

use super::tagger::Ranking;

/// `Ref.`, `Refrain:`, `Chorus)` and friends.
#[allow(clippy::expect_used)]
static RE_CHORUS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s?(ref(rain)?|chorus)\b([).:]|\s:)*\s*").expect("valid regex: RE_CHORUS_LABEL")
});

/// `1.`, `2)`, `3:`, `4 :`.
#[allow(clippy::expect_used)]
static RE_VERSE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s?\d+([).:]|\s:)*\s*").expect("valid regex: RE_VERSE_LABEL")
});

/// `info:`, `@info `.
#[allow(clippy::expect_used)]
static RE_INFO_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s?@?info((:\s*)|\s+)").expect("valid regex: RE_INFO_LABEL")
});

/// The three kinds of section label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LabelKind {
    /// Chorus or refrain.
    Chorus,
    /// Numbered verse.
    Verse,
    /// Informational text.
    Info,
}

impl LabelKind {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Chorus => &RE_CHORUS_LABEL,
            Self::Verse => &RE_VERSE_LABEL,
            Self::Info => &RE_INFO_LABEL,
        }
    }

    /// Line type of a line opened by this label.
    pub const fn line_type(self) -> LineType {
        match self {
            Self::Chorus => LineType::ChorusLabel,
            Self::Verse => LineType::VerseLabel,
            Self::Info => LineType::Info,
        }
    }

    /// Match this label at the start of `line`, returning the label text
    /// including trailing punctuation and whitespace.
    pub fn find(self, line: &str) -> Option<&str> {
        self.pattern().find(line).map(|m| m.as_str())
    }
}

/// Where a section label was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLabel {
    /// Which label matched.
    pub kind: LabelKind,
    /// Index of the labeled line within its block.
    pub line: usize,
    /// The label as written, including trailing separators and spaces.
    pub text: String,
}

impl SectionLabel {
    /// Length of the label in chars.
    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

/// Result of section detection for one block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Resolved section kind.
    pub kind: SectionKind,
    /// The authoritative label, if any line carried one.
    pub label: Option<SectionLabel>,
}

/// Ranked label types for one line. Empty means the line carries no label.
///
/// A chorus label with nothing after it may be a repeat marker; whether it
/// is depends on the rest of the block, so both candidates are returned.
pub fn classify(line: &str) -> Vec<LineType> {
    if let Some(label) = LabelKind::Chorus.find(line) {
        let rest = &line[label.len()..];
        return if rest.trim().is_empty() {
            vec![LineType::ChorusRepeatMarker, LineType::ChorusLabel]
        } else {
            vec![LineType::ChorusLabel]
        };
    }

    [LabelKind::Verse, LabelKind::Info]
        .into_iter()
        .find(|kind| kind.find(line).is_some())
        .map(|kind| vec![kind.line_type()])
        .unwrap_or_default()
}

/// Find the section kind of a block from its first labeled line.
///
/// The label does not have to be on the first line: a chord line usually sits
/// above the labeled lyric line. Blocks without any label are `VerseVariant`.
pub fn detect_section(lines: &[Line]) -> Section {
    for (index, line) in lines.iter().enumerate() {
        let Some(&first) = classify(&line.text).first() else {
            continue;
        };

        let (kind, label_kind) = match first {
            LineType::ChorusRepeatMarker if lines.len() == 1 => (SectionKind::ChorusRepeat, LabelKind::Chorus),
            LineType::ChorusRepeatMarker | LineType::ChorusLabel => (SectionKind::Chorus, LabelKind::Chorus),
            LineType::VerseLabel => (SectionKind::Verse, LabelKind::Verse),
            _ => (SectionKind::Info, LabelKind::Info),
        };
        let text = label_kind.find(&line.text).unwrap_or_default().to_string();

        return Section {
            kind,
            label: Some(SectionLabel { kind: label_kind, line: index, text }),
        };
    }

    Section { kind: SectionKind::VerseVariant, label: None }
}

/// Pick one type per line from the tagger's rankings.
///
/// A ranking led by `None` falls back to its next candidate, or to `Blank`
/// when it has none; every fallback is reported.
pub fn resolve_line_types(rankings: &[Ranking], diags: &mut Diagnostics) -> Vec<LineType> {
    rankings
        .iter()
        .enumerate()
        .map(|(line, ranking)| {
            if let Some(&Some(kind)) = ranking.first() {
                return kind;
            }
            let chosen = ranking.iter().flatten().next().copied().unwrap_or(LineType::Blank);
            diags.warn(Warning::AmbiguousClassification { line, chosen: chosen.name().to_string() });
            chosen
        })
        .collect()
}

//! Output rendering for the LaTeX `songs` package.
//!
//! Each processed block is wrapped in the environment of its section kind,
//! then the blocks and the song's metadata are handed to a [`SongTemplate`].

pub mod template;

pub use template::{SongTemplate, TemplateCache};

use std::fmt;

use serde::Serialize;

use crate::constants::markup::TEXT_NOTE;
use crate::types::SectionKind;

/// Environment used when nothing more specific applies.
const FAILSAFE: (&str, &str) = (r"\beginverse*", r"\endverse*");

/// Begin and end commands for a section kind. `ChorusRepeat` has none.
pub const fn environment(kind: SectionKind) -> Option<(&'static str, &'static str)> {
    match kind {
        SectionKind::Verse => Some((r"\beginverse", r"\endverse")),
        SectionKind::Chorus => Some((r"\beginchorus", r"\endchorus")),
        SectionKind::Info => Some((r"\beginscripture{}", r"\endscripture")),
        SectionKind::VerseVariant | SectionKind::Title | SectionKind::Fallback => Some(FAILSAFE),
        SectionKind::ChorusRepeat => None,
    }
}

/// A block ready for the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBlock {
    /// Section kind the block was rendered as.
    pub kind: SectionKind,
    /// Opening command, empty when the block has no environment.
    pub begin: &'static str,
    /// Closing command, empty when the block has no environment.
    pub end: &'static str,
    /// Body lines.
    pub lines: Vec<String>,
}

impl fmt::Display for RenderedBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.begin.is_empty() {
            writeln!(f, "{}", self.begin)?;
        }
        f.write_str(&self.lines.join("\n"))?;
        if !self.end.is_empty() {
            write!(f, "\n{}", self.end)?;
        }
        Ok(())
    }
}

/// Wrap processed lines in the environment for `kind`.
///
/// A chorus repeat becomes a single `\textnote` carrying its label; `lines`
/// then holds the label text.
pub fn render_block(kind: SectionKind, lines: Vec<String>) -> RenderedBlock {
    let Some((begin, end)) = environment(kind) else {
        let label = lines.iter().map(|l| l.trim()).collect::<Vec<_>>().join(" ");
        return RenderedBlock {
            kind,
            begin: "",
            end: "",
            lines: vec![format!("{TEXT_NOTE}{{{label}}}")],
        };
    };

    RenderedBlock { kind, begin, end, lines }
}

/// Escape LaTeX special characters in plain text.
pub fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            '\\' => escaped.push_str(r"\textbackslash{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

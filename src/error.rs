//! Conversion error and warning types.
//!
//! Fatal problems abort the current song and surface as [`Error`]. Everything
//! else is a [`Warning`], collected in [`Diagnostics`] next to a best-effort
//! result.

use serde::Serialize;
use thiserror::Error;

/// Library result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Which line of a chord/lyric pair a replacement applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineSide {
    /// The chord line above.
    Chord,
    /// The lyric line below.
    Lyric,
}

impl std::fmt::Display for LineSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chord => f.write_str("chord"),
            Self::Lyric => f.write_str("lyric"),
        }
    }
}

/// Fatal errors with enough context to find the offending input
#[derive(Debug, Error)]
pub enum Error {
    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<std::path::PathBuf>,
    },

    /// The first block of the song has no title line
    #[error("No title found: the first block must start with the song title (first line: {first_line:?})")]
    MissingTitle {
        /// First line of the offending block, if the song had any content.
        first_line: Option<String>,
    },

    /// The replacement table produced overlapping ranges on one line
    #[error("Overlapping {side} replacements at columns {first:?} and {second:?} in {line:?}")]
    OverlappingReplacement {
        /// Line the replacements were collected from.
        line: String,
        /// Which line of the pair.
        side: LineSide,
        /// Earlier replacement range `[start, end)`.
        first: (usize, usize),
        /// Later replacement range that overlaps `first`.
        second: (usize, usize),
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Template lookup or loading error
    #[error("Template error: {0}")]
    Template(String),

    /// Several inputs of one batch would be written to the same file
    #[error("Output {output:?} would be written by {} inputs: {inputs:?}", .inputs.len())]
    OutputCollision {
        /// The shared output path.
        output: std::path::PathBuf,
        /// Every input mapped to it, in batch order.
        inputs: Vec<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<std::path::PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

/// Non-fatal problems. The conversion continues with a best-effort result.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The line tagger had no confident type for a line
    #[error("Type of line {line} could not be determined, assuming {chosen}")]
    AmbiguousClassification {
        /// Zero-based line number in the input.
        line: usize,
        /// Name of the type that was assumed.
        chosen: String,
    },

    /// A chord token did not match the chord grammar and was kept verbatim
    #[error("Unparsable chord {token:?} kept as written")]
    UnparsableChord {
        /// The token as written in the chord line.
        token: String,
    },

    /// A title-block key is not in the alias table
    #[error("Unknown metadata key {key:?}{}", did_you_mean(.suggestion.as_deref()))]
    UnknownMetadataKey {
        /// Key as written, lower-cased and without spaces.
        key: String,
        /// Closest known alias, if any is close enough.
        suggestion: Option<String>,
    },

    /// A title-block line is neither empty nor `key: value`
    #[error("Malformed metadata line {line:?}")]
    MalformedMetadata {
        /// The offending line.
        line: String,
    },

    /// A template referenced a placeholder nothing provides
    #[error("Unknown template placeholder {name:?}")]
    UnknownPlaceholder {
        /// Placeholder name between the braces.
        name: String,
    },
}

fn did_you_mean(suggestion: Option<&str>) -> String {
    suggestion.map(|s| format!(" (did you mean {s:?}?)")).unwrap_or_default()
}

/// Collects warnings for one song and logs each as it arrives.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Create an empty collector.
    pub const fn new() -> Self {
        Self { warnings: Vec::new() }
    }

    /// Record a warning.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Warnings recorded so far, in order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Consume the collector.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn unknown_key_message_includes_suggestion() {
        let w = Warning::UnknownMetadataKey {
            key: "melodi".to_string(),
            suggestion: Some("melodie".to_string()),
        };
        assert_eq!(w.to_string(), r#"Unknown metadata key "melodi" (did you mean "melodie"?)"#);

        let w = Warning::UnknownMetadataKey { key: "zzz".to_string(), suggestion: None };
        assert_eq!(w.to_string(), r#"Unknown metadata key "zzz""#);
    }

    #[test]
    fn diagnostics_keep_order() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.warn(Warning::UnparsableChord { token: "(x)".to_string() });
        diags.warn(Warning::MalformedMetadata { line: "oops".to_string() });
        assert_eq!(diags.warnings().len(), 2);
        assert!(matches!(diags.warnings()[0], Warning::UnparsableChord { .. }));
    }

    #[test]
    fn config_error_carries_hint() {
        let err = Error::config("Unknown notation style 'x'", "Use verbatim, compact or suffix");
        assert!(err.to_string().contains("Use verbatim"));
    }
}

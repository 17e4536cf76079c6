//! Column-range substitutions applied to chord and lyric lines before overlay.
//!
//! A [`ReplacementTable`] holds ordered `(pattern, replacement)` rules for each
//! side of a chord/lyric pair. Matches are turned into [`Replacement`]s whose
//! ranges are measured in character columns of the original line.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, LineSide, Result};

/// Substitute `text` for columns `[start, end)` of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// First replaced column (chars, 0-based).
    pub start: usize,
    /// One past the last replaced column.
    pub end: usize,
    /// Text to put in place of the range.
    pub text: String,
}

/// A pattern and its replacement template (`$1` expands capture groups).
#[derive(Debug, Clone)]
pub struct ReplacementRule {
    pattern: Regex,
    replacement: String,
}

impl ReplacementRule {
    /// Compile a rule.
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            Error::config(
                format!("Invalid replacement pattern '{pattern}': {e}"),
                "Replacement patterns use Rust regex syntax",
            )
        })?;
        Ok(Self { pattern, replacement: replacement.into() })
    }
}

/// Escapes and repeat signs for lyric lines.
const SONGS_LYRIC_RULES: &[(&str, &str)] = &[
    (r"&", r"\&"),
    (r"%", r"\%"),
    (r"#", r"\#"),
    (r"\|:", r"\lrep"),
    (r":\|", r"\rrep"),
    (r"(?i)\((?:x\s*(\d+)|(\d+)\s*x)\)", r"\rep{$1$2}"),
];

/// Repeat signs for chord lines.
const SONGS_CHORD_RULES: &[(&str, &str)] = &[(r"\|:", r"\lrep"), (r":\|", r"\rrep")];

#[allow(clippy::expect_used)]
static SONGS_DEFAULTS: LazyLock<ReplacementTable> = LazyLock::new(|| {
    let compile = |rules: &[(&str, &str)]| {
        rules
            .iter()
            .map(|(p, r)| ReplacementRule::new(p, *r).expect("valid regex: SONGS_DEFAULTS"))
            .collect()
    };
    ReplacementTable { chord: compile(SONGS_CHORD_RULES), lyric: compile(SONGS_LYRIC_RULES) }
});

/// Ordered substitution rules for chord lines and lyric lines.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTable {
    chord: Vec<ReplacementRule>,
    lyric: Vec<ReplacementRule>,
}

impl ReplacementTable {
    /// A table that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Escapes and repeat signs for the LaTeX `songs` package.
    pub fn songs_defaults() -> Self {
        SONGS_DEFAULTS.clone()
    }

    /// Add a chord-line rule.
    pub fn with_chord_rule(mut self, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        self.chord.push(ReplacementRule::new(pattern, replacement)?);
        Ok(self)
    }

    /// Add a lyric-line rule.
    pub fn with_lyric_rule(mut self, pattern: &str, replacement: impl Into<String>) -> Result<Self> {
        self.lyric.push(ReplacementRule::new(pattern, replacement)?);
        Ok(self)
    }

    /// Replacements for a chord line, sorted by start column.
    pub fn chord_replacements(&self, line: &str) -> Result<Vec<Replacement>> {
        collect(&self.chord, line, LineSide::Chord)
    }

    /// Replacements for a lyric line, sorted by start column.
    pub fn lyric_replacements(&self, line: &str) -> Result<Vec<Replacement>> {
        collect(&self.lyric, line, LineSide::Lyric)
    }
}

/// Run every rule over `line` and check that no two matches overlap.
fn collect(rules: &[ReplacementRule], line: &str, side: LineSide) -> Result<Vec<Replacement>> {
    let mut found = Vec::new();
    for rule in rules {
        for caps in rule.pattern.captures_iter(line) {
            let Some(m) = caps.get(0) else { continue };
            if m.is_empty() {
                continue;
            }
            let mut text = String::new();
            caps.expand(&rule.replacement, &mut text);
            let start = line[..m.start()].chars().count();
            let end = start + m.as_str().chars().count();
            found.push(Replacement { start, end, text });
        }
    }

    found.sort_by_key(|r| r.start);
    if let Some(pair) = found.windows(2).find(|w| w[1].start < w[0].end) {
        return Err(Error::OverlappingReplacement {
            line: line.to_string(),
            side,
            first: (pair[0].start, pair[0].end),
            second: (pair[1].start, pair[1].end),
        });
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    #[test]
    fn defaults_escape_lyrics() {
        let table = ReplacementTable::songs_defaults();
        let reps = table.lyric_replacements("Rock & roll 100%").unwrap();
        assert_eq!(
            reps,
            vec![
                Replacement { start: 5, end: 6, text: r"\&".to_string() },
                Replacement { start: 15, end: 16, text: r"\%".to_string() },
            ]
        );
    }

    #[test]
    fn repeat_counts_expand_captures() {
        let table = ReplacementTable::songs_defaults();
        let reps = table.lyric_replacements("sing it (2x)").unwrap();
        assert_eq!(reps.len(), 1);
        assert_eq!(reps[0].text, r"\rep{2}");
        assert_eq!((reps[0].start, reps[0].end), (8, 12));

        let reps = table.lyric_replacements("(x3)").unwrap();
        assert_eq!(reps[0].text, r"\rep{3}");
    }

    #[test]
    fn repeat_counts_ignore_case() {
        let table = ReplacementTable::songs_defaults();
        for (line, expected) in [("(2X)", r"\rep{2}"), ("(X3)", r"\rep{3}"), ("(4 X)", r"\rep{4}")] {
            let reps = table.lyric_replacements(line).unwrap();
            assert_eq!(reps.len(), 1, "{line:?}");
            assert_eq!(reps[0].text, expected);
        }
    }

    #[test]
    fn every_default_rule_is_present() {
        let table = ReplacementTable::songs_defaults();
        assert_eq!(table.lyric.len(), SONGS_LYRIC_RULES.len());
        assert_eq!(table.chord.len(), SONGS_CHORD_RULES.len());
    }

    #[test]
    fn columns_count_chars_not_bytes() {
        let table = ReplacementTable::songs_defaults();
        let reps = table.lyric_replacements("Grüße & Küsse").unwrap();
        assert_eq!((reps[0].start, reps[0].end), (6, 7));
    }

    #[test]
    fn chord_defaults_only_touch_repeat_signs() {
        let table = ReplacementTable::songs_defaults();
        let reps = table.chord_replacements("|: C   F#  :|").unwrap();
        assert_eq!(reps.len(), 2);
        assert_eq!(reps[0].text, r"\lrep");
        assert_eq!(reps[1].text, r"\rrep");
        assert_eq!(reps[1].start, 11);
    }

    #[test]
    fn overlapping_rules_fail_loudly() {
        let table = ReplacementTable::empty()
            .with_lyric_rule("ab", "X")
            .unwrap()
            .with_lyric_rule("bc", "Y")
            .unwrap();
        let err = table.lyric_replacements("abc").unwrap_err();
        match err {
            Error::OverlappingReplacement { side, first, second, .. } => {
                assert_eq!(side, LineSide::Lyric);
                assert_eq!(first, (0, 2));
                assert_eq!(second, (1, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invalid_pattern_is_a_config_error() {
        let err = ReplacementTable::empty().with_chord_rule("(", "x").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}

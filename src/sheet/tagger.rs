//! Line-grain type ranking.
//!
//! A [`LineTagger`] looks at raw lines and proposes, for each one, an ordered
//! list of candidate [`LineType`]s. A `None` in first position means the
//! tagger is not confident; the classifier then falls back through the rest
//! of the ranking.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::heuristics::{CHORD_AMBIGUOUS_MIN, CHORD_CONFIDENT_MIN, CHORD_LEANING_MIN};
use crate::types::LineType;

/// Candidate types for one line, most likely first.
pub type Ranking = Vec<Option<LineType>>;

/// Something that can propose line types for a whole song.
///
/// Implementations see every line at once so they can use context such as
/// "first non-blank line".
pub trait LineTagger {
    /// Rank candidate types for each line. The result has one entry per input line.
    fn rank_types(&self, lines: &[&str]) -> Vec<Ranking>;

    /// Get the tagger name (for logging).
    fn name(&self) -> &'static str;
}

/// A single chord as written in a chord line, optionally parenthesized.
#[allow(clippy::expect_used)]
static RE_CHORD_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\(?[A-Ha-h](?:is|es|s|#|b|♯|♭)*(?:maj|min|dim|aug|sus|add|m|[0-9]|[+°ø-])*(?:/[A-Ha-h](?:is|es|s|#|b|♯|♭)*)?\)?$",
    )
    .expect("valid regex: RE_CHORD_WORD")
});

/// Bar lines, repeat signs and rests found between chords.
#[allow(clippy::expect_used)]
static RE_BAR_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\|{1,2}|\|:|:\||[-%/.]+)$").expect("valid regex: RE_BAR_WORD")
});

/// Default tagger: title and metadata by position, chords by token shape.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicTagger {
    confident: f64,
    leaning: f64,
    ambiguous: f64,
}

impl Default for HeuristicTagger {
    fn default() -> Self {
        Self {
            confident: CHORD_CONFIDENT_MIN,
            leaning: CHORD_LEANING_MIN,
            ambiguous: CHORD_AMBIGUOUS_MIN,
        }
    }
}

impl HeuristicTagger {
    /// Rank a line that is neither blank nor part of the title block.
    fn rank_content(&self, line: &str) -> Ranking {
        let score = chord_score(line);
        if score >= self.confident {
            vec![Some(LineType::Chord), Some(LineType::Lyric)]
        } else if score >= self.leaning {
            vec![None, Some(LineType::Chord), Some(LineType::Lyric)]
        } else if score >= self.ambiguous {
            vec![None, Some(LineType::Lyric), Some(LineType::Chord)]
        } else {
            vec![Some(LineType::Lyric), Some(LineType::Chord)]
        }
    }
}

impl LineTagger for HeuristicTagger {
    fn rank_types(&self, lines: &[&str]) -> Vec<Ranking> {
        let mut seen_title = false;
        let mut in_title_block = false;

        lines
            .iter()
            .map(|line| {
                if line.trim().is_empty() {
                    in_title_block = false;
                    return vec![Some(LineType::Blank)];
                }
                if !seen_title {
                    seen_title = true;
                    in_title_block = true;
                    return vec![Some(LineType::Title)];
                }
                if in_title_block && line.contains(':') {
                    return vec![Some(LineType::Metadata), Some(LineType::Lyric)];
                }
                self.rank_content(line)
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "HeuristicTagger"
    }
}

/// Share of a line's visible characters that belong to chord-like words,
/// plus a bonus when words are spread out by runs of spaces.
pub fn chord_score(line: &str) -> f64 {
    let (chordish, total) = line
        .split_whitespace()
        .fold((0usize, 0usize), |(chordish, total), word| {
            let len = word.chars().count();
            let is_chord = RE_CHORD_WORD.is_match(word) || RE_BAR_WORD.is_match(word);
            (chordish + if is_chord { len } else { 0 }, total + len)
        });
    if total == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let share = chordish as f64 / total as f64;
    let spread = line.trim().contains("  ");
    if spread && share > 0.0 {
        (share + 0.25).min(1.0)
    } else {
        share
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn first(ranking: &Ranking) -> Option<LineType> {
        ranking.first().copied().flatten()
    }

    #[test]
    fn chord_lines_score_high() {
        assert!((chord_score("C   G   Am  F") - 1.0).abs() < f64::EPSILON);
        assert!((chord_score("fis  h7  E/gis") - 1.0).abs() < f64::EPSILON);
        assert!((chord_score("|: D  A :|") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lyric_lines_score_low() {
        assert!(chord_score("Amazing grace how sweet the sound") < CHORD_AMBIGUOUS_MIN);
        assert!(chord_score("A mighty fortress is our God") < CHORD_AMBIGUOUS_MIN);
        assert!(chord_score("") < f64::EPSILON);
    }

    #[test]
    fn tags_title_metadata_and_content() {
        let lines = [
            "Amazing Grace [Grace]",
            "mel: traditional",
            "",
            "  G        C",
            "Amazing grace",
        ];
        let ranks = HeuristicTagger::default().rank_types(&lines);
        assert_eq!(ranks.len(), lines.len());
        assert_eq!(first(&ranks[0]), Some(LineType::Title));
        assert_eq!(first(&ranks[1]), Some(LineType::Metadata));
        assert_eq!(first(&ranks[2]), Some(LineType::Blank));
        assert_eq!(first(&ranks[3]), Some(LineType::Chord));
        assert_eq!(first(&ranks[4]), Some(LineType::Lyric));
    }

    #[test]
    fn colons_after_the_title_block_are_lyrics() {
        let lines = ["Title", "", "Ref.: sing along"];
        let ranks = HeuristicTagger::default().rank_types(&lines);
        assert_eq!(first(&ranks[2]), Some(LineType::Lyric));
    }

    #[test]
    fn mixed_lines_are_ambiguous() {
        let tagger = HeuristicTagger::default();
        let ranking = tagger.rank_content("Am I");
        assert_eq!(ranking, vec![None, Some(LineType::Chord), Some(LineType::Lyric)]);

        let ranking = tagger.rank_content("His love");
        assert_eq!(ranking, vec![None, Some(LineType::Lyric), Some(LineType::Chord)]);
    }
}

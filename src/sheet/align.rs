//! Chord/lyric alignment.
//!
//! A chord line sits above its lyric line, and each chord belongs to the
//! lyric column directly beneath its first character. [`align`] walks a
//! block once, merging every chord line with the lyric line that follows it
//! and formatting chord lines without lyrics on their own.
//!
//! Replacements may change the length of the text in a column range. Both
//! lines are therefore held as `Cells`, one cell per original column, so a
//! substitution never moves any other column and the overlay can always use
//! the columns as written.

use std::ops::Range;

use crate::constants::markup::{CHORD_CLOSE, CHORD_OPEN, NO_LYRICS_CLOSE, NO_LYRICS_OPEN};
use crate::error::{Diagnostics, Result, Warning};
use crate::types::{Line, LineType};

use super::notation::normalize_chord_spelling;
use super::replace::Replacement;
use super::spacing::convert_spacing;
use super::ConvertOptions;

/// A maximal non-whitespace run of a chord line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordToken {
    /// First column (chars, 0-based).
    pub start: usize,
    /// One past the last column.
    pub end: usize,
    /// Token text, after any chord-line replacements.
    pub text: String,
}

/// A line as text cells indexed by original column.
///
/// A replacement of `[b, e)` stores its text in cell `b` and empties the rest
/// of the range, so cell `i` always holds what now stands at column `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Cells(Vec<String>);

impl Cells {
    fn new(line: &str) -> Self {
        Self(line.chars().map(String::from).collect())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn apply(&mut self, replacements: &[Replacement]) {
        for rep in replacements {
            if self.0.len() < rep.end {
                self.0.resize(rep.end, " ".to_string());
            }
            if let Some((first, rest)) = self.0[rep.start..rep.end].split_first_mut() {
                first.clone_from(&rep.text);
                rest.iter_mut().for_each(String::clear);
            }
        }
    }

    fn pad_to(&mut self, len: usize) {
        if self.0.len() < len {
            self.0.resize(len, " ".to_string());
        }
    }

    fn concat(&self, range: Range<usize>) -> String {
        self.0.get(range).map(<[String]>::concat).unwrap_or_default()
    }

    /// Maximal runs of non-whitespace cells. Emptied cells continue whatever
    /// run they sit in.
    fn tokens(&self) -> Vec<ChordToken> {
        let mut tokens = Vec::new();
        let mut start = None;

        for (col, cell) in self.0.iter().enumerate() {
            if cell.is_empty() {
                continue;
            }
            let blank = cell.chars().all(char::is_whitespace);
            match (start, blank) {
                (None, false) => start = Some(col),
                (Some(s), true) => {
                    tokens.push(self.token(s, col));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            tokens.push(self.token(s, self.0.len()));
        }
        tokens
    }

    fn token(&self, start: usize, end: usize) -> ChordToken {
        ChordToken { start, end, text: self.concat(start..end) }
    }

    /// Drop trailing whitespace cells; they carry no chords.
    fn trim_end(&mut self) {
        while self.0.last().is_some_and(|c| c.chars().all(char::is_whitespace)) {
            self.0.pop();
        }
    }
}

/// Tokens of a chord line as written.
pub fn chord_tokens(line: &str) -> Vec<ChordToken> {
    Cells::new(line).tokens()
}

/// Apply the lyric rules to a line that has no chords above it.
pub fn replace_lyric_text(line: &str, options: &ConvertOptions) -> Result<String> {
    let mut cells = Cells::new(line);
    cells.apply(&options.replacements.lyric_replacements(line)?);
    Ok(cells.concat(0..cells.len()))
}

/// `\[chord]` with the configured spelling. Unparsable chords are kept as
/// written and reported.
fn chord_marker(token: &str, options: &ConvertOptions, diags: &mut Diagnostics) -> String {
    let spelled = normalize_chord_spelling(token, options.notation).unwrap_or_else(|| {
        diags.warn(Warning::UnparsableChord { token: token.to_string() });
        token.to_string()
    });
    format!("{CHORD_OPEN}{spelled}{CHORD_CLOSE}")
}

/// Overlay a chord line onto the lyric line beneath it.
///
/// Each chord marker lands directly before the lyric character that sat
/// under the chord's first column. Lyric text under a chord is not skipped.
/// Where the chord line runs past the lyrics, the lyrics are padded with
/// spaces. The result goes through [`convert_spacing`].
pub fn merge_chord_and_lyric(
    chord: &str,
    lyric: &str,
    options: &ConvertOptions,
    diags: &mut Diagnostics,
) -> Result<String> {
    let mut chord_cells = Cells::new(chord);
    let mut lyric_cells = Cells::new(lyric);

    lyric_cells.apply(&options.replacements.lyric_replacements(lyric)?);
    chord_cells.apply(&options.replacements.chord_replacements(chord)?);
    chord_cells.trim_end();
    lyric_cells.pad_to(chord_cells.len());

    let mut merged = String::new();
    let mut cursor = 0;
    for token in chord_cells.tokens() {
        merged.push_str(&lyric_cells.concat(cursor..token.start));
        merged.push_str(&chord_marker(&token.text, options, diags));
        cursor = token.start;
    }
    merged.push_str(&lyric_cells.concat(cursor..lyric_cells.len()));

    Ok(convert_spacing(&merged))
}

/// Format a chord line that has no lyrics beneath it.
///
/// The gaps between chords are kept as spaces, which become `\hspace`, and the
/// whole line is wrapped in `{\nolyrics …}`.
pub fn format_chord_only(
    chord: &str,
    options: &ConvertOptions,
    diags: &mut Diagnostics,
) -> Result<String> {
    let mut cells = Cells::new(chord);
    cells.apply(&options.replacements.chord_replacements(chord)?);

    let mut line = String::new();
    let mut last_end = 0;
    for token in cells.tokens() {
        line.push_str(&" ".repeat(token.start - last_end));
        line.push_str(&chord_marker(&token.text, options, diags));
        last_end = token.end;
    }

    Ok(format!("{NO_LYRICS_OPEN}{}{NO_LYRICS_CLOSE}", convert_spacing(&line)))
}

/// Merge chord lines into the lyric lines below them, in one forward pass.
///
/// Chord lines followed by a lyric line become one `AnnotatedLyric` line.
/// Chord lines followed by anything else, including the end of the block,
/// are formatted alone and stay `Chord`. Every other line keeps its type and
/// only gets the lyric replacements.
pub fn align(lines: Vec<Line>, options: &ConvertOptions, diags: &mut Diagnostics) -> Result<Vec<Line>> {
    let mut aligned = Vec::with_capacity(lines.len());
    let mut previous: Option<Line> = None;

    // The trailing `None` flushes whatever is still buffered
    for mut current in lines.into_iter().map(Some).chain(std::iter::once(None)) {
        match previous.take() {
            None => {}
            Some(prev) if prev.kind == LineType::Chord => {
                // A merge uses up the current line as well
                if let Some(lyric) = current.take_if(|l| l.kind == LineType::Lyric) {
                    let merged = merge_chord_and_lyric(&prev.text, &lyric.text, options, diags)?;
                    aligned.push(Line::new(merged, LineType::AnnotatedLyric));
                } else {
                    let chords = format_chord_only(&prev.text, options, diags)?;
                    aligned.push(Line::new(chords, LineType::Chord));
                }
            }
            Some(mut prev) => {
                if prev.kind != LineType::Lyric {
                    tracing::debug!("Passing {} line through unaligned: {:?}", prev.kind, prev.text);
                }
                prev.text = replace_lyric_text(&prev.text, options)?;
                aligned.push(prev);
            }
        }

        previous = current;
    }

    Ok(aligned)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::sheet::replace::ReplacementTable;
    use crate::types::NotationStyle;
    use pretty_assertions::assert_eq;

    fn verbatim() -> ConvertOptions {
        ConvertOptions { notation: NotationStyle::Verbatim, replacements: ReplacementTable::empty() }
    }

    fn merge(chord: &str, lyric: &str, options: &ConvertOptions) -> String {
        merge_chord_and_lyric(chord, lyric, options, &mut Diagnostics::new()).unwrap()
    }

    /// (column in the marker-free text, chord) for every marker in `merged`.
    fn marker_columns(merged: &str) -> Vec<(usize, String)> {
        let mut found = Vec::new();
        let mut plain_len = 0;
        let mut rest = merged;
        while let Some(open) = rest.find(r"\[") {
            plain_len += rest[..open].chars().count();
            let after = &rest[open + 2..];
            let close = after.find(']').unwrap();
            found.push((plain_len, after[..close].to_string()));
            rest = &after[close + 1..];
        }
        found
    }

    #[test]
    fn chords_land_on_their_columns() {
        let cases = [
            ("C   G", "Hello world"),
            ("  Am        F", "Amazing grace how sweet"),
            ("D     A  D", "Short and sweet tune"),
            ("   D", "Grüß Gott"),
        ];
        for (chord, lyric) in cases {
            let merged = merge(chord, lyric, &verbatim());
            let expected: Vec<_> = chord_tokens(chord).into_iter().map(|t| (t.start, t.text)).collect();
            assert_eq!(marker_columns(&merged), expected, "{chord:?} over {lyric:?}");
        }
    }

    #[test]
    fn merges_marker_before_lyric_character() {
        assert_eq!(merge("C   G", "Hello world", &verbatim()), r"\[C]Hell\[G]o world");
        assert_eq!(merge("   D", "Grüß Gott", &verbatim()), r"Grü\[D]ß Gott");
    }

    #[test]
    fn shine_on_me_now() {
        let options = ConvertOptions::default();
        assert_eq!(merge("C       G", "Shine on me now", &options), r"\[C]Shine on\[G] me now");
        assert_eq!(merge("C           G", "Shine on me now", &options), r"\[C]Shine on me \[G]now");
    }

    #[test]
    fn chords_past_the_lyrics_pad_with_space() {
        assert_eq!(merge("C      G", "Go", &verbatim()), r"\[C]Go\hspace{1.67em}\[G] ");
    }

    #[test]
    fn longer_lyric_replacement_keeps_later_chords_in_place() {
        let options = ConvertOptions::default();
        assert_eq!(merge("C     G", "Rock & roll", &options), r"\[C]Rock \&\[G] roll");
        // Replacement directly under a chord
        assert_eq!(merge("     G", "Rock & roll", &options), r"Rock \[G]\& roll");
    }

    #[test]
    fn chord_replacements_do_not_shift_lyrics() {
        let options = ConvertOptions::default();
        assert_eq!(
            merge("|: C  :|", "Sing it loud", &options),
            r"\[\lrep]Sin\[C]g i\[\rrep]t loud"
        );
    }

    #[test]
    fn notation_is_applied_to_markers() {
        let options = ConvertOptions::default();
        assert_eq!(merge("a   C", "Hello you", &options), r"\[Am]Hell\[C]o you");
    }

    #[test]
    fn unparsable_chords_warn_and_pass_through() {
        let mut diags = Diagnostics::new();
        let merged = merge_chord_and_lyric("N.C. G", "Silence here", &ConvertOptions::default(), &mut diags).unwrap();
        assert_eq!(merged, r"\[N.C.]Silen\[G]ce here");
        assert_eq!(diags.warnings(), [Warning::UnparsableChord { token: "N.C.".to_string() }]);
    }

    #[test]
    fn orphan_chords_keep_their_gaps() {
        let mut diags = Diagnostics::new();
        let line = format_chord_only("C       G", &ConvertOptions::default(), &mut diags).unwrap();
        assert_eq!(line, r"{\nolyrics \[C]\hspace{2.33em}\[G]}");

        let line = format_chord_only("G D", &ConvertOptions::default(), &mut diags).unwrap();
        assert_eq!(line, r"{\nolyrics \[G] \[D]}");
        assert!(diags.is_empty());
    }

    #[test]
    fn orphan_repeat_signs_are_replaced() {
        let mut diags = Diagnostics::new();
        let line = format_chord_only("|: C  :|", &ConvertOptions::default(), &mut diags).unwrap();
        assert_eq!(line, r"{\nolyrics \[\lrep] \[C]\hspace{0.67em}\[\rrep]}");
        assert!(diags.is_empty());
    }

    #[test]
    fn orphan_chord_keeps_its_indent() {
        let line = format_chord_only("   G", &ConvertOptions::default(), &mut Diagnostics::new()).unwrap();
        assert_eq!(line, r"{\nolyrics \hspace{1em}\[G]}");
    }

    #[test]
    fn align_pairs_chords_with_following_lyrics() {
        let lines = vec![
            Line::new("C   G", LineType::Chord),
            Line::new("Hello world", LineType::Lyric),
            Line::new("F", LineType::Chord),
            Line::new("C", LineType::Chord),
            Line::new("Bye", LineType::Lyric),
            Line::new("plain words", LineType::Lyric),
            Line::new("G", LineType::Chord),
        ];
        let aligned = align(lines, &verbatim(), &mut Diagnostics::new()).unwrap();
        let kinds: Vec<_> = aligned.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            [
                LineType::AnnotatedLyric,
                LineType::Chord,
                LineType::AnnotatedLyric,
                LineType::Lyric,
                LineType::Chord,
            ]
        );
        assert_eq!(aligned[1].text, r"{\nolyrics \[F]}");
        assert_eq!(aligned[2].text, r"\[C]Bye");
        assert_eq!(aligned[3].text, "plain words");
        assert_eq!(aligned[4].text, r"{\nolyrics \[G]}");
    }

    #[test]
    fn align_passes_other_lines_through() {
        let lines = vec![
            Line::new("see page 3", LineType::Info),
            Line::new("words", LineType::Lyric),
        ];
        let aligned = align(lines.clone(), &verbatim(), &mut Diagnostics::new()).unwrap();
        assert_eq!(aligned, lines);
    }

    #[test]
    fn lines_without_chords_still_get_lyric_rules() {
        let lines = vec![
            Line::new("Rock & roll 100%", LineType::Lyric),
            Line::new("capo 2 #1", LineType::Info),
        ];
        let aligned = align(lines, &ConvertOptions::default(), &mut Diagnostics::new()).unwrap();
        assert_eq!(aligned[0], Line::new(r"Rock \& roll 100\%", LineType::Lyric));
        assert_eq!(aligned[1], Line::new(r"capo 2 \#1", LineType::Info));
    }

    #[test]
    fn overlapping_replacements_abort_alignment() {
        let options = ConvertOptions {
            notation: NotationStyle::Verbatim,
            replacements: ReplacementTable::empty()
                .with_lyric_rule("ab", "X")
                .unwrap()
                .with_lyric_rule("bc", "Y")
                .unwrap(),
        };
        let lines = vec![Line::new("C", LineType::Chord), Line::new("abc", LineType::Lyric)];
        assert!(align(lines, &options, &mut Diagnostics::new()).is_err());
    }
}

//! Chord spelling normalization.
//!
//! Two conventions exist for minor chords in hand-written sheets: a lower-case
//! root (`a7`) or an explicit marker (`Am7`). [`normalize_chord_spelling`]
//! rewrites a token into the configured [`NotationStyle`].

use std::sync::LazyLock;

use regex::Regex;

use crate::types::NotationStyle;

/// Root letter, accidentals, optional minor marker, and anything after.
#[allow(clippy::expect_used)]
static RE_CHORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s?)([A-Ha-h])((?:is|es|s|#|b|♯|♭)*)(min|m)?(.*)$").expect("valid regex: RE_CHORD")
});

/// A chord token split at its grammatical seams. All parts borrow the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChordParts<'a> {
    prefix: &'a str,
    root: char,
    accidentals: &'a str,
    minor: Option<&'a str>,
    rest: &'a str,
}

impl<'a> ChordParts<'a> {
    fn parse(token: &'a str) -> Option<Self> {
        let caps = RE_CHORD.captures(token)?;
        let prefix = caps.get(1)?.as_str();
        let root = caps.get(2)?.as_str().chars().next()?;
        let acc = caps.get(3)?;
        let mut accidentals = acc.as_str();
        let mut minor = caps.get(4);
        let mut rest_start = caps.get(5)?.start();

        // `maj` is a modifier, not a minor marker
        if let Some(m) = minor {
            if m.as_str() == "m" && token[m.end()..].starts_with("aj") {
                rest_start = m.start();
                minor = None;
            }
        }

        // The `s` of `Asus` / `esus` belongs to `sus`, not to the accidentals
        if minor.is_none() && accidentals.ends_with('s') && token[rest_start..].starts_with("us") {
            accidentals = &accidentals[..accidentals.len() - 1];
            rest_start = acc.end() - 1;
        }

        Some(Self {
            prefix,
            root,
            accidentals,
            minor: minor.map(|m| m.as_str()),
            rest: &token[rest_start..],
        })
    }

    fn to_compact(self) -> String {
        if !self.root.is_lowercase() {
            return self.join(self.root, self.minor);
        }
        let root = self.root.to_ascii_uppercase();
        self.join(root, Some(self.minor.unwrap_or("m")))
    }

    fn to_suffix(self) -> String {
        if self.minor.is_none() {
            return self.join(self.root, None);
        }
        self.join(self.root.to_ascii_lowercase(), None)
    }

    fn join(self, root: char, minor: Option<&str>) -> String {
        format!(
            "{}{root}{}{}{}",
            self.prefix,
            self.accidentals,
            minor.unwrap_or_default(),
            self.rest
        )
    }
}

/// Rewrite a chord token into `style`.
///
/// Returns `None` when the token has no recognizable root letter; callers keep
/// such tokens as written and report them. Tokens starting with `\` are markup
/// and tokens without any letter are bar lines or rests, both kept unchanged.
/// Slash chords are normalized on each side, and a parenthesized chord keeps
/// its parentheses.
pub fn normalize_chord_spelling(token: &str, style: NotationStyle) -> Option<String> {
    if style == NotationStyle::Verbatim
        || token.starts_with('\\')
        || !token.chars().any(char::is_alphabetic)
    {
        return Some(token.to_string());
    }

    if let Some(inner) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        return normalize_chord_spelling(inner, style).map(|n| format!("({n})"));
    }

    let sides = token
        .split('/')
        .map(|side| {
            let parts = ChordParts::parse(side)?;
            Some(match style {
                NotationStyle::Compact => parts.to_compact(),
                NotationStyle::Suffix => parts.to_suffix(),
                NotationStyle::Verbatim => side.to_string(),
            })
        })
        .collect::<Option<Vec<_>>>()?;

    Some(sides.join("/"))
}

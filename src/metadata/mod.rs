//! Title-block metadata.
//!
//! The first block of a song holds the title, optionally followed by an
//! alternative index title in brackets, and `key: value` lines:
//!
//! ```text
//! Amazing Grace [Grace, amazing]
//! mel: traditional
//! Text: John Newton
//! ```
//!
//! Keys are matched case- and space-insensitively against a fixed alias table.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::Serialize;

use crate::error::{Diagnostics, Warning};
use crate::types::Block;

/// Written key (lower-case, no spaces) to canonical key.
static KEY_ALIASES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    const ALIASES: &[(&str, &[&str])] = &[
        ("mel", &["mel", "melodie", "weise"]),
        ("txt", &["txt", "text", "worte"]),
        ("jahr", &["j", "jahr"]),
        ("meljahr", &["meljahr", "melj", "weisej", "weisejahr"]),
        ("txtjahr", &["txtj", "textj", "txtjahr", "textjahr", "wortejahr", "wortej"]),
        ("alb", &["alb", "album"]),
        ("bo", &["bo", "bock"]),
        ("vq", &["vq", "vasquaner"]),
        ("tf", &["tf", "turmfalke"]),
        ("gb", &["gb", "gnorkenbüdel", "gnorken"]),
        ("tb", &["tb", "burgundi", "tarmina"]),
        ("hk", &["hk", "holz", "holzknopp"]),
        ("wuw", &["wuw"]),
        ("lager", &["lager"]),
        ("biest", &["biest"]),
        ("hvp", &["hvp"]),
    ];

    ALIASES
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect()
});

/// Title and metadata of one song.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    /// Song title.
    pub title: String,
    /// Alternative title for the index, from `Title [Index]`.
    pub index: Option<String>,
    /// Canonical key to value.
    pub fields: BTreeMap<String, String>,
}

impl Metadata {
    /// Flat view including `title` and `index`, as templates see it.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = self.fields.clone();
        map.insert("title".to_string(), self.title.clone());
        if let Some(index) = &self.index {
            map.insert("index".to_string(), index.clone());
        }
        map
    }

    /// Look up a canonical field.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

/// Canonical key for a key as written, if it is known.
pub fn canonical_key(written: &str) -> Option<&'static str> {
    let normalized: String = written.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    KEY_ALIASES.get(normalized.as_str()).copied()
}

/// Read title, index title and fields from the title block.
///
/// Unknown keys and lines without a `:` are reported and skipped.
pub fn extract_metadata(block: &Block, diags: &mut Diagnostics) -> Metadata {
    let mut lines = block.lines().iter().map(|l| l.text.as_str());
    let (title, index) = lines.next().map(split_title).unwrap_or_default();
    let mut metadata = Metadata { title, index, fields: BTreeMap::new() };

    for line in lines {
        let Some((key, value)) = line.split_once(':') else {
            if !line.trim().is_empty() {
                diags.warn(Warning::MalformedMetadata { line: line.to_string() });
            }
            continue;
        };

        let written: String = key.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
        match canonical_key(&written) {
            Some(canonical) => {
                metadata.fields.insert(canonical.to_string(), value.trim().to_string());
            }
            None => {
                let suggestion = suggest_key(&written);
                diags.warn(Warning::UnknownMetadataKey { key: written, suggestion });
            }
        }
    }

    tracing::debug!("Title {:?} with {} metadata fields", metadata.title, metadata.fields.len());
    metadata
}

/// `Title [Index]` into its parts. A `[` at the very start is part of the title.
fn split_title(line: &str) -> (String, Option<String>) {
    let Some(open) = line.find('[').filter(|&i| i > 0) else {
        return (line.trim().to_string(), None);
    };
    let index = line[open + 1..]
        .find(']')
        .map(|close| line[open + 1..open + 1 + close].trim().to_string());
    (line[..open].trim().to_string(), index)
}

/// Closest known alias for an unknown key.
fn suggest_key(written: &str) -> Option<String> {
    const MIN_SCORE: i64 = 50;

    let matcher = SkimMatcherV2::default();
    KEY_ALIASES
        .keys()
        .filter_map(|alias| {
            let score = matcher.fuzzy_match(alias, written)?;
            (score >= MIN_SCORE).then_some((score, *alias))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
        .map(|(_, alias)| alias.to_string())
}

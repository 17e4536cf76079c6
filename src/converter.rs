//! Whole-song conversion.
//!
//! [`SongConverter`] runs the pipeline for one song sheet: tag lines,
//! segment into blocks, read the title block, then label-strip, align and
//! render every other block.

use serde::Serialize;

use crate::error::{Diagnostics, Error, Result, Warning};
use crate::metadata::{extract_metadata, Metadata};
use crate::render::{render_block, RenderedBlock, SongTemplate};
use crate::sheet::{
    align, detect_section, replace_lyric_text, resolve_line_types, segment, strip_label, ConvertOptions,
    HeuristicTagger, LineTagger,
};
use crate::types::{Block, Line, LineType, SectionKind};

/// A converted song, before templating.
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    /// Song title.
    pub title: String,
    /// Title-block metadata.
    pub metadata: Metadata,
    /// Rendered sections in input order.
    pub blocks: Vec<RenderedBlock>,
    /// Everything reported while converting.
    pub warnings: Vec<Warning>,
}

/// Converts song sheets with a fixed tagger, options and template.
///
/// The converter holds no per-song state and can be shared across threads.
#[derive(Debug)]
pub struct SongConverter<T: LineTagger = HeuristicTagger> {
    tagger: T,
    options: ConvertOptions,
    template: SongTemplate,
}

impl SongConverter {
    /// Converter with the default heuristic tagger.
    pub fn new(options: ConvertOptions, template: SongTemplate) -> Self {
        Self::with_tagger(HeuristicTagger::default(), options, template)
    }
}

impl Default for SongConverter {
    fn default() -> Self {
        Self::new(ConvertOptions::default(), SongTemplate::builtin())
    }
}

impl<T: LineTagger> SongConverter<T> {
    /// Converter with a custom line tagger.
    pub const fn with_tagger(tagger: T, options: ConvertOptions, template: SongTemplate) -> Self {
        Self { tagger, options, template }
    }

    /// Conversion options in use.
    pub const fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert one song sheet.
    ///
    /// Fails when the first block has no title line or when replacements
    /// overlap; everything else is collected as warnings on the [`Song`].
    pub fn convert(&self, source: &str) -> Result<Song> {
        let mut diags = Diagnostics::new();

        let texts: Vec<&str> = source.lines().collect();
        let rankings = self.tagger.rank_types(&texts);
        let types = resolve_line_types(&rankings, &mut diags);
        tracing::debug!("{} tagged {} lines", self.tagger.name(), texts.len());

        let lines = texts.iter().zip(types).map(|(text, kind)| Line::new(*text, kind)).collect();
        let mut blocks = segment(lines).into_iter();

        let title_block = blocks.next().ok_or(Error::MissingTitle { first_line: None })?;
        if !title_block.contains(LineType::Title) {
            return Err(Error::MissingTitle {
                first_line: title_block.lines().first().map(|l| l.text.clone()),
            });
        }
        let metadata = extract_metadata(&title_block, &mut diags);

        let rendered = blocks
            .map(|block| self.convert_block(block, &mut diags))
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            "Converted {:?}: {} blocks, {} warnings",
            metadata.title,
            rendered.len(),
            diags.warnings().len()
        );

        Ok(Song {
            title: metadata.title.clone(),
            metadata,
            blocks: rendered,
            warnings: diags.into_warnings(),
        })
    }

    /// Label-strip, align and wrap one non-title block.
    fn convert_block(&self, block: Block, diags: &mut Diagnostics) -> Result<RenderedBlock> {
        let section = detect_section(block.lines());
        let kind = if block.contains(LineType::Title) || block.contains(LineType::Metadata) {
            SectionKind::Fallback
        } else {
            section.kind
        };
        tracing::debug!("Block of {} lines is {kind}", block.len());

        if kind == SectionKind::ChorusRepeat {
            let label = section.label.map(|l| l.text).unwrap_or_default();
            return Ok(render_block(kind, vec![label]));
        }

        let (_, block) = strip_label(block, section.label.as_ref());
        let lines = if kind.aligns_chords() {
            align(block.into_lines(), &self.options, diags)?
        } else {
            block
                .into_lines()
                .into_iter()
                .map(|mut line| {
                    line.text = replace_lyric_text(&line.text, &self.options)?;
                    Ok(line)
                })
                .collect::<Result<Vec<_>>>()?
        };

        let texts = lines
            .into_iter()
            .map(|line| line.text)
            .filter(|text| !text.trim().is_empty())
            .collect();
        Ok(render_block(kind, texts))
    }

    /// Fill the template for an already converted song.
    pub fn render(&self, song: &Song, diags: &mut Diagnostics) -> String {
        self.template.render(&song.metadata, &song.blocks, diags)
    }

    /// Convert and render in one go. Template warnings are appended to the
    /// song's own.
    pub fn convert_to_latex(&self, source: &str) -> Result<(String, Song)> {
        let mut song = self.convert(source)?;
        let mut diags = Diagnostics::new();
        let document = self.render(&song, &mut diags);
        song.warnings.extend(diags.into_warnings());
        Ok((document, song))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::sheet::Ranking;
    use pretty_assertions::assert_eq;

    /// Tags every non-blank line with one fixed type.
    struct FixedTagger(LineType);

    impl LineTagger for FixedTagger {
        fn rank_types(&self, lines: &[&str]) -> Vec<Ranking> {
            lines
                .iter()
                .map(|l| vec![Some(if l.trim().is_empty() { LineType::Blank } else { self.0 })])
                .collect()
        }

        fn name(&self) -> &'static str {
            "FixedTagger"
        }
    }

    const SONG: &str = "My Song [Alt]
mel: Jane Doe

   C       G
1. Shine on me now

Ref.: Glory glory

Ref.
";

    #[test]
    fn converts_a_complete_song() {
        let (doc, song) = SongConverter::default().convert_to_latex(SONG).unwrap();

        assert_eq!(song.title, "My Song");
        assert_eq!(song.metadata.index.as_deref(), Some("Alt"));
        assert_eq!(song.metadata.get("mel"), Some("Jane Doe"));
        assert!(song.warnings.is_empty(), "{:?}", song.warnings);

        let kinds: Vec<_> = song.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(kinds, [SectionKind::Verse, SectionKind::Chorus, SectionKind::ChorusRepeat]);

        assert_eq!(
            doc,
            r"\beginsong{My Song}[index={Alt}, mel={Jane Doe}]

\beginverse
\[C]Shine on\[G] me now
\endverse

\beginchorus
Glory glory
\endchorus

\textnote{Ref.}

\endsong
"
        );
    }

    #[test]
    fn empty_input_has_no_title() {
        let err = SongConverter::default().convert("\n\n").unwrap_err();
        assert!(matches!(err, Error::MissingTitle { first_line: None }));
    }

    #[test]
    fn first_block_without_title_is_fatal() {
        let converter = SongConverter::with_tagger(
            FixedTagger(LineType::Lyric),
            ConvertOptions::default(),
            SongTemplate::builtin(),
        );
        match converter.convert("just lyrics\n\nmore") {
            Err(Error::MissingTitle { first_line }) => {
                assert_eq!(first_line.as_deref(), Some("just lyrics"));
            }
            other => panic!("expected MissingTitle, got {other:?}"),
        }
    }

    #[test]
    fn stray_title_lines_fall_back() {
        let converter = SongConverter::with_tagger(
            FixedTagger(LineType::Title),
            ConvertOptions::default(),
            SongTemplate::builtin(),
        );
        let song = converter.convert("Title\n\nC    G\nsomething").unwrap();
        assert_eq!(song.blocks.len(), 1);
        assert_eq!(song.blocks[0].kind, SectionKind::Fallback);
        assert_eq!(song.blocks[0].lines, vec!["C    G", "something"]);
    }

    #[test]
    fn info_blocks_keep_their_text() {
        let song = SongConverter::default()
            .convert("Title\n\ninfo: Capo 2, play slowly")
            .unwrap();
        assert_eq!(song.blocks[0].kind, SectionKind::Info);
        assert_eq!(song.blocks[0].lines, vec!["Capo 2, play slowly"]);
    }

    #[test]
    fn chordless_lines_are_escaped() {
        let song = SongConverter::default()
            .convert("Title\n\nRock & roll 100%\n\ninfo: capo 2 & 100% slow\n")
            .unwrap();
        assert_eq!(song.blocks[0].lines, vec![r"Rock \& roll 100\%"]);
        assert_eq!(song.blocks[1].kind, SectionKind::Info);
        assert_eq!(song.blocks[1].lines, vec![r"capo 2 \& 100\% slow"]);
    }

    #[test]
    fn unlabeled_verse_with_orphan_chords() {
        let song = SongConverter::default()
            .convert("Title\n\na       E\nAnd then\nD   A")
            .unwrap();
        assert_eq!(song.blocks[0].kind, SectionKind::VerseVariant);
        assert_eq!(
            song.blocks[0].lines,
            vec![r"\[Am]And then\[E] ", r"{\nolyrics \[D]\hspace{1em}\[A]}"]
        );
    }

    #[test]
    fn overlapping_replacements_abort_the_song() {
        let replacements = crate::sheet::ReplacementTable::empty()
            .with_lyric_rule("ab", "X")
            .unwrap()
            .with_lyric_rule("bc", "Y")
            .unwrap();
        let options = ConvertOptions { replacements, ..ConvertOptions::default() };
        let converter = SongConverter::new(options, SongTemplate::builtin());

        let err = converter.convert("Title\n\nC\nabc").unwrap_err();
        assert!(matches!(err, Error::OverlappingReplacement { .. }));
    }
}

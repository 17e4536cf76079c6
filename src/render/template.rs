//! Song document templates.
//!
//! A template is LaTeX source with `\VAR{name}` placeholders. Known names are
//! `title`, `body`, `options` and `metadata.<key>`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::constants::template::{BUILTIN_NAME, TEMPLATE_EXTENSION};
use crate::error::{Diagnostics, Error, Result, Warning};
use crate::metadata::Metadata;

use super::{escape_latex, RenderedBlock};

/// `\VAR{name}`.
#[allow(clippy::expect_used)]
static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\VAR\{([^}]*)\}").expect("valid regex: RE_PLACEHOLDER")
});

const BUILTIN_SOURCE: &str = r"\beginsong{\VAR{title}}\VAR{options}

\VAR{body}

\endsong
";

/// A loaded template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongTemplate {
    name: String,
    source: String,
}

impl SongTemplate {
    /// The template compiled into the binary.
    pub fn builtin() -> Self {
        Self::from_source(BUILTIN_NAME, BUILTIN_SOURCE)
    }

    /// A template from a string.
    pub fn from_source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self { name: name.into(), source: source.into() }
    }

    /// Load a template file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = fs_err::read_to_string(path).map_err(|e| Error::io(e, path.to_path_buf()))?;
        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        tracing::debug!("Loaded template {name} from {}", path.display());
        Ok(Self { name, source })
    }

    /// Template name, for logging.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fill in the placeholders.
    ///
    /// Blocks are separated by blank lines in `body`. Unknown placeholders
    /// render empty and are reported; a `metadata.<key>` the song lacks
    /// renders empty silently.
    pub fn render(&self, metadata: &Metadata, blocks: &[RenderedBlock], diags: &mut Diagnostics) -> String {
        let body = blocks.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n\n");
        let fields = metadata.to_map();

        RE_PLACEHOLDER
            .replace_all(&self.source, |caps: &Captures<'_>| {
                let name = caps[1].trim();
                match name {
                    "title" => escape_latex(&metadata.title),
                    "body" => body.clone(),
                    "options" => song_options(metadata),
                    _ => {
                        if let Some(key) = name.strip_prefix("metadata.") {
                            fields.get(key).map(|v| escape_latex(v)).unwrap_or_default()
                        } else {
                            diags.warn(Warning::UnknownPlaceholder { name: name.to_string() });
                            String::new()
                        }
                    }
                }
            })
            .into_owned()
    }
}

/// `[index={…}, key={…}, …]`, or nothing when the song has no metadata.
fn song_options(metadata: &Metadata) -> String {
    let options: Vec<String> = metadata
        .index
        .iter()
        .map(|index| ("index", index.as_str()))
        .chain(metadata.fields.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map(|(key, value)| format!("{key}={{{}}}", escape_latex(value)))
        .collect();

    if options.is_empty() {
        String::new()
    } else {
        format!("[{}]", options.join(", "))
    }
}

/// Cached templates, looked up by name in a list of directories.
#[derive(Debug, Default)]
pub struct TemplateCache {
    templates: HashMap<String, SongTemplate>,
    search_paths: Vec<PathBuf>,
}

impl TemplateCache {
    /// Create a new template cache with search paths
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { templates: HashMap::new(), search_paths }
    }

    /// Add a search path
    pub fn add_search_path(&mut self, path: PathBuf) {
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    /// Try to find and load a template.
    ///
    /// `builtin` is always available. A name that is an existing file is
    /// loaded directly; anything else is looked up as `<dir>/<name>.tex`.
    fn find_template(&self, name: &str) -> Result<SongTemplate> {
        if name == BUILTIN_NAME {
            return Ok(SongTemplate::builtin());
        }

        let direct = Path::new(name);
        if direct.is_file() {
            return SongTemplate::from_file(direct);
        }

        let file_name = format!("{name}.{TEMPLATE_EXTENSION}");
        self.search_paths
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
            .map_or_else(
                || {
                    Err(Error::Template(format!(
                        "template '{name}' not found (searched {} directories)",
                        self.search_paths.len()
                    )))
                },
                |path| SongTemplate::from_file(&path),
            )
    }

    /// Get a template, loading it if necessary
    pub fn get(&mut self, name: &str) -> Result<&SongTemplate> {
        if !self.templates.contains_key(name) {
            let template = self.find_template(name)?;
            self.templates.insert(name.to_string(), template);
        }
        self.templates
            .get(name)
            .ok_or_else(|| Error::Template(format!("template '{name}' vanished from cache")))
    }
}

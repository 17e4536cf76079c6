//! Batch conversion of song files.
//!
//! Inputs may be files or directories; directories are walked recursively
//! for `*.txt`. Songs are converted in parallel and each one succeeds or fails
//! on its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::constants::template::{INPUT_EXTENSION, OUTPUT_EXTENSION};
use crate::converter::SongConverter;
use crate::error::{Error, Result, Warning};
use crate::sheet::LineTagger;

/// Where generated documents go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Keep documents in memory for printing.
    Stdout,
    /// `<stem>.tex` next to each input.
    Beside,
    /// `<stem>.tex` in one directory.
    Directory(PathBuf),
}

impl Destination {
    /// Output path for `input`, or `None` when nothing is written.
    pub fn output_path(&self, input: &Path) -> Option<PathBuf> {
        match self {
            Self::Stdout => None,
            Self::Beside => Some(input.with_extension(OUTPUT_EXTENSION)),
            Self::Directory(dir) => {
                let mut name = input.file_stem()?.to_os_string();
                name.push(".");
                name.push(OUTPUT_EXTENSION);
                Some(dir.join(name))
            }
        }
    }
}

/// Result of converting one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Input file.
    pub input: PathBuf,
    /// Written document, if any.
    pub output: Option<PathBuf>,
    /// Song title, when conversion got that far.
    pub title: Option<String>,
    /// Warnings for this song.
    pub warnings: Vec<Warning>,
    /// Fatal error message, if the song failed.
    pub error: Option<String>,
    /// Document text for [`Destination::Stdout`].
    #[serde(skip)]
    pub document: Option<String>,
}

impl FileOutcome {
    fn new(input: &Path) -> Self {
        Self {
            input: input.to_path_buf(),
            output: None,
            title: None,
            warnings: Vec::new(),
            error: None,
            document: None,
        }
    }

    /// Whether the song converted.
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of a whole batch, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Songs converted without a fatal error.
    pub converted: usize,
    /// Songs that failed.
    pub failed: usize,
    /// Total warnings across all songs.
    pub warnings: usize,
    /// Per-file details.
    pub songs: Vec<FileOutcome>,
}

impl BatchReport {
    fn from_outcomes(songs: Vec<FileOutcome>) -> Self {
        let failed = songs.iter().filter(|s| !s.is_ok()).count();
        Self {
            converted: songs.len() - failed,
            failed,
            warnings: songs.iter().map(|s| s.warnings.len()).sum(),
            songs,
        }
    }

    /// Whether every song converted.
    pub const fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Expand inputs into song files. Directories contribute their `*.txt` files
/// in sorted order; files are taken as given.
pub fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(input)
            .follow_links(true)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == INPUT_EXTENSION))
            .map(walkdir::DirEntry::into_path)
            .collect();
        found.sort();
        tracing::debug!("Found {} song files in {}", found.len(), input.display());
        files.extend(found);
    }
    files
}

/// Output paths claimed by more than one input, with those inputs.
fn output_collisions(files: &[PathBuf], destination: &Destination) -> HashMap<PathBuf, Vec<PathBuf>> {
    let mut claims: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
    for input in files {
        if let Some(output) = destination.output_path(input) {
            claims.entry(output).or_default().push(input.clone());
        }
    }
    claims.retain(|_, inputs| inputs.len() > 1);
    claims
}

/// Convert every file in parallel.
///
/// Inputs that would overwrite each other's output are not converted; each
/// of them fails with [`Error::OutputCollision`].
pub fn convert_all<T: LineTagger + Sync>(
    converter: &SongConverter<T>,
    files: &[PathBuf],
    destination: &Destination,
) -> Result<BatchReport> {
    if let Destination::Directory(dir) = destination {
        fs_err::create_dir_all(dir).map_err(|e| Error::io(e, dir.clone()))?;
    }

    let collisions = output_collisions(files, destination);
    let start = Instant::now();
    let outcomes: Vec<FileOutcome> = files
        .par_iter()
        .map(|input| {
            let output = destination.output_path(input);
            match output.and_then(|o| collisions.get_key_value(&o)) {
                Some((output, inputs)) => collision_outcome(input, output, inputs),
                None => convert_file(converter, input, destination),
            }
        })
        .collect();
    let report = BatchReport::from_outcomes(outcomes);

    tracing::info!(
        "Converted {} of {} songs in {:?} ({} warnings)",
        report.converted,
        files.len(),
        start.elapsed(),
        report.warnings
    );
    Ok(report)
}

fn collision_outcome(input: &Path, output: &Path, inputs: &[PathBuf]) -> FileOutcome {
    let error = Error::OutputCollision { output: output.to_path_buf(), inputs: inputs.to_vec() };
    tracing::error!("{}: {error}", input.display());
    FileOutcome { error: Some(error.to_string()), ..FileOutcome::new(input) }
}

fn convert_file<T: LineTagger>(converter: &SongConverter<T>, input: &Path, destination: &Destination) -> FileOutcome {
    let mut outcome = FileOutcome::new(input);

    let converted = fs_err::read_to_string(input)
        .map_err(|e| Error::io(e, input.to_path_buf()))
        .and_then(|source| converter.convert_to_latex(&source));
    let (document, song) = match converted {
        Ok(done) => done,
        Err(e) => {
            tracing::error!("{}: {e}", input.display());
            outcome.error = Some(e.to_string());
            return outcome;
        }
    };
    outcome.title = Some(song.title);
    outcome.warnings = song.warnings;

    match destination.output_path(input) {
        Some(path) => {
            if let Err(e) = fs_err::write(&path, document) {
                tracing::error!("{}: {e}", path.display());
                outcome.error = Some(e.to_string());
            } else {
                tracing::debug!("Wrote {}", path.display());
                outcome.output = Some(path);
            }
        }
        None => outcome.document = Some(document),
    }
    outcome
}

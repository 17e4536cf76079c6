//! `songsheet` - convert chord sheets to LaTeX `songs` documents.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songsheet::config::{expand_path, Config};
use songsheet::render::TemplateCache;
use songsheet::utils::batch::{collect_inputs, convert_all, Destination};
use songsheet::{ConvertOptions, NotationStyle, SongConverter};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Song files or directories of `*.txt` songs
    #[arg(required = true, value_name = "INPUTS")]
    inputs: Vec<PathBuf>,

    /// Write `<stem>.tex` files here instead of next to each input
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Chord spelling: verbatim, compact or suffix
    #[arg(short, long, value_name = "STYLE")]
    notation: Option<NotationStyle>,

    /// Template name (searched in the template directories) or path
    #[arg(short, long, value_name = "NAME|PATH")]
    template: Option<String>,

    /// Print documents to stdout instead of writing files
    #[arg(long, action = ArgAction::SetTrue)]
    stdout: bool,

    /// Write a JSON report of the batch to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "songsheet=debug,info" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let config = Config::load().context("Failed to load configuration")?;
    tracing::debug!("{} v{}", config.app_name(), config.app_version());

    let notation = cli.notation.unwrap_or(config.notation);
    let template_name = cli.template.unwrap_or(config.template);
    let mut templates = TemplateCache::new(config.template_dirs);
    let template = templates
        .get(&template_name)
        .with_context(|| format!("Failed to load template '{template_name}'"))?
        .clone();
    tracing::info!("Using template {} with {notation} chords", template.name());

    let converter = SongConverter::new(ConvertOptions::with_notation(notation), template);

    let destination = if cli.stdout {
        Destination::Stdout
    } else {
        cli.output_dir
            .map(|dir| expand_path(&dir))
            .or(config.output_dir)
            .map_or(Destination::Beside, Destination::Directory)
    };

    let files = collect_inputs(&cli.inputs);
    if files.is_empty() {
        anyhow::bail!("No song files found in the given inputs");
    }

    let report = convert_all(&converter, &files, &destination).context("Batch conversion failed")?;

    if destination == Destination::Stdout {
        let mut stdout = std::io::stdout().lock();
        for document in report.songs.iter().filter_map(|s| s.document.as_deref()) {
            writeln!(stdout, "{document}").context("Failed to write to stdout")?;
        }
    }

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        fs_err::write(path, json).context("Failed to write report")?;
        tracing::info!("Wrote report to {}", path.display());
    }

    for song in report.songs.iter().filter(|s| !s.is_ok()) {
        eprintln!("failed: {}: {}", song.input.display(), song.error.as_deref().unwrap_or_default());
    }

    Ok(report.is_success())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

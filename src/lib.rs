//! `songsheet` - plain-text chord sheets to LaTeX `songs` documents.
//!
//! A song sheet interleaves chord lines with the lyric lines beneath them.
//! This crate classifies each line, splits the song into sections, merges
//! every chord into the lyric column it sits above, and renders the result
//! through a template.

pub mod config;
pub mod constants;
pub mod converter;
pub mod error;
pub mod metadata;
pub mod render;
pub mod sheet;
pub mod types;
pub mod utils;

pub use converter::{Song, SongConverter};
pub use error::{Diagnostics, Error, Result, Warning};
pub use sheet::ConvertOptions;
pub use types::{Block, Line, LineType, NotationStyle, SectionKind};

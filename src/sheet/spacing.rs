//! Space-run conversion.
//!
//! Typeset output does not honour runs of literal spaces, so every run of two
//! or more becomes an explicit `\hspace` sized in em.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::constants::markup::SPACES_PER_EM;

/// Two or more consecutive spaces.
#[allow(clippy::expect_used)]
static RE_SPACE_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r" {2,}").expect("valid regex: RE_SPACE_RUN")
});

/// Replace each run of 2+ spaces with `\hspace{<run/3>em}`.
///
/// The width is rounded to two decimals and printed without trailing zeros.
/// Single spaces and everything else pass through, so converting twice is the
/// same as converting once.
pub fn convert_spacing(line: &str) -> String {
    RE_SPACE_RUN
        .replace_all(line, |caps: &Captures<'_>| hspace(caps[0].len()))
        .into_owned()
}

/// Spacing command for a run of `spaces` spaces.
pub fn hspace(spaces: usize) -> String {
    #[allow(clippy::cast_precision_loss)]
    let em = (spaces as f64 / SPACES_PER_EM * 100.0).round() / 100.0;
    format!(r"\hspace{{{em}em}}")
}

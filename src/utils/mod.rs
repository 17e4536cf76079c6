//! Utility modules.

pub mod batch;

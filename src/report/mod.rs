//! Report renderers for dependency scan results.
//!
//! - [`terminal`]: summary per ecosystem plus a sorted dependency table; `--quiet` prints keys only.
//! - [`json`]: sorted composite keys with per-ecosystem status and errors.

pub mod json;
pub mod terminal;

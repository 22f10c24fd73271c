//! Frame sinks.
//!
//! Sinks consume rendered frames in increasing frame order and are fed by
//! [`crate::Simulation::render_range`].

/// `ffmpeg`-based video sink.
pub mod ffmpeg;
/// Numbered PNG still images.
pub mod png_seq;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;

use crate::foundation::error::StarfieldResult;
use std::path::Path;

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> StarfieldResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

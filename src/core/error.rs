use std::path::PathBuf;
use thiserror::Error;

/// Conditions the keyframe pipeline must report distinctly to the caller.
///
/// Everything else (backend failures mid-run, filesystem errors) travels
/// as plain `anyhow` context up to the CLI boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The video container could not be opened at all. Fatal, and raised
    /// before any output is produced.
    #[error("cannot open video source {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// The container opened but produced zero readable frames. A clean
    /// terminal condition, not a crash: the output folder is left empty.
    #[error("video source {path} opened but produced no frames")]
    EmptySource { path: PathBuf },
}

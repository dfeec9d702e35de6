use std::path::PathBuf;
use thiserror::Error;

/// Failures that can abort a pipeline run.
///
/// Data-quality problems (unmatched lines, audit issues) are deliberately not
/// represented here; they are ordinary values that accumulate in reports.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Required input file not found: {}", .0.display())]
    AssetMissing(PathBuf),

    #[error("Recognizer command not found: {0}")]
    RecognizerMissing(String),

    #[error("Speech recognition failed (exit code {code}): {diagnostics}")]
    RecognitionFailed { code: i32, diagnostics: String },

    #[error("Recognizer reported a failure: {0}")]
    RecognizerReported(String),

    #[error("Recognizer produced unusable output: {0}")]
    MalformedRecognition(String),
}

impl SyncError {
    pub fn from_exit_status(status: std::process::ExitStatus, diagnostics: &str) -> Self {
        SyncError::RecognitionFailed {
            code: status.code().unwrap_or(-1),
            diagnostics: diagnostics.trim_end().to_string(),
        }
    }
}

/// Eager existence check for user-supplied input files.
pub fn ensure_asset(path: &std::path::Path) -> Result<(), SyncError> {
    if path.exists() {
        Ok(())
    } else {
        Err(SyncError::AssetMissing(path.to_path_buf()))
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// A single word with its timing information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub probability: f64,
}

/// One span of audio the recognizer believes is continuous speech.
///
/// `start < end` is expected but not guaranteed by the recognizer; consumers
/// must tolerate degenerate spans (the audit gate flags them downstream).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSegment {
    /// Sequence index, order-significant within one transcription run.
    pub id: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
    /// Recognizer-reported score, advisory only.
    #[serde(default)]
    pub confidence: f64,
    /// Word-level timings for karaoke-style highlighting.
    /// If empty, the segment carries no finer-grained timing.
    #[serde(default)]
    pub words: Vec<WordTiming>,
}

/// Complete recognizer output for one audio file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResult {
    pub duration: f64,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub language_probability: f64,
    pub segments: Vec<RecognizedSegment>,
    #[serde(default)]
    pub confidence: f64,
}

/// Parse one raw recognizer document into the typed result.
///
/// Used identically for fresh subprocess output and cached entries, so both
/// paths get the same validation. The recognizer reports its own failures as
/// `{"error": ..., "status": "failed"}`, possibly with a zero exit code, and
/// that payload is rejected here so it can never be cached or aligned
/// against.
pub fn parse_transcription(raw: &str) -> Result<TranscriptionResult> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| SyncError::MalformedRecognition(format!("invalid JSON: {e}")))?;

    if let Some(error) = value.get("error").and_then(|v| v.as_str()) {
        return Err(SyncError::RecognizerReported(error.to_string()).into());
    }

    let result: TranscriptionResult = serde_json::from_value(value)
        .map_err(|e| SyncError::MalformedRecognition(format!("unexpected shape: {e}")))?;
    Ok(result)
}

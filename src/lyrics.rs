use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::align::SyncedLine;
use crate::transcribe::result::WordTiming;

/// One timed lyric line as handed to the renderer. Field names follow the
/// camelCase JSON contract of the composition layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub words: Vec<WordTiming>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl From<SyncedLine> for LyricLine {
    fn from(line: SyncedLine) -> Self {
        Self {
            text: line.text,
            start: line.start,
            end: line.end,
            confidence: line.confidence,
            words: line.words,
            background_image: None,
        }
    }
}

/// Read the authoritative lyric sheet: one line per entry, trimmed, blank
/// lines dropped.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read lyrics text from {}", path.display()))?;
    Ok(raw
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub fn read_lyrics(path: &Path) -> Result<Vec<LyricLine>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read timed lyrics from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse timed lyrics in {}", path.display()))
}

pub fn write_lyrics(path: &Path, lines: &[LyricLine]) -> Result<()> {
    let rendered = serde_json::to_string_pretty(lines).context("Failed to serialize timed lyrics")?;
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write timed lyrics to {}", path.display()))
}

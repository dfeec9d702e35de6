pub mod cache;
pub mod recognizer;
pub mod result;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::path::Path;

use crate::cli::TranscribeArgs;
use crate::config::SyncConfig;
use crate::error::ensure_asset;
use crate::ui::prelude::*;

use cache::{TranscriptionCache, run_transcription};
use recognizer::{RecognitionRequest, WhisperRecognizer};

/// Recognition model selector. `large` resolves to the recognizer's
/// `large-v3` build; cache keys record the selector name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSize {
    Base,
    Small,
    #[default]
    Medium,
    Large,
}

impl ModelSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelSize::Base => "base",
            ModelSize::Small => "small",
            ModelSize::Medium => "medium",
            ModelSize::Large => "large",
        }
    }

    /// Argument passed to the recognizer subprocess.
    pub fn recognizer_arg(self) -> &'static str {
        match self {
            ModelSize::Large => "large-v3",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for ModelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the effective recognition request from flags and config, checking
/// the audio file eagerly before any expensive work.
pub fn build_request(
    audio: &Path,
    model: Option<ModelSize>,
    language: Option<&str>,
    config: &SyncConfig,
) -> Result<RecognitionRequest> {
    ensure_asset(audio)?;
    let audio = audio
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize path {}", audio.display()))?;
    Ok(RecognitionRequest {
        audio,
        model: model.unwrap_or(config.model),
        language: language.unwrap_or(&config.language).to_string(),
    })
}

pub fn handle_transcribe(args: &TranscribeArgs, config: &SyncConfig) -> Result<()> {
    let request = build_request(&args.audio, args.model, args.language.as_deref(), config)?;
    emit(
        Level::Info,
        "transcribe.start",
        &format!(
            "Transcribing {} ({} model, language {})",
            request.audio.display(),
            request.model,
            request.language
        ),
        None,
    );

    let recognizer =
        WhisperRecognizer::new(args.recognizer.as_deref().unwrap_or(&config.recognizer))?;
    let cache = TranscriptionCache::open()?;
    let outcome = run_transcription(&recognizer, &cache, &request, args.force)?;

    if outcome.cache_hit {
        emit(
            Level::Info,
            "transcribe.cached",
            &format!(
                "Using cached transcription at {} (use --force to regenerate)",
                outcome.cache_path.display()
            ),
            None,
        );
    } else {
        emit(
            Level::Success,
            "transcribe.success",
            &format!("Cached transcription at {}", outcome.cache_path.display()),
            None,
        );
    }
    emit(
        Level::Info,
        "transcribe.summary",
        &format!(
            "{} segments over {:.1}s of audio",
            outcome.result.segments.len(),
            outcome.result.duration
        ),
        Some(json!({
            "segments": outcome.result.segments.len(),
            "duration": outcome.result.duration,
            "cacheHit": outcome.cache_hit,
            "cachePath": outcome.cache_path,
        })),
    );
    Ok(())
}

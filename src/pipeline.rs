use anyhow::{Result, bail};
use serde_json::json;

use crate::align::normalize::TextNormalizer;
use crate::align::{self, LineOutcome};
use crate::audit::{self, RenderStyle};
use crate::cli::GenerateArgs;
use crate::config::SyncConfig;
use crate::error::ensure_asset;
use crate::images;
use crate::lyrics::{self, LyricLine};
use crate::transcribe::build_request;
use crate::transcribe::cache::{TranscriptionCache, run_transcription};
use crate::transcribe::recognizer::WhisperRecognizer;
use crate::ui::prelude::*;

/// Run the full pipeline: transcribe (cached), align the authoritative lyric
/// sheet, assign background images, audit, and only then write the output
/// file. A failed audit leaves the output untouched.
pub fn handle_generate(args: &GenerateArgs, config: &SyncConfig) -> Result<()> {
    let request = build_request(&args.audio, args.model, args.language.as_deref(), config)?;
    ensure_asset(&args.lyrics)?;

    emit(
        Level::Info,
        "generate.start",
        &format!("Generating timed lyrics for {}", request.audio.display()),
        Some(json!({
            "audio": request.audio.display().to_string(),
            "lyrics": args.lyrics.display().to_string(),
            "model": request.model.as_str(),
            "language": request.language,
        })),
    );

    let lines = lyrics::load_lines(&args.lyrics)?;
    if lines.is_empty() {
        bail!(
            "Lyrics file {} contains no usable lines",
            args.lyrics.display()
        );
    }

    let recognizer =
        WhisperRecognizer::new(args.recognizer.as_deref().unwrap_or(&config.recognizer))?;
    let cache = TranscriptionCache::open()?;
    let outcome = run_transcription(&recognizer, &cache, &request, args.force)?;
    if outcome.cache_hit {
        emit(
            Level::Info,
            "transcribe.cached",
            "Using cached transcription",
            None,
        );
    }
    emit(
        Level::Info,
        "generate.transcribed",
        &format!(
            "{} segments over {:.1}s of audio",
            outcome.result.segments.len(),
            outcome.result.duration
        ),
        Some(json!({
            "segments": outcome.result.segments.len(),
            "duration": outcome.result.duration,
        })),
    );

    let normalizer = TextNormalizer::new()?;
    let outcomes = align::align_lines(&normalizer, &lines, &outcome.result.segments)?;

    let mut synced = Vec::new();
    let mut unmatched = 0usize;
    for result in outcomes {
        match result {
            LineOutcome::Synced(line) => synced.push(line),
            LineOutcome::Unmatched(miss) => {
                unmatched += 1;
                emit(
                    Level::Warn,
                    "align.unmatched",
                    &format!("Could not find timing for line: \"{}\"", miss.text),
                    Some(json!({ "lineIndex": miss.line_index })),
                );
            }
        }
    }
    emit(
        Level::Info,
        "align.summary",
        &format!("Matched {} lines, {} unmatched", synced.len(), unmatched),
        Some(json!({ "matched": synced.len(), "unmatched": unmatched })),
    );

    let mut timed: Vec<LyricLine> = synced.into_iter().map(Into::into).collect();

    let images_dir = args.images_dir.clone().or_else(|| config.images_dir());
    if let Some(dir) = images_dir {
        let pool = images::scan_pool(&dir);
        emit(
            Level::Info,
            "images.pool",
            &format!(
                "Found {} background images in {}",
                pool.len(),
                dir.display()
            ),
            Some(json!({ "count": pool.len() })),
        );
        images::assign_backgrounds(&mut timed, &pool);
    }

    let style = RenderStyle {
        font_size: Some(args.font_size.unwrap_or(config.font_size)),
    };
    let report = audit::audit_lines(&timed, Some(&style));
    audit::emit_issues(&report);
    if !report.is_valid {
        bail!(
            "Audit failed: {} error(s) detected. Fix them before rendering.",
            report.summary.error_count
        );
    }

    let total_words: usize = timed.iter().map(|l| l.words.len()).sum();
    lyrics::write_lyrics(&args.output, &timed)?;
    emit(
        Level::Success,
        "generate.success",
        &format!(
            "Wrote {} timed lines to {}",
            timed.len(),
            args.output.display()
        ),
        Some(json!({
            "lines": timed.len(),
            "words": total_words,
            "warnings": report.summary.warning_count,
            "output": args.output.display().to_string(),
        })),
    );
    Ok(())
}

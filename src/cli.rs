use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::transcribe::ModelSize;
use crate::ui::OutputFormat;

/// Sync authoritative lyrics to a recording and gate the result for rendering
#[derive(Parser, Debug)]
#[command(name = "lyrsync", version, about, long_about = None)]
pub struct Cli {
    /// Activate debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit newline-delimited JSON events instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Transcribe an audio file with the configured recognizer (cached)
    Transcribe(TranscribeArgs),
    /// Run the full pipeline: transcribe, align, audit, write timed lyrics
    Generate(GenerateArgs),
    /// Validate an existing timed-lyrics JSON file
    Audit(AuditArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TranscribeArgs {
    /// Audio file to transcribe
    #[arg(value_hint = ValueHint::FilePath)]
    pub audio: PathBuf,

    /// Recognition model size override
    #[arg(long, value_enum)]
    pub model: Option<ModelSize>,

    /// Language code override (e.g. ja, en)
    #[arg(long)]
    pub language: Option<String>,

    /// Recognizer command override; may carry arguments
    #[arg(long)]
    pub recognizer: Option<String>,

    /// Re-run recognition even if a cached transcription exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Audio file to sync against
    #[arg(value_hint = ValueHint::FilePath)]
    pub audio: PathBuf,

    /// Authoritative lyric sheet, one display line per text line
    #[arg(value_hint = ValueHint::FilePath)]
    pub lyrics: PathBuf,

    /// Output path for the timed-lyrics JSON
    #[arg(short = 'o', long = "output", value_hint = ValueHint::FilePath, default_value = "lyrics.json")]
    pub output: PathBuf,

    /// Recognition model size override
    #[arg(long, value_enum)]
    pub model: Option<ModelSize>,

    /// Language code override (e.g. ja, en)
    #[arg(long)]
    pub language: Option<String>,

    /// Recognizer command override; may carry arguments
    #[arg(long)]
    pub recognizer: Option<String>,

    /// Re-run recognition even if a cached transcription exists
    #[arg(long)]
    pub force: bool,

    /// Directory of background images cycled across lines
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub images_dir: Option<PathBuf>,

    /// Font size assumed by the layout audit
    #[arg(long)]
    pub font_size: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct AuditArgs {
    /// Timed-lyrics JSON file to validate
    #[arg(value_hint = ValueHint::FilePath)]
    pub lyrics: PathBuf,

    /// Font size assumed by the layout audit
    #[arg(long)]
    pub font_size: Option<f64>,
}

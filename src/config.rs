use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::transcribe::ModelSize;

pub const DEFAULT_RECOGNIZER: &str = "whisper-transcribe";
pub const DEFAULT_LANGUAGE: &str = "ja";
pub const DEFAULT_FONT_SIZE: f64 = 80.0;

/// Defaults for everything the CLI flags can override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Recognition model size used when --model is not given
    pub model: ModelSize,
    /// Language code passed to the recognizer
    pub language: String,
    /// Recognizer command; may carry arguments, e.g. "python3 /opt/whisper/transcribe.py"
    pub recognizer: String,
    /// Directory scanned for background images (~ is expanded)
    pub images_dir: Option<String>,
    /// Font size assumed by the layout audit
    pub font_size: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            model: ModelSize::default(),
            language: DEFAULT_LANGUAGE.to_string(),
            recognizer: DEFAULT_RECOGNIZER.to_string(),
            images_dir: None,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl SyncConfig {
    pub fn load() -> Result<Self> {
        Self::load_from_path(config_path()?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents).context("parsing config")?;
        if !config.font_size.is_finite() || config.font_size <= 0.0 {
            config.font_size = DEFAULT_FONT_SIZE;
        }
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }

        let toml = toml::to_string_pretty(self).context("serializing config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing config to {}", path.display()))?;
        Ok(())
    }

    /// Configured image directory with ~ expanded, if any.
    pub fn images_dir(&self) -> Option<PathBuf> {
        self.images_dir
            .as_deref()
            .map(|dir| PathBuf::from(shellexpand::tilde(dir).into_owned()))
    }
}

fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Unable to determine config directory")?
        .join("lyrsync")
        .join("config.toml"))
}

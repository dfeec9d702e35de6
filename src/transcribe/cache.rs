use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use super::ModelSize;
use super::recognizer::{RecognitionRequest, Recognizer};
use super::result::{TranscriptionResult, parse_transcription};

/// Streaming SHA-256 over the audio file's bytes. The hash keys the cache, so
/// renaming a file never serves stale results and changed bytes never hit.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read {} for hashing", path.display()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// Content-addressed cache key: audio hash plus the recognition parameters,
/// so the same audio analyzed with different settings never collides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    audio_sha256: String,
    model: ModelSize,
    language: String,
}

impl CacheKey {
    pub fn for_file(audio: &Path, model: ModelSize, language: &str) -> Result<Self> {
        Ok(Self {
            audio_sha256: compute_file_hash(audio)?,
            model,
            language: language.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("{}_{}_{}.json", self.audio_sha256, self.model, self.language)
    }
}

pub struct TranscriptionCache {
    root: PathBuf,
}

impl TranscriptionCache {
    /// Cache under the platform cache directory; created on first use.
    pub fn open() -> Result<Self> {
        let root = dirs::cache_dir()
            .context("Unable to determine cache directory")?
            .join("lyrsync")
            .join("transcriptions");
        Self::open_at(root)
    }

    pub fn open_at(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).with_context(|| {
            format!(
                "Failed to create transcription cache directory at {}",
                root.display()
            )
        })?;
        Ok(Self { root })
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Persist the raw recognizer document verbatim. Atomic write-then-rename:
    /// a half-written entry is never readable under the final name.
    fn store(&self, key: &CacheKey, raw: &str) -> Result<PathBuf> {
        let path = self.entry_path(key);
        let mut temp = tempfile::NamedTempFile::new_in(&self.root)
            .context("Failed to create temporary cache file")?;
        temp.write_all(raw.as_bytes())
            .context("Failed to write cache entry")?;
        temp.persist(&path)
            .with_context(|| format!("Failed to move cache entry into {}", path.display()))?;
        Ok(path)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOutcome {
    pub result: TranscriptionResult,
    pub cache_hit: bool,
    pub cache_path: PathBuf,
}

/// Return the transcription for `request`, invoking the recognizer only on a
/// cache miss (or when `force` evicts the entry). Failed recognitions never
/// leave a cache entry behind; a corrupt entry fails the run and `force` is
/// the repair path.
pub fn run_transcription(
    recognizer: &dyn Recognizer,
    cache: &TranscriptionCache,
    request: &RecognitionRequest,
    force: bool,
) -> Result<TranscriptionOutcome> {
    let key = CacheKey::for_file(&request.audio, request.model, &request.language)?;
    let path = cache.entry_path(&key);

    if path.exists() && !force {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading cached transcription {}", path.display()))?;
        let result = parse_transcription(&raw)
            .with_context(|| format!("parsing cached transcription {}", path.display()))?;
        return Ok(TranscriptionOutcome {
            result,
            cache_hit: true,
            cache_path: path,
        });
    }

    let raw = recognizer.recognize(request)?;
    let result = parse_transcription(&raw)?;
    let cache_path = cache.store(&key, &raw)?;

    Ok(TranscriptionOutcome {
        result,
        cache_hit: false,
        cache_path,
    })
}

use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{ChildStderr, Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::error::SyncError;
use crate::progress::create_spinner;
use crate::ui;
use crate::ui::prelude::*;

use super::ModelSize;

#[derive(Debug, Clone)]
pub struct RecognitionRequest {
    pub audio: PathBuf,
    pub model: ModelSize,
    pub language: String,
}

/// Narrow boundary around the speech recognizer.
///
/// Returns the raw result document from the recognizer's stdout; callers parse
/// it with [`super::result::parse_transcription`] so fresh and cached documents
/// go through the same validation. Alignment and audit code never touch
/// process plumbing, and tests substitute a fake implementation.
pub trait Recognizer {
    fn recognize(&self, request: &RecognitionRequest) -> Result<String>;
}

/// Runs the external recognizer command.
///
/// The command is user-configurable and may carry its own arguments
/// (e.g. `python3 /opt/whisper/transcribe.py`); the audio path, `--model` and
/// `--lang` are appended. The subprocess contract: one JSON result document on
/// stdout, diagnostics on stderr.
pub struct WhisperRecognizer {
    command: Vec<String>,
}

impl WhisperRecognizer {
    pub fn new(command: &str) -> Result<Self> {
        let command = shell_words::split(command)
            .with_context(|| format!("parsing recognizer command {:?}", command))?;
        if command.is_empty() {
            bail!("recognizer command is empty");
        }
        Ok(Self { command })
    }

    fn program(&self) -> &str {
        &self.command[0]
    }

    fn preflight(&self) -> Result<(), SyncError> {
        which::which(self.program())
            .map_err(|_| SyncError::RecognizerMissing(self.program().to_string()))?;
        Ok(())
    }
}

impl Recognizer for WhisperRecognizer {
    fn recognize(&self, request: &RecognitionRequest) -> Result<String> {
        self.preflight()?;

        let mut child = Command::new(self.program())
            .args(&self.command[1..])
            .arg(&request.audio)
            .args(["--model", request.model.recognizer_arg()])
            .args(["--lang", &request.language])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to spawn recognizer '{}'", self.program()))?;

        // Spinner and live debug lines would fight over the terminal; show one.
        let spinner = if get_output_format() == OutputFormat::Text && !ui::is_debug_enabled() {
            Some(create_spinner(format!(
                "Transcribing with {} model...",
                request.model
            )))
        } else {
            None
        };

        let stderr = child
            .stderr
            .take()
            .context("recognizer stderr was not piped")?;
        let diagnostics_thread = std::thread::spawn(move || drain_diagnostics(stderr));

        // stdout is buffered in full; partial results are not part of the
        // contract. Reading before wait() avoids a full-pipe deadlock.
        let mut raw = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout
                .read_to_string(&mut raw)
                .context("Failed to read recognizer stdout")?;
        }

        let status = child.wait().context("Failed to wait for recognizer")?;
        let diagnostics = diagnostics_thread.join().unwrap_or_default();

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if !status.success() {
            return Err(SyncError::from_exit_status(status, &diagnostics.join("\n")).into());
        }

        Ok(raw)
    }
}

/// Surface recognizer stderr as debug log lines while capturing it for error
/// reporting.
fn drain_diagnostics(stderr: ChildStderr) -> Vec<String> {
    let mut lines = Vec::new();
    for line in BufReader::new(stderr).lines() {
        let Ok(line) = line else { break };
        if ui::is_debug_enabled() {
            emit(
                Level::Debug,
                "recognizer.stderr",
                &format!("[recognizer] {}", line),
                None,
            );
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::result::parse_transcription;

    fn request() -> RecognitionRequest {
        RecognitionRequest {
            audio: PathBuf::from("/dev/null"),
            model: ModelSize::Base,
            language: "ja".to_string(),
        }
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(WhisperRecognizer::new("").is_err());
    }

    #[test]
    fn command_splitting_keeps_arguments() {
        let rec = WhisperRecognizer::new("python3 /opt/whisper/transcribe.py").unwrap();
        assert_eq!(rec.command, vec!["python3", "/opt/whisper/transcribe.py"]);
    }

    #[test]
    fn missing_program_is_a_typed_error() {
        let rec = WhisperRecognizer::new("lyrsync-no-such-recognizer").unwrap();
        let err = rec.recognize(&request()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::RecognizerMissing(_))
        ));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        fn fake_recognizer(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-recognizer.sh");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[test]
        fn captures_stdout_document() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_recognizer(
                dir.path(),
                r#"echo '{"duration": 1.5, "segments": []}'"#,
            );
            let rec = WhisperRecognizer::new(script.to_str().unwrap()).unwrap();
            let raw = rec.recognize(&request()).unwrap();
            let result = parse_transcription(&raw).unwrap();
            assert_eq!(result.duration, 1.5);
            assert!(result.segments.is_empty());
        }

        #[test]
        fn nonzero_exit_carries_diagnostics() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_recognizer(dir.path(), "echo 'model exploded' >&2\nexit 3");
            let rec = WhisperRecognizer::new(script.to_str().unwrap()).unwrap();
            let err = rec.recognize(&request()).unwrap_err();
            match err.downcast_ref::<SyncError>() {
                Some(SyncError::RecognitionFailed { code, diagnostics }) => {
                    assert_eq!(*code, 3);
                    assert!(diagnostics.contains("model exploded"));
                }
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }
}

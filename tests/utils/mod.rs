use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use super::common::TestEnvironment;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

pub fn run_lyrsync(env: &TestEnvironment, args: &[&str]) -> Result<CommandOutput> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lyrsync"));
    cmd.args(args)
        .current_dir(env.path())
        .env("HOME", env.home())
        .env("XDG_CONFIG_HOME", env.home().join(".config"))
        .env("XDG_CACHE_HOME", env.home().join(".cache"));

    let output = cmd.output()?;
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

/// Install a recognizer stand-in that logs each invocation and prints the
/// given transcription document on stdout.
#[cfg(unix)]
pub fn install_fake_recognizer(env: &TestEnvironment, payload: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let bin_dir = env.path().join("bin");
    fs::create_dir_all(&bin_dir)?;

    let payload_path = env.path().join("payload.json");
    fs::write(&payload_path, payload)?;

    let script_path = bin_dir.join("fake-recognizer");
    let script = format!(
        "#!/bin/sh\necho run >> \"{}\"\ncat \"{}\"\n",
        env.path().join("calls.log").display(),
        payload_path.display()
    );
    fs::write(&script_path, script)?;
    fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755))?;
    Ok(script_path)
}

/// How many times the fake recognizer has been invoked.
#[cfg(unix)]
pub fn recognizer_calls(env: &TestEnvironment) -> usize {
    fs::read_to_string(env.path().join("calls.log"))
        .map(|log| log.lines().count())
        .unwrap_or(0)
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::write(path, content)?)
}

pub fn read_file(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

pub fn file_exists(path: &Path) -> bool {
    path.exists()
}

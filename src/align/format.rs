use anyhow::{Context, Result};
use regex::Regex;

/// Lines at or under this many characters are left alone.
pub const MAX_LINE_LENGTH: usize = 15;
/// Lines longer than this get a forced midpoint break when nothing better exists.
pub const FORCED_BREAK_LENGTH: usize = 20;

/// Rewrites long lyric lines with display line breaks so the renderer never
/// has to wrap text itself. Presentation only; timing is untouched.
pub struct LineBreaker {
    whitespace_runs: Regex,
    terminal_marks: Regex,
}

impl LineBreaker {
    pub fn new() -> Result<Self> {
        Ok(Self {
            whitespace_runs: Regex::new("[ 　]+").context("compiling whitespace-run pattern")?,
            terminal_marks: Regex::new("([、。！？])")
                .context("compiling terminal-mark pattern")?,
        })
    }

    /// Break preference: existing whitespace runs, then after sentence-terminal
    /// punctuation, then a single forced break at the character midpoint.
    pub fn format(&self, text: &str) -> String {
        let char_count = text.chars().count();
        if char_count <= MAX_LINE_LENGTH {
            return text.to_string();
        }

        if self.whitespace_runs.is_match(text) {
            return self
                .whitespace_runs
                .replace_all(text, "\n")
                .trim()
                .to_string();
        }

        if self.terminal_marks.is_match(text) {
            return self
                .terminal_marks
                .replace_all(text, "$1\n")
                .trim()
                .to_string();
        }

        if char_count > FORCED_BREAK_LENGTH {
            let mid = char_count / 2;
            let mut out = String::with_capacity(text.len() + 1);
            for (i, c) in text.chars().enumerate() {
                if i == mid {
                    out.push('\n');
                }
                out.push(c);
            }
            return out;
        }

        text.to_string()
    }
}

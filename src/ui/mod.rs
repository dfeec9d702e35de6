use colored::*;
use lazy_static::lazy_static;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }

    fn paint(self, message: &str) -> String {
        match self {
            Level::Info => message.normal().to_string(),
            Level::Success => message.green().bold().to_string(),
            Level::Warn => message.yellow().bold().to_string(),
            Level::Error => message.red().bold().to_string(),
            Level::Debug => message.cyan().to_string(),
        }
    }

    fn is_diagnostic(self) -> bool {
        matches!(self, Level::Warn | Level::Error)
    }
}

#[derive(Debug, Clone)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

lazy_static! {
    static ref RENDERER: RwLock<Renderer> = RwLock::new(Renderer::default());
}

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub fn init(format: OutputFormat, color: bool) {
    if let Ok(mut r) = RENDERER.write() {
        r.format = format;
        r.color = color;
    }
}

pub fn get_output_format() -> OutputFormat {
    RENDERER.read().map(|r| r.format).unwrap_or(OutputFormat::Text)
}

pub const SEPARATOR_HEAVY: &str = "━";
pub const SEPARATOR_LIGHT: &str = "─";

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

/// Drop ANSI CSI sequences so JSON consumers never see control bytes.
fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for end in chars.by_ref() {
                if ('@'..='~').contains(&end) {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

/// Emit one structured event. Text mode prints the colored message; JSON mode
/// prints one event object per line. Warnings and errors go to stderr.
pub fn emit(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
    let renderer = match RENDERER.read() {
        Ok(r) => r.clone(),
        Err(_) => return,
    };
    let line = match renderer.format {
        OutputFormat::Text => {
            if renderer.color {
                level.paint(message)
            } else {
                message.to_string()
            }
        }
        OutputFormat::Json => {
            let clean = strip_ansi(message);
            let event = Event {
                level: level.as_str(),
                code,
                message: &clean,
                data,
            };
            match serde_json::to_string(&event) {
                Ok(s) => s,
                Err(_) => return,
            }
        }
    };
    if level.is_diagnostic() {
        let _ = writeln!(io::stderr(), "{}", line);
    } else {
        let _ = writeln!(io::stdout(), "{}", line);
    }
}

/// Print a horizontal rule in text mode; suppressed in JSON mode.
pub fn separator(light: bool) {
    if get_output_format() == OutputFormat::Json {
        return;
    }
    let glyph = if light {
        SEPARATOR_LIGHT
    } else {
        SEPARATOR_HEAVY
    };
    let _ = writeln!(io::stdout(), "{}", glyph.repeat(80));
}

pub mod prelude {
    pub use super::{Level, OutputFormat, emit, get_output_format, separator};
}

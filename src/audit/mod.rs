use anyhow::{Result, bail};
use colored::*;
use serde::Serialize;
use serde_json::json;

use crate::cli::AuditArgs;
use crate::config::SyncConfig;
use crate::lyrics::{self, LyricLine};
use crate::ui::prelude::*;

/// Lines displayed faster than this are flagged as unreadable.
const MIN_SECONDS_PER_CHAR: f64 = 0.1;
const SCREEN_WIDTH: f64 = 1080.0;
const SAFE_MARGIN_X: f64 = 100.0;
/// Used when the caller supplies a style without a font size.
const FALLBACK_FONT_SIZE: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn color_label(&self) -> impl std::fmt::Display {
        match self {
            Severity::Error => "ERROR".red().bold(),
            Severity::Warning => "WARN".yellow().bold(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditIssue {
    pub severity: Severity,
    pub line_index: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub total_lines: usize,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub is_valid: bool,
    pub issues: Vec<AuditIssue>,
    pub summary: AuditSummary,
}

/// Rendering parameters that affect layout checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderStyle {
    pub font_size: Option<f64>,
}

/// Validate timed lyric lines before they are handed to a renderer.
///
/// Errors mark data a renderer cannot display correctly; warnings mark lines
/// a viewer will struggle with. `is_valid` reflects errors only.
pub fn audit_lines(lines: &[LyricLine], style: Option<&RenderStyle>) -> AuditReport {
    let mut issues = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        check_integrity(line, index, &mut issues);
        check_readability(line, index, &mut issues);
        if let Some(style) = style {
            check_layout(line, index, style, &mut issues);
        }
    }
    check_overlaps(lines, &mut issues);

    let error_count = issues.iter().filter(|i| i.severity.is_error()).count();
    let warning_count = issues.len() - error_count;

    AuditReport {
        is_valid: error_count == 0,
        issues,
        summary: AuditSummary {
            total_lines: lines.len(),
            error_count,
            warning_count,
        },
    }
}

fn check_integrity(line: &LyricLine, index: usize, issues: &mut Vec<AuditIssue>) {
    if line.text.is_empty() {
        issues.push(AuditIssue {
            severity: Severity::Error,
            line_index: index,
            message: "Text content is missing or empty.".to_string(),
            details: None,
        });
    }
    if !line.start.is_finite() || !line.end.is_finite() {
        issues.push(AuditIssue {
            severity: Severity::Error,
            line_index: index,
            message: "Start or end time is not a finite number.".to_string(),
            details: None,
        });
    }
    if line.start >= line.end {
        issues.push(AuditIssue {
            severity: Severity::Error,
            line_index: index,
            message: format!(
                "Invalid timing: start ({}) >= end ({}).",
                line.start, line.end
            ),
            details: None,
        });
    }
}

fn check_readability(line: &LyricLine, index: usize, issues: &mut Vec<AuditIssue>) {
    let char_count = line.text.chars().count();
    if char_count == 0 {
        return;
    }

    let duration = line.end - line.start;
    let per_char = duration / char_count as f64;
    if per_char < MIN_SECONDS_PER_CHAR {
        issues.push(AuditIssue {
            severity: Severity::Warning,
            line_index: index,
            message: format!(
                "Readability risk: displayed too fast ({per_char:.2}s/char). Recommended > {MIN_SECONDS_PER_CHAR}s."
            ),
            details: Some(json!({
                "duration": format!("{duration:.2}"),
                "charCount": char_count,
            })),
        });
    }
}

fn check_layout(line: &LyricLine, index: usize, style: &RenderStyle, issues: &mut Vec<AuditIssue>) {
    // Width estimate treats every glyph as a full em, an upper bound for CJK
    // text.
    let font_size = style.font_size.unwrap_or(FALLBACK_FONT_SIZE);
    let estimated_width = line.text.chars().count() as f64 * font_size;
    let safe_width = SCREEN_WIDTH - SAFE_MARGIN_X * 2.0;

    if estimated_width > safe_width {
        issues.push(AuditIssue {
            severity: Severity::Warning,
            line_index: index,
            message: format!(
                "Layout risk: text might exceed safe area (Est. {estimated_width}px > {safe_width}px)."
            ),
            details: Some(json!({
                "text": line.text,
                "estimatedWidth": estimated_width,
            })),
        });
    }
}

fn check_overlaps(lines: &[LyricLine], issues: &mut Vec<AuditIssue>) {
    for (index, pair) in lines.windows(2).enumerate() {
        let current = &pair[0];
        let next = &pair[1];
        if current.end > next.start {
            issues.push(AuditIssue {
                severity: Severity::Warning,
                line_index: index,
                message: format!(
                    "Overlap detected with next line (Line {} overlaps Line {}).",
                    index + 1,
                    index + 2
                ),
                details: Some(json!({
                    "currentEnd": current.end,
                    "nextStart": next.start,
                    "diff": current.end - next.start,
                })),
            });
        }
    }
}

pub fn print_report(report: &AuditReport) {
    separator(false);
    println!("{}", "Audit report".bold());
    println!("Total lines: {}", report.summary.total_lines);
    println!("Errors:      {}", report.summary.error_count);
    println!("Warnings:    {}", report.summary.warning_count);
    separator(true);

    if report.issues.is_empty() {
        println!("{}", "All checks passed.".green());
        return;
    }

    for issue in &report.issues {
        println!(
            "[{}] Line {}: {}",
            issue.severity.color_label(),
            issue.line_index + 1,
            issue.message
        );
        if let Some(details) = &issue.details {
            println!("    {details}");
        }
    }
}

/// Emit every issue as a structured event, for callers that report while a
/// larger run continues.
pub fn emit_issues(report: &AuditReport) {
    for issue in &report.issues {
        let level = if issue.severity.is_error() {
            Level::Error
        } else {
            Level::Warn
        };
        emit(
            level,
            "audit.issue",
            &format!("Line {}: {}", issue.line_index + 1, issue.message),
            Some(json!({
                "lineIndex": issue.line_index,
                "severity": issue.severity,
                "details": issue.details,
            })),
        );
    }
}

pub fn handle_audit(args: &AuditArgs, config: &SyncConfig) -> Result<()> {
    let lines = lyrics::read_lyrics(&args.lyrics)?;
    let style = RenderStyle {
        font_size: Some(args.font_size.unwrap_or(config.font_size)),
    };
    let report = audit_lines(&lines, Some(&style));

    if get_output_format() == OutputFormat::Json {
        emit(
            Level::Info,
            "audit.report",
            "Audit report",
            Some(json!(report)),
        );
    } else {
        print_report(&report);
    }

    if !report.is_valid {
        bail!(
            "Audit failed: {} error(s) detected. Fix them before rendering.",
            report.summary.error_count
        );
    }
    emit(Level::Success, "audit.passed", "No critical errors detected", None);
    Ok(())
}

//! CLI output formatting for the `check` command.
//!
//! # Information-First Display
//!
//! Every file leads with its positional index and filename. Details (type,
//! size, preview handle, rejection reason) follow as indented context lines,
//! so the output reads as an inventory of what the widget would hold.
//!
//! ```text
//! Widget
//!     max 1 file, 2.0 MiB each, accepts image/*
//!
//! Accepted
//! 001 portrait.png
//!     Type: image/png, 1.2 MiB
//!     Preview: blob:folio/1/portrait.png
//!
//! Rejected
//! 001 cv.pdf
//!     Reason: unsupported file type application/pdf (accepted: image/*)
//! ```
//!
//! Format functions return `Vec<String>` and do no I/O; the `print_*`
//! wrapper writes to stdout.

use crate::config::UploadConfig;
use crate::selection::ValidationReport;
use crate::types::PendingFile;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["KiB", "MiB", "GiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn widget_summary(config: &UploadConfig) -> String {
    let max = config.effective_max_files();
    let files = if max == 1 { "file" } else { "files" };
    let accepts = if config.accepted_types.trim().is_empty() {
        "anything"
    } else {
        config.accepted_types.as_str()
    };
    let mut summary = format!(
        "max {max} {files}, {} each, accepts {accepts}",
        format_size(config.max_size)
    );
    if config.disabled {
        summary.push_str(" (disabled)");
    }
    summary
}

/// Format the result of checking a batch against a widget.
pub fn format_check_output(
    config: &UploadConfig,
    accepted: &[PendingFile],
    report: &ValidationReport,
) -> Vec<String> {
    let mut lines = vec![
        "Widget".to_string(),
        format!("{}{}", indent(1), widget_summary(config)),
    ];

    if !accepted.is_empty() {
        lines.push(String::new());
        lines.push("Accepted".to_string());
        for (i, file) in accepted.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), file.meta.filename));
            lines.push(format!(
                "{}Type: {}, {}",
                indent(1),
                file.meta.mime_type,
                format_size(file.meta.size)
            ));
            if let Some(preview) = &file.preview {
                lines.push(format!("{}Preview: {}", indent(1), preview));
            }
        }
    }

    if !report.is_empty() {
        lines.push(String::new());
        lines.push("Rejected".to_string());
        for (i, rejection) in report.rejections.iter().enumerate() {
            lines.push(format!("{} {}", format_index(i + 1), rejection.filename));
            lines.push(format!("{}Reason: {}", indent(1), rejection.reason));
        }
    }

    lines
}

pub fn print_check_output(config: &UploadConfig, accepted: &[PendingFile], report: &ValidationReport) {
    for line in format_check_output(config, accepted, report) {
        println!("{}", line);
    }
}

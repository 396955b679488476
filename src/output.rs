//! CLI output formatting for batch results.
//!
//! Every batch prints the same shape: a header naming the operation and the
//! folder, one line per input file in scan order, then a summary line.
//!
//! ## Grayscale / Black and White
//!
//! ```text
//! Grayscale: photos
//! 001 cat.png → cat_grayscale.png
//! 002 cat_bw.png: skipped (already a converted file)
//! 003 broken.jpg: failed (Processing failed: ...)
//! Wrote 1, skipped 1, failed 1
//! ```
//!
//! ## PDF
//!
//! ```text
//! PDF: photos
//! 001 cat.png → page 1
//! 002 dog.jpg → page 2
//! PDF saved as: photos/output.pdf (2 pages)
//! ```
//!
//! ## Resize
//!
//! ```text
//! Resize: photos
//! 001 cat.png: resized
//! Images resized successfully!
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects. The interactive session
//! writes the same lines to its own writer.

use crate::batch::{BatchReport, FileOutcome, Operation, Outcome};
use crate::imaging::PRESETS;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn outcome_line(index: usize, entry: &FileOutcome, operation: Operation) -> String {
    let name = file_name(&entry.source);
    match &entry.outcome {
        // Resize overwrites in place, so the output name adds nothing
        Outcome::Written { .. } if operation == Operation::Resize => {
            format!("{} {}: resized", format_index(index), name)
        }
        Outcome::Written { output } => {
            format!("{} {} → {}", format_index(index), name, file_name(output))
        }
        Outcome::Placed { page } => format!("{} {} → page {}", format_index(index), name, page),
        Outcome::Skipped { reason } => {
            format!("{} {}: skipped ({})", format_index(index), name, reason)
        }
        Outcome::Failed { error } => format!("{} {}: failed ({})", format_index(index), name, error),
    }
}

/// Format the summary line of a report.
fn summary_line(report: &BatchReport) -> String {
    match report.operation {
        Operation::Pdf => {
            let pages = plural(report.succeeded(), "page");
            let detail = if report.has_failures() {
                format!("{pages}, {} failed", report.failed())
            } else {
                pages
            };
            match &report.output {
                Some(path) => format!("PDF saved as: {} ({})", path.display(), detail),
                None => format!("PDF not written ({})", detail),
            }
        }
        Operation::Resize if !report.has_failures() => "Images resized successfully!".to_string(),
        Operation::Resize => format!(
            "Resized {}, failed {}",
            plural(report.succeeded(), "image"),
            report.failed()
        ),
        Operation::Grayscale | Operation::BlackAndWhite => format!(
            "Wrote {}, skipped {}, failed {}",
            report.succeeded(),
            report.skipped(),
            report.failed()
        ),
    }
}

/// Format a batch report as display lines.
pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {}",
        report.operation.label(),
        report.directory.display()
    )];

    if report.outcomes.is_empty() {
        lines.push("No images found in the specified folder.".to_string());
        return lines;
    }

    for (i, entry) in report.outcomes.iter().enumerate() {
        lines.push(outcome_line(i + 1, entry, report.operation));
    }
    lines.push(summary_line(report));
    lines
}

/// Format the numbered aspect-ratio preset table.
///
/// ```text
///  1  16:9
///  2  16:9
/// ...
/// 10  1:1
/// ```
pub fn format_presets() -> Vec<String> {
    PRESETS
        .iter()
        .map(|p| format!("{:>2}  {}", p.id, p))
        .collect()
}

/// Format the interactive main menu for `dir`.
pub fn format_menu(dir: &Path) -> Vec<String> {
    vec![
        format!("Output location: {}", dir.display()),
        "What's gonna be:".to_string(),
        "1. Grayscale".to_string(),
        "2. Black and White".to_string(),
        "3. PDF".to_string(),
        "4. Resize".to_string(),
        "0. Exit".to_string(),
    ]
}

/// Print a batch report to stdout.
pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{}", line);
    }
}

/// Print a batch report to stdout as pretty JSON.
pub fn print_batch_report_json(report: &BatchReport) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

/// Print the preset table to stdout.
pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

//! CLI output formatting.
//!
//! Output is issue-centric: every issue gets a `Begin working on Folder` line
//! as it starts, followed by indented result lines once it finishes.
//!
//! ```text
//! Begin working on Folder legacy/si_20100802
//!     si_20100802: 24 PDFs, 24 JPGs → si_20100802.zip
//! Begin working on Folder legacy/si_20100809
//!     FAILED si_20100809: page-number pattern mismatch: cover.pdf
//!
//! 1 issue completed, 1 failed
//! Process took 0.412 seconds
//! ```
//!
//! In dry-run mode each planned rename is listed under its issue:
//!
//! ```text
//!     si_20100802: 2 PDFs, 2 JPGs (dry run)
//!         si_20100802_1_1_01.pdf → page-0.pdf
//! ```
//!
//! Each `format_*` function returns `Vec<String>` and has no side effects;
//! `print_*` wrappers write to stdout.

use crate::process::{IssueReport, ProcessEvent, RunSummary};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// One-line summary of a completed issue.
fn report_line(report: &IssueReport) -> String {
    let mut line = format!(
        "{}{}: {}, {}",
        indent(1),
        report.name(),
        plural(report.pdf_count, "PDF"),
        plural(report.jpg_count, "JPG")
    );
    if report.thumbnails > 0 {
        line.push_str(&format!(" ({} generated)", report.thumbnails));
    }
    if let Some(package) = &report.package {
        line.push_str(&format!(" → {}", file_name(package)));
    }
    if report.dry_run {
        line.push_str(" (dry run)");
    }
    line
}

/// Format a single progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::IssueStarted { issue } => {
            vec![format!("Begin working on Folder {}", issue.display())]
        }
        ProcessEvent::IssueCompleted(report) => {
            let mut lines = vec![report_line(report)];
            if report.dry_run {
                for rename in &report.renames {
                    lines.push(format!(
                        "{}{} → {}",
                        indent(2),
                        file_name(&rename.source),
                        file_name(&rename.target)
                    ));
                }
            }
            lines
        }
        ProcessEvent::IssueFailed { issue, error } => {
            vec![format!("{}FAILED {}: {}", indent(1), file_name(issue), error)]
        }
    }
}

/// Print a progress event to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        println!("{}", line);
    }
}

/// Format the end-of-run summary, including elapsed time.
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "{} completed, {} failed",
            plural(summary.completed(), "issue"),
            summary.failed()
        ),
        format!("Process took {} seconds", summary.elapsed.as_secs_f64()),
    ]
}

/// Print the end-of-run summary to stdout.
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}

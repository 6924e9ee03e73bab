//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Loaded 1204 entries (1187 printings, 17 merged, 9342 comments)
//! Printings
//!     1187 pages → cards/
//!     1120 images copied, 67 missing
//! Unique cards
//!     803 combined pages → cards/combined/
//! Failures
//!     printing 4521 Goblin King: IO error: ...
//!
//! Generated 1187 printing pages, 803 combined pages, 1 failure → dist
//! ```
//!
//! ## Check
//!
//! ```text
//! Printings: 1187
//! Unique cards: 803 (384 ungrouped printings)
//! Comments: 9342
//! Name map entries: 20511
//! ```

use crate::catalog::{Catalog, LoadStats};
use crate::generate::{PageFailure, PageKind, RenderedPage, RunReport};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, singular: &str, plural: &str) -> String {
    format!("{} {}", n, if n == 1 { singular } else { plural })
}

fn format_load(load: &LoadStats) -> String {
    format!(
        "Loaded {} ({} printings, {} merged, {})",
        plural(load.entries, "entry", "entries"),
        load.new_printings,
        load.merged,
        plural(load.comments, "comment", "comments"),
    )
}

fn format_failure(failure: &PageFailure) -> String {
    let kind = match failure.kind {
        PageKind::Printing => "printing",
        PageKind::Combined => "combined",
    };
    format!("{}{} {} {}: {}", indent(1), kind, failure.key, failure.name, failure.reason)
}

/// Format the result of a full build.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = vec![format_load(&report.load)];

    if report.printings == 0 {
        lines.push("No cards found in data directory".to_string());
        return lines;
    }

    lines.push("Printings".to_string());
    lines.push(format!("{}{} pages → cards/", indent(1), report.printing_pages));
    lines.push(format!(
        "{}{} images copied, {} missing",
        indent(1),
        report.images_copied,
        report.images_missing
    ));

    lines.push("Unique cards".to_string());
    lines.push(format!(
        "{}{} combined pages → cards/combined/",
        indent(1),
        report.combined_pages
    ));

    if !report.failures.is_empty() {
        lines.push("Failures".to_string());
        lines.extend(report.failures.iter().map(format_failure));
    }

    lines.push(String::new());
    let mut summary = format!(
        "Generated {}, {}",
        plural(report.printing_pages, "printing page", "printing pages"),
        plural(report.combined_pages, "combined page", "combined pages"),
    );
    if !report.failures.is_empty() {
        summary.push_str(&format!(", {}", plural(report.failures.len(), "failure", "failures")));
    }
    summary.push_str(&format!(" → {}", report.output_dir.display()));
    lines.push(summary);
    lines
}

pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{}", line);
    }
}

/// Format catalog statistics for the `check` command.
pub fn format_check_output(catalog: &Catalog) -> Vec<String> {
    let grouped: usize = catalog.groups().map(|(_, ids)| ids.len()).sum();
    vec![
        format!("Printings: {}", catalog.len()),
        format!(
            "Unique cards: {} ({} ungrouped printings)",
            catalog.unique_len(),
            catalog.len() - grouped
        ),
        format!("Comments: {}", catalog.comment_count()),
        format!("Name map entries: {}", catalog.names().len()),
    ]
}

pub fn print_check_output(catalog: &Catalog) {
    for line in format_check_output(catalog) {
        println!("{}", line);
    }
}

/// Format the result of single-card generation.
pub fn format_single_output(id: u64, page: &RenderedPage) -> Vec<String> {
    vec![format!("Generated page for {} → {}", id, page.path.display())]
}

pub fn print_single_output(id: u64, page: &RenderedPage) {
    for line in format_single_output(id, page) {
        println!("{}", line);
    }
}

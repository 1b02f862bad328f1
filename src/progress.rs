//! Progress reporting for the compression batch
//!
//! Provides real-time progress display using indicatif progress bars.
//! A thin presentation layer over the structured report - the core
//! never prints.

use crate::compress::{AggregateReport, BatchStats};
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays batch status
pub struct ProgressReporter {
    /// Progress bar over the batch
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter for a batch of `total` items
    pub fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display from the pool statistics
    pub fn update(&self, stats: &BatchStats) {
        self.bar.set_position(stats.done());

        let failures = stats.failures();
        if failures > 0 {
            self.bar.set_message(format!("{} failed", failures));
        }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Print a header at the start of the batch
pub fn print_header(source: &str, dest: &str, workers: usize, files: usize) {
    println!();
    println!(
        "{} {}",
        style("gzdir").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), source);
    println!("  {} {}", style("Output:").bold(), dest);
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Files:").bold(), format_number(files as u64));
    println!();
}

/// Print a summary of the batch results
pub fn print_summary(report: &AggregateReport, dest: &str) {
    let bytes_str = format_size(report.bytes, BINARY);
    let duration_secs = report.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        report.succeeded as f64 / duration_secs
    } else {
        0.0
    };

    let title = if report.completed {
        style("Compression Complete").green().bold()
    } else {
        style("Compression Interrupted").yellow().bold()
    };

    println!();
    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Compressed:").bold(),
        format_number(report.succeeded)
    );
    println!("  {} {}", style("Input Size:").bold(), bytes_str);
    println!(
        "  {} {:.1}s ({:.0} files/sec)",
        style("Duration:").bold(),
        duration_secs,
        rate
    );
    if report.failed > 0 {
        println!(
            "  {} {}",
            style("Failed:").yellow().bold(),
            format_number(report.failed)
        );
        for failure in &report.failures {
            println!(
                "    {} {}: {}",
                style("✗").red(),
                failure.source.display(),
                failure.reason
            );
        }
    }
    println!("  {} {}", style("Output:").bold(), dest);
    println!();
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

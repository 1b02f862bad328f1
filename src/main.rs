//! gzdir - Bounded Parallel Directory Compression
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use gzdir::compress::CompressCoordinator;
use gzdir::config::{CliArgs, CompressConfig};
use gzdir::prepare;
use gzdir::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = CompressConfig::from_args(args).context("Invalid configuration")?;

    // Validate source, create destination
    prepare::check_source(&config.source)?;
    prepare::prepare_dest(&config.dest)?;

    // Scan once: regular files to compress, subdirectory names to record
    let scan = prepare::scan(&config.source)?;
    let total = scan.files.len();

    // Write the subdirectory manifest
    let manifest = prepare::write_manifest(&scan.subdirs, &config.dest)?;
    info!(
        subdirs = scan.subdirs.len(),
        path = %manifest.display(),
        "Subdirectory manifest written"
    );

    if config.show_progress {
        print_header(
            &config.source.display().to_string(),
            &config.dest.display().to_string(),
            config.workers,
            total,
        );
    }

    // Create coordinator
    let coordinator = CompressCoordinator::new(scan.files, config.dest.clone(), config.workers)
        .context("Failed to initialize compressor")?;

    // Setup signal handler for graceful shutdown
    let shutdown_flag = coordinator.shutdown_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        shutdown_flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Sample pool statistics onto a progress bar while the batch runs
    let progress = config
        .show_progress
        .then(|| Arc::new(ProgressReporter::new(total as u64)));

    let sampler_stop = Arc::new(AtomicBool::new(false));
    let sampler = progress.as_ref().map(|reporter| {
        let reporter = Arc::clone(reporter);
        let stats = coordinator.stats();
        let stop = Arc::clone(&sampler_stop);

        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                reporter.update(&stats);
                thread::sleep(Duration::from_millis(100));
            }
            reporter.update(&stats);
        })
    });

    // Run the batch
    let report = coordinator.run().context("Compression failed")?;

    // Stop the sampler and clear the bar
    sampler_stop.store(true, Ordering::Relaxed);
    if let Some(handle) = sampler {
        let _ = handle.join();
    }
    if let Some(ref reporter) = progress {
        reporter.finish_and_clear();
    }

    // Print summary
    if config.show_progress {
        print_summary(&report, &config.dest.display().to_string());
    }

    // Report success/failure
    if !report.completed {
        info!("Batch was interrupted before completion");
    }

    if report.failed > 0 {
        info!(failed = report.failed, "Batch completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("gzdir=debug,warn")
    } else {
        EnvFilter::new("gzdir=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}

use std::{path::PathBuf, sync::Arc};

use chrono::Utc;
use clap::Parser;
use cleanser::{
    CleanserConfig, RetentionPolicyEngine,
    config::LogLevel,
    observability,
    retention::{SweepReport, TracingLog},
};

/// CLI arguments for cleanser
#[derive(Parser, Debug)]
#[command(version, about = "Delete old files from the file system", long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "conf/config.json")]
    config: PathBuf,

    /// Log what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Log at debug level regardless of the configured level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut config = match CleanserConfig::from_file(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Failed to load config from {}: {}",
                args.config.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if args.dry_run {
        config.dry_run = true;
    }
    if args.verbose {
        config.logging.level = LogLevel::Debug;
    }

    if let Err(e) = observability::init_tracing(&config.logging) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    tracing::info!(
        config_file = %args.config.display(),
        rules = config.directories.len(),
        dry_run = config.dry_run,
        "Starting cleanser"
    );

    let engine = RetentionPolicyEngine::from_config(&config, Arc::new(TracingLog));
    let report = engine.run(Utc::now());
    log_report(&report);
}

fn log_report(report: &SweepReport) {
    let errors = report.errors().count();
    if errors > 0 {
        tracing::warn!(
            removed = report.total_removed(),
            errors,
            "Cleanup finished with errors"
        );
    } else if report.has_deletions() {
        tracing::info!(removed = report.total_removed(), "Cleanup finished");
    } else {
        tracing::debug!("Cleanup finished, nothing to clean up");
    }
}

//! bandcamp-expand CLI entry point

use bandcamp_expand::config::{Cli, Settings};
use bandcamp_expand::pipeline;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    let settings = Settings::from_cli(&cli);

    if let Err(e) = validate_inputs(&settings) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match pipeline::run(&settings) {
        Ok(report) => {
            if settings.dry_run {
                return ExitCode::SUCCESS;
            }

            println!();
            println!(
                "Summary: {} expanded, {} left in place (of {} archives)",
                report.successful(),
                report.failures(),
                report.total_archives
            );
            let merge = report.merge_totals();
            if merge.replaced > 0 {
                println!(
                    "  {} library files were replaced after a size mismatch",
                    merge.replaced
                );
            }

            if report.failures() > 0 {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = cli.log_level().to_string().to_lowercase();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_thread_ids(true)
        .init();
}

fn validate_inputs(settings: &Settings) -> Result<(), String> {
    if !settings.source.is_dir() {
        return Err(format!(
            "Source directory does not exist: {}\n\n  Tip: Bandcamp downloads are expected in ~/Downloads/Bandcamp.\n  Examples:\n    bandcamp-expand --source ~/Downloads/Bandcamp --library ~/Music\n    bandcamp-expand --dry-run",
            settings.source.display()
        ));
    }

    if settings.staging.starts_with(&settings.library) {
        return Err(format!(
            "Staging directory {} must not live inside the library {}\n\n  Tip: Staging is deleted after each archive; pass --staging elsewhere.",
            settings.staging.display(),
            settings.library.display()
        ));
    }

    Ok(())
}

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gocov_codacy::build_report;

/// gocov-codacy — Convert a Go coverage profile into a Codacy coverage report.
#[derive(Parser)]
#[command(name = "gocov-codacy", version, about)]
struct Cli {
    /// Path to the profile written by `go test -coverprofile`.
    #[arg(env = "GOCOV_CODACY_PROFILE")]
    profile: PathBuf,

    /// Write the report to this file instead of stdout.
    #[arg(short, long, env = "GOCOV_CODACY_OUTPUT")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON.
    #[arg(long)]
    pretty: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let report = build_report(&cli.profile)
        .with_context(|| format!("Failed to convert {}", cli.profile.display()))?;
    let json = if cli.pretty {
        report.to_json_pretty()?
    } else {
        report.to_json()?
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                output = %path.display(),
                files = report.file_reports.len(),
                total = report.total,
                "wrote report"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&json)?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}

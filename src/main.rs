//! gpx-hr-merge - command-line entry point.

use clap::Parser;
use gpx_hr_merge::config::load_config;
use gpx_hr_merge::pipeline::{self, MergeOutcome, MergeRequest, EXIT_FAILURE};
use gpx_hr_merge::TimeBasis;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "gpx-hr-merge")]
#[command(version, about = "Merge heart-rate data from a TCX file into a GPX track", long_about = None)]
struct Cli {
    /// GPX file containing track data
    #[arg(short = 't', long = "track", value_name = "GPX")]
    track: PathBuf,

    /// TCX file containing cardio data
    #[arg(short = 'c', long = "cardio", value_name = "TCX")]
    cardio: PathBuf,

    /// Output file (default: GPX path with the configured suffix appended)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Maximum start/end gap between the recordings, in seconds
    #[arg(long, value_name = "SECONDS")]
    threshold: Option<i64>,

    /// Timestamp interpretation: local or utc
    #[arg(long, value_name = "BASIS")]
    time_basis: Option<TimeBasis>,

    /// Configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Prints usage and exits 0 for --help, 2 for bad arguments.
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    if let Some(threshold) = cli.threshold {
        config.plausibility_threshold_secs = threshold;
    }
    if let Some(basis) = cli.time_basis {
        config.time_basis = basis;
    }

    let request = MergeRequest {
        track: cli.track,
        cardio: cli.cardio,
        output: cli.output,
    };

    match pipeline::run(&request, &config) {
        Ok(MergeOutcome::Merged {
            output,
            summary,
            skipped,
            ..
        }) => {
            tracing::info!(
                "Merged heart rate into {} points across {} tracks ({} activity points skipped): {}",
                summary.points,
                summary.tracks,
                skipped,
                output.display()
            );
            ExitCode::SUCCESS
        }
        Ok(MergeOutcome::Rejected(report)) => {
            println!(
                "Files do not match: start differs by {}s, end by {}s (threshold {}s)",
                report.start_diff, report.end_diff, report.threshold
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

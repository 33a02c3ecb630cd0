//! Drawing job entry point
//!
//! Reads one job (from a file or stdin), runs it and prints the result JSON
//! on stdout. Logs go to stderr.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use de_job::{JobConfig, JobError, decode_job, run_job};

#[derive(Debug, Parser)]
#[command(name = "drawing-job", version, about = "Build a solid and export its drawing")]
struct Cli {
    /// Job JSON file; read from stdin when omitted
    job: Option<PathBuf>,

    /// RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the result on a single line
    #[arg(long)]
    compact: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(JobConfig::load)
        .transpose()
        .map(Option::unwrap_or_default);

    let filter = match &config {
        Ok(config) => config.log_filter().to_string(),
        Err(_) => de_job::DEFAULT_LOG_FILTER.to_string(),
    };
    init_tracing(&filter);

    match config.map_err(JobError::from).and_then(|config| run(&cli, &config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(filter: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli, config: &JobConfig) -> Result<(), JobError> {
    let input = match &cli.job {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| JobError::Io(format!("{}: {e}", path.display())))?,
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .map_err(|e| JobError::Io(e.to_string()))?;
            input
        }
    };

    let value: serde_json::Value =
        serde_json::from_str(&input).map_err(|e| JobError::Decode(e.to_string()))?;
    let job = decode_job(&value)?;
    let output = run_job(&job, config)?;

    let text = if cli.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .map_err(|e| JobError::Output(e.to_string()))?;
    println!("{text}");
    Ok(())
}

//! Command-line entry point: resolve configuration, then upload the tree.
use anyhow::{Context, Result};
use clap::Parser;
use dataset_uploader::{
    config::{Config, ConfigOverrides},
    dataset::DatasetClient,
    logging,
    uploader::{self, RunOutcome, WalkOptions},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "dataset-uploader",
    about = "Upload every file under a directory to a dataset document-ingestion API",
    version
)]
struct Cli {
    /// Directory to upload (defaults to `UPLOAD_ROOT`).
    root: Option<PathBuf>,
    /// API host, e.g. `localhost` or `10.0.0.5:8080` (defaults to `DATASET_API_BASE`).
    #[arg(long)]
    api_base: Option<String>,
    /// Target dataset identifier (defaults to `DATASET_ID`).
    #[arg(long)]
    dataset_id: Option<String>,
    /// Bearer credential (defaults to `DATASET_API_KEY`).
    #[arg(long)]
    api_key: Option<String>,
    /// Upload only the direct children of the root.
    #[arg(long)]
    no_recursive: bool,
    /// JSON file replacing the built-in processing config (defaults to `DATASET_PROCESS_CONFIG`).
    #[arg(long)]
    process_config: Option<PathBuf>,
    /// Per-request timeout in seconds (defaults to `DATASET_TIMEOUT_SECS`).
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl From<Cli> for ConfigOverrides {
    fn from(cli: Cli) -> Self {
        Self {
            api_base: cli.api_base,
            dataset_id: cli.dataset_id,
            api_key: cli.api_key,
            root: cli.root,
            recursive: cli.no_recursive.then_some(false),
            process_config: cli.process_config,
            timeout_secs: cli.timeout_secs,
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let log_guard = logging::init_tracing();

    let code = match execute(cli) {
        Ok(RunOutcome::Completed { uploaded }) => {
            println!("All files uploaded ({uploaded}).");
            0
        }
        Ok(RunOutcome::Halted {
            failed_at,
            path,
            error,
            uploaded,
        }) => {
            println!(
                "Stopped at file {failed_at} ({}) after {uploaded} successful upload(s): {error}",
                path.display()
            );
            1
        }
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Upload run aborted");
            eprintln!("error: {err:#}");
            1
        }
    };

    // `exit` skips destructors; flush the file writer first.
    drop(log_guard);
    std::process::exit(code);
}

fn execute(cli: Cli) -> Result<RunOutcome> {
    let config = Config::load(cli.into()).context("failed to load configuration")?;
    let client = DatasetClient::new(config.target, &config.processing, config.timeout)
        .context("failed to initialize dataset client")?;
    tracing::info!(endpoint = %client.endpoint(), "Uploading to dataset");

    let options = WalkOptions {
        recursive: config.recursive,
    };
    uploader::run(&config.root, &client, options)
        .with_context(|| format!("cannot upload from {}", config.root.display()))
}

//! Batch similarity-key enrichment and duplicate clustering.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use simclust_core::{Record, Resolution};
use simclust_match::{MatchClient, MatchConfig, Matcher, enrich};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod input;
mod output;

use output::{ClusterReportSink, FullDumpSink, OutputSink};

#[derive(Parser)]
#[command(name = "simclust", version, about = "Find near-duplicate records via similarity keys")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve every input line and write a two-column CSV of (value, key).
    Append {
        #[command(flatten)]
        service: ServiceArgs,
        /// Input file, one record per line.
        #[arg(long)]
        input: PathBuf,
        /// Output CSV file.
        #[arg(long)]
        output: PathBuf,
    },
    /// Resolve every input line and print clusters of likely duplicates.
    Report {
        #[command(flatten)]
        service: ServiceArgs,
        /// Input file, one record per line.
        #[arg(long)]
        input: PathBuf,
        /// Write the report here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Only cluster lookups that returned the success result code.
        #[arg(long)]
        require_success: bool,
    },
    /// Look up a single value and print its key, result code, and credits.
    Lookup {
        #[command(flatten)]
        service: ServiceArgs,
        /// The value to match.
        value: String,
    },
}

#[derive(Args)]
struct ServiceArgs {
    /// API license key for the matching service.
    #[arg(long, env = "SIMCLUST_LICENSE")]
    license: String,

    /// Which matcher to query: company, individual, or address.
    #[arg(long, default_value = "company")]
    matcher: Matcher,

    /// Algorithm selector override (e.g. model-v4-wide).
    #[arg(long)]
    algorithm: Option<String>,

    /// Maximum lookups in flight at once.
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Service base URL.
    #[arg(long, default_value = "https://api.interzoid.com")]
    base_url: String,
}

impl ServiceArgs {
    fn match_config(&self) -> MatchConfig {
        MatchConfig {
            license: self.license.clone(),
            matcher: self.matcher,
            algorithm: self.algorithm.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Command::Append {
            service,
            input,
            output,
        } => {
            let records = input::read_records(&input)?;
            // Create the output before spending lookups on the batch.
            let file = create_output(&output)?;
            let resolutions = resolve_all(&service, records).await?;
            FullDumpSink::new(file).write(&resolutions)?;
            info!(rows = resolutions.len(), output = %output.display(), "wrote full dump");
        }
        Command::Report {
            service,
            input,
            output,
            require_success,
        } => {
            let records = input::read_records(&input)?;
            match output {
                Some(path) => {
                    let file = create_output(&path)?;
                    let resolutions = resolve_all(&service, records).await?;
                    let mut sink = ClusterReportSink::new(file).require_success(require_success);
                    sink.write(&resolutions)?;
                    info!(output = %path.display(), "wrote cluster report");
                }
                None => {
                    let resolutions = resolve_all(&service, records).await?;
                    let mut sink = ClusterReportSink::new(io::stdout().lock())
                        .require_success(require_success);
                    sink.write(&resolutions)?;
                }
            }
        }
        Command::Lookup { service, value } => {
            let client = MatchClient::new(service.match_config())?;
            let response = client.fetch(&value).await?;
            println!("Similarity Key: {}", response.sim_key.as_deref().unwrap_or(""));
            println!("Result Code: {}", response.code.as_deref().unwrap_or(""));
            println!(
                "Remaining Credits: {}",
                response.credits.as_deref().unwrap_or("")
            );
        }
    }

    Ok(())
}

fn create_output(path: &Path) -> anyhow::Result<File> {
    File::create(path).with_context(|| format!("creating output file {}", path.display()))
}

/// Resolve every record under the configured concurrency limit. Per-record
/// lookup failures come back as degraded resolutions, in input order.
async fn resolve_all(
    service: &ServiceArgs,
    records: Vec<Record>,
) -> anyhow::Result<Vec<Resolution>> {
    let client = MatchClient::new(service.match_config())?;
    Ok(enrich(records, service.concurrency, |record| client.resolve(record)).await)
}

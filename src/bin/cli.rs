//! metricskv CLI Client
//!
//! Command-line interface for storing and querying metrics.

use std::time::Duration;

use clap::{Parser, Subcommand};
use metricskv::network::{unix_now, Client};
use metricskv::protocol::format_value;
use tracing_subscriber::{fmt, EnvFilter};

/// metricskv CLI
#[derive(Parser, Debug)]
#[command(name = "metricskv-cli")]
#[command(about = "CLI for the metricskv metrics store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    server: String,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a sample
    Put {
        /// Metric name
        key: String,

        /// Sample value
        value: f64,

        /// Unix timestamp in seconds (defaults to now)
        #[arg(long)]
        timestamp: Option<i64>,
    },

    /// Print the samples of a metric, or of all metrics with '*'
    Get {
        /// Metric name or '*'
        key: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> metricskv::Result<()> {
    let timeout = (args.timeout_ms > 0).then(|| Duration::from_millis(args.timeout_ms));
    let mut client = Client::connect(args.server.as_str(), timeout)?;

    match args.command {
        Commands::Put {
            key,
            value,
            timestamp,
        } => {
            client.put(&key, value, timestamp.unwrap_or_else(unix_now))?;
        }
        Commands::Get { key } => {
            for (name, samples) in client.get(&key)? {
                for sample in samples {
                    println!("{} {} {}", name, format_value(sample.value), sample.timestamp);
                }
            }
        }
    }

    client.close()
}

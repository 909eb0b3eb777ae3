//! # Client Binary Entry Point
//!
//! Sends one image to a TensorFlow Serving PredictionService and prints the
//! classification response.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin client -- --server localhost:9000 --image cat.jpg
//! ```
//!
//! With a config file and JSON output:
//! ```bash
//! cargo run --bin client -- --config config/client.toml --image cat.jpg --format json
//! ```
//!
//! The client will:
//! 1. Load configuration (defaults, then the TOML file, then flags)
//! 2. Read the image file
//! 3. Connect to the PredictionService
//! 4. Call `Predict` with a 10 second deadline
//! 5. Print the response to stdout
//!
//! Logs go to stderr, so stdout carries only the response.

use clap::Parser;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;

use inception_client::common::config::ClientConfig;
use inception_client::OutputFormat;

/// Command-line arguments for the client binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// PredictionService host:port
    #[arg(long)]
    server: Option<String>,

    /// Path to image in JPEG format
    #[arg(long)]
    image: Option<PathBuf>,

    /// Optional client configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How to print the response
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

impl Args {
    /// Built-in defaults, overridden by the config file, overridden by flags.
    fn into_config(self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(server) = self.server {
            config = config.with_server(server);
        }
        if let Some(image) = self.image {
            config = config.with_image(image);
        }
        if let Some(format) = self.format {
            config = config.with_format(format);
        }

        Ok(config)
    }
}

/// Initialize the logging system with timestamp, level, and message formatting.
///
/// Logs are printed to stderr with INFO level by default; `RUST_LOG`
/// overrides the level.
/// Format: `[HH:MM:SS] [LEVEL] message`
fn init_logger() {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] [{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter_level(LevelFilter::Info)
        .parse_env(Env::default())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = args.into_config()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    inception_client::run(&config, &mut out).await?;

    Ok(())
}

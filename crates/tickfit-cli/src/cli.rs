//! CLI argument definitions for tickfit.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `train` | Fetch a price series and train until the EMA rule stops |
//! | `series` | Fetch a price series and print its summary |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `text` | Output format (text, ndjson) |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! # Train on the built-in sawtooth series
//! tickfit train --source synthetic
//!
//! # Train on an Event Store stream with a config file
//! tickfit train --source event-store --stream BotCoin-001001 --config train.toml
//!
//! # Machine-readable progress
//! tickfit --format ndjson train --source file --path prices.txt
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "tickfit",
    author,
    version,
    about = "Train a feed-forward network on tick price returns"
)]
pub struct Cli {
    /// Output format for progress and results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable progress lines.
    Text,
    /// One JSON object per line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Train a network on a price series.
    Train(TrainArgs),
    /// Fetch a price series and print a summary.
    Series(SeriesArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Deterministic sawtooth series.
    Synthetic,
    /// Event Store HTTP API.
    EventStore,
    /// Whitespace-separated price file.
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NormalizationArg {
    MinMax,
    ZScore,
}

/// Where the price series comes from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    #[arg(long, value_enum, default_value_t = SourceSelector::Synthetic)]
    pub source: SourceSelector,

    /// Event Store base URL.
    #[arg(long, default_value = "http://127.0.0.1:2113")]
    pub url: String,

    /// Event Store stream name.
    #[arg(long, default_value = "BotCoin-001001")]
    pub stream: String,

    /// Event type kept from the stream.
    #[arg(long, default_value = "TickEvent")]
    pub event_type: String,

    /// Maximum number of events or prices read (1..=4096).
    #[arg(long, default_value_t = 4096)]
    pub limit: usize,

    /// Price file for `--source file`.
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Length of the synthetic series.
    #[arg(long, default_value_t = 6000)]
    pub synthetic_len: usize,

    /// Period of the synthetic sawtooth.
    #[arg(long, default_value_t = 46)]
    pub synthetic_period: usize,

    /// Per-request timeout for HTTP sources.
    #[arg(long, default_value_t = 60_000)]
    pub timeout_ms: u64,

    /// Retries after a failed HTTP request.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Args)]
pub struct TrainArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// TOML training configuration; flags below override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub window_size: Option<usize>,

    #[arg(long)]
    pub prediction_size: Option<usize>,

    #[arg(long)]
    pub hidden_size: Option<usize>,

    /// EMA window and warm-up length.
    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long)]
    pub max_iterations: Option<u64>,

    /// Weight initialisation seed.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum)]
    pub normalization: Option<NormalizationArg>,
}

#[derive(Debug, Clone, Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn train_defaults_to_synthetic_source() {
        let cli = Cli::try_parse_from(["tickfit", "train"]).expect("parses");
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(cli.format, OutputFormat::Text);
        assert_eq!(args.source.source, SourceSelector::Synthetic);
        assert_eq!(args.source.limit, 4096);
        assert!(args.config.is_none());
    }

    #[test]
    fn global_format_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tickfit",
            "train",
            "--source",
            "event-store",
            "--seed",
            "7",
            "--format",
            "ndjson",
            "--normalization",
            "z-score",
        ])
        .expect("parses");

        assert_eq!(cli.format, OutputFormat::Ndjson);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.source.source, SourceSelector::EventStore);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.normalization, Some(NormalizationArg::ZScore));
    }
}

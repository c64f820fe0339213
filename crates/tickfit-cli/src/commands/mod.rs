mod series;
mod train;

use std::time::Duration;

use tickfit_core::{
    EventStoreSource, FileSource, PriceSeries, RetryConfig, SeriesRequest, SeriesSource,
    SyntheticSource,
};
use tickfit_ml::fetch_prices;

use crate::cli::{Cli, Command, SourceArgs, SourceSelector};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Train(args) => train::run(args, cli.format).await,
        Command::Series(args) => series::run(args, cli.format).await,
    }
}

fn build_source(args: &SourceArgs) -> Result<Box<dyn SeriesSource>, CliError> {
    let source: Box<dyn SeriesSource> = match args.source {
        SourceSelector::Synthetic => Box::new(SyntheticSource::new(
            args.synthetic_len,
            args.synthetic_period,
        )?),
        SourceSelector::EventStore => {
            let retry = if args.max_retries == 0 {
                RetryConfig::no_retry()
            } else {
                RetryConfig {
                    max_retries: args.max_retries,
                    ..RetryConfig::default()
                }
            };
            Box::new(
                EventStoreSource::new(args.url.as_str())
                    .with_retry(retry)
                    .with_timeout_ms(args.timeout_ms),
            )
        }
        SourceSelector::File => {
            let path = args.path.as_ref().ok_or_else(|| {
                CliError::Command(String::from("--source file requires --path"))
            })?;
            Box::new(FileSource::new(path.clone()))
        }
    };
    Ok(source)
}

fn series_request(args: &SourceArgs) -> Result<SeriesRequest, CliError> {
    Ok(SeriesRequest::new(
        args.stream.as_str(),
        args.event_type.as_str(),
        args.limit,
    )?)
}

/// Upper bound on how long a fetch may take before the CLI gives up.
fn fetch_budget(args: &SourceArgs) -> Duration {
    let attempts = u64::from(args.max_retries) + 1;
    Duration::from_millis(args.timeout_ms.saturating_mul(attempts).saturating_add(30_000))
}

async fn fetch(args: &SourceArgs) -> Result<PriceSeries, CliError> {
    let source = build_source(args)?;
    let request = series_request(args)?;
    let budget = fetch_budget(args);

    tokio::time::timeout(budget, fetch_prices(source.as_ref(), request))
        .await
        .map_err(|_| {
            CliError::Source(tickfit_core::SourceError::unavailable(format!(
                "fetch did not finish within {} ms",
                budget.as_millis()
            )))
        })?
        .map_err(CliError::from)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn source_args(argv: &[&str]) -> SourceArgs {
        let cli = Cli::try_parse_from(argv).expect("parses");
        match cli.command {
            Command::Series(args) => args.source,
            Command::Train(args) => args.source,
        }
    }

    #[test]
    fn file_source_requires_path() {
        let args = source_args(&["tickfit", "series", "--source", "file"]);
        let err = build_source(&args).err().expect("missing path");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn oversized_limit_is_rejected() {
        let args = source_args(&["tickfit", "series", "--limit", "5000"]);
        assert!(matches!(series_request(&args), Err(CliError::Validation(_))));
    }

    #[tokio::test]
    async fn synthetic_fetch_uses_requested_shape() {
        let args = source_args(&[
            "tickfit",
            "series",
            "--synthetic-len",
            "50",
            "--synthetic-period",
            "5",
        ]);
        let prices = fetch(&args).await.expect("synthetic");
        assert_eq!(prices.len(), 50);
        assert_eq!(prices.summary().max, Some(5.0));
    }
}

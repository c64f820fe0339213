use std::io::{self, Write};

use serde::Serialize;
use tickfit_ml::report::{progress_line, CONVERGED_MESSAGE};
use tickfit_ml::{
    prepare, CancellationToken, EpochResult, NormalizationMethod, StopReason, Trainer,
    TrainingConfig, TrainingReport,
};

use crate::cli::{NormalizationArg, OutputFormat, TrainArgs};
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct TrainingSummary<'a> {
    stop_reason: StopReason,
    iterations: u64,
    last_epoch: Option<&'a EpochResult>,
}

pub async fn run(args: &TrainArgs, format: OutputFormat) -> Result<(), CliError> {
    let config = resolve_config(args)?;
    let prices = super::fetch(&args.source).await?;
    let dataset = prepare(&prices, &config)?;
    let trainer = Trainer::new(&config, dataset)?;

    let token = CancellationToken::new();
    let interrupt = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received; stopping after the current epoch");
                token.cancel();
            }
        })
    };

    let outcome = tokio::task::spawn_blocking(move || train_blocking(trainer, &token, format))
        .await
        .map_err(|e| CliError::Task(e.to_string()));
    interrupt.abort();

    let report = outcome??;
    write_summary(&mut io::stdout().lock(), &report, format)
}

/// Config file first, then flag overrides, then validation.
fn resolve_config(args: &TrainArgs) -> Result<TrainingConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::from_file(path)?,
        None => TrainingConfig::default(),
    };

    if let Some(value) = args.window_size {
        config.window_size = value;
    }
    if let Some(value) = args.prediction_size {
        config.prediction_size = value;
    }
    if args.hidden_size.is_some() {
        config.hidden_size = args.hidden_size;
    }
    if let Some(value) = args.batch_size {
        config.batch_size = value;
    }
    if let Some(value) = args.max_iterations {
        config.max_iterations = value;
    }
    if let Some(value) = args.seed {
        config.seed = value;
    }
    if let Some(value) = args.normalization {
        config.normalization = match value {
            NormalizationArg::MinMax => NormalizationMethod::MinMax,
            NormalizationArg::ZScore => NormalizationMethod::ZScore,
        };
    }

    config.validate()?;
    Ok(config)
}

fn train_blocking(
    mut trainer: Trainer,
    token: &CancellationToken,
    format: OutputFormat,
) -> Result<TrainingReport, CliError> {
    let stdout = io::stdout();
    let mut write_error = None;

    let report = trainer.run(token, |epoch| {
        if write_error.is_some() {
            return;
        }
        if let Err(error) = write_epoch(&mut stdout.lock(), epoch, format) {
            write_error = Some(error);
            token.cancel();
        }
    });

    if let Some(error) = write_error {
        return Err(error.into());
    }
    Ok(report?)
}

fn write_epoch(out: &mut impl Write, epoch: &EpochResult, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}", progress_line(epoch)),
        OutputFormat::Ndjson => {
            serde_json::to_writer(&mut *out, epoch)?;
            writeln!(out)
        }
    }
}

fn write_summary(
    out: &mut impl Write,
    report: &TrainingReport,
    format: OutputFormat,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Text => match report.stop_reason {
            StopReason::Converged => writeln!(out, "{CONVERGED_MESSAGE}")?,
            StopReason::IterationLimit => writeln!(
                out,
                "Iteration limit reached after {} iterations",
                report.iterations
            )?,
        },
        OutputFormat::Ndjson => {
            let summary = TrainingSummary {
                stop_reason: report.stop_reason,
                iterations: report.iterations,
                last_epoch: report.last_epoch(),
            };
            serde_json::to_writer(&mut *out, &summary)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    fn train_args(argv: &[&str]) -> TrainArgs {
        match Cli::try_parse_from(argv).expect("parses").command {
            Command::Train(args) => args,
            Command::Series(_) => panic!("expected train"),
        }
    }

    fn report(stop_reason: StopReason) -> TrainingReport {
        TrainingReport {
            stop_reason,
            iterations: 1,
            epochs: vec![EpochResult {
                iteration: 1,
                learning_error: 2.0,
                prediction_error: 1.0,
                ema: 180.1,
                predicted: vec![1.0],
                actual: vec![1.1],
            }],
        }
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "window_size = 6\nseed = 3\nbatch_size = 4").expect("write");
        let path = file.path().to_string_lossy().into_owned();

        let args = train_args(&["tickfit", "train", "--config", &path, "--seed", "11"]);
        let config = resolve_config(&args).expect("valid");

        assert_eq!(config.window_size, 6);
        assert_eq!(config.batch_size, 4);
        assert_eq!(config.seed, 11);
    }

    #[test]
    fn invalid_override_is_a_config_error() {
        let args = train_args(&["tickfit", "train", "--batch-size", "0"]);
        let err = resolve_config(&args).expect_err("invalid");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn converged_text_summary_prints_breaking_message() {
        let mut out = Vec::new();
        write_summary(&mut out, &report(StopReason::Converged), OutputFormat::Text)
            .expect("written");
        assert_eq!(String::from_utf8(out).expect("utf8"), format!("{CONVERGED_MESSAGE}\n"));
    }

    #[test]
    fn ndjson_epoch_is_one_json_line() {
        let report = report(StopReason::IterationLimit);
        let mut out = Vec::new();
        write_epoch(&mut out, &report.epochs[0], OutputFormat::Ndjson).expect("written");
        write_summary(&mut out, &report, OutputFormat::Ndjson).expect("written");

        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["iteration"], 1);
        assert_eq!(lines[1]["stop_reason"], "iteration_limit");
        assert_eq!(lines[1]["last_epoch"]["ema"], 180.1);
    }
}

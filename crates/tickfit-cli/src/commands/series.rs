use std::io::Write;

use crate::cli::{OutputFormat, SeriesArgs};
use crate::error::CliError;

pub async fn run(args: &SeriesArgs, format: OutputFormat) -> Result<(), CliError> {
    let prices = super::fetch(&args.source).await?;
    let summary = prices.summary();

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => serde_json::to_writer_pretty(&mut stdout, &summary)?,
        OutputFormat::Ndjson => serde_json::to_writer(&mut stdout, &summary)?,
    }
    writeln!(stdout)?;
    Ok(())
}

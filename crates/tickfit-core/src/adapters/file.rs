use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use crate::series_source::{SeriesRequest, SeriesSource, SourceError, SourceId};
use crate::PriceSeries;

/// Reads prices from a whitespace-separated text file.
///
/// Each non-empty line holds one observation with the price in the last
/// column, so both `20240102 101.5` and bare `101.5` are accepted. Lines
/// starting with `#` are comments. Lines are taken in file order, which must
/// be chronological.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses the body of a price file into a series.
pub fn parse_price_lines(content: &str) -> Result<PriceSeries, SourceError> {
    let mut prices = Vec::new();
    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let field = line.split_whitespace().last().unwrap_or(line);
        let price = field.parse::<f64>().map_err(|e| {
            SourceError::invalid_response(format!(
                "line {}: cannot parse price '{field}': {e}",
                number + 1
            ))
        })?;
        prices.push(price);
    }
    Ok(PriceSeries::new(prices)?)
}

impl SeriesSource for FileSource {
    fn id(&self) -> SourceId {
        SourceId::File
    }

    fn fetch_series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                SourceError::unavailable(format!("cannot read '{}': {e}", self.path.display()))
            })?;
            let series = parse_price_lines(&content)?;

            // Keep the most recent `limit` observations, like a backward read.
            let prices = series.into_inner();
            let skip = prices.len().saturating_sub(req.limit);
            tracing::debug!(path = %self.path.display(), kept = prices.len() - skip, "loaded price file");
            Ok(PriceSeries::new(prices[skip..].to_vec())?)
        })
    }
}

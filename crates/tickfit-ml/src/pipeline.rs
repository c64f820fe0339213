//! Prices to training matrices.

use ndarray::Array2;
use tickfit_core::{PriceSeries, SeriesRequest, SeriesSource};

use crate::config::TrainingConfig;
use crate::error::{DataUnit, FitError, FitResult};
use crate::normalizer::Normalizer;
use crate::returns::{to_returns, ReturnSeries};
use crate::window::{build_samples, to_matrices};

/// Everything one training run reads: the raw returns, the fitted
/// normalizer and the normalized samples as matrices.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub returns: ReturnSeries,
    pub normalizer: Normalizer,
    /// One normalized input window per row.
    pub inputs: Array2<f64>,
    /// One normalized target window per row.
    pub targets: Array2<f64>,
    pub window_size: usize,
    pub prediction_size: usize,
}

impl PreparedDataset {
    pub fn sample_count(&self) -> usize {
        self.inputs.nrows()
    }

    /// Return-space target of sample `pos`.
    pub fn actual(&self, pos: usize) -> &[f64] {
        let start = pos + self.window_size;
        &self.returns.as_slice()[start..start + self.prediction_size]
    }
}

/// Runs returns, normalization and windowing in that order.
pub fn prepare(prices: &PriceSeries, config: &TrainingConfig) -> FitResult<PreparedDataset> {
    config.validate()?;

    let returns = to_returns(prices)?;
    let needed = config.min_prices();
    if prices.len() < needed {
        return Err(FitError::InsufficientData {
            needed,
            available: prices.len(),
            unit: DataUnit::Prices,
        });
    }

    let mut normalizer = Normalizer::new(config.normalization);
    normalizer.fit(returns.as_slice())?;
    let normalized = normalizer.normalize(returns.as_slice())?;

    let samples = build_samples(&normalized, config.window_size, config.prediction_size)?;
    let (inputs, targets) = to_matrices(&samples);

    tracing::info!(
        prices = prices.len(),
        returns = returns.len(),
        samples = samples.len(),
        "prepared dataset"
    );

    Ok(PreparedDataset {
        returns,
        normalizer,
        inputs,
        targets,
        window_size: config.window_size,
        prediction_size: config.prediction_size,
    })
}

/// Fetches a price series from `source`.
pub async fn fetch_prices(
    source: &dyn SeriesSource,
    request: SeriesRequest,
) -> FitResult<PriceSeries> {
    tracing::info!(source = %source.id(), stream = %request.stream, limit = request.limit, "fetching prices");
    let prices = source.fetch_series(request).await?;
    tracing::info!(source = %source.id(), count = prices.len(), "fetched prices");
    Ok(prices)
}

//! Price to relative-return transform.

use tickfit_core::PriceSeries;

use crate::error::{DataUnit, FitError, FitResult};

/// Consecutive price ratios, `returns[i] = prices[i + 1] / prices[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnSeries {
    values: Vec<f64>,
}

impl ReturnSeries {
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Converts a price series into its return series.
///
/// # Errors
///
/// - [`FitError::InsufficientData`] when fewer than two prices are given.
/// - [`FitError::DivideByZero`] when any price is zero.
pub fn to_returns(prices: &PriceSeries) -> FitResult<ReturnSeries> {
    let prices = prices.as_slice();
    if prices.len() < 2 {
        return Err(FitError::InsufficientData {
            needed: 2,
            available: prices.len(),
            unit: DataUnit::Prices,
        });
    }

    if let Some(index) = prices.iter().position(|&price| price == 0.0) {
        return Err(FitError::DivideByZero { index });
    }

    let values = prices.windows(2).map(|pair| pair[1] / pair[0]).collect();

    Ok(ReturnSeries { values })
}

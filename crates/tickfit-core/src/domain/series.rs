use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Chronological price observations, oldest first.
///
/// Values must be finite and non-negative. Zero is accepted here and
/// rejected, with its index, by the return transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct PriceSeries {
    prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(prices: Vec<f64>) -> Result<Self, ValidationError> {
        for (index, &value) in prices.iter().enumerate() {
            validate_price(index, value)?;
        }
        Ok(Self { prices })
    }

    /// Skips validation for generated values that are positive by construction.
    pub(crate) fn from_positive_integers(prices: Vec<f64>) -> Self {
        Self { prices }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.prices
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.prices
    }

    pub fn summary(&self) -> SeriesSummary {
        let min = self.prices.iter().copied().reduce(f64::min);
        let max = self.prices.iter().copied().reduce(f64::max);
        SeriesSummary {
            count: self.prices.len(),
            first: self.prices.first().copied(),
            last: self.prices.last().copied(),
            min,
            max,
        }
    }
}

impl TryFrom<Vec<f64>> for PriceSeries {
    type Error = ValidationError;

    fn try_from(value: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PriceSeries> for Vec<f64> {
    fn from(value: PriceSeries) -> Self {
        value.prices
    }
}

/// Descriptive statistics reported by `tickfit series`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub first: Option<f64>,
    pub last: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

fn validate_price(index: usize, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinitePrice { index, value });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativePrice { index, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let err = PriceSeries::new(vec![1.0, -2.0]).expect_err("must fail");
        assert!(matches!(err, ValidationError::NegativePrice { index: 1, .. }));

        let err = PriceSeries::new(vec![f64::NAN]).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFinitePrice { index: 0, .. }));
    }

    #[test]
    fn keeps_zero_prices_for_downstream_reporting() {
        let series = PriceSeries::new(vec![1.0, 0.0, 3.0]).expect("zero is representable");
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn summary_tracks_extremes_and_endpoints() {
        let series = PriceSeries::new(vec![3.0, 1.0, 5.0, 2.0]).expect("valid");
        let summary = series.summary();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.first, Some(3.0));
        assert_eq!(summary.last, Some(2.0));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.max, Some(5.0));
    }

    #[test]
    fn deserialization_applies_validation() {
        let parsed: Result<PriceSeries, _> = serde_json::from_str("[1.0, -1.0]");
        assert!(parsed.is_err());
    }
}

//! Fit-once affine normalization of the return series.
//!
//! Both supported methods reduce to `n = (x - center) / scale`, so the
//! inverse is exact up to floating point rounding. The fitted parameters live
//! in an immutable [`NormalizationState`]; a [`Normalizer`] accepts exactly one
//! `fit` and rejects use before it.

use serde::{Deserialize, Serialize};

use crate::config::NormalizationMethod;
use crate::error::{DataUnit, FitError, FitResult};

/// Fitted normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizationState {
    pub method: NormalizationMethod,
    pub center: f64,
    pub scale: f64,
}

impl NormalizationState {
    /// Computes parameters from `series`.
    ///
    /// A constant series has no spread; it gets a unit scale so the
    /// transform stays invertible.
    pub fn fit(method: NormalizationMethod, series: &[f64]) -> FitResult<Self> {
        if series.is_empty() {
            return Err(FitError::InsufficientData {
                needed: 1,
                available: 0,
                unit: DataUnit::Returns,
            });
        }

        let (center, spread) = match method {
            NormalizationMethod::MinMax => {
                let min = series.iter().copied().fold(f64::INFINITY, f64::min);
                let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                ((min + max) / 2.0, (max - min) / 2.0)
            }
            NormalizationMethod::ZScore => {
                let n = series.len() as f64;
                let mean = series.iter().sum::<f64>() / n;
                let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
                (mean, variance.sqrt())
            }
        };

        if !center.is_finite() || !spread.is_finite() {
            return Err(FitError::NumericalFailure(String::from(
                "normalization statistics are not finite",
            )));
        }

        Ok(Self {
            method,
            center,
            scale: if spread > 0.0 { spread } else { 1.0 },
        })
    }

    pub fn normalize_value(&self, value: f64) -> f64 {
        (value - self.center) / self.scale
    }

    pub fn denormalize_value(&self, value: f64) -> f64 {
        value * self.scale + self.center
    }
}

/// Holds the normalization fitted for one training run.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer {
    method: NormalizationMethod,
    state: Option<NormalizationState>,
}

impl Normalizer {
    pub fn new(method: NormalizationMethod) -> Self {
        Self {
            method,
            state: None,
        }
    }

    /// Fits the normalizer once.
    ///
    /// # Errors
    ///
    /// [`FitError::AlreadyFitted`] on a second call; refitting requires a new
    /// normalizer.
    pub fn fit(&mut self, series: &[f64]) -> FitResult<&NormalizationState> {
        if self.state.is_some() {
            return Err(FitError::AlreadyFitted);
        }
        let state = NormalizationState::fit(self.method, series)?;
        tracing::debug!(center = state.center, scale = state.scale, method = ?state.method, "fitted normalizer");
        Ok(self.state.insert(state))
    }

    pub fn state(&self) -> FitResult<&NormalizationState> {
        self.state.as_ref().ok_or(FitError::NormalizationNotFitted)
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    pub fn normalize(&self, series: &[f64]) -> FitResult<Vec<f64>> {
        let state = self.state()?;
        Ok(series.iter().map(|&x| state.normalize_value(x)).collect())
    }

    pub fn denormalize(&self, series: &[f64]) -> FitResult<Vec<f64>> {
        let state = self.state()?;
        Ok(series.iter().map(|&x| state.denormalize_value(x)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RETURNS: [f64; 6] = [0.98, 1.02, 1.5, 0.5, 1.0, 1.01];

    fn fitted(method: NormalizationMethod) -> Normalizer {
        let mut normalizer = Normalizer::new(method);
        normalizer.fit(&RETURNS).expect("fit");
        normalizer
    }

    #[test]
    fn round_trip_restores_fitted_series() {
        for method in [NormalizationMethod::MinMax, NormalizationMethod::ZScore] {
            let normalizer = fitted(method);
            let normalized = normalizer.normalize(&RETURNS).expect("fitted");
            let restored = normalizer.denormalize(&normalized).expect("fitted");

            assert_eq!(restored.len(), RETURNS.len());
            for (a, b) in restored.iter().zip(RETURNS.iter()) {
                assert!((a - b).abs() < 1e-12, "{method:?}: {a} vs {b}");
            }
        }
    }

    #[test]
    fn min_max_spans_bipolar_range() {
        let normalized = fitted(NormalizationMethod::MinMax)
            .normalize(&RETURNS)
            .expect("fitted");
        let min = normalized.iter().copied().fold(f64::INFINITY, f64::min);
        let max = normalized.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        assert!((min + 1.0).abs() < 1e-12);
        assert!((max - 1.0).abs() < 1e-12);
    }

    #[test]
    fn z_score_has_zero_mean_unit_deviation() {
        let normalized = fitted(NormalizationMethod::ZScore)
            .normalize(&RETURNS)
            .expect("fitted");
        let n = normalized.len() as f64;
        let mean = normalized.iter().sum::<f64>() / n;
        let variance = normalized.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        assert!(mean.abs() < 1e-12);
        assert!((variance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn use_before_fit_is_rejected() {
        let normalizer = Normalizer::new(NormalizationMethod::MinMax);
        assert!(matches!(
            normalizer.normalize(&RETURNS),
            Err(FitError::NormalizationNotFitted)
        ));
        assert!(matches!(
            normalizer.denormalize(&RETURNS),
            Err(FitError::NormalizationNotFitted)
        ));
    }

    #[test]
    fn second_fit_is_rejected_and_state_is_kept() {
        let mut normalizer = fitted(NormalizationMethod::MinMax);
        let before = *normalizer.state().expect("fitted");

        assert!(matches!(normalizer.fit(&[5.0, 6.0]), Err(FitError::AlreadyFitted)));
        assert_eq!(*normalizer.state().expect("fitted"), before);
    }

    #[test]
    fn constant_series_stays_invertible() {
        let mut normalizer = Normalizer::new(NormalizationMethod::MinMax);
        normalizer.fit(&[1.0, 1.0, 1.0]).expect("fit");

        let normalized = normalizer.normalize(&[1.0, 1.0]).expect("fitted");
        assert_eq!(normalized, vec![0.0, 0.0]);
        assert_eq!(normalizer.denormalize(&normalized).expect("fitted"), vec![1.0, 1.0]);
    }

    #[test]
    fn empty_series_cannot_be_fitted() {
        let mut normalizer = Normalizer::new(NormalizationMethod::ZScore);
        assert!(matches!(
            normalizer.fit(&[]),
            Err(FitError::InsufficientData { .. })
        ));
    }
}

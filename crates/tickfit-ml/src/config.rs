use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FitError, FitResult};
use crate::window::min_len;

/// Normalization strategy fitted on the return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMethod {
    /// Map `[min, max]` onto `[-1, 1]`, the output range of the bipolar sigmoid.
    #[default]
    MinMax,
    /// Subtract the mean and divide by the population standard deviation.
    ZScore,
}

/// Hyperparameters of one training run.
///
/// Every field has a default, so a TOML file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Input window length.
    pub window_size: usize,
    /// Output window length.
    pub prediction_size: usize,
    /// Hidden layer width; `None` means twice the window size.
    pub hidden_size: Option<usize>,
    /// EMA smoothing window, also the warm-up length of the stopping rule.
    pub batch_size: usize,
    /// Hard ceiling on iterations.
    pub max_iterations: u64,
    /// Initial EMA value; must exceed any plausible prediction error.
    pub ema_sentinel: f64,
    pub normalization: NormalizationMethod,
    /// Seed for weight initialisation.
    pub seed: u64,
    /// Steepness of the bipolar sigmoid.
    pub activation_alpha: f64,
    pub lm_initial_lambda: f64,
    pub lm_adjustment: f64,
    pub lm_max_lambda: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            prediction_size: 2,
            hidden_size: None,
            batch_size: 10,
            max_iterations: 100_000,
            ema_sentinel: 200.0,
            normalization: NormalizationMethod::MinMax,
            seed: 0,
            activation_alpha: 2.0,
            lm_initial_lambda: 0.1,
            lm_adjustment: 10.0,
            lm_max_lambda: 1e25,
        }
    }
}

impl TrainingConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> FitResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            FitError::InvalidConfig(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> FitResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| FitError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> FitResult<()> {
        if self.window_size == 0 {
            return Err(invalid("window_size must be greater than 0"));
        }
        if self.prediction_size == 0 {
            return Err(invalid("prediction_size must be greater than 0"));
        }
        if self.hidden_size == Some(0) {
            return Err(invalid("hidden_size must be greater than 0"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size must be greater than 0"));
        }
        if self.max_iterations == 0 {
            return Err(invalid("max_iterations must be greater than 0"));
        }
        if !self.ema_sentinel.is_finite() {
            return Err(invalid("ema_sentinel must be finite"));
        }
        if !(self.activation_alpha > 0.0 && self.activation_alpha.is_finite()) {
            return Err(invalid("activation_alpha must be positive"));
        }
        if !(self.lm_initial_lambda > 0.0) {
            return Err(invalid("lm_initial_lambda must be positive"));
        }
        if !(self.lm_adjustment > 1.0) {
            return Err(invalid("lm_adjustment must be greater than 1"));
        }
        if !(self.lm_max_lambda > self.lm_initial_lambda) {
            return Err(invalid("lm_max_lambda must exceed lm_initial_lambda"));
        }
        Ok(())
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size.unwrap_or(self.window_size * 2)
    }

    /// Prices needed to build a single sample; one more than the returns.
    pub fn min_prices(&self) -> usize {
        min_len(self.window_size, self.prediction_size) + 1
    }
}

fn invalid(message: &str) -> FitError {
    FitError::InvalidConfig(message.to_owned())
}

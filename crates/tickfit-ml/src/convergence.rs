//! EMA-based early stopping on the held-out prediction error.

use serde::Serialize;

use crate::config::TrainingConfig;

/// Outcome of observing one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Continue,
    Converged,
}

/// Tracks an exponential moving average of the prediction error.
///
/// `ema = (previous * (batch_size - 1) + error) / batch_size`. The first
/// `batch_size` iterations only warm the average up; after that, the first
/// iteration whose EMA exceeds the previous one stops training. On that
/// iteration the previous EMA is left as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceMonitor {
    batch_size: usize,
    previous: f64,
    current: f64,
    iteration: u64,
}

impl ConvergenceMonitor {
    pub fn new(sentinel: f64, batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            previous: sentinel,
            current: sentinel,
            iteration: 0,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(config.ema_sentinel, config.batch_size)
    }

    pub fn observe(&mut self, prediction_error: f64) -> Decision {
        self.iteration += 1;
        let n = self.batch_size as f64;
        self.current = (self.previous * (n - 1.0) + prediction_error) / n;

        if self.iteration > self.batch_size as u64 && self.current > self.previous {
            return Decision::Converged;
        }
        self.previous = self.current;
        Decision::Continue
    }

    /// EMA after the latest observation.
    pub fn ema(&self) -> f64 {
        self.current
    }

    pub fn previous_ema(&self) -> f64 {
        self.previous
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }
}

//! Epoch optimizers.
//!
//! The trainer only depends on [`EpochOptimizer`]: one call performs exactly
//! one pass over the full sample set and updates the network in place. An
//! epoch must never leave the sum of squared errors higher than it found it.

mod levenberg_marquardt;

pub use levenberg_marquardt::LevenbergMarquardt;

use ndarray::Array2;
use serde::Serialize;

use crate::error::FitResult;
use crate::network::Network;

/// Outcome of one optimizer epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochStats {
    pub sse_before: f64,
    pub sse_after: f64,
    /// Damping in effect after the epoch.
    pub damping: f64,
    pub rejected_steps: u32,
    pub accepted: bool,
}

/// One-epoch training strategy over a full batch of samples.
pub trait EpochOptimizer: Send {
    fn name(&self) -> &'static str;

    /// Runs one epoch over `inputs` (one sample per row) and `targets`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::NumericalFailure`](crate::FitError::NumericalFailure)
    /// when the network produces non-finite outputs.
    fn run_epoch(
        &mut self,
        network: &mut Network,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
    ) -> FitResult<EpochStats>;
}

/// Sum of squared errors of `network` over the batch.
pub fn sum_squared_error(network: &Network, inputs: &Array2<f64>, targets: &Array2<f64>) -> f64 {
    inputs
        .rows()
        .into_iter()
        .zip(targets.rows())
        .map(|(input, target)| {
            let output = network.compute(input);
            (&target - &output).mapv(|e| e * e).sum()
        })
        .sum()
}

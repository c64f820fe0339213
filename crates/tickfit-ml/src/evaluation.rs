//! Error measures in return space.

use crate::error::{DataUnit, FitError, FitResult};
use crate::network::Network;
use crate::pipeline::PreparedDataset;
use crate::window::min_len;

/// Mean absolute percentage error, `mean_k |1 - predicted_k / actual_k| * 100`.
pub fn percentage_error(predicted: &[f64], actual: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let total: f64 = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (1.0 - p / a).abs())
        .sum();
    total / actual.len() as f64 * 100.0
}

/// Errors of one evaluation pass over every sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Summed error of all but the last sample, divided by `sample_count - 1`.
    pub learning_error: f64,
    /// Error on the last (held-out) sample.
    pub prediction_error: f64,
    /// Denormalized network output for the held-out sample.
    pub predicted: Vec<f64>,
    /// Return-space target of the held-out sample.
    pub actual: Vec<f64>,
}

/// Runs `network` over every sample of `dataset` and scores it.
pub fn evaluate(network: &Network, dataset: &PreparedDataset) -> FitResult<Evaluation> {
    let count = dataset.sample_count();
    let Some(last) = count.checked_sub(1) else {
        return Err(FitError::InsufficientData {
            needed: min_len(dataset.window_size, dataset.prediction_size),
            available: dataset.returns.len(),
            unit: DataUnit::Returns,
        });
    };

    let mut learning_total = 0.0;
    for pos in 0..last {
        let predicted = predict(network, dataset, pos)?;
        learning_total += percentage_error(&predicted, dataset.actual(pos));
    }

    let predicted = predict(network, dataset, last)?;
    let actual = dataset.actual(last).to_vec();
    let prediction_error = percentage_error(&predicted, &actual);
    let learning_error = if last == 0 {
        0.0
    } else {
        learning_total / last as f64
    };

    Ok(Evaluation {
        learning_error,
        prediction_error,
        predicted,
        actual,
    })
}

fn predict(network: &Network, dataset: &PreparedDataset, pos: usize) -> FitResult<Vec<f64>> {
    let output = network.compute(dataset.inputs.row(pos));
    if output.iter().any(|v| !v.is_finite()) {
        return Err(FitError::NumericalFailure(format!(
            "network output for sample {pos} is not finite"
        )));
    }
    dataset.normalizer.denormalize(&output.to_vec())
}

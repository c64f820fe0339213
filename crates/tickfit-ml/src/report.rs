//! Human-readable progress output.

use crate::trainer::EpochResult;

/// Printed once when the EMA rule stops training.
pub const CONVERGED_MESSAGE: &str = "Prediction quality not improving, breaking...";

/// Formats values with three decimals, comma separated.
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| format!("{v:.3}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// `00012 - LE 1.2345%, Prediction 1.021,0.998 (1.022,1.000) 0.1500%, EMA 3.1000%`
pub fn progress_line(epoch: &EpochResult) -> String {
    format!(
        "{:05} - LE {:.4}%, Prediction {} ({}) {:.4}%, EMA {:.4}%",
        epoch.iteration,
        epoch.learning_error,
        format_values(&epoch.predicted),
        format_values(&epoch.actual),
        epoch.prediction_error,
        epoch.ema,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_layout() {
        let epoch = EpochResult {
            iteration: 12,
            learning_error: 1.23457,
            prediction_error: 0.15,
            ema: 3.1,
            predicted: vec![1.0214, 0.9981],
            actual: vec![1.0222, 1.0],
        };

        assert_eq!(
            progress_line(&epoch),
            "00012 - LE 1.2346%, Prediction 1.021,0.998 (1.022,1.000) 0.1500%, EMA 3.1000%"
        );
    }

    #[test]
    fn empty_values_format_as_empty() {
        assert_eq!(format_values(&[]), "");
    }
}

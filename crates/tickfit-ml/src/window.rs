//! Sliding-window sample construction.

use ndarray::Array2;

use crate::error::{DataUnit, FitError, FitResult};

/// One supervised pair: `window_size` inputs followed by `prediction_size` targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
}

/// Shortest series that yields one sample.
pub fn min_len(window_size: usize, prediction_size: usize) -> usize {
    window_size + prediction_size + 1
}

/// Number of samples a series of `len` values yields, if any.
pub fn sample_count(len: usize, window_size: usize, prediction_size: usize) -> Option<usize> {
    len.checked_sub(window_size + prediction_size)
        .filter(|&count| count > 0)
}

/// Slices `series` into overlapping samples with stride 1.
///
/// Sample `pos` takes `series[pos..pos + window_size]` as input and the next
/// `prediction_size` values as target. The count is
/// `len - window_size - prediction_size`, which leaves the final value of the
/// series unused.
pub fn build_samples(
    series: &[f64],
    window_size: usize,
    prediction_size: usize,
) -> FitResult<Vec<Sample>> {
    if window_size == 0 || prediction_size == 0 {
        return Err(FitError::InvalidConfig(String::from(
            "window and prediction sizes must be greater than 0",
        )));
    }

    let count = sample_count(series.len(), window_size, prediction_size).ok_or(
        FitError::InsufficientData {
            needed: min_len(window_size, prediction_size),
            available: series.len(),
            unit: DataUnit::Returns,
        },
    )?;

    Ok((0..count)
        .map(|pos| {
            let split = pos + window_size;
            Sample {
                input: series[pos..split].to_vec(),
                target: series[split..split + prediction_size].to_vec(),
            }
        })
        .collect())
}

/// Stacks sample inputs and targets into row-major matrices.
pub fn to_matrices(samples: &[Sample]) -> (Array2<f64>, Array2<f64>) {
    let inputs = samples.first().map_or(0, |s| s.input.len());
    let outputs = samples.first().map_or(0, |s| s.target.len());

    let x = Array2::from_shape_fn((samples.len(), inputs), |(row, col)| samples[row].input[col]);
    let y = Array2::from_shape_fn((samples.len(), outputs), |(row, col)| {
        samples[row].target[col]
    });
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f64> {
        (0..len).map(|i| i as f64).collect()
    }

    #[test]
    fn produces_expected_count_and_shapes() {
        let samples = build_samples(&ramp(20), 4, 2).expect("enough data");

        assert_eq!(samples.len(), 14);
        assert!(samples.iter().all(|s| s.input.len() == 4 && s.target.len() == 2));
        assert_eq!(samples[0].input, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(samples[0].target, vec![4.0, 5.0]);
        assert_eq!(samples[13].target, vec![17.0, 18.0]);
    }

    #[test]
    fn consecutive_inputs_overlap_by_window_minus_one() {
        let samples = build_samples(&ramp(30), 5, 3).expect("enough data");
        for pair in samples.windows(2) {
            assert_eq!(pair[0].input[1..], pair[1].input[..4]);
        }
    }

    #[test]
    fn series_not_longer_than_window_plus_prediction_is_insufficient() {
        for len in [0, 5, 12] {
            let err = build_samples(&ramp(len), 10, 2).expect_err("too short");
            assert!(matches!(err, FitError::InsufficientData { needed: 13, .. }));
        }
        assert_eq!(build_samples(&ramp(13), 10, 2).expect("one sample").len(), 1);
        assert_eq!(min_len(10, 2), 13);
    }

    #[test]
    fn zero_sized_windows_are_invalid_config() {
        assert!(matches!(
            build_samples(&ramp(10), 0, 2),
            Err(FitError::InvalidConfig(_))
        ));
    }

    #[test]
    fn matrices_mirror_samples() {
        let samples = build_samples(&ramp(8), 3, 2).expect("enough data");
        let (x, y) = to_matrices(&samples);

        assert_eq!(x.dim(), (3, 3));
        assert_eq!(y.dim(), (3, 2));
        assert_eq!(x[[2, 0]], 2.0);
        assert_eq!(y[[2, 1]], 6.0);
    }
}

use ndarray::{Array1, Array2};

use super::{sum_squared_error, EpochOptimizer, EpochStats};
use crate::config::TrainingConfig;
use crate::error::{FitError, FitResult};
use crate::network::Network;

/// Levenberg–Marquardt least-squares training.
///
/// Each epoch builds the Jacobian of every network output with respect to
/// every parameter, then solves `(JᵀJ + λI) δ = Jᵀe` by Cholesky
/// decomposition. A step is kept only if it lowers the sum of squared
/// errors; otherwise λ grows by `adjustment` and the solve is repeated. Once
/// λ passes `max_damping` the epoch gives up and restores the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct LevenbergMarquardt {
    damping: f64,
    adjustment: f64,
    max_damping: f64,
}

impl LevenbergMarquardt {
    pub fn new(initial_damping: f64, adjustment: f64, max_damping: f64) -> Self {
        Self {
            damping: initial_damping,
            adjustment,
            max_damping,
        }
    }

    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(
            config.lm_initial_lambda,
            config.lm_adjustment,
            config.lm_max_lambda,
        )
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }
}

impl EpochOptimizer for LevenbergMarquardt {
    fn name(&self) -> &'static str {
        "levenberg-marquardt"
    }

    fn run_epoch(
        &mut self,
        network: &mut Network,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
    ) -> FitResult<EpochStats> {
        let (jacobian, errors) = jacobian_and_errors(network, inputs, targets);
        let sse_before = errors.dot(&errors);
        if !sse_before.is_finite() {
            return Err(FitError::NumericalFailure(String::from(
                "network output is not finite",
            )));
        }

        let hessian = jacobian.t().dot(&jacobian);
        let gradient = jacobian.t().dot(&errors);
        let original = network.parameters();
        let mut rejected_steps = 0;

        loop {
            let mut damped = hessian.clone();
            damped.diag_mut().mapv_inplace(|h| h + self.damping);

            if let Some(step) = cholesky_solve(&damped, &gradient) {
                network.set_parameters((&original + &step).view());
                let sse_after = sum_squared_error(network, inputs, targets);
                if sse_after < sse_before {
                    self.damping = (self.damping / self.adjustment).max(f64::MIN_POSITIVE);
                    return Ok(EpochStats {
                        sse_before,
                        sse_after,
                        damping: self.damping,
                        rejected_steps,
                        accepted: true,
                    });
                }
            }

            rejected_steps += 1;
            self.damping *= self.adjustment;
            if self.damping > self.max_damping {
                self.damping = self.max_damping;
                network.set_parameters(original.view());
                tracing::debug!(rejected_steps, "no improving step found; parameters unchanged");
                return Ok(EpochStats {
                    sse_before,
                    sse_after: sse_before,
                    damping: self.damping,
                    rejected_steps,
                    accepted: false,
                });
            }
        }
    }
}

/// Rows are `(sample, output)` pairs; errors are `target - output`.
fn jacobian_and_errors(
    network: &Network,
    inputs: &Array2<f64>,
    targets: &Array2<f64>,
) -> (Array2<f64>, Array1<f64>) {
    let outputs = targets.ncols();
    let rows = inputs.nrows() * outputs;
    let mut jacobian = Array2::zeros((rows, network.parameter_count()));
    let mut errors = Array1::zeros(rows);

    for (sample, (input, target)) in inputs.rows().into_iter().zip(targets.rows()).enumerate() {
        let activations = network.forward(input);
        let Some(output) = activations.last() else {
            continue;
        };
        for k in 0..outputs {
            let row = sample * outputs + k;
            errors[row] = target[k] - output[k];
            network.output_gradient(&activations, k, jacobian.row_mut(row));
        }
    }
    (jacobian, errors)
}

/// Solves `a x = b` for symmetric positive definite `a`.
///
/// Returns `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[[i, j]];
            for k in 0..j {
                sum -= l[[i, k]] * l[[j, k]];
            }
            if i == j {
                if !(sum > 0.0) {
                    return None;
                }
                l[[i, i]] = sum.sqrt();
            } else {
                l[[i, j]] = sum / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b.
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= l[[i, k]] * z[k];
        }
        z[i] = sum / l[[i, i]];
    }

    // Back substitution: Lᵀ x = z.
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in (i + 1)..n {
            sum -= l[[k, i]] * x[k];
        }
        x[i] = sum / l[[i, i]];
    }

    x.iter().all(|v| v.is_finite()).then_some(x)
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::network::BipolarSigmoid;

    fn toy_problem() -> (Network, Array2<f64>, Array2<f64>) {
        let mut network = Network::new(2, &[4], 1, BipolarSigmoid::new(2.0));
        network.randomize(&mut StdRng::seed_from_u64(5));
        let inputs = array![[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0], [0.5, 0.5]];
        let targets = array![[-0.5], [0.5], [0.5], [-0.5], [0.0]];
        (network, inputs, targets)
    }

    #[test]
    fn cholesky_solves_small_spd_system() {
        let a = array![[4.0, 2.0], [2.0, 3.0]];
        let b = array![2.0, 1.0];
        let x = cholesky_solve(&a, &b).expect("positive definite");

        let residual = a.dot(&x) - &b;
        assert!(residual.iter().all(|r| r.abs() < 1e-12));
    }

    #[test]
    fn cholesky_rejects_indefinite_matrix() {
        let a = array![[1.0, 2.0], [2.0, 1.0]];
        assert!(cholesky_solve(&a, &array![1.0, 1.0]).is_none());
    }

    #[test]
    fn epochs_never_increase_squared_error() {
        let (mut network, inputs, targets) = toy_problem();
        let mut optimizer = LevenbergMarquardt::new(0.1, 10.0, 1e25);

        let initial = sum_squared_error(&network, &inputs, &targets);
        let mut previous = initial;
        for _ in 0..25 {
            let stats = optimizer
                .run_epoch(&mut network, &inputs, &targets)
                .expect("finite");
            let current = sum_squared_error(&network, &inputs, &targets);

            assert!(current <= previous + 1e-12, "{current} > {previous}");
            assert!((stats.sse_after - current).abs() < 1e-9);
            previous = current;
        }
        assert!(previous < initial, "no progress: {previous} vs {initial}");
    }

    #[test]
    fn exhausted_damping_restores_parameters() {
        let (mut network, inputs, targets) = toy_problem();
        let before = network.parameters();
        let mut optimizer = LevenbergMarquardt::new(1e24, 10.0, 1e25);

        let stats = optimizer
            .run_epoch(&mut network, &inputs, &targets)
            .expect("finite");

        assert!(!stats.accepted);
        assert_eq!(stats.rejected_steps, 2);
        assert_eq!(stats.damping, 1e25);
        assert_eq!(stats.sse_after, stats.sse_before);
        assert_eq!(optimizer.damping(), 1e25);
        assert_eq!(network.parameters(), before);
    }

    #[test]
    fn identical_starts_give_identical_epochs() {
        let (mut a, inputs, targets) = toy_problem();
        let (mut b, _, _) = toy_problem();
        let mut opt_a = LevenbergMarquardt::new(0.1, 10.0, 1e25);
        let mut opt_b = LevenbergMarquardt::new(0.1, 10.0, 1e25);

        for _ in 0..5 {
            let sa = opt_a.run_epoch(&mut a, &inputs, &targets).expect("finite");
            let sb = opt_b.run_epoch(&mut b, &inputs, &targets).expect("finite");
            assert_eq!(sa, sb);
        }
        assert_eq!(a, b);
    }
}

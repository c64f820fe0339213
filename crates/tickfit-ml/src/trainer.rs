//! The epoch loop.
//!
//! ```text
//! Idle -> Training -> Evaluating -> Continue -> Training ...
//!                                \-> Converged -> Idle
//! ```
//!
//! One iteration is exactly one optimizer epoch over all samples followed by
//! an evaluation pass. The loop ends when the [`ConvergenceMonitor`] reports
//! convergence, when `max_iterations` is reached, or when the cancellation
//! token is tripped between iterations.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::cancel::CancellationToken;
use crate::config::TrainingConfig;
use crate::convergence::{ConvergenceMonitor, Decision};
use crate::error::{FitError, FitResult};
use crate::evaluation::evaluate;
use crate::network::{BipolarSigmoid, Network};
use crate::optimizer::{EpochOptimizer, LevenbergMarquardt};
use crate::pipeline::PreparedDataset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainerPhase {
    Idle,
    Training,
    Evaluating,
}

/// Scores reported after one iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochResult {
    pub iteration: u64,
    pub learning_error: f64,
    pub prediction_error: f64,
    pub ema: f64,
    pub predicted: Vec<f64>,
    pub actual: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Converged,
    IterationLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub stop_reason: StopReason,
    pub iterations: u64,
    pub epochs: Vec<EpochResult>,
}

impl TrainingReport {
    pub fn last_epoch(&self) -> Option<&EpochResult> {
        self.epochs.last()
    }
}

pub struct Trainer {
    dataset: PreparedDataset,
    network: Network,
    optimizer: Box<dyn EpochOptimizer>,
    monitor: ConvergenceMonitor,
    max_iterations: u64,
    iteration: u64,
    phase: TrainerPhase,
}

impl Trainer {
    /// Builds a `window -> hidden -> prediction` network seeded from
    /// `config.seed` and a Levenberg–Marquardt optimizer.
    pub fn new(config: &TrainingConfig, dataset: PreparedDataset) -> FitResult<Self> {
        config.validate()?;
        if dataset.window_size != config.window_size
            || dataset.prediction_size != config.prediction_size
        {
            return Err(FitError::InvalidConfig(format!(
                "dataset was prepared for window {} / prediction {}, config asks for {} / {}",
                dataset.window_size,
                dataset.prediction_size,
                config.window_size,
                config.prediction_size
            )));
        }

        let mut network = Network::new(
            config.window_size,
            &[config.hidden_size()],
            config.prediction_size,
            BipolarSigmoid::new(config.activation_alpha),
        );
        network.randomize(&mut StdRng::seed_from_u64(config.seed));

        Ok(Self {
            dataset,
            network,
            optimizer: Box::new(LevenbergMarquardt::from_config(config)),
            monitor: ConvergenceMonitor::from_config(config),
            max_iterations: config.max_iterations,
            iteration: 0,
            phase: TrainerPhase::Idle,
        })
    }

    pub fn with_optimizer(mut self, optimizer: Box<dyn EpochOptimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn phase(&self) -> TrainerPhase {
        self.phase
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn dataset(&self) -> &PreparedDataset {
        &self.dataset
    }

    /// Iterations completed so far.
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Runs one epoch, evaluates, and feeds the monitor.
    pub fn step(&mut self) -> FitResult<(EpochResult, Decision)> {
        let iteration = self.iteration + 1;

        self.phase = TrainerPhase::Training;
        let stats = self.optimizer.run_epoch(
            &mut self.network,
            &self.dataset.inputs,
            &self.dataset.targets,
        )?;
        tracing::debug!(
            iteration,
            optimizer = self.optimizer.name(),
            sse = stats.sse_after,
            damping = stats.damping,
            rejected = stats.rejected_steps,
            "epoch finished"
        );

        self.phase = TrainerPhase::Evaluating;
        let evaluation = evaluate(&self.network, &self.dataset)?;
        let decision = self.monitor.observe(evaluation.prediction_error);
        self.iteration = iteration;

        let epoch = EpochResult {
            iteration,
            learning_error: evaluation.learning_error,
            prediction_error: evaluation.prediction_error,
            ema: self.monitor.ema(),
            predicted: evaluation.predicted,
            actual: evaluation.actual,
        };
        Ok((epoch, decision))
    }

    /// Trains until convergence, the iteration limit, or cancellation.
    ///
    /// `on_epoch` sees every iteration as it completes.
    pub fn run<F>(&mut self, cancel: &CancellationToken, on_epoch: F) -> FitResult<TrainingReport>
    where
        F: FnMut(&EpochResult),
    {
        tracing::info!(
            samples = self.dataset.sample_count(),
            parameters = self.network.parameter_count(),
            optimizer = self.optimizer.name(),
            max_iterations = self.max_iterations,
            "training started"
        );
        let outcome = self.run_loop(cancel, on_epoch);
        self.phase = TrainerPhase::Idle;

        match &outcome {
            Ok(report) => tracing::info!(
                iterations = report.iterations,
                stop_reason = ?report.stop_reason,
                "training finished"
            ),
            Err(err) => tracing::warn!(error = %err, "training aborted"),
        }
        outcome
    }

    fn run_loop<F>(&mut self, cancel: &CancellationToken, mut on_epoch: F) -> FitResult<TrainingReport>
    where
        F: FnMut(&EpochResult),
    {
        let mut epochs = Vec::new();
        loop {
            if cancel.is_cancelled() {
                return Err(FitError::Cancelled {
                    iteration: self.iteration + 1,
                });
            }
            if self.iteration >= self.max_iterations {
                return Ok(self.report(StopReason::IterationLimit, epochs));
            }

            let (epoch, decision) = self.step()?;
            on_epoch(&epoch);
            epochs.push(epoch);

            if decision == Decision::Converged {
                return Ok(self.report(StopReason::Converged, epochs));
            }
        }
    }

    fn report(&self, stop_reason: StopReason, epochs: Vec<EpochResult>) -> TrainingReport {
        TrainingReport {
            stop_reason,
            iterations: self.iteration,
            epochs,
        }
    }
}

#[cfg(test)]
mod tests {
    use tickfit_core::SyntheticSource;

    use super::*;
    use crate::pipeline::prepare;

    fn small_config() -> TrainingConfig {
        TrainingConfig {
            window_size: 4,
            prediction_size: 1,
            hidden_size: Some(6),
            batch_size: 3,
            max_iterations: 40,
            seed: 9,
            ..TrainingConfig::default()
        }
    }

    fn trainer(config: &TrainingConfig) -> Trainer {
        let prices = SyntheticSource::new(90, 7).expect("period").generate();
        let dataset = prepare(&prices, config).expect("prepared");
        Trainer::new(config, dataset).expect("valid config")
    }

    #[test]
    fn runs_at_least_warm_up_plus_one_iteration() {
        let config = small_config();
        let mut trainer = trainer(&config);
        let mut seen = Vec::new();

        let report = trainer
            .run(&CancellationToken::new(), |epoch| seen.push(epoch.iteration))
            .expect("trained");

        assert!(report.iterations > config.batch_size as u64);
        assert!(report.iterations <= config.max_iterations);
        assert_eq!(report.epochs.len() as u64, report.iterations);
        assert_eq!(seen, (1..=report.iterations).collect::<Vec<_>>());
        assert_eq!(trainer.phase(), TrainerPhase::Idle);
    }

    #[test]
    fn iteration_limit_stops_the_loop() {
        let config = TrainingConfig {
            max_iterations: 2,
            ..small_config()
        };
        let report = trainer(&config)
            .run(&CancellationToken::new(), |_| {})
            .expect("trained");

        assert_eq!(report.stop_reason, StopReason::IterationLimit);
        assert_eq!(report.iterations, 2);
    }

    #[test]
    fn same_seed_gives_identical_reports() {
        let config = small_config();
        let a = trainer(&config)
            .run(&CancellationToken::new(), |_| {})
            .expect("trained");
        let b = trainer(&config)
            .run(&CancellationToken::new(), |_| {})
            .expect("trained");
        assert_eq!(a, b);
    }

    #[test]
    fn cancelled_before_first_epoch() {
        let config = small_config();
        let mut trainer = trainer(&config);
        let token = CancellationToken::new();
        token.cancel();

        let err = trainer.run(&token, |_| {}).expect_err("cancelled");
        assert!(matches!(err, FitError::Cancelled { iteration: 1 }));
        assert_eq!(trainer.iteration(), 0);
    }

    #[test]
    fn cancellation_lets_the_current_epoch_finish() {
        let config = small_config();
        let mut trainer = trainer(&config);
        let token = CancellationToken::new();
        let trip = token.clone();

        let err = trainer
            .run(&token, |epoch| {
                if epoch.iteration == 2 {
                    trip.cancel();
                }
            })
            .expect_err("cancelled");

        assert!(matches!(err, FitError::Cancelled { iteration: 3 }));
        assert_eq!(trainer.iteration(), 2);
    }

    #[test]
    fn step_updates_phase_and_counter() {
        let config = small_config();
        let mut trainer = trainer(&config);
        assert_eq!(trainer.phase(), TrainerPhase::Idle);

        let (epoch, _) = trainer.step().expect("epoch");
        assert_eq!(epoch.iteration, 1);
        assert_eq!(trainer.iteration(), 1);
        assert_eq!(trainer.phase(), TrainerPhase::Evaluating);
        assert_eq!(epoch.predicted.len(), 1);
    }

    #[test]
    fn mismatched_dataset_is_rejected() {
        let config = small_config();
        let prices = SyntheticSource::new(90, 7).expect("period").generate();
        let dataset = prepare(&prices, &config).expect("prepared");
        let other = TrainingConfig {
            window_size: 5,
            ..config
        };

        assert!(matches!(
            Trainer::new(&other, dataset),
            Err(FitError::InvalidConfig(_))
        ));
    }
}

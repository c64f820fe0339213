//! # Tickfit ML
//!
//! Turns a price series into overlapping return windows and trains a
//! feed-forward network on them until the held-out prediction error stops
//! improving.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Training hyperparameters (TOML loadable) |
//! | [`returns`] | Price to relative-return transform |
//! | [`normalizer`] | Fit-once normalization |
//! | [`window`] | Sliding-window samples |
//! | [`pipeline`] | Prices to training matrices |
//! | [`network`] | Bipolar sigmoid activation network |
//! | [`optimizer`] | Epoch optimizers (Levenberg–Marquardt) |
//! | [`evaluation`] | Learning and prediction error |
//! | [`convergence`] | EMA stopping rule |
//! | [`trainer`] | The epoch loop |
//! | [`report`] | Progress lines |
//! | [`cancel`] | Cooperative cancellation |
//!
//! ## Example
//!
//! ```no_run
//! use tickfit_core::SyntheticSource;
//! use tickfit_ml::{prepare, report, CancellationToken, Trainer, TrainingConfig};
//!
//! let config = TrainingConfig::default();
//! let prices = SyntheticSource::default().generate();
//! let dataset = prepare(&prices, &config)?;
//! let mut trainer = Trainer::new(&config, dataset)?;
//! let report = trainer.run(&CancellationToken::new(), |epoch| {
//!     println!("{}", report::progress_line(epoch));
//! })?;
//! println!("{:?} after {} iterations", report.stop_reason, report.iterations);
//! # Ok::<(), tickfit_ml::FitError>(())
//! ```

pub mod cancel;
pub mod config;
pub mod convergence;
pub mod error;
pub mod evaluation;
pub mod network;
pub mod normalizer;
pub mod optimizer;
pub mod pipeline;
pub mod report;
pub mod returns;
pub mod trainer;
pub mod window;

pub use cancel::CancellationToken;
pub use config::{NormalizationMethod, TrainingConfig};
pub use convergence::{ConvergenceMonitor, Decision};
pub use error::{DataUnit, FitError, FitErrorKind, FitResult};
pub use evaluation::{evaluate, percentage_error, Evaluation};
pub use network::{BipolarSigmoid, DenseLayer, Network};
pub use normalizer::{NormalizationState, Normalizer};
pub use optimizer::{sum_squared_error, EpochOptimizer, EpochStats, LevenbergMarquardt};
pub use pipeline::{fetch_prices, prepare, PreparedDataset};
pub use returns::{to_returns, ReturnSeries};
pub use trainer::{EpochResult, StopReason, Trainer, TrainerPhase, TrainingReport};
pub use window::{build_samples, min_len, sample_count, to_matrices, Sample};

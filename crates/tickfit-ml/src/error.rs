use std::fmt;

use thiserror::Error;

use tickfit_core::SourceError;

/// Coarse classification of a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitErrorKind {
    InsufficientData,
    DivideByZero,
    NormalizationNotFitted,
    AlreadyFitted,
    SourceUnavailable,
    InvalidConfig,
    NumericalFailure,
    Cancelled,
}

/// What an [`FitError::InsufficientData`] count refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataUnit {
    Prices,
    Returns,
}

impl fmt::Display for DataUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prices => f.write_str("prices"),
            Self::Returns => f.write_str("returns"),
        }
    }
}

/// Errors raised while preparing data or training. Every variant aborts the run.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("insufficient data: need at least {needed} {unit}, got {available}")]
    InsufficientData {
        needed: usize,
        available: usize,
        unit: DataUnit,
    },

    #[error("price at index {index} is zero; cannot compute return")]
    DivideByZero { index: usize },

    #[error("normalizer used before fit")]
    NormalizationNotFitted,

    #[error("normalizer is already fitted; create a new one to refit")]
    AlreadyFitted,

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("numerical failure: {0}")]
    NumericalFailure(String),

    #[error("training cancelled before iteration {iteration}")]
    Cancelled { iteration: u64 },
}

impl FitError {
    pub const fn kind(&self) -> FitErrorKind {
        match self {
            Self::InsufficientData { .. } => FitErrorKind::InsufficientData,
            Self::DivideByZero { .. } => FitErrorKind::DivideByZero,
            Self::NormalizationNotFitted => FitErrorKind::NormalizationNotFitted,
            Self::AlreadyFitted => FitErrorKind::AlreadyFitted,
            Self::Source(_) => FitErrorKind::SourceUnavailable,
            Self::InvalidConfig(_) => FitErrorKind::InvalidConfig,
            Self::NumericalFailure(_) => FitErrorKind::NumericalFailure,
            Self::Cancelled { .. } => FitErrorKind::Cancelled,
        }
    }
}

pub type FitResult<T> = Result<T, FitError>;

use thiserror::Error;

use tickfit_ml::{FitError, FitErrorKind};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickfit_core::ValidationError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Source(#[from] tickfit_core::SourceError),

    #[error(transparent)]
    Fit(#[from] FitError),

    #[error("training task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Source(_) => 3,
            Self::Fit(error) => match error.kind() {
                FitErrorKind::InvalidConfig => 2,
                FitErrorKind::SourceUnavailable => 3,
                FitErrorKind::Cancelled => 130,
                _ => 4,
            },
            Self::Task(_) => 4,
            Self::Serialization(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use tickfit_core::{SourceError, ValidationError};

    use super::*;

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(CliError::from(ValidationError::EmptyStream).exit_code(), 2);
        assert_eq!(CliError::from(SourceError::unavailable("down")).exit_code(), 3);
        assert_eq!(
            CliError::from(FitError::from(SourceError::unavailable("down"))).exit_code(),
            3
        );
        assert_eq!(
            CliError::from(FitError::InvalidConfig(String::from("x"))).exit_code(),
            2
        );
        assert_eq!(
            CliError::from(FitError::DivideByZero { index: 3 }).exit_code(),
            4
        );
        assert_eq!(
            CliError::from(FitError::Cancelled { iteration: 1 }).exit_code(),
            130
        );
        assert_eq!(
            CliError::from(std::io::Error::other("closed")).exit_code(),
            10
        );
    }
}

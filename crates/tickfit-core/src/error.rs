use thiserror::Error;

/// Validation and contract errors exposed by `tickfit-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("price at index {index} must be finite, got {value}")]
    NonFinitePrice { index: usize, value: f64 },
    #[error("price at index {index} must be non-negative, got {value}")]
    NegativePrice { index: usize, value: f64 },

    #[error("stream name cannot be empty")]
    EmptyStream,
    #[error("event type cannot be empty")]
    EmptyEventType,
    #[error("batch limit {limit} must be within 1..={max}")]
    InvalidLimit { limit: usize, max: usize },

    #[error("synthetic period must be greater than zero")]
    ZeroPeriod,
}

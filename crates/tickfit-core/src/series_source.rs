//! Series source trait and request/error types.
//!
//! A series source is the only collaborator the training pipeline needs from
//! the outside world: it hands back a chronological [`PriceSeries`] for a
//! request, or a structured [`SourceError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use tickfit_core::{SeriesRequest, SeriesSource, SyntheticSource};
//!
//! async fn load() -> Result<(), tickfit_core::SourceError> {
//!     let source = SyntheticSource::default();
//!     let series = source.fetch_series(SeriesRequest::default()).await?;
//!     println!("{} prices", series.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{PriceSeries, TickEvent, ValidationError};

/// Largest batch the event log returns for one backward read.
pub const MAX_BATCH_SIZE: usize = 4096;

/// Identifies which adapter produced a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Synthetic,
    EventStore,
    File,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Synthetic => "synthetic",
            Self::EventStore => "event_store",
            Self::File => "file",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    InvalidRequest,
    InvalidResponse,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

impl From<ValidationError> for SourceError {
    fn from(error: ValidationError) -> Self {
        Self::invalid_response(error.to_string())
    }
}

/// Request payload for a series fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub stream: String,
    pub event_type: String,
    pub limit: usize,
}

impl SeriesRequest {
    pub fn new(
        stream: impl Into<String>,
        event_type: impl Into<String>,
        limit: usize,
    ) -> Result<Self, ValidationError> {
        let stream = stream.into();
        let event_type = event_type.into();
        if stream.trim().is_empty() {
            return Err(ValidationError::EmptyStream);
        }
        if event_type.trim().is_empty() {
            return Err(ValidationError::EmptyEventType);
        }
        if limit == 0 || limit > MAX_BATCH_SIZE {
            return Err(ValidationError::InvalidLimit {
                limit,
                max: MAX_BATCH_SIZE,
            });
        }
        Ok(Self {
            stream,
            event_type,
            limit,
        })
    }
}

impl Default for SeriesRequest {
    fn default() -> Self {
        Self {
            stream: String::from("BotCoin-001001"),
            event_type: String::from(TickEvent::EVENT_TYPE),
            limit: MAX_BATCH_SIZE,
        }
    }
}

/// Source adapter contract.
///
/// Implementations return prices oldest first. They must not substitute
/// defaults for malformed observations; a bad record fails the fetch.
pub trait SeriesSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fetches the series described by `req`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the upstream cannot be reached, the request
    /// is not satisfiable, or a record cannot be decoded.
    fn fetch_series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>>;
}

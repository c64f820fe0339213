//! # Tickfit Core
//!
//! Price series contracts and source adapters for the tickfit trainer.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Series sources (synthetic, Event Store, price file) |
//! | [`domain`] | Domain models (PriceSeries, TickEvent) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`retry`] | Retry policy for upstream reads |
//! | [`series_source`] | Series source trait and request/error types |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │ SeriesSource    │────▶│ HTTP Client      │
//! │ (Adapter Trait) │     │ (reqwest/script) │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ PriceSeries     │──▶ tickfit-ml pipeline
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod retry;
pub mod series_source;

pub use adapters::{EventStoreSource, FileSource, SyntheticSource};

pub use domain::{PriceSeries, SeriesSummary, TickEvent};

pub use error::ValidationError;

pub use http_client::{
    BasicCredentials, HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse,
    ReqwestHttpClient, ScriptedHttpClient,
};

pub use retry::{Backoff, RetryConfig};

pub use series_source::{
    SeriesRequest, SeriesSource, SourceError, SourceErrorKind, SourceId, MAX_BATCH_SIZE,
};

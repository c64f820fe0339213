//! # Domain Models
//!
//! Canonical value types shared by the sources and the training pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceSeries`] | Chronological, validated price observations |
//! | [`TickEvent`] | Tick payload as stored in the event log |
//! | [`SeriesSummary`] | Descriptive statistics of a fetched series |

mod series;
mod tick;

pub use series::{PriceSeries, SeriesSummary};
pub use tick::TickEvent;

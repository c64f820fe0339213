use std::future::Future;
use std::pin::Pin;

use crate::series_source::{SeriesRequest, SeriesSource, SourceError, SourceId};
use crate::{PriceSeries, ValidationError};

/// Deterministic sawtooth series `1, 2, ..., period, 1, 2, ...`.
///
/// The request's stream, event type and limit are ignored; the generator
/// always yields `len` points so offline runs reproduce exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticSource {
    len: usize,
    period: usize,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            len: 6000,
            period: 46,
        }
    }
}

impl SyntheticSource {
    pub fn new(len: usize, period: usize) -> Result<Self, ValidationError> {
        if period == 0 {
            return Err(ValidationError::ZeroPeriod);
        }
        Ok(Self { len, period })
    }

    pub fn generate(&self) -> PriceSeries {
        let prices = (0..self.len)
            .map(|index| (index % self.period + 1) as f64)
            .collect();
        PriceSeries::from_positive_integers(prices)
    }
}

impl SeriesSource for SyntheticSource {
    fn id(&self) -> SourceId {
        SourceId::Synthetic
    }

    fn fetch_series<'a>(
        &'a self,
        _req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move { Ok(self.generate()) })
    }
}

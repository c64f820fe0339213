use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::series_source::{SeriesRequest, SeriesSource, SourceError, SourceId};
use crate::{PriceSeries, TickEvent};

const ATOM_JSON: &str = "application/vnd.eventstore.atom+json";

/// Reads tick prices from an Event Store stream over its HTTP API.
///
/// The stream is read backwards from its head, filtered to the requested
/// event type and reversed into chronological order.
#[derive(Clone)]
pub struct EventStoreSource {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl Default for EventStoreSource {
    fn default() -> Self {
        let auth = match std::env::var("TICKFIT_EVENTSTORE_USER") {
            Ok(user) => HttpAuth::basic(user, std::env::var("TICKFIT_EVENTSTORE_PASSWORD").ok()),
            Err(_) => HttpAuth::None,
        };
        Self {
            base_url: String::from("http://127.0.0.1:2113"),
            http_client: Arc::new(ReqwestHttpClient::default()),
            auth,
            retry: RetryConfig::default(),
            timeout_ms: 60_000,
        }
    }
}

impl EventStoreSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            ..Self::default()
        }
    }

    pub fn with_http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = http_client;
        self
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn backward_url(&self, req: &SeriesRequest) -> String {
        format!(
            "{}/streams/{}/head/backward/{}?embed=body",
            self.base_url,
            urlencoding::encode(&req.stream),
            req.limit
        )
    }

    async fn read_page(&self, url: &str) -> Result<String, SourceError> {
        let mut retry = 0;
        loop {
            let request = HttpRequest::get(url)
                .with_header("accept", ATOM_JSON)
                .with_auth(&self.auth)
                .with_timeout_ms(self.timeout_ms);

            let (message, retryable) = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) if response.status == 404 => {
                    return Err(SourceError::invalid_request(format!(
                        "event store stream not found at {url}"
                    )));
                }
                Ok(response) => (
                    format!("event store returned status {}", response.status),
                    self.retry.should_retry_status(response.status),
                ),
                Err(error) => (
                    format!("event store transport error: {}", error.message()),
                    self.retry.should_retry_transport(&error),
                ),
            };

            retry += 1;
            if !retryable || !self.retry.allows_retry(retry) {
                return Err(SourceError::unavailable(message));
            }

            let delay = self.retry.delay_for_attempt(retry - 1);
            tracing::warn!(%message, retry, delay_ms = delay.as_millis() as u64, "retrying event store read");
            tokio::time::sleep(delay).await;
        }
    }
}

/// Decodes a backward Atom page into chronological prices of `event_type`.
pub fn parse_backward_feed(body: &str, event_type: &str) -> Result<PriceSeries, SourceError> {
    let feed: AtomFeed = serde_json::from_str(body)
        .map_err(|e| SourceError::invalid_response(format!("failed to parse atom feed: {e}")))?;

    let mut prices = feed
        .entries
        .iter()
        .filter(|entry| entry.event_type == event_type)
        .map(decode_tick)
        .collect::<Result<Vec<_>, _>>()?;
    prices.reverse();

    Ok(PriceSeries::new(prices)?)
}

fn decode_tick(entry: &AtomEntry) -> Result<f64, SourceError> {
    let describe = || {
        entry
            .event_number
            .map(|number| format!("event #{number}"))
            .unwrap_or_else(|| String::from("event"))
    };

    let tick: TickEvent = match &entry.data {
        Some(Value::String(raw)) => serde_json::from_str(raw),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()),
        _ => {
            return Err(SourceError::invalid_response(format!(
                "{} has no embedded JSON body",
                describe()
            )))
        }
    }
    .map_err(|e| SourceError::invalid_response(format!("{}: {e}", describe())))?;

    Ok(tick.last_price)
}

impl SeriesSource for EventStoreSource {
    fn id(&self) -> SourceId {
        SourceId::EventStore
    }

    fn fetch_series<'a>(
        &'a self,
        req: SeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let url = self.backward_url(&req);
            tracing::info!(stream = %req.stream, limit = req.limit, "reading event store stream");

            let body = self.read_page(&url).await?;
            let series = parse_backward_feed(&body, &req.event_type)?;

            tracing::info!(events = series.len(), event_type = %req.event_type, "decoded tick events");
            Ok(series)
        })
    }
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtomEntry {
    event_type: String,
    #[serde(default)]
    event_number: Option<u64>,
    #[serde(default)]
    data: Option<Value>,
}

use serde::{Deserialize, Serialize};

/// Tick payload written to the event log by the market feed.
///
/// Only `last_price` is consumed by training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickEvent {
    pub last_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ask: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl TickEvent {
    /// Event type name under which ticks are appended to the stream.
    pub const EVENT_TYPE: &'static str = "TickEvent";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_payload() {
        let tick: TickEvent = serde_json::from_str(r#"{"last_price": 6421.5}"#).expect("valid");
        assert_eq!(tick.last_price, 6421.5);
        assert_eq!(tick.bid, None);
    }

    #[test]
    fn missing_last_price_is_an_error() {
        let parsed: Result<TickEvent, _> = serde_json::from_str(r#"{"bid": 1.0}"#);
        assert!(parsed.is_err());
    }
}

//! Alert record model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Directional classification derived from a subject marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeType {
    Call,
    Put,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Call => "CALL",
            TradeType::Put => "PUT",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CALL" => Ok(TradeType::Call),
            "PUT" => Ok(TradeType::Put),
            other => Err(format!("unknown trade type: {other}")),
        }
    }
}

/// One active alert, keyed by ticker symbol.
///
/// The store evicts the record once `expiration_time` has passed, so a
/// second alert for the same ticker is only accepted after the window ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlertRecord {
    pub ticker_symbol: String,
    pub trade_type: TradeType,
    /// Epoch seconds.
    pub added_timestamp: i64,
    /// Epoch seconds; TTL attribute.
    pub expiration_time: i64,
}

impl AlertRecord {
    pub fn new(
        ticker_symbol: impl Into<String>,
        trade_type: TradeType,
        added_timestamp: i64,
        ttl_secs: i64,
    ) -> Self {
        Self {
            ticker_symbol: ticker_symbol.into(),
            trade_type,
            added_timestamp,
            expiration_time: added_timestamp.saturating_add(ttl_secs),
        }
    }

    /// Whether the record is past its TTL at `now` (epoch seconds).
    pub fn is_expired(&self, now: i64) -> bool {
        self.expiration_time <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_is_added_plus_ttl() {
        let rec = AlertRecord::new("AAPL", TradeType::Call, 1_700_000_000, 7200);
        assert_eq!(rec.expiration_time, 1_700_007_200);
        assert!(!rec.is_expired(1_700_007_199));
        assert!(rec.is_expired(1_700_007_200));
    }

    #[test]
    fn huge_ttl_saturates_instead_of_wrapping() {
        let rec = AlertRecord::new("X", TradeType::Call, 1_760_000_000, i64::MAX);
        assert_eq!(rec.expiration_time, i64::MAX);
        assert!(!rec.is_expired(1_760_000_000));
    }

    #[test]
    fn trade_type_round_trips_through_str() {
        assert_eq!("CALL".parse::<TradeType>().unwrap(), TradeType::Call);
        assert_eq!("PUT".parse::<TradeType>().unwrap(), TradeType::Put);
        assert!("call".parse::<TradeType>().is_err());
        assert_eq!(TradeType::Put.to_string(), "PUT");
    }

    #[test]
    fn serializes_with_store_attribute_names() {
        let rec = AlertRecord::new("BRK.B", TradeType::Put, 10, 5);
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["TickerSymbol"], "BRK.B");
        assert_eq!(json["TradeType"], "PUT");
        assert_eq!(json["AddedTimestamp"], 10);
        assert_eq!(json["ExpirationTime"], 15);
    }
}

//! Subject-line parsing: trade-type markers and dotted ticker tokens.

use std::sync::LazyLock;

use regex::Regex;

use super::model::TradeType;

/// A dot followed by uppercase letters, digits, or further dots.
static TICKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[A-Z0-9.]+").expect("ticker regex is valid"));

/// Result of parsing an alert subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSubject {
    pub trade_type: TradeType,
    pub tickers: Vec<String>,
}

/// Classify a subject by marker and extract its tickers.
///
/// Returns `None` when neither marker is present. The call marker is
/// checked first.
pub fn parse_subject(subject: &str, call_marker: &str, put_marker: &str) -> Option<ParsedSubject> {
    let trade_type = if subject.contains(call_marker) {
        TradeType::Call
    } else if subject.contains(put_marker) {
        TradeType::Put
    } else {
        return None;
    };

    Some(ParsedSubject {
        trade_type,
        tickers: extract_tickers(subject),
    })
}

/// Every `.TICKER` token in order of appearance, leading dots stripped.
///
/// Tokens that are nothing but dots are dropped.
pub fn extract_tickers(subject: &str) -> Vec<String> {
    TICKER_RE
        .find_iter(subject)
        .filter_map(|m| {
            let symbol = m.as_str().trim_start_matches('.');
            if symbol.is_empty() {
                tracing::warn!(token = m.as_str(), "Ignoring empty ticker token");
                None
            } else {
                Some(symbol.to_string())
            }
        })
        .collect()
}

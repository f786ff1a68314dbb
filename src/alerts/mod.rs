//! Trading alerts: record model and subject-line parsing.

pub mod model;
pub mod parse;

pub use model::{AlertRecord, TradeType};
pub use parse::{ParsedSubject, extract_tickers, parse_subject};

/// Subject marker for weekly call alerts.
pub const CALL_MARKER: &str = "2+ATR_40+Delta_Weekly_Calls";

/// Subject marker for weekly put alerts.
pub const PUT_MARKER: &str = "2+ATR_40+Delta_Weekly_Puts";

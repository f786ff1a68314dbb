//! Alert Triage: scheduled mailbox triage for trading-alert emails.

pub mod alerts;
pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod runtime;
pub mod store;
pub mod triage;

//! Persistence layer: libSQL-backed alert table with TTL eviction.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use traits::AlertStore;

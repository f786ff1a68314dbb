//! Error types for the alert triage job.

/// Top-level error type for an invocation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Credential provider errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token file not found: {0}")]
    TokenFileMissing(String),

    #[error("Invalid token file {path}: {reason}")]
    InvalidTokenFile { path: String, reason: String },

    #[error("No valid access token and no refresh token available")]
    NoRefreshToken,

    #[error("Token refresh failed: {reason}")]
    RefreshFailed { reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Mail service errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Mail API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from mail API: {0}")]
    InvalidResponse(String),

    #[error("Malformed message {id}: {reason}")]
    MalformedMessage { id: String, reason: String },
}

/// Key-value store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// Conditional insert rejected because a live record holds the key.
    #[error("Conditional check failed: {key} already exists")]
    AlreadyExists { key: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

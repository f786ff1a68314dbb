//! Mail-access credentials.
//!
//! The job never runs an interactive consent flow. It reads an
//! authorized-user token file, detects expiry, and renews the access token
//! with the stored refresh token when needed.

pub mod provider;
pub mod token;

pub use provider::FileCredentialProvider;
pub use token::AuthorizedUserToken;

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::AuthError;

/// Supplies a currently valid mail-access token.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Return a usable access token, refreshing it if expired.
    async fn access_token(&self) -> Result<SecretString, AuthError>;
}

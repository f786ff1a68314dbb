//! Token-file credential provider with refresh-token renewal.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::CredentialProvider;
use super::token::AuthorizedUserToken;
use crate::error::AuthError;

/// Renew this long before the recorded expiry.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Successful token endpoint response.
#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Reads an authorized-user token file and refreshes it on demand.
///
/// A renewed token is written back to the file. The write is best effort:
/// read-only deployments still get a working token for the invocation.
pub struct FileCredentialProvider {
    path: PathBuf,
    http: reqwest::Client,
}

impl FileCredentialProvider {
    pub fn new(path: impl Into<PathBuf>, http: reqwest::Client) -> Self {
        Self {
            path: path.into(),
            http,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<AuthorizedUserToken, AuthError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(AuthError::TokenFileMissing(self.path.display().to_string()));
            }
            Err(e) => return Err(AuthError::Io(e)),
        };
        AuthorizedUserToken::from_json(&raw).map_err(|e| AuthError::InvalidTokenFile {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    async fn refresh(&self, token: &mut AuthorizedUserToken) -> Result<(), AuthError> {
        let refresh_token = token
            .refresh_token
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        if let Some(client_id) = token.client_id.as_deref() {
            form.push(("client_id", client_id));
        }
        if let Some(client_secret) = token.client_secret.as_deref() {
            form.push(("client_secret", client_secret));
        }

        let response = self
            .http
            .post(token.token_uri())
            .form(&form)
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed {
                reason: format!("refresh request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let error = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(AuthError::RefreshFailed {
                reason: format!("token endpoint returned {status}: {error}"),
            });
        }

        let body: RefreshResponse = response.json().await.map_err(|e| AuthError::RefreshFailed {
            reason: format!("failed to parse token response: {e}"),
        })?;

        let expires_at = body
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));
        token.apply_refresh(body.access_token, expires_at, body.refresh_token);
        info!(expires_at = ?expires_at, "Access token refreshed");
        Ok(())
    }

    async fn persist(&self, token: &AuthorizedUserToken) {
        let json = match token.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialize refreshed token");
                return;
            }
        };
        // Write to a sibling temp file, then rename over the original.
        let tmp_path = self.path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp_path, json).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &self.path).await,
            Err(e) => Err(e),
        };
        match written {
            Ok(()) => debug!(path = %self.path.display(), "Refreshed token persisted"),
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "Could not persist refreshed token"
            ),
        }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn access_token(&self) -> Result<SecretString, AuthError> {
        let mut token = self.load().await?;

        if token.needs_refresh(Utc::now(), chrono::Duration::seconds(EXPIRY_SKEW_SECS)) {
            self.refresh(&mut token).await?;
            self.persist(&token).await;
        }

        token
            .token
            .map(SecretString::from)
            .ok_or(AuthError::NoRefreshToken)
    }
}

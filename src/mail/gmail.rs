//! Gmail REST API client (users.messages list/get/delete/batchDelete).

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::types::{MailMessage, MessageHeader, MessageListPage};
use super::{MailConnector, MailService};
use crate::error::MailError;

/// Google API error envelope: `{"error": {"code": .., "message": ..}}`.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct RawMessage {
    id: String,
    #[serde(default)]
    payload: Option<RawPayload>,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    headers: Vec<MessageHeader>,
}

/// Gmail API client bound to one mailbox and access token.
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    access_token: SecretString,
}

impl GmailClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            user_id: user_id.into(),
            access_token,
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/gmail/v1/users/{}/messages", self.base_url, self.user_id)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, MailError> {
        let response = request
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&text)
            .map(|b| b.error.message)
            .unwrap_or(text);
        Err(MailError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MailService for GmailClient {
    async fn list_messages(
        &self,
        query: &str,
        max_results: Option<u32>,
        page_token: Option<&str>,
    ) -> Result<MessageListPage, MailError> {
        let mut params: Vec<(&str, String)> = vec![("q", query.to_string())];
        if let Some(max) = max_results {
            params.push(("maxResults", max.to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        let response = self
            .send(self.http.get(self.messages_url()).query(&params))
            .await?;
        response
            .json::<MessageListPage>()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("messages.list: {e}")))
    }

    async fn get_message(&self, id: &str) -> Result<MailMessage, MailError> {
        let url = format!("{}/{id}", self.messages_url());
        let response = self
            .send(self.http.get(url).query(&[("format", "full")]))
            .await?;
        let raw: RawMessage = response
            .json()
            .await
            .map_err(|e| MailError::InvalidResponse(format!("messages.get {id}: {e}")))?;

        let payload = raw.payload.ok_or_else(|| MailError::MalformedMessage {
            id: raw.id.clone(),
            reason: "missing payload".into(),
        })?;
        Ok(MailMessage::new(raw.id, payload.headers))
    }

    async fn delete_message(&self, id: &str) -> Result<(), MailError> {
        let url = format!("{}/{id}", self.messages_url());
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    async fn batch_delete(&self, ids: &[String]) -> Result<(), MailError> {
        let url = format!("{}/batchDelete", self.messages_url());
        self.send(self.http.post(url).json(&serde_json::json!({ "ids": ids })))
            .await?;
        Ok(())
    }
}

/// Creates [`GmailClient`]s sharing one HTTP client.
#[derive(Clone)]
pub struct GmailConnector {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
}

impl GmailConnector {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            user_id: user_id.into(),
        }
    }
}

impl MailConnector for GmailConnector {
    fn connect(&self, access_token: SecretString) -> Arc<dyn MailService> {
        Arc::new(GmailClient::new(
            self.http.clone(),
            self.base_url.clone(),
            self.user_id.clone(),
            access_token,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_url_includes_user() {
        let client = GmailClient::new(
            reqwest::Client::new(),
            "https://gmail.googleapis.com",
            "me",
            SecretString::from("t"),
        );
        assert_eq!(
            client.messages_url(),
            "https://gmail.googleapis.com/gmail/v1/users/me/messages"
        );
    }

    #[test]
    fn api_error_body_parses() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}}"#,
        )
        .unwrap();
        assert_eq!(body.error.message, "Requested entity was not found.");
    }

    #[test]
    fn raw_message_without_payload() {
        let raw: RawMessage = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert!(raw.payload.is_none());
    }
}

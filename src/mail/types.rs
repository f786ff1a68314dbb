//! Mail message types.

use serde::{Deserialize, Serialize};

/// Subject used when a message carries no Subject header.
pub const NO_SUBJECT: &str = "No Subject";

/// A listed message: id only, detail fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl MessageRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            thread_id: None,
        }
    }
}

/// One page of a message search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageListPage {
    /// Absent from the API response when nothing matched.
    #[serde(default)]
    pub messages: Vec<MessageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

/// A fetched message. Only headers are consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub id: String,
    pub headers: Vec<MessageHeader>,
}

impl MailMessage {
    pub fn new(id: impl Into<String>, headers: Vec<MessageHeader>) -> Self {
        Self {
            id: id.into(),
            headers,
        }
    }

    /// First header with the given name, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The Subject header, or [`NO_SUBJECT`].
    pub fn subject(&self) -> &str {
        self.header("Subject").unwrap_or(NO_SUBJECT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(name: &str, value: &str) -> MessageHeader {
        MessageHeader {
            name: name.into(),
            value: value.into(),
        }
    }

    #[test]
    fn subject_found_case_insensitively() {
        let msg = MailMessage::new(
            "m1",
            vec![header("From", "alerts@x.com"), header("subject", "Hi .AAPL")],
        );
        assert_eq!(msg.subject(), "Hi .AAPL");
        assert_eq!(msg.header("FROM"), Some("alerts@x.com"));
    }

    #[test]
    fn missing_subject_defaults() {
        let msg = MailMessage::new("m1", vec![header("From", "a@b.c")]);
        assert_eq!(msg.subject(), NO_SUBJECT);
    }

    #[test]
    fn list_page_without_messages_field() {
        let page: MessageListPage = serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(page.messages.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn list_page_with_next_token() {
        let page: MessageListPage = serde_json::from_str(
            r#"{"messages": [{"id": "a", "threadId": "t"}], "nextPageToken": "p2"}"#,
        )
        .unwrap();
        assert_eq!(page.messages[0].id, "a");
        assert_eq!(page.messages[0].thread_id.as_deref(), Some("t"));
        assert_eq!(page.next_page_token.as_deref(), Some("p2"));
    }
}

//! Authorized-user token file model.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default token endpoint when the file does not name one.
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// On-disk authorized-user credentials.
///
/// Unknown fields are carried through `extra` so a rewritten file keeps
/// everything the issuing tool wrote.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthorizedUserToken {
    /// Current access token.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access token expiry, RFC 3339 (naive timestamps are read as UTC).
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl std::fmt::Debug for AuthorizedUserToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserToken")
            .field("has_token", &self.token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expiry", &self.expiry)
            .finish()
    }
}

impl AuthorizedUserToken {
    /// Parse the JSON contents of a token file.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parsed expiry, if present and readable.
    pub fn expiry_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.as_deref().and_then(parse_expiry)
    }

    /// Whether the access token must be renewed at `now`.
    ///
    /// A token with no recorded expiry never expires; a missing token is
    /// always unusable. `skew` renews slightly before the recorded expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>, skew: chrono::Duration) -> bool {
        if self.token.as_deref().is_none_or(str::is_empty) {
            return true;
        }
        match self.expiry_at() {
            Some(expiry) => now + skew >= expiry,
            None => false,
        }
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(GOOGLE_TOKEN_URI)
    }

    /// Record a renewed access token.
    pub fn apply_refresh(
        &mut self,
        access_token: String,
        expires_at: Option<DateTime<Utc>>,
        rotated_refresh_token: Option<String>,
    ) {
        self.token = Some(access_token);
        self.expiry = expires_at.map(|e| e.to_rfc3339_opts(SecondsFormat::Micros, true));
        if let Some(refresh) = rotated_refresh_token {
            self.refresh_token = Some(refresh);
        }
    }
}

/// Parse an RFC 3339 or naive ISO-8601 timestamp into DateTime<Utc>.
fn parse_expiry(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| chrono::NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"{
        "token": "ya29.old",
        "refresh_token": "1//refresh",
        "token_uri": "https://oauth2.googleapis.com/token",
        "client_id": "client.apps.googleusercontent.com",
        "client_secret": "shh",
        "scopes": ["https://mail.google.com/"],
        "universe_domain": "googleapis.com",
        "account": "",
        "expiry": "2026-03-01T12:00:00.123456Z"
    }"#;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, h, m, 0).unwrap()
    }

    #[test]
    fn parses_authorized_user_file() {
        let token = AuthorizedUserToken::from_json(SAMPLE).unwrap();
        assert_eq!(token.token.as_deref(), Some("ya29.old"));
        assert_eq!(token.scopes, vec!["https://mail.google.com/"]);
        assert_eq!(token.expiry_at().unwrap().timestamp(), at(12, 0).timestamp());
        assert_eq!(token.extra["universe_domain"], "googleapis.com");
    }

    #[test]
    fn naive_expiry_read_as_utc() {
        let token = AuthorizedUserToken::from_json(
            r#"{"token": "t", "expiry": "2026-03-01T12:00:00"}"#,
        )
        .unwrap();
        assert_eq!(token.expiry_at(), Some(at(12, 0)));
    }

    #[test]
    fn refresh_needed_near_expiry() {
        let token = AuthorizedUserToken::from_json(SAMPLE).unwrap();
        let skew = chrono::Duration::seconds(60);
        assert!(!token.needs_refresh(at(11, 0), skew));
        assert!(token.needs_refresh(at(11, 59), skew));
        assert!(token.needs_refresh(at(13, 0), skew));
    }

    #[test]
    fn missing_token_always_needs_refresh() {
        let token = AuthorizedUserToken::from_json(r#"{"refresh_token": "r"}"#).unwrap();
        assert!(token.needs_refresh(at(0, 0), chrono::Duration::zero()));
        assert_eq!(token.token_uri(), GOOGLE_TOKEN_URI);
    }

    #[test]
    fn no_expiry_never_expires() {
        let token = AuthorizedUserToken::from_json(r#"{"token": "t"}"#).unwrap();
        assert!(!token.needs_refresh(at(23, 0), chrono::Duration::seconds(60)));
    }

    #[test]
    fn apply_refresh_keeps_refresh_token_unless_rotated() {
        let mut token = AuthorizedUserToken::from_json(SAMPLE).unwrap();
        token.apply_refresh("ya29.new".into(), Some(at(13, 0)), None);
        assert_eq!(token.token.as_deref(), Some("ya29.new"));
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(token.expiry_at(), Some(at(13, 0)));

        token.apply_refresh("ya29.newer".into(), None, Some("1//rotated".into()));
        assert_eq!(token.refresh_token.as_deref(), Some("1//rotated"));
        assert!(token.expiry.is_none());
    }

    #[test]
    fn rewrite_preserves_unknown_fields() {
        let token = AuthorizedUserToken::from_json(SAMPLE).unwrap();
        let json: serde_json::Value = serde_json::from_str(&token.to_json().unwrap()).unwrap();
        assert_eq!(json["universe_domain"], "googleapis.com");
        assert_eq!(json["client_secret"], "shh");
    }

    #[test]
    fn debug_redacts_secrets() {
        let token = AuthorizedUserToken::from_json(SAMPLE).unwrap();
        let printed = format!("{token:?}");
        assert!(!printed.contains("ya29.old"));
        assert!(!printed.contains("shh"));
        assert!(!printed.contains("1//refresh"));
    }
}

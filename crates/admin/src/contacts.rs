//! Contact-form messages from the REST API.

use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use shieldline_core::{ContactId, ContactStatus};

use crate::config::AdminConfig;

/// Keys the API has used to wrap the message list.
const WRAPPER_KEYS: &[&str] = &["contacts", "messages", "data"];

/// Errors that can occur when reading contact messages.
#[derive(Debug, Error)]
pub enum ContactsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// A message submitted through the site's contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(alias = "_id")]
    pub id: ContactId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: ContactStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    /// Whether the message still needs attention.
    #[must_use]
    pub const fn is_unread(&self) -> bool {
        self.status.is_unread()
    }
}

/// Something that can list unread contact messages.
pub trait ContactsSource: Send + Sync {
    /// Fetch every message that has not been read yet.
    fn fetch_unread(&self) -> impl Future<Output = Result<Vec<ContactMessage>, ContactsError>> + Send;
}

/// Contacts API client.
#[derive(Debug, Clone)]
pub struct ContactsClient {
    client: reqwest::Client,
    contacts_url: Url,
}

impl ContactsClient {
    /// Create a new contacts client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value, the URL cannot
    /// be extended, or the HTTP client fails to build.
    pub fn new(config: &AdminConfig) -> Result<Self, ContactsError> {
        let contacts_url = endpoint(&config.api_base_url, "contacts")?;

        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.api_token.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| ContactsError::Parse(format!("Invalid API token format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            client,
            contacts_url,
        })
    }

    /// The URL messages are read from.
    #[must_use]
    pub const fn contacts_url(&self) -> &Url {
        &self.contacts_url
    }

    /// Fetch all contact messages regardless of status.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the body is not a message list.
    #[instrument(skip(self), fields(url = %self.contacts_url))]
    pub async fn fetch_all(&self) -> Result<Vec<ContactMessage>, ContactsError> {
        let response = self.client.get(self.contacts_url.clone()).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ContactsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ContactsError::Parse(e.to_string()))?;
        let messages = parse_messages(body)?;
        debug!(count = messages.len(), "Fetched contact messages");
        Ok(messages)
    }
}

impl ContactsSource for ContactsClient {
    async fn fetch_unread(&self) -> Result<Vec<ContactMessage>, ContactsError> {
        let mut messages = self.fetch_all().await?;
        messages.retain(ContactMessage::is_unread);
        Ok(messages)
    }
}

/// Append a path segment to an API base URL, tolerating a missing trailing slash.
fn endpoint(base: &Url, segment: &str) -> Result<Url, ContactsError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(segment)
        .map_err(|e| ContactsError::Parse(format!("invalid API base URL {base}: {e}")))
}

/// Decode a message list, bare or wrapped under a known key.
fn parse_messages(body: Value) -> Result<Vec<ContactMessage>, ContactsError> {
    let list = match body {
        Value::Array(list) => Value::Array(list),
        Value::Object(mut map) => WRAPPER_KEYS
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_array))
            .ok_or_else(|| ContactsError::Parse("response has no message list".to_string()))?,
        other => {
            return Err(ContactsError::Parse(format!(
                "expected a message list, got {other}"
            )));
        }
    };
    serde_json::from_value(list).map_err(|e| ContactsError::Parse(e.to_string()))
}

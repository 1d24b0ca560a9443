//! Google Docs backed [`DocumentSink`].

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};
use warden_core::current_unix_timestamp_ms;

use crate::docs_api_client::GoogleDocsApiClient;
use crate::docs_types::{normalize_line, utf16_len, AppendReceipt, DocsError, DocumentSink};
use crate::service_account::ServiceAccountCredentials;

pub const DEFAULT_DOCS_API_BASE: &str = "https://docs.googleapis.com/v1";
const TOKEN_REFRESH_MARGIN_MS: u64 = 60_000;
const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 3_600;

#[derive(Clone)]
/// Appender configuration. Credentials and document id are checked per append.
pub struct GoogleDocsConfig {
    pub api_base: String,
    pub credentials_json: Option<String>,
    pub document_id: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for GoogleDocsConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_DOCS_API_BASE.to_string(),
            credentials_json: None,
            document_id: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedAccessToken {
    client_email: String,
    value: String,
    expires_unix_ms: u64,
}

pub struct GoogleDocsAppender {
    config: GoogleDocsConfig,
    client: GoogleDocsApiClient,
    token: Mutex<Option<CachedAccessToken>>,
}

impl GoogleDocsAppender {
    pub fn new(config: GoogleDocsConfig) -> Result<Self, DocsError> {
        let client = GoogleDocsApiClient::new(&config.api_base, config.request_timeout_ms)?;
        Ok(Self {
            config,
            client,
            token: Mutex::new(None),
        })
    }

    fn document_id(&self) -> Result<&str, DocsError> {
        self.config
            .document_id
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(DocsError::MissingDocumentId)
    }

    fn credentials(&self) -> Result<ServiceAccountCredentials, DocsError> {
        let raw = self
            .config
            .credentials_json
            .as_deref()
            .ok_or(DocsError::MissingCredentials)?;
        ServiceAccountCredentials::from_json(raw)
    }

    async fn access_token(
        &self,
        credentials: &ServiceAccountCredentials,
    ) -> Result<String, DocsError> {
        let mut cached = self.token.lock().await;
        let now_ms = current_unix_timestamp_ms();
        if let Some(token) = cached.as_ref() {
            if token.client_email == credentials.client_email
                && token.expires_unix_ms > now_ms.saturating_add(TOKEN_REFRESH_MARGIN_MS)
            {
                return Ok(token.value.clone());
            }
        }

        let assertion = credentials.signed_assertion(now_ms / 1_000)?;
        let response = self
            .client
            .exchange_assertion(credentials.token_uri(), &assertion)
            .await?;
        let lifetime_ms = response
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECONDS)
            .saturating_mul(1_000);
        debug!(
            client_email = credentials.client_email.as_str(),
            lifetime_ms, "obtained google access token"
        );
        *cached = Some(CachedAccessToken {
            client_email: credentials.client_email.clone(),
            value: response.access_token.clone(),
            expires_unix_ms: now_ms.saturating_add(lifetime_ms),
        });
        Ok(response.access_token)
    }
}

#[async_trait]
impl DocumentSink for GoogleDocsAppender {
    async fn append(&self, text: &str) -> Result<AppendReceipt, DocsError> {
        let document_id = self.document_id()?;
        let credentials = self.credentials()?;
        let access_token = self.access_token(&credentials).await?;

        let end_index = self
            .client
            .document_end_index(&access_token, document_id)
            .await?;
        // The body always ends with an implicit newline; insert before it.
        let index = end_index.saturating_sub(1).max(1);
        let line = normalize_line(text);
        self.client
            .insert_text(&access_token, document_id, index, &line)
            .await?;

        let receipt = AppendReceipt {
            document_id: document_id.to_string(),
            index,
            inserted_len: utf16_len(&line),
        };
        info!(
            document_id = receipt.document_id.as_str(),
            index = receipt.index,
            inserted_len = receipt.inserted_len,
            "appended log line"
        );
        Ok(receipt)
    }
}

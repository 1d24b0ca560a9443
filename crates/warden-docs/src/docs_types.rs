use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
/// Failures surfaced by document appends.
pub enum DocsError {
    #[error("missing service-account credentials (GOOGLE_CREDS_JSON)")]
    MissingCredentials,
    #[error("invalid service-account credentials: {0}")]
    InvalidCredentials(String),
    #[error("missing target document id (GOOGLE_DOC_ID)")]
    MissingDocumentId,
    #[error("failed to sign service-account assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("google {operation} returned non-success status {status}: {body}")]
    HttpStatus {
        operation: String,
        status: u16,
        body: String,
    },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("append queue is closed")]
    QueueClosed,
}

impl DocsError {
    /// True for errors caused by absent or malformed configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials | Self::InvalidCredentials(_) | Self::MissingDocumentId
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendReceipt {
    pub document_id: String,
    /// Index the text was inserted at, in UTF-16 code units.
    pub index: u64,
    /// Inserted length in UTF-16 code units, trailing newline included.
    pub inserted_len: u64,
}

#[async_trait]
/// Append-only text sink backing the command log.
pub trait DocumentSink: Send + Sync {
    async fn append(&self, text: &str) -> Result<AppendReceipt, DocsError>;
}

/// Returns `text` with a trailing newline, adding one only when absent.
pub fn normalize_line(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// Document indexes count UTF-16 code units.
pub fn utf16_len(text: &str) -> u64 {
    text.encode_utf16().count() as u64
}

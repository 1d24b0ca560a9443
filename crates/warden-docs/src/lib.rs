//! Remote document appender for Warden.
//!
//! Appends one line of text at the end of a single Google Docs document per
//! call. Authentication uses a service-account JWT bearer grant. Appends can be
//! serialized through [`AppendQueue`] so that the read-end-offset-then-insert
//! sequence never interleaves between concurrent commands.

pub mod append_queue;
pub mod docs_api_client;
pub mod docs_types;
pub mod google_docs_appender;
pub mod memory_document;
pub mod service_account;

pub use append_queue::AppendQueue;
pub use docs_api_client::GoogleDocsApiClient;
pub use docs_types::{normalize_line, utf16_len, AppendReceipt, DocsError, DocumentSink};
pub use google_docs_appender::{GoogleDocsAppender, GoogleDocsConfig, DEFAULT_DOCS_API_BASE};
pub use memory_document::InMemoryDocument;
pub use service_account::{ServiceAccountCredentials, DEFAULT_TOKEN_URI, DOCUMENT_SCOPES};

//! In-process document with the same end-index semantics as a Google Doc.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::docs_types::{normalize_line, utf16_len, AppendReceipt, DocsError, DocumentSink};

/// Body text always ends with one implicit newline, and body indexes start at 1.
pub struct InMemoryDocument {
    document_id: String,
    body: Mutex<String>,
}

impl InMemoryDocument {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            body: Mutex::new("\n".to_string()),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Text content without the implicit trailing newline.
    pub fn text(&self) -> String {
        let body = self.body.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        body[..body.len().saturating_sub(1)].to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }

    /// Body length in UTF-16 code units, implicit newline included.
    pub fn content_len(&self) -> u64 {
        let body = self.body.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        utf16_len(&body)
    }

    pub fn end_index(&self) -> u64 {
        1 + self.content_len()
    }
}

#[async_trait]
impl DocumentSink for InMemoryDocument {
    async fn append(&self, text: &str) -> Result<AppendReceipt, DocsError> {
        let line = normalize_line(text);
        let mut body = self.body.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let index = utf16_len(&body);
        let insert_at = body.len() - 1;
        body.insert_str(insert_at, &line);
        Ok(AppendReceipt {
            document_id: self.document_id.clone(),
            index,
            inserted_len: utf16_len(&line),
        })
    }
}

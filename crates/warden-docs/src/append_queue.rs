//! Single-writer queue in front of a [`DocumentSink`].
//!
//! One task owns the inner sink and applies appends in arrival order, so the
//! end-offset read and the insert of one append never overlap with another.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::docs_types::{AppendReceipt, DocsError, DocumentSink};

struct AppendJob {
    text: String,
    reply: oneshot::Sender<Result<AppendReceipt, DocsError>>,
}

#[derive(Clone)]
pub struct AppendQueue {
    sender: mpsc::Sender<AppendJob>,
}

impl AppendQueue {
    /// Spawns the writer task on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn DocumentSink>, capacity: usize) -> Self {
        let (sender, mut receiver) = mpsc::channel::<AppendJob>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(job) = receiver.recv().await {
                let result = sink.append(&job.text).await;
                if job.reply.send(result).is_err() {
                    debug!("append caller went away before the result was delivered");
                }
            }
            debug!("append queue closed");
        });
        Self { sender }
    }
}

#[async_trait]
impl DocumentSink for AppendQueue {
    async fn append(&self, text: &str) -> Result<AppendReceipt, DocsError> {
        let (reply, result) = oneshot::channel();
        self.sender
            .send(AppendJob {
                text: text.to_string(),
                reply,
            })
            .await
            .map_err(|_| DocsError::QueueClosed)?;
        result.await.map_err(|_| DocsError::QueueClosed)?
    }
}

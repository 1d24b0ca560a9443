//! Maps one invocation to one handler and one ephemeral reply.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use warden_core::CommandInvocation;
use warden_discord::PlatformActions;
use warden_docs::DocumentSink;

use crate::command_catalog::{command_spec, CommandName};
use crate::command_handlers::{run_handler, HandlerContext, HandlerOutcome};
use crate::command_validation::{validate_invocation, CommandRejection};

const UNKNOWN_COMMAND_MESSAGE: &str = "Unknown command.";
const FAILED_COMMAND_MESSAGE: &str = "❌ Command failed. Check the bot logs.";

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    Completed,
    Rejected,
    Failed,
    Unknown,
}

impl ReplyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub content: String,
    /// Replies are only visible to the invoking user.
    pub ephemeral: bool,
    pub outcome: ReplyOutcome,
}

impl CommandReply {
    fn new(content: impl Into<String>, outcome: ReplyOutcome) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            outcome,
        }
    }

    fn rejected(rejection: &CommandRejection) -> Self {
        Self::new(format!("❌ {rejection}"), ReplyOutcome::Rejected)
    }
}

pub struct CommandDispatcher {
    platform: Arc<dyn PlatformActions>,
    document: Arc<dyn DocumentSink>,
    started_at: Instant,
    clock: Clock,
}

impl CommandDispatcher {
    pub fn new(platform: Arc<dyn PlatformActions>, document: Arc<dyn DocumentSink>) -> Self {
        Self {
            platform,
            document,
            started_at: Instant::now(),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for log line timestamps.
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub async fn dispatch(&self, invocation: &CommandInvocation) -> CommandReply {
        let Some(name) = CommandName::parse(&invocation.name) else {
            info!(command = invocation.name.as_str(), "unknown command");
            return CommandReply::new(UNKNOWN_COMMAND_MESSAGE, ReplyOutcome::Unknown);
        };

        if let Err(rejection) = validate_invocation(&command_spec(name), invocation) {
            info!(command = name.as_str(), %rejection, "command rejected");
            return CommandReply::rejected(&rejection);
        }

        let context = HandlerContext {
            invocation,
            now: (self.clock)(),
            uptime: self.started_at.elapsed(),
            platform: self.platform.as_ref(),
            document: self.document.as_ref(),
        };
        match run_handler(name, &context).await {
            Ok(HandlerOutcome::Done(content)) => {
                info!(
                    command = name.as_str(),
                    actor = invocation.actor.id.as_str(),
                    "command completed"
                );
                CommandReply::new(content, ReplyOutcome::Completed)
            }
            Ok(HandlerOutcome::Rejected(rejection)) => {
                info!(command = name.as_str(), %rejection, "command rejected");
                CommandReply::rejected(&rejection)
            }
            Err(error) => {
                warn!(
                    command = name.as_str(),
                    actor = invocation.actor.id.as_str(),
                    error = %format!("{error:#}"),
                    "command failed"
                );
                CommandReply::new(FAILED_COMMAND_MESSAGE, ReplyOutcome::Failed)
            }
        }
    }
}

//! Slash command catalog and dispatcher for Warden.
//!
//! The catalog describes every command the bot registers. The dispatcher maps
//! one invocation to exactly one handler, validates arguments before any side
//! effect, and always produces exactly one ephemeral reply.

pub mod command_catalog;
pub mod command_dispatch;
mod command_handlers;
pub mod command_validation;

pub use command_catalog::{
    catalog, command_spec, registration_payload, CommandName, CommandSpec, InvocationContext,
    OptionSpec,
};
pub use command_dispatch::{CommandDispatcher, CommandReply, ReplyOutcome};
pub use command_validation::{validate_invocation, CommandRejection};

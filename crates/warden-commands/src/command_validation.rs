//! Argument and context checks run before any side effect.

use thiserror::Error;
use warden_core::{ArgKind, ArgValue, CommandInvocation};

use crate::command_catalog::{CommandSpec, InvocationContext};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons an invocation is refused without touching the platform or the document.
pub enum CommandRejection {
    #[error("Missing required option `{name}`.")]
    MissingOption { name: String },
    #[error("Option `{name}` must be a {expected}, got a {actual}.")]
    WrongKind {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Option `{name}` must be one of {allowed}, got `{value}`.")]
    InvalidChoice {
        name: String,
        value: String,
        allowed: String,
    },
    #[error("Option `{name}` is not accepted by this command.")]
    UnknownOption { name: String },
    #[error("This command only works inside a server.")]
    GuildOnly,
    #[error("This command only works inside a server, on a text channel.")]
    TextChannelOnly,
    #[error("The remove-role action also needs a role.")]
    RoleRequiredForAction,
}

/// Checks `invocation` against `spec`: context, unknown options, presence, kinds, and choices.
pub fn validate_invocation(
    spec: &CommandSpec,
    invocation: &CommandInvocation,
) -> Result<(), CommandRejection> {
    match spec.context {
        InvocationContext::Anywhere => {}
        InvocationContext::Guild => {
            if invocation.guild_id.is_none() {
                return Err(CommandRejection::GuildOnly);
            }
        }
        InvocationContext::GuildTextChannel => {
            let text_channel = invocation
                .channel
                .as_ref()
                .is_some_and(|channel| channel.text_based);
            if invocation.guild_id.is_none() || !text_channel {
                return Err(CommandRejection::TextChannelOnly);
            }
        }
    }

    if let Some(name) = invocation
        .options
        .keys()
        .find(|name| spec.option_spec(name).is_none())
    {
        return Err(CommandRejection::UnknownOption { name: name.clone() });
    }

    for option in &spec.options {
        let Some(value) = invocation.options.get(option.name) else {
            if option.required {
                return Err(CommandRejection::MissingOption {
                    name: option.name.to_string(),
                });
            }
            continue;
        };
        if value.kind() != option.kind {
            return Err(CommandRejection::WrongKind {
                name: option.name.to_string(),
                expected: option.kind.as_str(),
                actual: value.kind().as_str(),
            });
        }
        if let ArgValue::String(raw) = value {
            if option.required && option.kind == ArgKind::String && raw.trim().is_empty() {
                return Err(CommandRejection::MissingOption {
                    name: option.name.to_string(),
                });
            }
            if !option.choices.is_empty() && !option.choices.contains(&raw.as_str()) {
                return Err(CommandRejection::InvalidChoice {
                    name: option.name.to_string(),
                    value: raw.clone(),
                    allowed: option.choices.join(", "),
                });
            }
        }
    }
    Ok(())
}

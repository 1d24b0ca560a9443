//! Discord platform actions for Warden.
//!
//! Wraps the Discord REST API calls the bot performs on behalf of a command:
//! member lookup, role add/remove, kick, channel lockdown overwrites, and
//! application command registration. The gateway connection itself is owned
//! by the SDK in `warden-bot`.

pub mod discord_api_client;
pub mod discord_helpers;
pub mod permissions;
pub mod platform_actions;

pub use discord_api_client::{DiscordApiClient, DEFAULT_DISCORD_API_BASE};
pub use permissions::{
    merge_send_messages_overwrite, PermissionOverwrite, SendMessagesOverwrite, KICK_MEMBERS,
    MANAGE_CHANNELS, MANAGE_ROLES, SEND_MESSAGES,
};
pub use platform_actions::{DiscordPlatform, MemberRecord, PlatformActions};

//! Command invocation model delivered by the gateway bridge.
//!
//! An invocation is created per interaction and discarded once the
//! dispatcher has produced its reply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// A platform user as seen by the bot: snowflake id plus display tag.
pub struct UserRef {
    pub id: String,
    pub tag: String,
}

impl UserRef {
    pub fn new(id: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tag: tag.into(),
        }
    }

    /// `tag (id)` form used in log lines.
    pub fn display(&self) -> String {
        format!("{} ({})", self.tag, self.id)
    }

    /// Platform mention markup, `<@id>`.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

impl RoleRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn display(&self) -> String {
        format!("{} ({})", self.name, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    /// True when the channel accepts text messages (text, news, threads, voice text).
    pub text_based: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    String,
    User,
    Role,
}

impl ArgKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::User => "user",
            Self::Role => "role",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ArgValue {
    String(String),
    User(UserRef),
    Role(RoleRef),
}

impl ArgValue {
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::String(_) => ArgKind::String,
            Self::User(_) => ArgKind::User,
            Self::Role(_) => ArgKind::Role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One structured request originating from the platform's interaction system.
pub struct CommandInvocation {
    pub name: String,
    pub options: BTreeMap<String, ArgValue>,
    pub actor: UserRef,
    pub guild_id: Option<String>,
    pub channel: Option<ChannelRef>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>, actor: UserRef) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
            actor,
            guild_id: None,
            channel: None,
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn in_channel(mut self, channel_id: impl Into<String>, text_based: bool) -> Self {
        self.channel = Some(ChannelRef {
            id: channel_id.into(),
            text_based,
        });
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: ArgValue) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_option(name, ArgValue::String(value.into()))
    }

    pub fn with_user(self, name: impl Into<String>, user: UserRef) -> Self {
        self.with_option(name, ArgValue::User(user))
    }

    pub fn with_role(self, name: impl Into<String>, role: RoleRef) -> Self {
        self.with_option(name, ArgValue::Role(role))
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.options.get(name) {
            Some(ArgValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<&UserRef> {
        match self.options.get(name) {
            Some(ArgValue::User(user)) => Some(user),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<&RoleRef> {
        match self.options.get(name) {
            Some(ArgValue::Role(role)) => Some(role),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArgKind, ArgValue, CommandInvocation, RoleRef, UserRef};

    #[test]
    fn unit_typed_accessors_ignore_mismatched_kinds() {
        let invocation = CommandInvocation::new("promote-member", UserRef::new("1", "a#0001"))
            .with_string("member", "not-a-user")
            .with_role("role", RoleRef::new("9", "Sergeant"));

        assert_eq!(invocation.user("member"), None);
        assert_eq!(invocation.string("member"), Some("not-a-user"));
        assert_eq!(invocation.role("role").map(|role| role.name.as_str()), Some("Sergeant"));
        assert_eq!(invocation.string("missing"), None);
    }

    #[test]
    fn unit_arg_value_reports_kind() {
        assert_eq!(ArgValue::String("x".into()).kind(), ArgKind::String);
        assert_eq!(
            ArgValue::User(UserRef::new("1", "a")).kind().as_str(),
            "user"
        );
    }

    #[test]
    fn unit_user_ref_display_and_mention() {
        let user = UserRef::new("77", "cadet");
        assert_eq!(user.display(), "cadet (77)");
        assert_eq!(user.mention(), "<@77>");
    }
}

//! Role, membership, and lockdown actions performed for commands.
//!
//! Every action is a single fire-and-forget REST call (lockdown reads the
//! channel first to merge its overwrite). No local state tracks roles or lock
//! status.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::discord_api_client::DiscordApiClient;
use crate::permissions::{
    merge_send_messages_overwrite, PermissionOverwrite, SendMessagesOverwrite,
    ROLE_OVERWRITE_TYPE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    pub guild_id: String,
    pub user_id: String,
}

#[async_trait]
/// Platform mutations the dispatcher may request.
pub trait PlatformActions: Send + Sync {
    async fn fetch_member(&self, guild_id: &str, user_id: &str) -> Result<MemberRecord>;

    async fn add_role(
        &self,
        member: &MemberRecord,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()>;

    async fn remove_role(
        &self,
        member: &MemberRecord,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()>;

    async fn kick(&self, member: &MemberRecord, reason: Option<&str>) -> Result<()>;

    /// Edits the @everyone overwrite on `channel_id`, touching only SEND_MESSAGES.
    async fn set_channel_send_messages(
        &self,
        guild_id: &str,
        channel_id: &str,
        setting: SendMessagesOverwrite,
    ) -> Result<()>;
}

#[derive(Clone)]
pub struct DiscordPlatform {
    client: DiscordApiClient,
}

impl DiscordPlatform {
    pub fn new(client: DiscordApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlatformActions for DiscordPlatform {
    async fn fetch_member(&self, guild_id: &str, user_id: &str) -> Result<MemberRecord> {
        let member = self
            .client
            .get_guild_member(guild_id, user_id)
            .await
            .with_context(|| format!("member {user_id} not available in guild {guild_id}"))?;
        Ok(MemberRecord {
            guild_id: guild_id.to_string(),
            user_id: member
                .user
                .map(|user| user.id)
                .unwrap_or_else(|| user_id.to_string()),
        })
    }

    async fn add_role(
        &self,
        member: &MemberRecord,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        self.client
            .add_member_role(&member.guild_id, &member.user_id, role_id, reason)
            .await?;
        info!(
            guild_id = member.guild_id.as_str(),
            user_id = member.user_id.as_str(),
            role_id,
            "role added"
        );
        Ok(())
    }

    async fn remove_role(
        &self,
        member: &MemberRecord,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        self.client
            .remove_member_role(&member.guild_id, &member.user_id, role_id, reason)
            .await?;
        info!(
            guild_id = member.guild_id.as_str(),
            user_id = member.user_id.as_str(),
            role_id,
            "role removed"
        );
        Ok(())
    }

    async fn kick(&self, member: &MemberRecord, reason: Option<&str>) -> Result<()> {
        self.client
            .kick_member(&member.guild_id, &member.user_id, reason)
            .await?;
        info!(
            guild_id = member.guild_id.as_str(),
            user_id = member.user_id.as_str(),
            "member kicked"
        );
        Ok(())
    }

    async fn set_channel_send_messages(
        &self,
        guild_id: &str,
        channel_id: &str,
        setting: SendMessagesOverwrite,
    ) -> Result<()> {
        let channel = self.client.get_channel(channel_id).await?;
        // The @everyone role shares the guild's id.
        let existing = channel
            .permission_overwrites
            .iter()
            .find(|overwrite| overwrite.kind == ROLE_OVERWRITE_TYPE && overwrite.id == guild_id);
        let (allow, deny) = merge_send_messages_overwrite(existing, setting);
        let overwrite = PermissionOverwrite {
            id: guild_id.to_string(),
            kind: ROLE_OVERWRITE_TYPE,
            allow,
            deny,
        };
        self.client
            .put_permission_overwrite(channel_id, &overwrite)
            .await?;
        info!(
            guild_id,
            channel_id,
            send_messages = setting.as_str(),
            "channel overwrite updated"
        );
        Ok(())
    }
}

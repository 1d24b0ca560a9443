//! Discord REST API client used by platform actions and command registration.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use warden_core::truncate_for_error;

use crate::discord_helpers::{encode_audit_log_reason, ensure_snowflake};
use crate::permissions::PermissionOverwrite;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const AUDIT_LOG_REASON_HEADER: &str = "X-Audit-Log-Reason";

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordUser {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordGuildMember {
    #[serde(default)]
    pub user: Option<DiscordUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(default)]
    pub permission_overwrites: Vec<PermissionOverwrite>,
}

#[derive(Clone)]
pub struct DiscordApiClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
}

impl DiscordApiClient {
    pub fn new(api_base: String, bot_token: String, request_timeout_ms: u64) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(
                "DiscordBot (https://github.com/warden-bot/warden, 0.1)",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .context("failed to create discord api client")?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.trim().to_string(),
        })
    }

    pub async fn get_guild_member(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<DiscordGuildMember> {
        ensure_snowflake("guild", guild_id)?;
        ensure_snowflake("user", user_id)?;
        self.request_json(
            "guild member fetch",
            self.http.get(format!(
                "{}/guilds/{}/members/{}",
                self.api_base, guild_id, user_id
            )),
        )
        .await
    }

    pub async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        ensure_snowflake("guild", guild_id)?;
        ensure_snowflake("user", user_id)?;
        ensure_snowflake("role", role_id)?;
        self.request_empty(
            "member role add",
            self.http.put(format!(
                "{}/guilds/{}/members/{}/roles/{}",
                self.api_base, guild_id, user_id, role_id
            )),
            reason,
        )
        .await
    }

    pub async fn remove_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        ensure_snowflake("guild", guild_id)?;
        ensure_snowflake("user", user_id)?;
        ensure_snowflake("role", role_id)?;
        self.request_empty(
            "member role remove",
            self.http.delete(format!(
                "{}/guilds/{}/members/{}/roles/{}",
                self.api_base, guild_id, user_id, role_id
            )),
            reason,
        )
        .await
    }

    pub async fn kick_member(
        &self,
        guild_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> Result<()> {
        ensure_snowflake("guild", guild_id)?;
        ensure_snowflake("user", user_id)?;
        self.request_empty(
            "member kick",
            self.http.delete(format!(
                "{}/guilds/{}/members/{}",
                self.api_base, guild_id, user_id
            )),
            reason,
        )
        .await
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<DiscordChannel> {
        ensure_snowflake("channel", channel_id)?;
        self.request_json(
            "channel fetch",
            self.http
                .get(format!("{}/channels/{}", self.api_base, channel_id)),
        )
        .await
    }

    pub async fn put_permission_overwrite(
        &self,
        channel_id: &str,
        overwrite: &PermissionOverwrite,
    ) -> Result<()> {
        ensure_snowflake("channel", channel_id)?;
        ensure_snowflake("overwrite", &overwrite.id)?;
        let payload = json!({
            "type": overwrite.kind,
            "allow": overwrite.allow.to_string(),
            "deny": overwrite.deny.to_string(),
        });
        self.request_empty(
            "channel permission overwrite",
            self.http
                .put(format!(
                    "{}/channels/{}/permissions/{}",
                    self.api_base, channel_id, overwrite.id
                ))
                .json(&payload),
            None,
        )
        .await
    }

    /// Replaces the application's command set; scoped to one guild when given.
    pub async fn bulk_overwrite_commands(
        &self,
        application_id: &str,
        guild_id: Option<&str>,
        commands: &Value,
    ) -> Result<usize> {
        ensure_snowflake("application", application_id)?;
        let url = match guild_id {
            Some(guild_id) => {
                ensure_snowflake("guild", guild_id)?;
                format!(
                    "{}/applications/{}/guilds/{}/commands",
                    self.api_base, application_id, guild_id
                )
            }
            None => format!("{}/applications/{}/commands", self.api_base, application_id),
        };
        let registered: Vec<Value> = self
            .request_json("application command registration", self.http.put(url).json(commands))
            .await?;
        Ok(registered.len())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.header(
            reqwest::header::AUTHORIZATION,
            format!("Bot {}", self.bot_token),
        )
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        if self.bot_token.is_empty() {
            bail!("discord api {operation} requires a bot token (DISCORD_TOKEN)");
        }
        let response = self
            .authorize(request)
            .send()
            .await
            .with_context(|| format!("discord api {operation} request failed"))?;
        let status = response.status();
        if status.is_success() {
            debug!(operation, status = status.as_u16(), "discord api call succeeded");
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!(
            "discord api {operation} failed with status {}: {}",
            status.as_u16(),
            truncate_for_error(&body, 800)
        ))
    }

    async fn request_json<T>(&self, operation: &str, request: reqwest::RequestBuilder) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(operation, request).await?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode discord {operation}"))
    }

    async fn request_empty(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
        reason: Option<&str>,
    ) -> Result<()> {
        let request = match reason.and_then(encode_audit_log_reason) {
            Some(reason) => request.header(AUDIT_LOG_REASON_HEADER, reason),
            None => request,
        };
        self.send(operation, request).await.map(|_| ())
    }
}

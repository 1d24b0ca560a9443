use std::time::Duration;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use tracing::warn;
use warden_core::{format_uptime, or_placeholder, CommandInvocation, LogLine, RoleRef, UserRef};
use warden_discord::{MemberRecord, PlatformActions, SendMessagesOverwrite};
use warden_docs::DocumentSink;

use crate::command_catalog::{
    CommandName, OPT_ACTION, OPT_BADGE, OPT_CERTIFICATE, OPT_DETAILS, OPT_FROM, OPT_FULL_NAME,
    OPT_MEMBER, OPT_NATIONAL_ID, OPT_NOTE, OPT_REASON, OPT_ROLE, OPT_UNTIL, REMOVAL_KICK,
    REMOVAL_ROLE, SHIFT_CLOSE, SHIFT_OPEN,
};
use crate::command_validation::CommandRejection;

const ONLINE_MESSAGE: &str = "Duty desk bot is online ✅";

pub(crate) enum HandlerOutcome {
    Done(String),
    Rejected(CommandRejection),
}

pub(crate) struct HandlerContext<'a> {
    pub(crate) invocation: &'a CommandInvocation,
    pub(crate) now: DateTime<Utc>,
    pub(crate) uptime: Duration,
    pub(crate) platform: &'a dyn PlatformActions,
    pub(crate) document: &'a dyn DocumentSink,
}

impl HandlerContext<'_> {
    fn line(&self, tag: &str) -> LogLine {
        LogLine::new(tag, self.now, &self.invocation.actor)
    }

    fn required_string(&self, name: &str) -> Result<&str> {
        self.invocation
            .string(name)
            .ok_or_else(|| anyhow!("validated option `{name}` is missing"))
    }

    fn required_user(&self, name: &str) -> Result<&UserRef> {
        self.invocation
            .user(name)
            .ok_or_else(|| anyhow!("validated option `{name}` is missing"))
    }

    fn required_role(&self, name: &str) -> Result<&RoleRef> {
        self.invocation
            .role(name)
            .ok_or_else(|| anyhow!("validated option `{name}` is missing"))
    }

    fn optional_text(&self, name: &str) -> &str {
        or_placeholder(self.invocation.string(name))
    }

    /// Reason forwarded to the platform audit log; blank means none.
    fn audit_reason(&self) -> Option<&str> {
        self.invocation
            .string(OPT_REASON)
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }

    fn guild_field(&self) -> &str {
        or_placeholder(self.invocation.guild_id.as_deref())
    }

    fn guild_id(&self) -> Result<&str> {
        self.invocation
            .guild_id
            .as_deref()
            .ok_or_else(|| anyhow!("guild-only command ran without a guild"))
    }

    fn channel_id(&self) -> Result<&str> {
        self.invocation
            .channel
            .as_ref()
            .map(|channel| channel.id.as_str())
            .ok_or_else(|| anyhow!("channel command ran without a channel"))
    }

    async fn append(&self, line: LogLine) -> Result<()> {
        if let Err(error) = self.document.append(&line.render()).await {
            if error.is_configuration() {
                warn!(
                    tag = line.tag(),
                    "document log is not configured; set GOOGLE_CREDS_JSON and GOOGLE_DOC_ID"
                );
            }
            return Err(anyhow::Error::new(error)
                .context(format!("failed to append {} log line", line.tag())));
        }
        Ok(())
    }

    /// Appends after a platform action already succeeded; a failure here leaves the two out of step.
    async fn append_after_action(&self, line: LogLine) -> Result<()> {
        let tag = line.tag().to_string();
        let result = self.append(line).await;
        if result.is_err() {
            warn!(
                tag = tag.as_str(),
                actor = self.invocation.actor.id.as_str(),
                "platform action applied but its log line was not appended"
            );
        }
        result
    }

    async fn fetch_target_member(&self) -> Result<(MemberRecord, &UserRef)> {
        let target = self.required_user(OPT_MEMBER)?;
        let member = self
            .platform
            .fetch_member(self.guild_id()?, &target.id)
            .await?;
        Ok((member, target))
    }
}

pub(crate) async fn run_handler(
    name: CommandName,
    context: &HandlerContext<'_>,
) -> Result<HandlerOutcome> {
    match name {
        CommandName::Info => Ok(HandlerOutcome::Done(ONLINE_MESSAGE.to_string())),
        CommandName::Uptime => Ok(HandlerOutcome::Done(format!(
            "⏱️ Uptime: {}",
            format_uptime(context.uptime)
        ))),
        CommandName::Process => process(context).await,
        CommandName::CertificateAdd => certificate(context, "CERTIFICATE_ADD", "added").await,
        CommandName::CertificateRemove => {
            certificate(context, "CERTIFICATE_REMOVE", "removed").await
        }
        CommandName::BadgeRequest => badge_request(context).await,
        CommandName::LeaveAdd => leave_add(context).await,
        CommandName::LeaveCancel => leave_cancel(context).await,
        CommandName::WeekClose => week_close(context).await,
        CommandName::TrafficShift => traffic_shift(context).await,
        CommandName::LockdownClose => lockdown(context, SendMessagesOverwrite::Deny).await,
        CommandName::LockdownOpen => lockdown(context, SendMessagesOverwrite::Inherit).await,
        CommandName::PromoteMember => promote(context).await,
        CommandName::DemoteMember => demote(context).await,
        CommandName::RemoveMember => remove_member(context).await,
    }
}

async fn process(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let line = context
        .line("PROCESS")
        .value(context.required_string(OPT_FULL_NAME)?)
        .value(context.required_string(OPT_NATIONAL_ID)?)
        .field("guild", context.guild_field());
    context.append(line).await?;
    Ok(HandlerOutcome::Done(
        "✅ Processing entry added to the log document.".to_string(),
    ))
}

async fn certificate(
    context: &HandlerContext<'_>,
    tag: &str,
    verb: &str,
) -> Result<HandlerOutcome> {
    let member = context.required_user(OPT_MEMBER)?;
    let line = context
        .line(tag)
        .field("member", member.display())
        .field("certificate", context.required_string(OPT_CERTIFICATE)?);
    context.append(line).await?;
    Ok(HandlerOutcome::Done(format!("✅ Certificate {verb} (logged).")))
}

async fn badge_request(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let line = context
        .line("BADGE_REQUEST")
        .field("badge", context.required_string(OPT_BADGE)?)
        .field("details", context.optional_text(OPT_DETAILS));
    context.append(line).await?;
    Ok(HandlerOutcome::Done(
        "✅ Badge request submitted (logged).".to_string(),
    ))
}

async fn leave_add(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let member = context.required_user(OPT_MEMBER)?;
    let line = context
        .line("LEAVE_ADD")
        .field("member", member.display())
        .field("from", context.required_string(OPT_FROM)?)
        .field("until", context.required_string(OPT_UNTIL)?)
        .field("reason", context.optional_text(OPT_REASON));
    context.append(line).await?;
    Ok(HandlerOutcome::Done("✅ Leave added (logged).".to_string()))
}

async fn leave_cancel(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let member = context.required_user(OPT_MEMBER)?;
    let line = context
        .line("LEAVE_CANCEL")
        .field("member", member.display())
        .field("reason", context.optional_text(OPT_REASON));
    context.append(line).await?;
    Ok(HandlerOutcome::Done("✅ Leave cancelled (logged).".to_string()))
}

async fn week_close(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let line = context
        .line("WEEK_CLOSE")
        .field("guild", context.guild_field())
        .field("note", context.optional_text(OPT_NOTE));
    context.append(line).await?;
    Ok(HandlerOutcome::Done("✅ Week closed (logged).".to_string()))
}

async fn traffic_shift(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let action = context.required_string(OPT_ACTION)?;
    let tag = match action {
        SHIFT_OPEN => "TRAFFIC_SHIFT_OPEN",
        SHIFT_CLOSE => "TRAFFIC_SHIFT_CLOSE",
        other => return Err(anyhow!("validated shift action `{other}` is unsupported")),
    };
    let line = context
        .line(tag)
        .field("guild", context.guild_field())
        .field("note", context.optional_text(OPT_NOTE));
    context.append(line).await?;
    Ok(HandlerOutcome::Done(format!(
        "✅ Traffic shift: **{action}** (logged)."
    )))
}

async fn lockdown(
    context: &HandlerContext<'_>,
    setting: SendMessagesOverwrite,
) -> Result<HandlerOutcome> {
    let guild_id = context.guild_id()?;
    let channel_id = context.channel_id()?;
    context
        .platform
        .set_channel_send_messages(guild_id, channel_id, setting)
        .await?;

    let (tag, message) = match setting {
        SendMessagesOverwrite::Deny => ("LOCKDOWN_CLOSE", "🔒 Lockdown active on this channel."),
        SendMessagesOverwrite::Inherit => ("LOCKDOWN_OPEN", "🔓 Lockdown lifted on this channel."),
    };
    let line = context
        .line(tag)
        .field("guild", guild_id)
        .field("channel", channel_id);
    context.append_after_action(line).await?;
    Ok(HandlerOutcome::Done(message.to_string()))
}

async fn promote(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let role = context.required_role(OPT_ROLE)?;
    let (member, target) = context.fetch_target_member().await?;
    context
        .platform
        .add_role(&member, &role.id, context.audit_reason())
        .await?;

    let line = context
        .line("PROMOTE")
        .field("member", target.display())
        .field("role", role.display())
        .field("reason", context.optional_text(OPT_REASON));
    context.append_after_action(line).await?;
    Ok(HandlerOutcome::Done(format!(
        "✅ {} received the role **{}**.",
        target.mention(),
        role.name
    )))
}

async fn demote(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let role = context.required_role(OPT_ROLE)?;
    let (member, target) = context.fetch_target_member().await?;
    context
        .platform
        .remove_role(&member, &role.id, context.audit_reason())
        .await?;

    let line = context
        .line("DEMOTE")
        .field("member", target.display())
        .field("role", role.display())
        .field("reason", context.optional_text(OPT_REASON));
    context.append_after_action(line).await?;
    Ok(HandlerOutcome::Done(format!(
        "✅ Role **{}** was removed from {}.",
        role.name,
        target.mention()
    )))
}

async fn remove_member(context: &HandlerContext<'_>) -> Result<HandlerOutcome> {
    let action = context.required_string(OPT_ACTION)?;
    match action {
        REMOVAL_KICK => {
            let (member, target) = context.fetch_target_member().await?;
            context.platform.kick(&member, context.audit_reason()).await?;

            let line = context
                .line("REMOVE_MEMBER_KICK")
                .field("member", target.display())
                .field("reason", context.optional_text(OPT_REASON));
            context.append_after_action(line).await?;
            Ok(HandlerOutcome::Done(format!(
                "✅ {} was kicked.",
                target.mention()
            )))
        }
        REMOVAL_ROLE => {
            let Some(role) = context.invocation.role(OPT_ROLE) else {
                return Ok(HandlerOutcome::Rejected(
                    CommandRejection::RoleRequiredForAction,
                ));
            };
            let (member, target) = context.fetch_target_member().await?;
            context
                .platform
                .remove_role(&member, &role.id, context.audit_reason())
                .await?;

            let line = context
                .line("REMOVE_MEMBER_ROLE")
                .field("member", target.display())
                .field("role", role.display())
                .field("reason", context.optional_text(OPT_REASON));
            context.append_after_action(line).await?;
            Ok(HandlerOutcome::Done(format!(
                "✅ Removed the role **{}** from {}.",
                role.name,
                target.mention()
            )))
        }
        other => Err(anyhow!("validated removal action `{other}` is unsupported")),
    }
}

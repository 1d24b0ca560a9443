//! Bridges serenity gateway events to the command dispatcher.

use std::sync::Arc;

use anyhow::Result;
use serenity::all::{
    ChannelType, CommandInteraction, Context, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage, EditInteractionResponse,
    EventHandler, Interaction, Ready, ResolvedValue,
};
use serenity::async_trait;
use tracing::{debug, info, warn};
use warden_commands::{CommandDispatcher, CommandReply};
use warden_core::{ArgValue, CommandInvocation, RoleRef, UserRef};

pub(crate) struct GatewayHandler {
    dispatcher: Arc<CommandDispatcher>,
}

impl GatewayHandler {
    pub(crate) fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventHandler for GatewayHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = ready.user.tag().as_str(),
            guilds = ready.guilds.len(),
            "bot online"
        );
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let replies = SerenityReplies {
            ctx: &ctx,
            command: &command,
        };
        // Discord drops interactions not acknowledged within three seconds.
        let acknowledged = acknowledge(&replies).await;

        let invocation = invocation_from_command(&command);
        debug!(
            command = invocation.name.as_str(),
            actor = invocation.actor.id.as_str(),
            acknowledged,
            "command received"
        );
        let reply = self.dispatcher.dispatch(&invocation).await;
        let delivery = deliver_reply(&replies, acknowledged, &reply).await;
        debug!(
            command = invocation.name.as_str(),
            outcome = reply.outcome.as_str(),
            delivery = delivery.as_str(),
            "interaction reply handled"
        );
    }
}

/// Interaction response calls used to deliver one reply per command.
#[async_trait]
pub(crate) trait InteractionReplies: Send + Sync {
    /// Acknowledges the interaction with an ephemeral "thinking" state.
    async fn defer(&self) -> Result<()>;

    async fn respond(&self, reply: &CommandReply) -> Result<()>;

    /// Replaces the deferred placeholder with the reply.
    async fn edit_deferred(&self, reply: &CommandReply) -> Result<()>;

    async fn follow_up(&self, reply: &CommandReply) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReplyDelivery {
    Edited,
    Responded,
    FollowedUp,
    Lost,
}

impl ReplyDelivery {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Edited => "edited",
            Self::Responded => "responded",
            Self::FollowedUp => "followed_up",
            Self::Lost => "lost",
        }
    }
}

pub(crate) async fn acknowledge(replies: &dyn InteractionReplies) -> bool {
    match replies.defer().await {
        Ok(()) => true,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "failed to defer interaction");
            false
        }
    }
}

/// Delivers `reply` once: edits the deferred response when acknowledged,
/// otherwise responds directly, and falls back to a follow-up either way.
pub(crate) async fn deliver_reply(
    replies: &dyn InteractionReplies,
    acknowledged: bool,
    reply: &CommandReply,
) -> ReplyDelivery {
    let primary = if acknowledged {
        replies
            .edit_deferred(reply)
            .await
            .map(|()| ReplyDelivery::Edited)
    } else {
        replies.respond(reply).await.map(|()| ReplyDelivery::Responded)
    };
    let error = match primary {
        Ok(delivery) => return delivery,
        Err(error) => error,
    };

    debug!(error = %format!("{error:#}"), "primary interaction reply failed; sending follow-up");
    match replies.follow_up(reply).await {
        Ok(()) => ReplyDelivery::FollowedUp,
        Err(error) => {
            warn!(
                outcome = reply.outcome.as_str(),
                error = %format!("{error:#}"),
                "failed to deliver interaction reply"
            );
            ReplyDelivery::Lost
        }
    }
}

struct SerenityReplies<'a> {
    ctx: &'a Context,
    command: &'a CommandInteraction,
}

#[async_trait]
impl InteractionReplies for SerenityReplies<'_> {
    async fn defer(&self) -> Result<()> {
        let message = CreateInteractionResponseMessage::new().ephemeral(true);
        self.command
            .create_response(&self.ctx.http, CreateInteractionResponse::Defer(message))
            .await?;
        Ok(())
    }

    async fn respond(&self, reply: &CommandReply) -> Result<()> {
        let message = CreateInteractionResponseMessage::new()
            .content(reply.content.as_str())
            .ephemeral(reply.ephemeral);
        self.command
            .create_response(&self.ctx.http, CreateInteractionResponse::Message(message))
            .await?;
        Ok(())
    }

    async fn edit_deferred(&self, reply: &CommandReply) -> Result<()> {
        self.command
            .edit_response(
                &self.ctx.http,
                EditInteractionResponse::new().content(reply.content.as_str()),
            )
            .await?;
        Ok(())
    }

    async fn follow_up(&self, reply: &CommandReply) -> Result<()> {
        let followup = CreateInteractionResponseFollowup::new()
            .content(reply.content.as_str())
            .ephemeral(reply.ephemeral);
        self.command
            .create_followup(&self.ctx.http, followup)
            .await?;
        Ok(())
    }
}

pub(crate) fn invocation_from_command(command: &CommandInteraction) -> CommandInvocation {
    let actor = UserRef::new(command.user.id.to_string(), command.user.tag());
    let mut invocation = CommandInvocation::new(command.data.name.clone(), actor);
    if let Some(guild_id) = command.guild_id {
        invocation = invocation.in_guild(guild_id.to_string());
    }
    let text_based = command
        .channel
        .as_ref()
        .is_some_and(|channel| is_text_based(channel.kind));
    invocation = invocation.in_channel(command.channel_id.to_string(), text_based);

    for option in command.data.options() {
        match resolved_argument(&option.value) {
            Some(value) => invocation = invocation.with_option(option.name, value),
            None => debug!(option = option.name, "ignoring unsupported option value"),
        }
    }
    invocation
}

pub(crate) fn resolved_argument(value: &ResolvedValue<'_>) -> Option<ArgValue> {
    match value {
        ResolvedValue::String(text) => Some(ArgValue::String((*text).to_string())),
        ResolvedValue::User(user, _) => Some(ArgValue::User(UserRef::new(
            user.id.to_string(),
            user.tag(),
        ))),
        ResolvedValue::Role(role) => Some(ArgValue::Role(RoleRef::new(
            role.id.to_string(),
            role.name.clone(),
        ))),
        _ => None,
    }
}

/// Channels whose members can post messages, threads and voice text chat included.
pub(crate) fn is_text_based(kind: ChannelType) -> bool {
    matches!(
        kind,
        ChannelType::Text
            | ChannelType::Private
            | ChannelType::Voice
            | ChannelType::GroupDm
            | ChannelType::News
            | ChannelType::NewsThread
            | ChannelType::PublicThread
            | ChannelType::PrivateThread
            | ChannelType::Stage
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{bail, Result};
    use serenity::all::{ChannelType, ResolvedValue};
    use serenity::async_trait;
    use warden_commands::{CommandReply, ReplyOutcome};
    use warden_core::ArgValue;

    use super::{
        acknowledge, deliver_reply, is_text_based, resolved_argument, InteractionReplies,
        ReplyDelivery,
    };

    #[derive(Default)]
    struct ScriptedReplies {
        failing: Vec<&'static str>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedReplies {
        fn failing(failing: &[&'static str]) -> Self {
            Self {
                failing: failing.to_vec(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call(&self, name: &'static str) -> Result<()> {
            self.calls.lock().expect("calls lock").push(name);
            if self.failing.contains(&name) {
                bail!("{name} rejected: Unknown interaction (10062)");
            }
            Ok(())
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    #[async_trait]
    impl InteractionReplies for ScriptedReplies {
        async fn defer(&self) -> Result<()> {
            self.call("defer")
        }

        async fn respond(&self, _reply: &CommandReply) -> Result<()> {
            self.call("respond")
        }

        async fn edit_deferred(&self, _reply: &CommandReply) -> Result<()> {
            self.call("edit")
        }

        async fn follow_up(&self, _reply: &CommandReply) -> Result<()> {
            self.call("follow_up")
        }
    }

    fn completed_reply() -> CommandReply {
        CommandReply {
            content: "✅ <@200> was kicked.".to_string(),
            ephemeral: true,
            outcome: ReplyOutcome::Completed,
        }
    }

    #[tokio::test]
    async fn functional_deferred_interaction_is_answered_by_editing() {
        let replies = ScriptedReplies::default();

        let acknowledged = acknowledge(&replies).await;
        let delivery = deliver_reply(&replies, acknowledged, &completed_reply()).await;

        assert!(acknowledged);
        assert_eq!(delivery, ReplyDelivery::Edited);
        assert_eq!(replies.calls(), vec!["defer", "edit"]);
    }

    #[tokio::test]
    async fn regression_failed_edit_falls_back_to_follow_up() {
        let replies = ScriptedReplies::failing(&["edit"]);

        let delivery = deliver_reply(&replies, true, &completed_reply()).await;

        assert_eq!(delivery, ReplyDelivery::FollowedUp);
        assert_eq!(replies.calls(), vec!["edit", "follow_up"]);
    }

    #[tokio::test]
    async fn regression_failed_defer_still_sends_one_direct_response() {
        let replies = ScriptedReplies::failing(&["defer"]);

        let acknowledged = acknowledge(&replies).await;
        let delivery = deliver_reply(&replies, acknowledged, &completed_reply()).await;

        assert!(!acknowledged);
        assert_eq!(delivery, ReplyDelivery::Responded);
        assert_eq!(replies.calls(), vec!["defer", "respond"]);
    }

    #[tokio::test]
    async fn regression_reply_is_lost_only_when_every_channel_fails() {
        let replies = ScriptedReplies::failing(&["respond", "follow_up"]);

        let delivery = deliver_reply(&replies, false, &completed_reply()).await;

        assert_eq!(delivery, ReplyDelivery::Lost);
        assert_eq!(replies.calls(), vec!["respond", "follow_up"]);
    }

    #[test]
    fn unit_text_channels_and_threads_accept_lockdown() {
        assert!(is_text_based(ChannelType::Text));
        assert!(is_text_based(ChannelType::News));
        assert!(is_text_based(ChannelType::PublicThread));
        assert!(!is_text_based(ChannelType::Category));
        assert!(!is_text_based(ChannelType::Forum));
    }

    #[test]
    fn unit_string_options_convert_and_numbers_are_ignored() {
        assert_eq!(
            resolved_argument(&ResolvedValue::String("night shift")),
            Some(ArgValue::String("night shift".to_string()))
        );
        assert_eq!(resolved_argument(&ResolvedValue::Integer(4)), None);
        assert_eq!(resolved_argument(&ResolvedValue::Boolean(true)), None);
    }
}

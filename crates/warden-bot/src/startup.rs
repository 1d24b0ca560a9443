use std::sync::Arc;

use anyhow::{Context, Result};
use serenity::all::{Client, GatewayIntents};
use tracing::{info, warn};
use warden_commands::{registration_payload, CommandDispatcher};
use warden_discord::{DiscordApiClient, DiscordPlatform};
use warden_docs::{AppendQueue, GoogleDocsAppender, GoogleDocsConfig};

use crate::bootstrap_helpers::non_empty;
use crate::cli_args::Cli;
use crate::gateway_runtime::GatewayHandler;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RegistrationOutcome {
    Skipped,
    Guild { guild_id: String, count: usize },
    Global { count: usize },
}

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    if cli.print_commands {
        let rendered = serde_json::to_string_pretty(&registration_payload())
            .context("failed to render slash command payload")?;
        println!("{rendered}");
        return Ok(());
    }

    let token = non_empty(cli.discord_token.as_deref())
        .map(str::to_string)
        .context("DISCORD_TOKEN is required to connect to the gateway")?;
    let discord = DiscordApiClient::new(
        cli.discord_api_base.clone(),
        token.clone(),
        cli.request_timeout_ms,
    )?;

    if cli.skip_command_registration {
        info!("slash command registration skipped by configuration");
    } else {
        let application_id = non_empty(cli.discord_client_id.as_deref());
        let guild_id = non_empty(cli.guild_id.as_deref());
        register_commands(&discord, application_id, guild_id).await?;
    }

    let dispatcher = build_dispatcher(&cli, discord)?;
    run_gateway(&token, dispatcher).await
}

fn build_dispatcher(cli: &Cli, discord: DiscordApiClient) -> Result<Arc<CommandDispatcher>> {
    if non_empty(cli.google_creds_json.as_deref()).is_none()
        || non_empty(cli.google_doc_id.as_deref()).is_none()
    {
        warn!("GOOGLE_CREDS_JSON or GOOGLE_DOC_ID is not set; logging commands will fail until configured");
    }
    let appender = GoogleDocsAppender::new(GoogleDocsConfig {
        api_base: cli.google_docs_api_base.clone(),
        credentials_json: cli.google_creds_json.clone(),
        document_id: cli.google_doc_id.clone(),
        request_timeout_ms: cli.request_timeout_ms,
    })?;
    let document = AppendQueue::spawn(Arc::new(appender), cli.append_queue_capacity);
    let platform = DiscordPlatform::new(discord);
    Ok(Arc::new(CommandDispatcher::new(
        Arc::new(platform),
        Arc::new(document),
    )))
}

/// Bulk-overwrites the command set, scoped to `guild_id` when present.
pub(crate) async fn register_commands(
    discord: &DiscordApiClient,
    application_id: Option<&str>,
    guild_id: Option<&str>,
) -> Result<RegistrationOutcome> {
    let Some(application_id) = application_id else {
        info!("DISCORD_CLIENT_ID is not set; skipping slash command registration");
        return Ok(RegistrationOutcome::Skipped);
    };

    let payload = registration_payload();
    let count = discord
        .bulk_overwrite_commands(application_id, guild_id, &payload)
        .await
        .context("failed to register slash commands")?;
    let outcome = match guild_id {
        Some(guild_id) => {
            info!(guild_id, count, "slash commands registered on guild");
            RegistrationOutcome::Guild {
                guild_id: guild_id.to_string(),
                count,
            }
        }
        None => {
            info!(count, "slash commands registered globally");
            RegistrationOutcome::Global { count }
        }
    };
    Ok(outcome)
}

async fn run_gateway(token: &str, dispatcher: Arc<CommandDispatcher>) -> Result<()> {
    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
    let mut client = Client::builder(token, intents)
        .event_handler(GatewayHandler::new(dispatcher))
        .await
        .context("failed to build discord gateway client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown requested; closing gateway shards");
            shard_manager.shutdown_all().await;
        }
    });

    client
        .start()
        .await
        .context("discord gateway client stopped with an error")
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;
    use warden_discord::DiscordApiClient;

    use super::{register_commands, RegistrationOutcome};

    fn client(server: &MockServer) -> DiscordApiClient {
        DiscordApiClient::new(server.base_url(), "bot-token".to_string(), 5_000)
            .expect("discord client")
    }

    #[tokio::test]
    async fn functional_registration_targets_guild_when_configured() {
        let server = MockServer::start();
        let guild = server.mock(|when, then| {
            when.method(PUT)
                .path("/applications/111/guilds/222/commands")
                .header("authorization", "Bot bot-token");
            then.status(200).json_body(json!([{ "id": "1" }, { "id": "2" }]));
        });

        let outcome = register_commands(&client(&server), Some("111"), Some("222"))
            .await
            .expect("registration");

        guild.assert();
        assert_eq!(
            outcome,
            RegistrationOutcome::Guild {
                guild_id: "222".to_string(),
                count: 2
            }
        );
    }

    #[tokio::test]
    async fn functional_registration_skips_without_application_id() {
        let server = MockServer::start();
        let global = server.mock(|when, then| {
            when.method(PUT).path("/applications/111/commands");
            then.status(200).json_body(json!([]));
        });

        let outcome = register_commands(&client(&server), None, None)
            .await
            .expect("skip");

        assert_eq!(outcome, RegistrationOutcome::Skipped);
        global.assert_calls(0);
    }

    #[tokio::test]
    async fn regression_registration_failure_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/applications/111/commands");
            then.status(401).body("{\"message\":\"401: Unauthorized\"}");
        });

        let error = register_commands(&client(&server), Some("111"), None)
            .await
            .expect_err("401 must fail");

        assert!(format!("{error:#}").contains("status 401"));
    }
}

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::{json, Value};
use warden_commands::{CommandDispatcher, ReplyOutcome};
use warden_core::{CommandInvocation, RoleRef, UserRef};
use warden_discord::{DiscordApiClient, DiscordPlatform};
use warden_docs::{AppendQueue, GoogleDocsAppender, GoogleDocsConfig};

const TEST_PRIVATE_KEY: &str =
    include_str!("../../../crates/warden-docs/testdata/service_account_key.pem");

const GUILD: &str = "100000000000000001";
const CHANNEL: &str = "200000000000000002";
const ACTOR: &str = "300000000000000003";
const MEMBER: &str = "300000000000000004";
const ROLE: &str = "400000000000000005";

struct Servers {
    discord: MockServer,
    google: MockServer,
}

impl Servers {
    fn start() -> Self {
        Self {
            discord: MockServer::start(),
            google: MockServer::start(),
        }
    }

    fn dispatcher(&self) -> CommandDispatcher {
        let discord = DiscordApiClient::new(self.discord.base_url(), "bot-token".to_string(), 3_000)
            .expect("discord client");
        let appender = GoogleDocsAppender::new(GoogleDocsConfig {
            api_base: self.google.base_url(),
            credentials_json: Some(
                json!({
                    "client_email": "warden@duty-desk.iam.gserviceaccount.com",
                    "private_key": TEST_PRIVATE_KEY,
                    "token_uri": self.google.url("/token"),
                })
                .to_string(),
            ),
            document_id: Some("doc-1".to_string()),
            request_timeout_ms: 3_000,
        })
        .expect("appender");
        let queue = AppendQueue::spawn(Arc::new(appender), 8);
        CommandDispatcher::new(Arc::new(DiscordPlatform::new(discord)), Arc::new(queue))
            .with_clock(fixed_now)
    }

    fn mock_google_token(&self) -> httpmock::Mock<'_> {
        self.google.mock(|when, then| {
            when.method(POST).path("/token");
            then.status(200)
                .json_body(json!({ "access_token": "ya29.it", "expires_in": 3599 }));
        })
    }

    fn mock_document(&self, end_index: u64) -> httpmock::Mock<'_> {
        self.google.mock(|when, then| {
            when.method(GET)
                .path("/documents/doc-1")
                .header("authorization", "Bearer ya29.it");
            then.status(200).json_body(json!({
                "body": { "content": [
                    { "endIndex": 1, "sectionBreak": {} },
                    { "startIndex": 1, "endIndex": end_index, "paragraph": {} }
                ]}
            }));
        })
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(1_770_370_200_123)
        .single()
        .expect("valid timestamp")
}

fn actor() -> UserRef {
    UserRef::new(ACTOR, "desk#0001")
}

fn insert_request(index: u64, text: &str) -> Value {
    json!({
        "requests": [
            { "insertText": { "location": { "index": index }, "text": text } }
        ]
    })
}

#[tokio::test]
async fn integration_promote_adds_role_then_appends_line_to_document() {
    let servers = Servers::start();
    let fetch = servers.discord.mock(|when, then| {
        when.method(GET)
            .path(format!("/guilds/{GUILD}/members/{MEMBER}"))
            .header("authorization", "Bot bot-token");
        then.status(200).json_body(json!({
            "user": { "id": MEMBER, "username": "rookie" },
            "roles": []
        }));
    });
    let grant = servers.discord.mock(|when, then| {
        when.method(PUT)
            .path(format!("/guilds/{GUILD}/members/{MEMBER}/roles/{ROLE}"))
            .header("x-audit-log-reason", "passed%20exam");
        then.status(204);
    });
    let token = servers.mock_google_token();
    let document = servers.mock_document(120);
    let line = format!(
        "PROMOTE | 2026-02-06T09:30:00.123Z | by desk#0001 ({ACTOR}) | member=rookie#0002 ({MEMBER}) | role=Sergeant ({ROLE}) | reason=passed exam\n"
    );
    let insert = servers.google.mock(|when, then| {
        when.method(POST)
            .path("/documents/doc-1:batchUpdate")
            .json_body(insert_request(119, &line));
        then.status(200).json_body(json!({ "replies": [{}] }));
    });

    let request = CommandInvocation::new("promote-member", actor())
        .in_guild(GUILD)
        .in_channel(CHANNEL, true)
        .with_user("member", UserRef::new(MEMBER, "rookie#0002"))
        .with_role("role", RoleRef::new(ROLE, "Sergeant"))
        .with_string("reason", "passed exam");
    let reply = servers.dispatcher().dispatch(&request).await;

    assert_eq!(reply.outcome, ReplyOutcome::Completed, "{}", reply.content);
    assert!(reply.ephemeral);
    fetch.assert();
    grant.assert();
    token.assert();
    document.assert();
    insert.assert();
}

#[tokio::test]
async fn integration_lockdown_close_edits_overwrite_then_logs_channel() {
    let servers = Servers::start();
    servers.discord.mock(|when, then| {
        when.method(GET).path(format!("/channels/{CHANNEL}"));
        then.status(200).json_body(json!({
            "id": CHANNEL,
            "permission_overwrites": []
        }));
    });
    let overwrite = servers.discord.mock(|when, then| {
        when.method(PUT)
            .path(format!("/channels/{CHANNEL}/permissions/{GUILD}"))
            .json_body(json!({ "type": 0, "allow": "0", "deny": "2048" }));
        then.status(204);
    });
    servers.mock_google_token();
    servers.mock_document(2);
    let insert = servers.google.mock(|when, then| {
        when.method(POST)
            .path("/documents/doc-1:batchUpdate")
            .body_includes(format!("guild={GUILD} | channel={CHANNEL}"))
            .body_includes("\"index\":1");
        then.status(200).json_body(json!({ "replies": [{}] }));
    });

    let request = CommandInvocation::new("lockdown-close", actor())
        .in_guild(GUILD)
        .in_channel(CHANNEL, true);
    let reply = servers.dispatcher().dispatch(&request).await;

    assert_eq!(reply.outcome, ReplyOutcome::Completed, "{}", reply.content);
    overwrite.assert();
    insert.assert();
}

#[tokio::test]
async fn integration_concurrent_commands_share_one_token_and_append_in_turn() {
    let servers = Servers::start();
    let token = servers.mock_google_token();
    let document = servers.mock_document(40);
    let insert = servers.google.mock(|when, then| {
        when.method(POST)
            .path("/documents/doc-1:batchUpdate")
            .body_includes("WEEK_CLOSE | ");
        then.status(200).json_body(json!({ "replies": [{}] }));
    });

    let dispatcher = Arc::new(servers.dispatcher());
    let mut tasks = Vec::new();
    for index in 0..5 {
        let dispatcher = Arc::clone(&dispatcher);
        tasks.push(tokio::spawn(async move {
            let request = CommandInvocation::new("week-close", actor())
                .in_guild(GUILD)
                .with_string("note", format!("batch {index}"));
            dispatcher.dispatch(&request).await
        }));
    }
    for task in tasks {
        let reply = task.await.expect("dispatch task");
        assert_eq!(reply.outcome, ReplyOutcome::Completed, "{}", reply.content);
    }

    token.assert_calls(1);
    document.assert_calls(5);
    insert.assert_calls(5);
}

#[tokio::test]
async fn regression_document_failure_after_kick_yields_single_error_reply() {
    let servers = Servers::start();
    servers.discord.mock(|when, then| {
        when.method(GET).path(format!("/guilds/{GUILD}/members/{MEMBER}"));
        then.status(200)
            .json_body(json!({ "user": { "id": MEMBER }, "roles": [] }));
    });
    let kick = servers.discord.mock(|when, then| {
        when.method(DELETE)
            .path(format!("/guilds/{GUILD}/members/{MEMBER}"));
        then.status(204);
    });
    servers.mock_google_token();
    servers.google.mock(|when, then| {
        when.method(GET).path("/documents/doc-1");
        then.status(403)
            .json_body(json!({ "error": { "message": "The caller does not have permission" } }));
    });

    let request = CommandInvocation::new("remove-member", actor())
        .in_guild(GUILD)
        .with_user("member", UserRef::new(MEMBER, "rookie#0002"))
        .with_string("action", "kick");
    let reply = servers.dispatcher().dispatch(&request).await;

    assert_eq!(reply.outcome, ReplyOutcome::Failed);
    assert_eq!(reply.content, "❌ Command failed. Check the bot logs.");
    kick.assert_calls(1);
}

#[tokio::test]
async fn regression_missing_document_configuration_fails_before_any_google_request() {
    let servers = Servers::start();
    let discord = DiscordApiClient::new(servers.discord.base_url(), "bot-token".to_string(), 3_000)
        .expect("discord client");
    let appender = GoogleDocsAppender::new(GoogleDocsConfig {
        api_base: servers.google.base_url(),
        ..GoogleDocsConfig::default()
    })
    .expect("appender");
    let dispatcher = CommandDispatcher::new(
        Arc::new(DiscordPlatform::new(discord)),
        Arc::new(AppendQueue::spawn(Arc::new(appender), 1)),
    );
    let token = servers.mock_google_token();

    let request = CommandInvocation::new("badge-request", actor()).with_string("badge", "K9");
    let reply = dispatcher.dispatch(&request).await;

    assert_eq!(reply.outcome, ReplyOutcome::Failed);
    token.assert_calls(0);
}

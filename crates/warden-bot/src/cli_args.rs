use clap::{ArgAction, Parser};
use warden_discord::DEFAULT_DISCORD_API_BASE;
use warden_docs::DEFAULT_DOCS_API_BASE;

fn parse_positive_u64(value: &str) -> Result<u64, String> {
    let parsed = value
        .parse::<u64>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

fn parse_positive_usize(value: &str) -> Result<usize, String> {
    let parsed = value
        .parse::<usize>()
        .map_err(|error| format!("failed to parse integer: {error}"))?;
    if parsed == 0 {
        return Err("value must be greater than 0".to_string());
    }
    Ok(parsed)
}

#[derive(Debug, Parser)]
#[command(
    name = "warden",
    about = "Duty desk slash-command bot that records every action in a Google Doc",
    version
)]
pub(crate) struct Cli {
    #[arg(
        long = "discord-token",
        env = "DISCORD_TOKEN",
        hide_env_values = true,
        help = "Bot token used for the gateway connection and REST calls"
    )]
    pub(crate) discord_token: Option<String>,

    #[arg(
        long = "discord-client-id",
        env = "DISCORD_CLIENT_ID",
        help = "Application id used to register slash commands"
    )]
    pub(crate) discord_client_id: Option<String>,

    #[arg(
        long = "guild-id",
        env = "GUILD_ID",
        help = "Register commands on this guild only (applies immediately)"
    )]
    pub(crate) guild_id: Option<String>,

    #[arg(
        long = "google-creds-json",
        env = "GOOGLE_CREDS_JSON",
        hide_env_values = true,
        help = "Service account JSON with client_email and private_key"
    )]
    pub(crate) google_creds_json: Option<String>,

    #[arg(
        long = "google-doc-id",
        env = "GOOGLE_DOC_ID",
        help = "Id of the Google Doc that receives one line per command"
    )]
    pub(crate) google_doc_id: Option<String>,

    #[arg(
        long = "discord-api-base",
        env = "WARDEN_DISCORD_API_BASE",
        default_value = DEFAULT_DISCORD_API_BASE,
        help = "Base URL of the Discord REST API"
    )]
    pub(crate) discord_api_base: String,

    #[arg(
        long = "google-docs-api-base",
        env = "WARDEN_GOOGLE_DOCS_API_BASE",
        default_value = DEFAULT_DOCS_API_BASE,
        help = "Base URL of the Google Docs REST API"
    )]
    pub(crate) google_docs_api_base: String,

    #[arg(
        long = "request-timeout-ms",
        env = "WARDEN_REQUEST_TIMEOUT_MS",
        default_value_t = 10_000,
        value_parser = parse_positive_u64,
        help = "Timeout in milliseconds for every outbound HTTP request"
    )]
    pub(crate) request_timeout_ms: u64,

    #[arg(
        long = "append-queue-capacity",
        env = "WARDEN_APPEND_QUEUE_CAPACITY",
        default_value_t = 64,
        value_parser = parse_positive_usize,
        help = "Pending document appends buffered before callers wait"
    )]
    pub(crate) append_queue_capacity: usize,

    #[arg(
        long = "skip-command-registration",
        env = "WARDEN_SKIP_COMMAND_REGISTRATION",
        default_value_t = false,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        help = "Do not overwrite the registered slash commands at startup"
    )]
    pub(crate) skip_command_registration: bool,

    #[arg(
        long = "print-commands",
        default_value_t = false,
        help = "Print the slash command registration payload as JSON and exit"
    )]
    pub(crate) print_commands: bool,
}

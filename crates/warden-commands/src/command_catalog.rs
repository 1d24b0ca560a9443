//! Static description of every slash command the bot serves.

use serde_json::{json, Value};
use warden_core::ArgKind;
use warden_discord::{KICK_MEMBERS, MANAGE_CHANNELS, MANAGE_ROLES};

pub(crate) const OPT_MEMBER: &str = "member";
pub(crate) const OPT_ROLE: &str = "role";
pub(crate) const OPT_REASON: &str = "reason";
pub(crate) const OPT_ACTION: &str = "action";
pub(crate) const OPT_NOTE: &str = "note";
pub(crate) const OPT_FULL_NAME: &str = "full_name";
pub(crate) const OPT_NATIONAL_ID: &str = "national_id";
pub(crate) const OPT_CERTIFICATE: &str = "certificate";
pub(crate) const OPT_BADGE: &str = "badge";
pub(crate) const OPT_DETAILS: &str = "details";
pub(crate) const OPT_FROM: &str = "from";
pub(crate) const OPT_UNTIL: &str = "until";

pub(crate) const SHIFT_OPEN: &str = "open";
pub(crate) const SHIFT_CLOSE: &str = "close";
pub(crate) const REMOVAL_KICK: &str = "kick";
pub(crate) const REMOVAL_ROLE: &str = "remove-role";

const CHAT_INPUT_COMMAND_TYPE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    Info,
    Uptime,
    Process,
    CertificateAdd,
    CertificateRemove,
    BadgeRequest,
    LeaveAdd,
    LeaveCancel,
    WeekClose,
    TrafficShift,
    LockdownOpen,
    LockdownClose,
    PromoteMember,
    DemoteMember,
    RemoveMember,
}

impl CommandName {
    pub const ALL: [Self; 15] = [
        Self::Info,
        Self::Process,
        Self::CertificateAdd,
        Self::CertificateRemove,
        Self::BadgeRequest,
        Self::LeaveAdd,
        Self::LeaveCancel,
        Self::WeekClose,
        Self::LockdownOpen,
        Self::LockdownClose,
        Self::TrafficShift,
        Self::PromoteMember,
        Self::DemoteMember,
        Self::RemoveMember,
        Self::Uptime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Uptime => "uptime",
            Self::Process => "process",
            Self::CertificateAdd => "certificate-add",
            Self::CertificateRemove => "certificate-remove",
            Self::BadgeRequest => "badge-request",
            Self::LeaveAdd => "leave-add",
            Self::LeaveCancel => "leave-cancel",
            Self::WeekClose => "week-close",
            Self::TrafficShift => "traffic-shift",
            Self::LockdownOpen => "lockdown-open",
            Self::LockdownClose => "lockdown-close",
            Self::PromoteMember => "promote-member",
            Self::DemoteMember => "demote-member",
            Self::RemoveMember => "remove-member",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == raw.trim())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Where a command may run.
pub enum InvocationContext {
    Anywhere,
    Guild,
    GuildTextChannel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ArgKind,
    pub required: bool,
    pub choices: &'static [&'static str],
}

impl OptionSpec {
    fn new(name: &'static str, description: &'static str, kind: ArgKind) -> Self {
        Self {
            name,
            description,
            kind,
            required: false,
            choices: &[],
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    fn discord_type(&self) -> u8 {
        match self.kind {
            ArgKind::String => 3,
            ArgKind::User => 6,
            ArgKind::Role => 8,
        }
    }

    fn to_registration_json(&self) -> Value {
        let mut option = json!({
            "type": self.discord_type(),
            "name": self.name,
            "description": self.description,
            "required": self.required,
        });
        if !self.choices.is_empty() {
            option["choices"] = Value::Array(
                self.choices
                    .iter()
                    .map(|choice| json!({ "name": choice, "value": choice }))
                    .collect(),
            );
        }
        option
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: CommandName,
    pub description: &'static str,
    pub options: Vec<OptionSpec>,
    pub context: InvocationContext,
    /// Permission bits a member needs by default to see the command.
    pub default_member_permissions: Option<u64>,
}

impl CommandSpec {
    fn new(name: CommandName, description: &'static str) -> Self {
        Self {
            name,
            description,
            options: Vec::new(),
            context: InvocationContext::Anywhere,
            default_member_permissions: None,
        }
    }

    fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    fn context(mut self, context: InvocationContext) -> Self {
        self.context = context;
        self
    }

    fn permissions(mut self, permissions: u64) -> Self {
        self.default_member_permissions = Some(permissions);
        self
    }

    pub fn option_spec(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|option| option.name == name)
    }

    pub fn to_registration_json(&self) -> Value {
        let mut command = json!({
            "type": CHAT_INPUT_COMMAND_TYPE,
            "name": self.name.as_str(),
            "description": self.description,
        });
        if !self.options.is_empty() {
            command["options"] = Value::Array(
                self.options
                    .iter()
                    .map(OptionSpec::to_registration_json)
                    .collect(),
            );
        }
        if let Some(permissions) = self.default_member_permissions {
            command["default_member_permissions"] = Value::String(permissions.to_string());
        }
        command
    }
}

fn member_option() -> OptionSpec {
    OptionSpec::new(OPT_MEMBER, "Member", ArgKind::User).required()
}

fn reason_option() -> OptionSpec {
    OptionSpec::new(OPT_REASON, "Reason", ArgKind::String)
}

fn note_option() -> OptionSpec {
    OptionSpec::new(OPT_NOTE, "Optional note", ArgKind::String)
}

pub fn command_spec(name: CommandName) -> CommandSpec {
    let spec = |description| CommandSpec::new(name, description);
    match name {
        CommandName::Info => spec("Bot status"),
        CommandName::Uptime => spec("How long the bot has been running"),
        CommandName::Process => spec("Record a processing entry")
            .option(OptionSpec::new(OPT_FULL_NAME, "Full name", ArgKind::String).required())
            .option(OptionSpec::new(OPT_NATIONAL_ID, "National ID number", ArgKind::String).required()),
        CommandName::CertificateAdd => spec("Add a certificate to a member")
            .option(member_option())
            .option(OptionSpec::new(OPT_CERTIFICATE, "Certificate name", ArgKind::String).required()),
        CommandName::CertificateRemove => spec("Remove a certificate from a member")
            .option(member_option())
            .option(OptionSpec::new(OPT_CERTIFICATE, "Certificate name", ArgKind::String).required()),
        CommandName::BadgeRequest => spec("Request a badge")
            .option(OptionSpec::new(OPT_BADGE, "Badge name", ArgKind::String).required())
            .option(OptionSpec::new(OPT_DETAILS, "Details or motivation", ArgKind::String)),
        CommandName::LeaveAdd => spec("Add leave for a member")
            .option(member_option())
            .option(OptionSpec::new(OPT_FROM, "From (e.g. 2026-02-06)", ArgKind::String).required())
            .option(OptionSpec::new(OPT_UNTIL, "Until (e.g. 2026-02-10)", ArgKind::String).required())
            .option(reason_option()),
        CommandName::LeaveCancel => spec("Cancel leave for a member")
            .option(member_option())
            .option(OptionSpec::new(OPT_REASON, "Cancellation reason", ArgKind::String)),
        CommandName::WeekClose => spec("Close the timesheet week and record it")
            .option(note_option()),
        CommandName::TrafficShift => spec("Open or close the traffic shift timesheet")
            .option(
                OptionSpec::new(OPT_ACTION, "What do you want to do?", ArgKind::String)
                    .required()
                    .choices(&[SHIFT_OPEN, SHIFT_CLOSE]),
            )
            .option(note_option()),
        CommandName::LockdownOpen => spec("Lift the lockdown on this channel")
            .context(InvocationContext::GuildTextChannel)
            .permissions(MANAGE_CHANNELS),
        CommandName::LockdownClose => spec("Lock this channel down")
            .context(InvocationContext::GuildTextChannel)
            .permissions(MANAGE_CHANNELS),
        CommandName::PromoteMember => spec("Promote a member (adds a role)")
            .context(InvocationContext::Guild)
            .permissions(MANAGE_ROLES)
            .option(member_option())
            .option(OptionSpec::new(OPT_ROLE, "New role", ArgKind::Role).required())
            .option(reason_option()),
        CommandName::DemoteMember => spec("Demote a member (removes a role)")
            .context(InvocationContext::Guild)
            .permissions(MANAGE_ROLES)
            .option(member_option())
            .option(OptionSpec::new(OPT_ROLE, "Role to remove", ArgKind::Role).required())
            .option(reason_option()),
        CommandName::RemoveMember => spec("Kick a member or remove the chosen role")
            .context(InvocationContext::Guild)
            .permissions(KICK_MEMBERS)
            .option(member_option())
            .option(
                OptionSpec::new(OPT_ACTION, "What happens to the member?", ArgKind::String)
                    .required()
                    .choices(&[REMOVAL_KICK, REMOVAL_ROLE]),
            )
            .option(OptionSpec::new(
                OPT_ROLE,
                "Role to remove when the action is remove-role",
                ArgKind::Role,
            ))
            .option(reason_option()),
    }
}

pub fn catalog() -> Vec<CommandSpec> {
    CommandName::ALL.into_iter().map(command_spec).collect()
}

/// Bulk-overwrite body for the platform's application command endpoint.
pub fn registration_payload() -> Value {
    Value::Array(
        catalog()
            .iter()
            .map(CommandSpec::to_registration_json)
            .collect(),
    )
}

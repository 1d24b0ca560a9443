//! Permission bits and overwrite arithmetic for channel lockdown.

use serde::{Deserialize, Serialize};

pub const KICK_MEMBERS: u64 = 1 << 1;
pub const MANAGE_CHANNELS: u64 = 1 << 4;
pub const SEND_MESSAGES: u64 = 1 << 11;
pub const MANAGE_ROLES: u64 = 1 << 28;

/// Overwrite type for role targets; members use 1.
pub const ROLE_OVERWRITE_TYPE: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMessagesOverwrite {
    /// Explicitly deny sending messages.
    Deny,
    /// Clear the bit so the role falls back to server permissions.
    Inherit,
}

impl SendMessagesOverwrite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deny => "deny",
            Self::Inherit => "inherit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionOverwrite {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(with = "permission_string")]
    pub allow: u64,
    #[serde(with = "permission_string")]
    pub deny: u64,
}

/// Returns the `(allow, deny)` pair after changing only SEND_MESSAGES.
pub fn merge_send_messages_overwrite(
    existing: Option<&PermissionOverwrite>,
    setting: SendMessagesOverwrite,
) -> (u64, u64) {
    let (allow, deny) = existing
        .map(|overwrite| (overwrite.allow, overwrite.deny))
        .unwrap_or((0, 0));
    match setting {
        SendMessagesOverwrite::Deny => (allow & !SEND_MESSAGES, deny | SEND_MESSAGES),
        SendMessagesOverwrite::Inherit => (allow & !SEND_MESSAGES, deny & !SEND_MESSAGES),
    }
}

mod permission_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.trim()
            .parse::<u64>()
            .map_err(|error| D::Error::custom(format!("invalid permission bitset '{raw}': {error}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{
        merge_send_messages_overwrite, PermissionOverwrite, SendMessagesOverwrite, MANAGE_ROLES,
        SEND_MESSAGES,
    };

    #[test]
    fn unit_deny_keeps_unrelated_bits_and_moves_send_messages_to_deny() {
        let existing = PermissionOverwrite {
            id: "1".to_string(),
            kind: 0,
            allow: SEND_MESSAGES | 1 << 6,
            deny: 1 << 15,
        };
        let (allow, deny) =
            merge_send_messages_overwrite(Some(&existing), SendMessagesOverwrite::Deny);
        assert_eq!(allow, 1 << 6);
        assert_eq!(deny, (1 << 15) | SEND_MESSAGES);
    }

    #[test]
    fn unit_inherit_clears_send_messages_from_both_sides() {
        let existing = PermissionOverwrite {
            id: "1".to_string(),
            kind: 0,
            allow: 0,
            deny: SEND_MESSAGES | MANAGE_ROLES,
        };
        assert_eq!(
            merge_send_messages_overwrite(Some(&existing), SendMessagesOverwrite::Inherit),
            (0, MANAGE_ROLES)
        );
        assert_eq!(
            merge_send_messages_overwrite(None, SendMessagesOverwrite::Inherit),
            (0, 0)
        );
    }

    #[test]
    fn unit_overwrite_bitsets_round_trip_as_decimal_strings() {
        let parsed: PermissionOverwrite =
            serde_json::from_str(r#"{"id":"9","type":0,"allow":"0","deny":"2048"}"#)
                .expect("parse overwrite");
        assert_eq!(parsed.deny, SEND_MESSAGES);
        let rendered = serde_json::to_value(&parsed).expect("serialize");
        assert_eq!(rendered["deny"], "2048");
        assert!(serde_json::from_str::<PermissionOverwrite>(
            r#"{"id":"9","type":0,"allow":"x","deny":"0"}"#
        )
        .is_err());
    }
}

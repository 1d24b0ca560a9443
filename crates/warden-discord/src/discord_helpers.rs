/// Audit log reasons travel in a header, so they are percent-encoded and capped at 512 chars.
pub(crate) fn encode_audit_log_reason(reason: &str) -> Option<String> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return None;
    }
    let capped = trimmed.chars().take(512).collect::<String>();
    Some(urlencoding::encode(&capped).into_owned())
}

/// Discord snowflakes are decimal strings; reject anything that would alter the request path.
pub(crate) fn ensure_snowflake(label: &str, value: &str) -> anyhow::Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
        anyhow::bail!("discord {label} id '{value}' is not a snowflake");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{encode_audit_log_reason, ensure_snowflake};

    #[test]
    fn unit_encode_audit_log_reason_percent_encodes_and_skips_blank() {
        assert_eq!(encode_audit_log_reason("   "), None);
        assert_eq!(
            encode_audit_log_reason("absent 3 shifts").as_deref(),
            Some("absent%203%20shifts")
        );
        assert_eq!(encode_audit_log_reason("ă").as_deref(), Some("%C4%83"));
    }

    #[test]
    fn unit_ensure_snowflake_rejects_path_characters() {
        assert!(ensure_snowflake("guild", "81384788765712384").is_ok());
        assert!(ensure_snowflake("guild", "").is_err());
        assert!(ensure_snowflake("user", "12/../34").is_err());
    }
}

use std::time::Duration;

/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Renders an elapsed duration as `{h}h {m}m {s}s`, truncating sub-second parts.
pub fn format_uptime(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    let hours = seconds / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes}m {secs}s")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{current_unix_timestamp_ms, format_uptime};

    #[test]
    fn unit_format_uptime_handles_zero_and_long_runs() {
        assert_eq!(format_uptime(Duration::ZERO), "0h 0m 0s");
        assert_eq!(format_uptime(Duration::from_millis(59_999)), "0h 0m 59s");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "25h 1m 1s");
    }

    #[test]
    fn unit_current_unix_timestamp_ms_is_after_2020() {
        assert!(current_unix_timestamp_ms() > 1_577_836_800_000);
    }
}

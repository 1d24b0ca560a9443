/// Caps `value` at `max_chars` characters for error messages, marking the cut with `...`.
pub fn truncate_for_error(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut truncated = value.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::truncate_for_error;

    #[test]
    fn regression_truncate_for_error_preserves_unicode_boundaries() {
        assert_eq!(truncate_for_error("ăîșț", 2), "ăî...");
        assert_eq!(truncate_for_error("ok", 10), "ok");
    }
}

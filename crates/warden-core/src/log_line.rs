//! Append-only log line format written to the target document.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::invocation::UserRef;

/// Rendered in place of an optional text argument that was not supplied.
pub const PLACEHOLDER: &str = "-";

const FIELD_SEPARATOR: &str = " | ";

/// ISO-8601 UTC timestamp with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Returns the value, or [`PLACEHOLDER`] when it is absent or blank.
pub fn or_placeholder(value: Option<&str>) -> &str {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => PLACEHOLDER,
    }
}

/// Folds line breaks and other control characters into spaces so one entry stays one line.
pub fn single_line(value: &str) -> String {
    value
        .chars()
        .map(|ch| {
            if ch.is_control() || ch == '\u{2028}' || ch == '\u{2029}' {
                ' '
            } else {
                ch
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    tag: String,
    timestamp: DateTime<Utc>,
    actor: String,
    fields: Vec<String>,
}

impl LogLine {
    pub fn new(tag: impl Into<String>, timestamp: DateTime<Utc>, actor: &UserRef) -> Self {
        Self {
            tag: tag.into(),
            timestamp,
            actor: single_line(&actor.display()),
            fields: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Adds a `key=value` field.
    pub fn field(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.fields
            .push(format!("{key}={}", single_line(value.as_ref())));
        self
    }

    /// Adds a bare value with no key.
    pub fn value(mut self, value: impl AsRef<str>) -> Self {
        self.fields.push(single_line(value.as_ref()));
        self
    }

    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.fields.len() + 3);
        parts.push(self.tag.clone());
        parts.push(iso_timestamp(self.timestamp));
        parts.push(format!("by {}", self.actor));
        parts.extend(self.fields.iter().cloned());
        parts.join(FIELD_SEPARATOR)
    }
}

//! Foundational types shared across Warden crates.
//!
//! Provides the command invocation model delivered by the gateway, the
//! append-only log line format written to the target document, and small
//! time helpers used for timestamps and uptime reporting.

pub mod invocation;
pub mod log_line;
pub mod text_utils;
pub mod time_utils;

pub use invocation::{ArgKind, ArgValue, ChannelRef, CommandInvocation, RoleRef, UserRef};
pub use log_line::{iso_timestamp, or_placeholder, single_line, LogLine, PLACEHOLDER};
pub use text_utils::truncate_for_error;
pub use time_utils::{current_unix_timestamp_ms, format_uptime};

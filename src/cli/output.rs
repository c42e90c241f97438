//! Output formatting for CLI commands

use serde::Serialize;

use crate::notification::Decision;
use crate::settings::Settings;

/// Format output as JSON (pretty-printed)
pub fn format_output<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
}

/// Human-readable forwarding status
pub fn format_status(settings: &Settings) -> String {
    let state = if settings.enabled { "ACTIVE" } else { "STOPPED" };
    let target = if settings.target_number.trim().is_empty() {
        "not set"
    } else {
        settings.target_number.as_str()
    };
    format!("Status: {}\nSMS target: {}", state, target)
}

/// Decision as a single line: `forward <destination> <text>` or `drop <reason>`
pub fn format_decision(decision: &Decision) -> String {
    match decision {
        Decision::Forward { destination, text } => format!("forward {} {}", destination, text),
        Decision::Drop(reason) => format!("drop {}", reason),
    }
}

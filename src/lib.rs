use serde::{Deserialize, Serialize};

/// Common utilities for the comment-checker hooks

/// Safely truncate a UTF-8 string to a maximum number of characters
pub fn truncate_utf8_safe(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

/// Locating, downloading and memoizing the checker executable
pub mod binary;

/// Running the checker and classifying its exit status
pub mod checker;

pub mod config;
pub mod error;

/// Host hook handlers
pub mod hooks;

pub mod logging;
pub mod pending;
pub mod platform;

/// Before/after correlation with TTL expiry
pub mod tracker;

// Re-export commonly used types for convenience
pub use binary::{BinaryLocator, BinaryResolver, ReleaseLocator};
pub use checker::{CheckOptions, CheckResult};
pub use config::{load_config, Config};
pub use error::CheckerError;
pub use hooks::CommentCheckerHooks;
pub use pending::{EditPair, Mutation, MutationKind, PendingCall};
pub use platform::PlatformDescriptor;
pub use tracker::PendingCallTracker;

/// Identifiers the host passes to both tool hooks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExecuteInput {
    pub tool: String,
    #[serde(rename = "sessionID", default)]
    pub session_id: String,
    #[serde(rename = "callID")]
    pub call_id: String,
}

/// `tool.execute.before` output: the raw tool arguments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolBeforeOutput {
    #[serde(default)]
    pub args: serde_json::Value,
}

/// `tool.execute.after` output; `output` may be appended to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolAfterOutput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Payload written to the checker's stdin - Claude Code PostToolUse hook shape
#[derive(Debug, Serialize)]
pub struct CheckPayload {
    pub session_id: String,
    pub tool_name: String,
    pub transcript_path: String,
    pub cwd: String,
    pub hook_event_name: String,
    pub tool_input: ToolInputPayload,
}

#[derive(Debug, Default, Serialize)]
pub struct ToolInputPayload {
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edits: Option<Vec<EditPair>>,
}

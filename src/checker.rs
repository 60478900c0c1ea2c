//! Runs the external comment-checker against one completed mutation.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::CheckerError;
use crate::pending::{Mutation, PendingCall};
use crate::{truncate_utf8_safe, CheckPayload, ToolInputPayload};

/// Exit code the checker uses to report new comments.
pub const EXIT_COMMENTS_FOUND: i32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckResult {
    pub has_comments: bool,
    pub message: String,
}

impl CheckResult {
    pub fn clean() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub custom_prompt: Option<String>,
    pub cwd: Option<PathBuf>,
}

pub fn build_payload(call: &PendingCall, cwd: &str) -> CheckPayload {
    let mut tool_input = ToolInputPayload {
        file_path: call.file_path.clone(),
        ..Default::default()
    };
    match &call.mutation {
        Mutation::Write { content } => tool_input.content = Some(content.clone()),
        Mutation::Edit { old_string, new_string } => {
            tool_input.old_string = Some(old_string.clone());
            tool_input.new_string = Some(new_string.clone());
        }
        Mutation::MultiEdit { edits } => tool_input.edits = Some(edits.clone()),
    }

    CheckPayload {
        session_id: call.session_id.clone(),
        tool_name: call.kind().label().to_string(),
        transcript_path: String::new(),
        cwd: cwd.to_string(),
        hook_event_name: "PostToolUse".to_string(),
        tool_input,
    }
}

/// Map the checker's exit status onto a result. Only exit 2 reports comments.
pub fn classify_exit(code: Option<i32>, stderr: &[u8]) -> CheckResult {
    match code {
        Some(0) => CheckResult::clean(),
        Some(EXIT_COMMENTS_FOUND) => CheckResult {
            has_comments: true,
            message: String::from_utf8_lossy(stderr).trim_end().to_string(),
        },
        other => {
            tracing::debug!(
                code = ?other,
                stderr = %truncate_utf8_safe(&String::from_utf8_lossy(stderr), 200),
                "comment-checker exited unexpectedly, ignoring"
            );
            CheckResult::clean()
        }
    }
}

/// Check one pending call. Any failure yields a clean result.
pub async fn check(call: &PendingCall, binary: Option<&Path>, options: &CheckOptions) -> CheckResult {
    let Some(binary) = binary else {
        tracing::debug!("comment-checker binary unavailable, skipping");
        return CheckResult::clean();
    };
    if !binary.is_file() {
        tracing::debug!(path = %binary.display(), "comment-checker binary missing on disk, skipping");
        return CheckResult::clean();
    }

    let cwd = options
        .cwd
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| ".".to_string());
    let payload = build_payload(call, &cwd);
    let prompt = options
        .custom_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    match run_checker(binary, &payload, prompt).await {
        Ok(result) => {
            tracing::debug!(file = %call.file_path, has_comments = result.has_comments, "Check finished");
            result
        }
        Err(e) => {
            tracing::debug!(error = %e, "comment-checker run failed");
            CheckResult::clean()
        }
    }
}

async fn run_checker(
    binary: &Path,
    payload: &CheckPayload,
    prompt: Option<&str>,
) -> Result<CheckResult, CheckerError> {
    let mut line = serde_json::to_string(payload)?;
    line.push('\n');

    let mut cmd = Command::new(binary);
    if let Some(prompt) = prompt {
        cmd.arg("--prompt").arg(prompt);
    }
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdin = child.stdin.take();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            // The checker may exit before reading everything.
            if let Err(e) = stdin.write_all(line.as_bytes()).await {
                tracing::debug!(error = %e, "Could not deliver payload to comment-checker");
            }
        }
    };
    let ((), output) = tokio::join!(feed, child.wait_with_output());
    let output = output?;

    Ok(classify_exit(output.status.code(), &output.stderr))
}

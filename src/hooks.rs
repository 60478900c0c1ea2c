//! `tool.execute.before` / `tool.execute.after` handlers.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use crate::binary::{BinaryLocator, BinaryResolver, ReleaseLocator};
use crate::checker::{self, CheckOptions};
use crate::config::Config;
use crate::pending::{MutationKind, PendingCall};
use crate::tracker::PendingCallTracker;
use crate::{ToolAfterOutput, ToolExecuteInput};

/// Substrings that mark a tool result as a failure.
const FAILURE_MARKERS: &[&str] = &["error:", "failed to", "could not"];

/// True when the tool's output reports an error; such calls are never checked.
pub fn is_tool_failure(output: &str) -> bool {
    let lower = output.to_lowercase();
    lower.trim_start().starts_with("error") || FAILURE_MARKERS.iter().any(|m| lower.contains(m))
}

pub struct CommentCheckerHooks<L = ReleaseLocator> {
    tracker: Arc<PendingCallTracker>,
    resolver: Arc<BinaryResolver<L>>,
    custom_prompt: RwLock<Option<String>>,
    cwd: Option<PathBuf>,
}

impl CommentCheckerHooks<ReleaseLocator> {
    /// Hooks backed by the release locator described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let resolver = Arc::new(BinaryResolver::new(ReleaseLocator::from_config(config)));
        Self::new(resolver, config.custom_prompt().map(str::to_string))
    }
}

impl<L: BinaryLocator> CommentCheckerHooks<L> {
    pub fn new(resolver: Arc<BinaryResolver<L>>, custom_prompt: Option<String>) -> Self {
        Self {
            tracker: Arc::new(PendingCallTracker::new()),
            resolver,
            custom_prompt: RwLock::new(custom_prompt),
            cwd: None,
        }
    }

    /// Working directory reported to the checker; defaults to the process cwd.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Spawn the stale-call sweeper and the background binary resolution.
    pub fn start(&self) {
        self.tracker.spawn_sweeper();
        self.resolver.warm_up();
    }

    pub fn tracker(&self) -> &Arc<PendingCallTracker> {
        &self.tracker
    }

    pub fn resolver(&self) -> &Arc<BinaryResolver<L>> {
        &self.resolver
    }

    pub fn set_custom_prompt(&self, prompt: Option<String>) {
        match self.custom_prompt.write() {
            Ok(mut guard) => *guard = prompt,
            Err(poisoned) => *poisoned.into_inner() = prompt,
        }
    }

    pub fn custom_prompt(&self) -> Option<String> {
        let guard = match self.custom_prompt.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.clone()
    }

    /// Remember the mutation so the matching after-event can check it.
    pub fn before(&self, input: &ToolExecuteInput, args: &serde_json::Value) {
        let Some(kind) = MutationKind::from_tool_name(&input.tool) else {
            return;
        };
        match PendingCall::from_tool_args(kind, &input.session_id, args) {
            Some(call) => {
                tracing::debug!(call_id = %input.call_id, %kind, file = %call.file_path, "Tracking mutation");
                self.tracker.record(&input.call_id, call);
            }
            None => {
                tracing::debug!(call_id = %input.call_id, %kind, "Mutation without file path, not tracked");
            }
        }
    }

    /// Check the completed mutation and append any warning to the tool output.
    pub async fn after(&self, input: &ToolExecuteInput, output: &mut ToolAfterOutput) {
        let Some(call) = self.tracker.take(&input.call_id) else {
            return;
        };

        if is_tool_failure(&output.output) {
            tracing::debug!(call_id = %input.call_id, "Tool failed, skipping comment check");
            return;
        }

        let binary = self.resolver.resolve().await;
        let options = CheckOptions {
            custom_prompt: self.custom_prompt(),
            cwd: self.cwd.clone(),
        };
        let result = checker::check(&call, binary.as_deref(), &options).await;

        if result.has_comments && !result.message.is_empty() {
            output.output.push_str("\n\n");
            output.output.push_str(&result.message);
        }
    }
}

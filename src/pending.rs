use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File-mutating tools the checker cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Write,
    Edit,
    MultiEdit,
}

impl MutationKind {
    /// Case-insensitive match on the host's tool name.
    pub fn from_tool_name(tool: &str) -> Option<Self> {
        match tool.to_ascii_lowercase().as_str() {
            "write" => Some(MutationKind::Write),
            "edit" => Some(MutationKind::Edit),
            "multiedit" => Some(MutationKind::MultiEdit),
            _ => None,
        }
    }

    /// Tool name as the checker binary expects it.
    pub fn label(&self) -> &'static str {
        match self {
            MutationKind::Write => "Write",
            MutationKind::Edit => "Edit",
            MutationKind::MultiEdit => "MultiEdit",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditPair {
    pub old_string: String,
    pub new_string: String,
}

/// The mutation payload; one variant per kind so only the matching fields exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Write { content: String },
    Edit { old_string: String, new_string: String },
    MultiEdit { edits: Vec<EditPair> },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Write { .. } => MutationKind::Write,
            Mutation::Edit { .. } => MutationKind::Edit,
            Mutation::MultiEdit { .. } => MutationKind::MultiEdit,
        }
    }
}

/// "Before" snapshot of a mutating tool call, waiting for its "after" event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCall {
    pub file_path: String,
    pub mutation: Mutation,
    pub session_id: String,
    pub created_at: DateTime<Utc>,
}

impl PendingCall {
    pub fn new(file_path: impl Into<String>, mutation: Mutation, session_id: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            mutation,
            session_id: session_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.mutation.kind()
    }

    /// Build from raw tool arguments. Accepts both camelCase and snake_case keys.
    /// Returns `None` when no target file path is present.
    pub fn from_tool_args(
        kind: MutationKind,
        session_id: &str,
        args: &serde_json::Value,
    ) -> Option<Self> {
        let file_path = string_arg(args, &["filePath", "file_path", "path"])?;

        let mutation = match kind {
            MutationKind::Write => Mutation::Write {
                content: string_arg(args, &["content"]).unwrap_or_default(),
            },
            MutationKind::Edit => Mutation::Edit {
                old_string: string_arg(args, &["oldString", "old_string"]).unwrap_or_default(),
                new_string: string_arg(args, &["newString", "new_string"]).unwrap_or_default(),
            },
            MutationKind::MultiEdit => Mutation::MultiEdit {
                edits: args
                    .get("edits")
                    .and_then(|v| v.as_array())
                    .map(|edits| {
                        edits
                            .iter()
                            .map(|edit| EditPair {
                                old_string: string_arg(edit, &["oldString", "old_string"])
                                    .unwrap_or_default(),
                                new_string: string_arg(edit, &["newString", "new_string"])
                                    .unwrap_or_default(),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        };

        Some(Self::new(file_path, mutation, session_id))
    }
}

fn string_arg(args: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| args.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_names_match_case_insensitively() {
        assert_eq!(MutationKind::from_tool_name("Edit"), Some(MutationKind::Edit));
        assert_eq!(MutationKind::from_tool_name("MULTIEDIT"), Some(MutationKind::MultiEdit));
        assert_eq!(MutationKind::from_tool_name("write"), Some(MutationKind::Write));
        assert_eq!(MutationKind::from_tool_name("bash"), None);
    }

    #[test]
    fn edit_args_accept_camel_case() {
        let args = json!({ "filePath": "src/a.rs", "oldString": "// TODO", "newString": "// TODO: fix" });
        let call = PendingCall::from_tool_args(MutationKind::Edit, "s1", &args).unwrap();
        assert_eq!(call.file_path, "src/a.rs");
        assert_eq!(
            call.mutation,
            Mutation::Edit {
                old_string: "// TODO".into(),
                new_string: "// TODO: fix".into()
            }
        );
        assert_eq!(call.session_id, "s1");
    }

    #[test]
    fn write_keeps_only_content() {
        let args = json!({ "file_path": "a.py", "content": "x = 1\n", "old_string": "ignored" });
        let call = PendingCall::from_tool_args(MutationKind::Write, "s", &args).unwrap();
        assert_eq!(call.mutation, Mutation::Write { content: "x = 1\n".into() });
    }

    #[test]
    fn multiedit_collects_pairs_with_mixed_keys() {
        let args = json!({
            "path": "lib.ts",
            "edits": [
                { "oldString": "a", "newString": "b" },
                { "old_string": "c", "new_string": "d" }
            ]
        });
        let call = PendingCall::from_tool_args(MutationKind::MultiEdit, "s", &args).unwrap();
        match call.mutation {
            Mutation::MultiEdit { edits } => {
                assert_eq!(edits.len(), 2);
                assert_eq!(edits[1].old_string, "c");
                assert_eq!(edits[1].new_string, "d");
            }
            other => panic!("unexpected mutation {other:?}"),
        }
    }

    #[test]
    fn missing_file_path_is_not_tracked() {
        let args = json!({ "content": "hello" });
        assert!(PendingCall::from_tool_args(MutationKind::Write, "s", &args).is_none());
    }
}

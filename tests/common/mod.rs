#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Write an executable shell script standing in for the comment-checker.
#[cfg(unix)]
pub fn fake_checker(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("comment-checker");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write fake checker");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod fake checker");
    path
}

pub fn edit_args(path: &str, old: &str, new: &str) -> serde_json::Value {
    serde_json::json!({ "filePath": path, "oldString": old, "newString": new })
}

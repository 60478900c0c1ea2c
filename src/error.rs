use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("no comment-checker release for platform {0}")]
    UnsupportedPlatform(String),

    #[error("failed to fetch release asset: {0}")]
    Request(#[from] reqwest::Error),

    #[error("release server returned HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("{tool} exited with {code:?} while extracting archive: {stderr}")]
    Extraction {
        tool: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("executable missing after extraction: {0}")]
    MissingExecutable(PathBuf),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode check payload: {0}")]
    Json(#[from] serde_json::Error),
}

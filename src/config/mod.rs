use std::path::PathBuf;

/// Release downloads live under `<repo>/releases/download/v<version>/`.
pub const DEFAULT_RELEASE_BASE_URL: &str =
    "https://github.com/code-yeongyu/go-claude-code-comment-checker/releases/download";

/// Used when no bundled package metadata names a version.
pub const FALLBACK_VERSION: &str = "0.4.1";

const CACHE_SUBDIR: [&str; 2] = ["oh-my-opencode", "bin"];

#[derive(Debug, Clone)]
pub struct Config {
    pub custom_prompt: Option<String>,
    pub debug: bool,
    /// Explicit checker executable; wins over every other lookup.
    pub binary_path: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub version: Option<String>,
    pub release_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            custom_prompt: None,
            debug: false,
            binary_path: None,
            cache_dir: default_cache_dir(),
            version: None,
            release_base_url: DEFAULT_RELEASE_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// The configured prompt, if it has any non-whitespace content.
    pub fn custom_prompt(&self) -> Option<&str> {
        self.custom_prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
    }
}

/// `$XDG_CACHE_HOME` or the platform cache directory, joined with the fixed subpath.
pub fn default_cache_dir() -> PathBuf {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(platform_cache_base)
        .unwrap_or_else(std::env::temp_dir);
    CACHE_SUBDIR.iter().fold(base, |dir, part| dir.join(part))
}

#[cfg(windows)]
fn platform_cache_base() -> Option<PathBuf> {
    dirs::data_local_dir()
}

#[cfg(not(windows))]
fn platform_cache_base() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".cache"))
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn load_config() -> Config {
    let mut cfg = Config::default();

    cfg.custom_prompt = env_non_empty("COMMENT_CHECKER_PROMPT");
    cfg.debug = env_flag("COMMENT_CHECKER_DEBUG");
    cfg.binary_path = env_non_empty("COMMENT_CHECKER_PATH").map(PathBuf::from);
    if let Some(dir) = env_non_empty("COMMENT_CHECKER_CACHE_DIR") {
        cfg.cache_dir = PathBuf::from(dir);
    }
    cfg.version = env_non_empty("COMMENT_CHECKER_VERSION");
    if let Some(url) = env_non_empty("COMMENT_CHECKER_RELEASE_URL") {
        cfg.release_base_url = url.trim_end_matches('/').to_string();
    }

    // Optional JSON config file: path from COMMENT_CHECKER_CONFIG or .comment-checker.json in CWD
    let cfg_path = std::env::var("COMMENT_CHECKER_CONFIG")
        .ok()
        .unwrap_or_else(|| ".comment-checker.json".to_string());
    if let Ok(text) = std::fs::read_to_string(&cfg_path) {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => apply_file_settings(&mut cfg, &json),
            Err(e) => tracing::warn!(path = %cfg_path, error = %e, "Ignoring malformed config file"),
        }
    }

    cfg
}

fn apply_file_settings(cfg: &mut Config, json: &serde_json::Value) {
    let Some(section) = json.get("comment_checker") else {
        return;
    };
    if let Some(prompt) = section.get("custom_prompt") {
        cfg.custom_prompt = prompt.as_str().map(str::to_string);
    }
    if let Some(debug) = section.get("debug").and_then(|v| v.as_bool()) {
        cfg.debug = debug;
    }
}

use comment_checker_hooks::config::{self, DEFAULT_RELEASE_BASE_URL};

fn with_env<K: AsRef<str>, V: AsRef<str>, F: FnOnce()>(pairs: &[(K, V)], f: F) {
    let saved: Vec<(String, Option<String>)> = pairs
        .iter()
        .map(|(k, _)| (k.as_ref().to_string(), std::env::var(k.as_ref()).ok()))
        .collect();
    for (k, v) in pairs.iter() {
        std::env::set_var(k.as_ref(), v.as_ref());
    }
    f();
    for (k, v) in saved {
        match v {
            Some(val) => std::env::set_var(k, val),
            None => std::env::remove_var(k),
        }
    }
}

// Environment is process-global, so every scenario runs inside one test.
#[test]
fn config_loads_from_env_and_json() {
    let td = tempfile::tempdir().unwrap();
    let missing = td.path().join("absent.json");

    with_env(
        &[
            ("COMMENT_CHECKER_PROMPT", "env prompt"),
            ("COMMENT_CHECKER_DEBUG", "1"),
            ("COMMENT_CHECKER_PATH", "/opt/tools/comment-checker"),
            ("COMMENT_CHECKER_CACHE_DIR", td.path().join("cc").to_string_lossy().as_ref()),
            ("COMMENT_CHECKER_VERSION", "0.6.0"),
            ("COMMENT_CHECKER_RELEASE_URL", "https://mirror.example/releases/"),
            ("COMMENT_CHECKER_CONFIG", missing.to_string_lossy().as_ref()),
        ],
        || {
            let cfg = config::load_config();
            assert_eq!(cfg.custom_prompt(), Some("env prompt"));
            assert!(cfg.debug);
            assert_eq!(cfg.binary_path.as_deref(), Some(std::path::Path::new("/opt/tools/comment-checker")));
            assert_eq!(cfg.cache_dir, td.path().join("cc"));
            assert_eq!(cfg.version.as_deref(), Some("0.6.0"));
            // Trailing slash is trimmed so asset URLs join cleanly
            assert_eq!(cfg.release_base_url, "https://mirror.example/releases");
        },
    );

    // JSON file overrides env for prompt and debug
    let cfg_file = td.path().join(".comment-checker.json");
    std::fs::write(
        &cfg_file,
        r#"{ "comment_checker": { "custom_prompt": "file prompt", "debug": false } }"#,
    )
    .unwrap();
    with_env(
        &[
            ("COMMENT_CHECKER_PROMPT", "env prompt"),
            ("COMMENT_CHECKER_DEBUG", "true"),
            ("COMMENT_CHECKER_CONFIG", cfg_file.to_string_lossy().as_ref()),
        ],
        || {
            let cfg = config::load_config();
            assert_eq!(cfg.custom_prompt(), Some("file prompt"));
            assert!(!cfg.debug);
        },
    );

    // Malformed file is ignored
    std::fs::write(&cfg_file, "{ not json").unwrap();
    with_env(
        &[
            ("COMMENT_CHECKER_PROMPT", "env prompt"),
            ("COMMENT_CHECKER_RELEASE_URL", "  "),
            ("COMMENT_CHECKER_CONFIG", cfg_file.to_string_lossy().as_ref()),
        ],
        || {
            let cfg = config::load_config();
            assert_eq!(cfg.custom_prompt(), Some("env prompt"));
            assert_eq!(cfg.release_base_url, DEFAULT_RELEASE_BASE_URL);
        },
    );
}

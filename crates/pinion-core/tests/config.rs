use pinion_core::config::{dirs_path, PinionConfig};

#[test]
fn test_default_cache_dir() {
    let config = PinionConfig::default();
    assert_eq!(config.cache.dir, "~/.pinion/manifests");
    assert!(config.cache.persistent);
}

#[test]
fn test_default_search_settings() {
    let config = PinionConfig::default();
    assert_eq!(config.resolver.prefetch, 4);
    assert!(config.resolver.max_steps.is_none());
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config: PinionConfig = toml::from_str("").unwrap();
    assert!(config.cache.persistent);
    assert_eq!(config.resolver.prefetch, 4);
}

#[test]
fn test_dirs_path_contains_pinion() {
    assert!(dirs_path().ends_with(".pinion"));
}

#[test]
fn test_cache_dir_expands_home() {
    let config = PinionConfig::default();
    let path = config.cache.dir_path();
    assert!(path.ends_with(".pinion/manifests"));
    assert!(!path.to_string_lossy().starts_with('~'));
}

#[test]
fn test_parse_from_toml() {
    let toml = r#"
[cache]
dir = "/custom/manifests"
persistent = false

[resolver]
prefetch = 0
max-steps = 5000
"#;
    let config: PinionConfig = toml::from_str(toml).unwrap();
    assert_eq!(config.cache.dir, "/custom/manifests");
    assert_eq!(config.cache.dir_path(), std::path::PathBuf::from("/custom/manifests"));
    assert!(!config.cache.persistent);
    assert_eq!(config.resolver.prefetch, 0);
    assert_eq!(config.resolver.max_steps, Some(5000));
}

#[test]
fn test_load_from_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolver]\nprefetch = 2\n").unwrap();
    let config = PinionConfig::load(&path).unwrap();
    assert_eq!(config.resolver.prefetch, 2);
}

#[test]
fn test_load_rejects_malformed_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[resolver\nprefetch = ").unwrap();
    let err = PinionConfig::load(&path).unwrap_err();
    assert!(err.to_string().contains("Configuration error"), "got: {err}");
}

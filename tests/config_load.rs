// tests/config_load.rs
use kormo_stream::config::feed::ENV_FEED_CONFIG_PATH;
use kormo_stream::config::insight::{ENV_INSIGHT_CONFIG_PATH, DEFAULT_MODEL};
use kormo_stream::config::{FeedConfig, InsightConfig};
use kormo_stream::insight::{build_provider, InsightProvider as _, ENV_INSIGHT_TEST_MODE};
use std::{env, fs};

fn clear_key_env() {
    env::remove_var("GEMINI_API_KEY");
    env::remove_var("API_KEY");
    env::remove_var(ENV_INSIGHT_TEST_MODE);
}

#[test]
fn feed_toml_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("feed.toml");
    fs::write(&p, "capacity = 40\ntick_min_ms = 9000\ntick_max_ms = 3000\n").unwrap();

    let cfg = FeedConfig::load_from(&p).unwrap();
    assert_eq!(cfg.capacity, 40);
    assert_eq!(cfg.initial_count, 15);
    assert_eq!((cfg.tick_min_ms, cfg.tick_max_ms), (3000, 9000));
    assert_eq!(cfg.live_window(), chrono::Duration::seconds(30));
}

#[serial_test::serial]
#[test]
fn feed_default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_FEED_CONFIG_PATH);

    // 1) Nothing on disk: built-in defaults
    assert_eq!(FeedConfig::load_default().unwrap(), FeedConfig::default());

    // 2) ./config/feed.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(tmp.path().join("config/feed.toml"), "capacity = 25\n").unwrap();
    assert_eq!(FeedConfig::load_default().unwrap().capacity, 25);

    // 3) Env path wins
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, "capacity = 7\ninitial_count = 50\n").unwrap();
    env::set_var(ENV_FEED_CONFIG_PATH, p_env.display().to_string());
    let cfg = FeedConfig::load_default().unwrap();
    assert_eq!(cfg.capacity, 7);
    assert_eq!(cfg.initial_count, 7, "initial batch clamped to capacity");

    // 4) Env path that does not exist is an error, not a silent fallback
    env::set_var(ENV_FEED_CONFIG_PATH, tmp.path().join("missing.toml"));
    assert!(FeedConfig::load_default().is_err());

    env::remove_var(ENV_FEED_CONFIG_PATH);
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn insight_env_key_prefers_gemini_var() {
    clear_key_env();
    let raw = r#"{ "provider": "Gemini", "api_key": "ENV" }"#;

    let cfg = InsightConfig::from_json_str(raw).unwrap();
    assert!(!cfg.has_credential());
    assert_eq!(cfg.provider, "gemini");
    assert_eq!(cfg.model, DEFAULT_MODEL);

    env::set_var("API_KEY", "fallback-key");
    assert_eq!(InsightConfig::from_json_str(raw).unwrap().api_key, "fallback-key");

    env::set_var("GEMINI_API_KEY", "primary-key");
    assert_eq!(InsightConfig::from_json_str(raw).unwrap().api_key, "primary-key");

    clear_key_env();
}

#[test]
fn insight_rejects_unknown_provider() {
    let err = InsightConfig::from_json_str(r#"{ "provider": "openai" }"#).unwrap_err();
    assert!(err.to_string().contains("Unsupported insight provider"));
}

#[test]
fn insight_debug_hides_key() {
    let cfg = InsightConfig::from_json_str(r#"{ "api_key": "sk-very-secret" }"#).unwrap();
    let dbg = format!("{cfg:?}");
    assert!(!dbg.contains("sk-very-secret"));
    assert!(dbg.contains("api_key_len"));
}

#[serial_test::serial]
#[test]
fn insight_default_env_path_must_exist() {
    env::set_var(ENV_INSIGHT_CONFIG_PATH, "/definitely/not/here.json");
    assert!(InsightConfig::load_default().is_err());

    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("insight.json");
    fs::write(&p, r#"{ "provider": "mock", "enabled": false }"#).unwrap();
    env::set_var(ENV_INSIGHT_CONFIG_PATH, p.display().to_string());
    let cfg = InsightConfig::load_default().unwrap();
    assert_eq!(cfg.provider, "mock");
    assert!(!cfg.enabled);

    env::remove_var(ENV_INSIGHT_CONFIG_PATH);
}

#[serial_test::serial]
#[test]
fn provider_factory_follows_config_and_test_mode() {
    clear_key_env();

    let no_key = InsightConfig::from_json_str("{}").unwrap();
    assert_eq!(build_provider(&no_key).unwrap().name(), "disabled");

    let keyed = InsightConfig::from_json_str(r#"{ "api_key": "k" }"#).unwrap();
    assert_eq!(build_provider(&keyed).unwrap().name(), "gemini");

    let off = InsightConfig::from_json_str(r#"{ "api_key": "k", "enabled": false }"#).unwrap();
    assert_eq!(build_provider(&off).unwrap().name(), "disabled");

    env::set_var(ENV_INSIGHT_TEST_MODE, "mock");
    assert_eq!(build_provider(&no_key).unwrap().name(), "mock");

    clear_key_env();
}

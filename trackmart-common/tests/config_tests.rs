//! Tests for configuration loading and credential resolution
//!
//! Covers the ENV → TOML priority order, fail-fast behavior when no
//! credentials are configured, and TOML file handling.
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate TRACKMART_CLIENT_ID or TRACKMART_CLIENT_SECRET are marked
//! with #[serial] so they run sequentially, not in parallel.

use serial_test::serial;
use std::env;
use std::io::Write;
use trackmart_common::config::{
    default_config_path, is_valid_key, load_toml_config, resolve_credentials, TomlConfig,
    ENV_CLIENT_ID, ENV_CLIENT_SECRET,
};
use trackmart_common::Error;

fn clear_env() {
    env::remove_var(ENV_CLIENT_ID);
    env::remove_var(ENV_CLIENT_SECRET);
}

#[test]
fn test_is_valid_key() {
    assert!(is_valid_key("abc123"));
    assert!(!is_valid_key(""));
    assert!(!is_valid_key("   "));
    assert!(!is_valid_key("\t\n"));
}

#[test]
#[serial]
fn test_resolve_fails_fast_when_unconfigured() {
    clear_env();

    let result = resolve_credentials(&TomlConfig::default());

    let err = result.expect_err("missing credentials must fail");
    match err {
        Error::Config(msg) => {
            // The error must tell the operator where to put the value
            assert!(msg.contains(ENV_CLIENT_ID), "message should name the env var: {}", msg);
            assert!(msg.contains("config.toml"), "message should name the config file: {}", msg);
        }
        other => panic!("expected Config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_resolve_from_environment() {
    clear_env();
    env::set_var(ENV_CLIENT_ID, "env-id");
    env::set_var(ENV_CLIENT_SECRET, "env-secret");

    let creds = resolve_credentials(&TomlConfig::default()).unwrap();
    assert_eq!(creds.client_id, "env-id");
    assert_eq!(creds.client_secret, "env-secret");

    clear_env();
}

#[test]
#[serial]
fn test_resolve_from_toml() {
    clear_env();

    let config = TomlConfig {
        client_id: Some("toml-id".to_string()),
        client_secret: Some("toml-secret".to_string()),
        ..Default::default()
    };

    let creds = resolve_credentials(&config).unwrap();
    assert_eq!(creds.client_id, "toml-id");
    assert_eq!(creds.client_secret, "toml-secret");
}

#[test]
#[serial]
fn test_environment_wins_over_toml() {
    clear_env();
    env::set_var(ENV_CLIENT_ID, "env-id");
    env::set_var(ENV_CLIENT_SECRET, "env-secret");

    let config = TomlConfig {
        client_id: Some("toml-id".to_string()),
        client_secret: Some("toml-secret".to_string()),
        ..Default::default()
    };

    let creds = resolve_credentials(&config).unwrap();
    assert_eq!(creds.client_id, "env-id");
    assert_eq!(creds.client_secret, "env-secret");

    clear_env();
}

#[test]
#[serial]
fn test_whitespace_env_value_falls_through_to_toml() {
    clear_env();
    env::set_var(ENV_CLIENT_ID, "   ");
    env::set_var(ENV_CLIENT_SECRET, "   ");

    let config = TomlConfig {
        client_id: Some("toml-id".to_string()),
        client_secret: Some("toml-secret".to_string()),
        ..Default::default()
    };

    let creds = resolve_credentials(&config).unwrap();
    assert_eq!(creds.client_id, "toml-id");

    clear_env();
}

#[test]
#[serial]
fn test_partial_credentials_still_fail() {
    clear_env();
    env::set_var(ENV_CLIENT_ID, "env-id");

    // Id resolves but the secret is missing everywhere
    let result = resolve_credentials(&TomlConfig::default());
    assert!(result.is_err());

    clear_env();
}

#[test]
fn test_load_missing_config_degrades_to_defaults() {
    let config = load_toml_config(std::path::Path::new("/nonexistent/trackmart/config.toml"))
        .expect("missing config file must not be an error");
    assert!(config.client_id.is_none());
    assert!(config.client_secret.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_config_roundtrip() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
client_id = "file-id"
client_secret = "file-secret"
market = "SE"

[logging]
level = "debug"
"#
    )
    .unwrap();

    let config = load_toml_config(file.path()).unwrap();
    assert_eq!(config.client_id.as_deref(), Some("file-id"));
    assert_eq!(config.client_secret.as_deref(), Some("file-secret"));
    assert_eq!(config.market.as_deref(), Some("SE"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_malformed_config_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "client_id = [this is not toml").unwrap();

    let result = load_toml_config(file.path());
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_default_config_path_under_platform_config_dir() {
    if let Some(path) = default_config_path() {
        let path_str = path.to_string_lossy();
        assert!(path_str.contains("trackmart"));
        assert!(path_str.ends_with("config.toml"));
    }
}

//! Unit tests for configuration resolution
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests
//! that manipulate FRAMELINE_* variables are marked with #[serial] so they
//! run sequentially, not in parallel.

use frameline_common::config::{
    default_data_dir, resolve_data_dir, resolve_gateway_config, TomlConfig, DATA_DIR_ENV,
    GATEWAY_KEY_ID_ENV, GATEWAY_SECRET_ENV,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

#[test]
#[serial]
fn cli_argument_has_highest_priority() {
    env::set_var(DATA_DIR_ENV, "/tmp/frameline-env");
    let toml = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/frameline-toml")),
        ..Default::default()
    };

    let dir = resolve_data_dir(Some(Path::new("/tmp/frameline-cli")), Some(&toml));
    assert_eq!(dir, PathBuf::from("/tmp/frameline-cli"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn env_var_beats_toml() {
    env::set_var(DATA_DIR_ENV, "/tmp/frameline-env");
    let toml = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/frameline-toml")),
        ..Default::default()
    };

    let dir = resolve_data_dir(None, Some(&toml));
    assert_eq!(dir, PathBuf::from("/tmp/frameline-env"));

    env::remove_var(DATA_DIR_ENV);
}

#[test]
#[serial]
fn falls_back_to_toml_then_default() {
    env::remove_var(DATA_DIR_ENV);
    let toml = TomlConfig {
        data_dir: Some(PathBuf::from("/tmp/frameline-toml")),
        ..Default::default()
    };

    assert_eq!(
        resolve_data_dir(None, Some(&toml)),
        PathBuf::from("/tmp/frameline-toml")
    );
    assert_eq!(resolve_data_dir(None, None), default_data_dir());
}

#[test]
#[serial]
fn missing_gateway_secret_is_fatal() {
    env::remove_var(GATEWAY_KEY_ID_ENV);
    env::remove_var(GATEWAY_SECRET_ENV);

    // No env, no TOML: both key id and secret are missing
    assert!(resolve_gateway_config(None).is_err());

    // Key id alone is not enough
    env::set_var(GATEWAY_KEY_ID_ENV, "rzp_test_key");
    assert!(resolve_gateway_config(None).is_err());

    env::remove_var(GATEWAY_KEY_ID_ENV);
}

#[test]
#[serial]
fn gateway_config_resolves_from_env() {
    env::set_var(GATEWAY_KEY_ID_ENV, "rzp_test_key");
    env::set_var(GATEWAY_SECRET_ENV, "shhh");

    let cfg = resolve_gateway_config(None).unwrap();
    assert_eq!(cfg.key_id, "rzp_test_key");
    assert_eq!(cfg.secret, "shhh");
    assert!(cfg.base_url.starts_with("https://"));

    env::remove_var(GATEWAY_KEY_ID_ENV);
    env::remove_var(GATEWAY_SECRET_ENV);
}

#[test]
fn toml_config_tolerates_missing_fields() {
    let toml_str = r#"
        data_dir = "/srv/frameline"
    "#;

    let config: TomlConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.data_dir, Some(PathBuf::from("/srv/frameline")));
    assert_eq!(config.gateway.key_id, None);
    assert_eq!(config.gateway.secret, None);
}

//! Integration tests for Settings loading with layered precedence.
//!
//! These tests use temp directories for the local layer only. Tests that set
//! environment variables touch fields the other tests do not assert on.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use rstree::application::ApplicationError;
use rstree::config::{local_config_path, Settings};

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
items_file = "data/tree.json"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.items_file, PathBuf::from("data/tree.json"));
}

#[test]
fn given_unknown_key_in_local_config_when_load_then_key_is_ignored() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "history_limit = 7\nitems_file = \"kept.json\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.items_file, PathBuf::from("kept.json"));
    assert!(!settings.to_toml().unwrap().contains("history_limit"));
}

#[test]
fn given_invalid_toml_when_load_then_returns_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "items_file = [not toml").unwrap();

    let result = Settings::load(Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_env_var_when_load_then_env_wins_over_local_config() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "show_ids = true\n").unwrap();

    std::env::set_var("RSTREE_SHOW_IDS", "false");
    let settings = Settings::load(Some(dir.path()));
    std::env::remove_var("RSTREE_SHOW_IDS");

    assert!(!settings.expect("load settings").show_ids);
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let settings = Settings {
        items_file: PathBuf::from("/srv/items.json"),
        show_ids: false,
    };

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}

use pollen8_core::{ConfigManager, Settings, CONNECTION_VALUE};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_empty_directory_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let settings = ConfigManager::load_from_sources(temp_dir.path(), "test").unwrap();
    assert_eq!(settings.env, "test");
    assert_eq!(settings.analytics.connection_value, CONNECTION_VALUE);
    assert_eq!(settings.analytics.top_industries, 5);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_environment_file_overrides_default() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        "[analytics]\ngrowth_window_days = 14\ntop_industries = 3\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("staging.toml"),
        "[analytics]\ngrowth_window_days = 60\n",
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(temp_dir.path(), "staging").unwrap();
    assert_eq!(settings.analytics.growth_window_days, 60);
    assert_eq!(settings.analytics.top_industries, 3);

    let other = ConfigManager::load_from_sources(temp_dir.path(), "production").unwrap();
    assert_eq!(other.analytics.growth_window_days, 14);
}

#[test]
fn test_local_file_wins_over_environment_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("development.toml"),
        "[invites]\ncode_length = 10\n",
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("local.toml"),
        "[invites]\ncode_length = 12\n",
    )
    .unwrap();

    let settings = ConfigManager::load_from_sources(temp_dir.path(), "development").unwrap();
    assert_eq!(settings.invites.code_length, 12);
    assert_eq!(settings.invites.trend_window_days, 7);
}

#[test]
fn test_manager_rejects_invalid_settings() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("default.toml"),
        "[analytics]\nconnection_value = -1.0\n",
    )
    .unwrap();

    let result = ConfigManager::new(
        Some(temp_dir.path().to_path_buf()),
        Some("test".to_string()),
    );
    assert!(result.is_err());
}

#[test]
fn test_manager_exposes_loaded_settings() {
    let temp_dir = TempDir::new().unwrap();
    let defaults = Settings {
        env: "test".to_string(),
        ..Settings::default()
    };
    fs::write(
        temp_dir.path().join("default.toml"),
        ConfigManager::to_toml(&defaults).unwrap(),
    )
    .unwrap();

    let manager = ConfigManager::new(
        Some(temp_dir.path().to_path_buf()),
        Some("test".to_string()),
    )
    .unwrap();
    assert_eq!(manager.config_dir(), temp_dir.path());
    assert_eq!(manager.settings(), &defaults);
}

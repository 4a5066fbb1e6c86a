//! Integration tests for the configuration system

use std::path::PathBuf;
use tabby_config::{
    apply_env_overrides, AppConfig, Config, ConfigError, ConfigManager, ConfigSection,
    LibraryConfig, LogLevel, CONFIG_VERSION,
};
use tempfile::TempDir;

fn setup_test_manager() -> Result<(TempDir, ConfigManager), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path());
    Ok((temp_dir, manager))
}

#[test]
fn test_full_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let created = manager.initialize()?;
    assert!(created);

    let config = manager.load()?;
    assert_eq!(config.version, CONFIG_VERSION);

    let mut modified = config.clone();
    modified.app.database_path = PathBuf::from("books/library.db");
    modified.library.trim_category_names = false;
    manager.save(&modified)?;

    let reloaded = manager.load()?;
    assert_eq!(reloaded.app.database_path, PathBuf::from("books/library.db"));
    assert!(!reloaded.library.trim_category_names);

    manager.reset()?;
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_invalid_config_is_not_saved() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.save(&Config::default())?;

    let mut invalid = Config::default();
    invalid.library.max_category_name_length = 1000;

    let result = manager.save(&invalid);
    assert!(matches!(result, Err(ConfigError::Invalid(_))));
    assert_eq!(manager.load()?, Config::default());

    Ok(())
}

#[test]
fn test_hand_edited_invalid_file_loads_with_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let (_temp_dir, manager) = setup_test_manager()?;

    std::fs::write(manager.config_path(), "[app]\nmax_connections = 0\n")?;

    let config = manager.load()?;
    assert_eq!(config.app.max_connections, 0);

    let errors = manager.validate()?;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "app.max_connections");
    assert_eq!(errors[0].value.as_deref(), Some("0"));

    Ok(())
}

#[test]
fn test_empty_file_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    std::fs::write(manager.config_path(), "   \n")?;

    assert!(matches!(manager.load(), Err(ConfigError::Empty { .. })));
    assert_eq!(manager.load_or_default(), Config::default());

    Ok(())
}

#[test]
fn test_backup_written_on_overwrite() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;

    let mut first = Config::default();
    first.app.max_connections = 2;
    manager.save(&first)?;
    manager.save(&Config::default())?;

    let backup: Config = toml::from_str(&std::fs::read_to_string(manager.backup_path())?)?;
    assert_eq!(backup.app.max_connections, 2);

    Ok(())
}

#[test]
fn test_update_closure() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.initialize()?;

    manager.update(|config| {
        config.app.log_level = LogLevel::Trace;
        config.library.max_category_name_length = 120;
    })?;

    let config = manager.load()?;
    assert_eq!(config.app.log_level, LogLevel::Trace);
    assert_eq!(config.library.max_category_name_length, 120);

    Ok(())
}

#[test]
fn test_all_sections_default_are_valid() {
    assert!(AppConfig::default().validate().is_ok());
    assert!(LibraryConfig::default().validate().is_ok());
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_serialization_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let original = Config::default();
    let toml_string = toml::to_string(&original)?;
    let deserialized: Config = toml::from_str(&toml_string)?;
    assert_eq!(original, deserialized);
    Ok(())
}

#[test]
fn test_log_level_written_lowercase() -> Result<(), Box<dyn std::error::Error>> {
    let toml_string = toml::to_string(&Config::default())?;
    assert!(toml_string.contains("log_level = \"info\""));
    Ok(())
}

#[test]
fn test_env_overrides_layer_over_file() -> Result<(), Box<dyn std::error::Error>> {
    let (_temp_dir, manager) = setup_test_manager()?;
    manager.update(|config| config.app.max_connections = 2)?;

    let mut config = manager.load()?;
    let applied = apply_env_overrides(&mut config, |name| {
        (name == "TABBY_APP_LOG_LEVEL").then(|| "trace".to_string())
    });

    assert_eq!(applied, 1);
    assert_eq!(config.app.log_level, LogLevel::Trace);
    assert_eq!(config.app.max_connections, 2);

    Ok(())
}

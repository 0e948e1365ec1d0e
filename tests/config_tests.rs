use pathquill::config::Config;
use tempfile::TempDir;

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert!(!config.pretty);
    assert_eq!(config.indent_size, 2);
    assert!(config.trailing_newline);
    assert!(!config.show_paths);
}

#[test]
fn test_custom_config() {
    let config = Config {
        pretty: true,
        indent_size: 4,
        trailing_newline: false,
        show_paths: true,
    };

    assert!(config.pretty);
    assert_eq!(config.indent_size, 4);
    assert!(!config.trailing_newline);
    assert!(config.show_paths);
}

#[test]
fn test_config_serialization() {
    let config = Config {
        pretty: true,
        indent_size: 8,
        ..Config::default()
    };

    let toml_string = toml::to_string(&config).unwrap();
    assert!(toml_string.contains("pretty = true"));
    assert!(toml_string.contains("indent_size = 8"));

    let deserialized: Config = toml::from_str(&toml_string).unwrap();
    assert_eq!(deserialized, config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: Config = toml::from_str("indent_size = 3\nshow_paths = true").unwrap();

    assert_eq!(config.indent_size, 3);
    assert!(config.show_paths);
    assert!(!config.pretty);
    assert!(config.trailing_newline);
}

#[test]
fn test_save_and_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = Config {
        pretty: true,
        indent_size: 4,
        trailing_newline: false,
        show_paths: false,
    };
    config.save_to(&path).unwrap();
    assert!(path.exists());

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_from_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_load_from_invalid_toml_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "pretty = \"sometimes\"").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

use assert_fs::prelude::*;
use reader_common::ReaderError;
use reader_config::{Config, OutputFormat};

fn token_only(key: &str) -> Option<String> {
    (key == "ACCESS_TOKEN").then(|| "file-test-token".to_string())
}

#[test]
fn test_file_values_are_loaded() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("reader.toml");
    file.write_str(
        r#"
[api]
base_url = "http://localhost:8080/api/v3"
timeout_secs = 5
verify_token = true

[mcp]
output = "text"

[log]
verbose = true
"#,
    )
    .unwrap();

    let config = Config::load_with(Some(file.path()), token_only).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8080/api/v3");
    assert_eq!(config.api.timeout_secs, 5);
    assert!(config.api.verify_token);
    assert_eq!(config.mcp.output, OutputFormat::Text);
    assert!(config.log.verbose);
    // Unset keys keep their defaults
    assert_eq!(config.api.auth_url, "https://readwise.io/api/v2/auth/");
    assert_eq!(config.mcp.server_name, "reader-api");
    assert_eq!(config.access_token.expose(), "file-test-token");
}

#[test]
fn test_token_in_file_is_ignored() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("reader.toml");
    file.write_str("access_token = \"from-file\"\n").unwrap();

    let err = Config::load_with(Some(file.path()), |_| None).unwrap_err();
    assert!(matches!(err, ReaderError::MissingToken { .. }));
}

#[test]
fn test_missing_file_is_config_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let missing = temp.child("nope.toml");

    let err = Config::load_with(Some(missing.path()), token_only).unwrap_err();
    assert!(matches!(err, ReaderError::ConfigError(_)));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("reader.toml");
    file.write_str("[api\nbase_url = ").unwrap();

    let err = Config::load_with(Some(file.path()), token_only).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

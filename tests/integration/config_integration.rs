//! Configuration loading through the CLI run context

use click_censor::cli::{Commands, RunContext};
use click_censor::error::ExtensionError;
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_explicit_config_file_drives_simulation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("click-censor.toml");
    fs::write(
        &path,
        r#"
extension_id = "custom-extension"

[style]
background = "navy"
color = "navy"

[logging]
color = false
"#,
    )
    .unwrap();

    let ctx = RunContext::new(Some(path)).unwrap();
    assert_eq!(ctx.config().extension_id, "custom-extension");
    assert_eq!(ctx.config().style.background, "navy");

    let rendered = ctx.execute(&Commands::Config).await.unwrap();
    assert!(rendered.contains("extension_id = \"custom-extension\""));

    // Sender validation still accepts the page, whose id comes from the same config.
    let out = ctx
        .execute(&Commands::Simulate {
            page: "a hidden word".to_string(),
            select: "hidden".to_string(),
            no_uncensor: false,
        })
        .await
        .unwrap();
    assert!(out.contains("target=Some("));
    assert!(out.ends_with("a hidden word"));
}

#[test]
fn test_missing_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let result = RunContext::new(Some(temp_dir.path().join("nope.toml")));
    assert!(matches!(result, Err(ExtensionError::ConfigError(_))));
}

#[test]
fn test_malformed_config_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[menu\ncensor_title = ").unwrap();
    assert!(RunContext::new(Some(path)).is_err());
}

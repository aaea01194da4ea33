// Settings unit tests

use std::path::PathBuf;
use tempfile::TempDir;
use watermark_my_images::config::*;

#[test]
fn test_can_deserialize_minimal_settings() {
    let settings = Settings::from_yaml_with_env("watermark: {}\n").expect("minimal settings");
    assert_eq!(settings.watermark.label, "WATERMARK");
    assert_eq!(settings.watermark.size, 60.0);
    assert_eq!(settings.watermark.text_color, "#000");
    assert_eq!(settings.watermark.text_opacity, 100);
    assert_eq!(settings.watermark.background_color, "#FFF");
    assert_eq!(settings.watermark.background_opacity, 0);
    assert_eq!(settings.watermark.font, "Arial");
    assert!(!settings.logs);
    assert_eq!(settings.logging.format, LogFormat::Pretty);
}

#[test]
fn test_substitutes_environment_variables() {
    std::env::set_var("WMI_TEST_LABEL", "CONFIDENTIAL");
    std::env::set_var("WMI_TEST_FONTS", "/opt/fonts");

    let yaml = r#"
watermark:
  label: "${WMI_TEST_LABEL}"
fonts_dir: "${WMI_TEST_FONTS}"
"#;
    let settings = Settings::from_yaml_with_env(yaml).unwrap();
    assert_eq!(settings.watermark.label, "CONFIDENTIAL");
    assert_eq!(settings.fonts_dir, PathBuf::from("/opt/fonts"));
}

#[test]
fn test_missing_environment_variable_is_error() {
    std::env::remove_var("WMI_TEST_DEFINITELY_UNSET");
    let yaml = "watermark:\n  label: \"${WMI_TEST_DEFINITELY_UNSET}\"\n";

    match Settings::from_yaml_with_env(yaml) {
        Err(ConfigError::MissingEnvVar(name)) => assert_eq!(name, "WMI_TEST_DEFINITELY_UNSET"),
        other => panic!("expected MissingEnvVar, got {:?}", other),
    }
}

#[test]
fn test_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("settings.yaml");
    std::fs::write(&path, "jpeg_quality: 88\nlogs: true\n").unwrap();

    let settings = Settings::from_file(&path).unwrap();
    assert_eq!(settings.jpeg_quality, 88);
    assert!(settings.logs);
}

#[test]
fn test_from_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Settings::from_file(dir.path().join("nope.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_validate_rejects_invalid_watermark() {
    let yaml = "watermark:\n  size: 0\n";
    let settings = Settings::from_yaml_with_env(yaml).unwrap();
    let err = settings.validate().unwrap_err();
    assert!(err.to_string().contains("text size"));
}

#[test]
fn test_validate_rejects_opacity_over_100() {
    let yaml = "watermark:\n  text_opacity: 150\n";
    let settings = Settings::from_yaml_with_env(yaml).unwrap();
    assert!(settings.validate().is_err());
}

#[test]
fn test_unknown_log_format_fails_to_parse() {
    let yaml = "logging:\n  format: xml\n";
    assert!(matches!(
        Settings::from_yaml_with_env(yaml),
        Err(ConfigError::Parse(_))
    ));
}

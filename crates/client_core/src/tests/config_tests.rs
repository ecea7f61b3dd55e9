use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn temp_dir(label: &str) -> std::path::PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = env::temp_dir().join(format!("survey_client_{label}_{suffix}"));
    fs::create_dir_all(&dir).expect("temp dir");
    dir
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_apply_without_file_or_env() {
    let settings =
        load_settings_from(Path::new("/nonexistent/survey.toml"), no_env).expect("load");
    assert_eq!(settings, ClientSettings::default());
}

#[test]
fn file_values_override_defaults() {
    let dir = temp_dir("file");
    let path = dir.join("survey.toml");
    fs::write(
        &path,
        "base_url = \"https://surveys.example.com/api/\"\nlog_filter = \"debug\"\n",
    )
    .expect("write");

    let settings = load_settings_from(&path, no_env).expect("load");
    assert_eq!(settings.base_url, "https://surveys.example.com/api");
    assert_eq!(settings.log_filter, "debug");

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn env_overrides_file_and_app_prefix_wins() {
    let dir = temp_dir("env");
    let path = dir.join("survey.toml");
    fs::write(&path, "base_url = \"http://from-file\"\n").expect("write");

    let vars: HashMap<&str, &str> = [
        ("SURVEY_BASE_URL", "http://from-env"),
        ("APP__BASE_URL", "http://from-app-env"),
        ("APP__LOG_FILTER", "warn"),
    ]
    .into_iter()
    .collect();
    let settings =
        load_settings_from(&path, |key| vars.get(key).map(|v| v.to_string())).expect("load");

    assert_eq!(settings.base_url, "http://from-app-env");
    assert_eq!(settings.log_filter, "warn");

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn invalid_file_is_reported_with_path() {
    let dir = temp_dir("invalid");
    let path = dir.join("survey.toml");
    fs::write(&path, "base_url = [").expect("write");

    let err = load_settings_from(&path, no_env).expect_err("must fail");
    assert!(err.to_string().contains("invalid settings file"), "{err}");

    fs::remove_dir_all(dir).expect("cleanup");
}

#[test]
fn rejects_non_http_base_url() {
    assert!(normalize_base_url("ftp://example.com").is_err());
    assert!(normalize_base_url("not a url").is_err());
    assert_eq!(
        normalize_base_url("  http://localhost:8000/api// ").expect("valid"),
        "http://localhost:8000/api"
    );
}

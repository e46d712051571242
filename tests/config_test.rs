use std::fs;

use mono_release::config::load_config;

#[test]
fn test_load_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monorelease.toml");
    fs::write(
        &path,
        r#"
            [commits]
            types = ["feat", "fix", "chore"]
            branch_prefixes = ["feat/", "fix/"]

            [[workspace.packages]]
            name = "core"
            path = "packages/core"

            [[workspace.packages]]
            name = "api"
            path = "packages/api"
            dependencies = ["core"]
        "#,
    )
    .unwrap();

    let config = load_config(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.commits.types, vec!["feat", "fix", "chore"]);
    assert_eq!(config.commits.branch_prefixes, vec!["feat/", "fix/"]);
    assert_eq!(config.workspace.packages.len(), 2);
    assert_eq!(config.workspace.packages[1].dependencies, vec!["core"]);
    // Unset fields fall back to defaults
    assert_eq!(config.commits.max_subject_length, 72);
    assert_eq!(config.tags.pattern, "{package}-v{version}");
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(load_config(Some("/nonexistent/monorelease.toml")).is_err());
}

#[test]
fn test_malformed_config_is_fatal_with_field_description() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monorelease.toml");
    fs::write(
        &path,
        r#"
            [commits]
            max_subject_length = "not a number"
        "#,
    )
    .unwrap();

    let err = load_config(Some(path.to_str().unwrap())).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("Configuration error"));
    assert!(message.contains("max_subject_length"));
}

#[test]
fn test_empty_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monorelease.toml");
    fs::write(&path, "").unwrap();

    let config = load_config(Some(path.to_str().unwrap())).unwrap();
    assert!(config.commits.types.contains(&"feat".to_string()));
    assert!(config.workspace.packages.is_empty());
}

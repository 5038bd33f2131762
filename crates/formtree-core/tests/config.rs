use formtree_core::config::{
    load_config, parse_config, save_config, EvaluatorConfig, MissingReferencePolicy,
};
use formtree_core::error::CoreError;
use pretty_assertions::assert_eq;

#[test]
fn unversioned_config_is_migrated() {
    let config = parse_config(r#"{ "path_delimiter": "/" }"#).unwrap();

    assert_eq!(config.config_version, 1);
    assert_eq!(config.missing_reference, MissingReferencePolicy::Zero);
}

#[test]
fn current_config_is_read_as_is() {
    let config = parse_config(
        r#"{ "config_version": 1, "path_delimiter": ".", "missing_reference": "incomplete" }"#,
    )
    .unwrap();

    assert_eq!(config.path_delimiter, '.');
    assert_eq!(config.missing_reference, MissingReferencePolicy::Incomplete);
}

#[test]
fn newer_config_is_rejected() {
    let err = parse_config(r#"{ "config_version": 7, "missing_reference": "zero" }"#).unwrap_err();

    assert!(matches!(
        err,
        CoreError::UnsupportedConfigVersion { found: 7, supported: 1 }
    ));
}

#[test]
fn alphanumeric_delimiter_is_rejected() {
    let err = parse_config(r#"{ "config_version": 1, "path_delimiter": "x", "missing_reference": "zero" }"#)
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidConfig(_)));
}

#[test]
fn non_object_config_is_rejected() {
    assert!(matches!(parse_config("[1, 2]"), Err(CoreError::InvalidConfig(_))));
}

#[test]
fn saved_config_loads_back() {
    let dir = std::env::temp_dir().join(format!("formtree-config-{}", std::process::id()));
    let path = dir.join("evaluator.json");

    let config = EvaluatorConfig {
        config_version: 0,
        ..EvaluatorConfig::default()
    }
    .with_missing_reference(MissingReferencePolicy::Incomplete);
    save_config(&path, &config).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded.config_version, 1);
    assert_eq!(loaded.missing_reference, MissingReferencePolicy::Incomplete);

    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, ["evaluator.json"]);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn saving_replaces_an_existing_config() {
    let dir = std::env::temp_dir().join(format!("formtree-config-replace-{}", std::process::id()));
    let path = dir.join("evaluator.json");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    save_config(&path, &EvaluatorConfig::default()).unwrap();

    assert_eq!(load_config(&path).unwrap(), EvaluatorConfig::default());
    assert!(!dir.join("evaluator.json.tmp").exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

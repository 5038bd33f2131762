use std::path::Path;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

/// Separator between segments of a `linkId`.
pub const PATH_DELIMITER: char = '/';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    #[serde(default = "default_delimiter")]
    pub path_delimiter: char,
    /// How an unanswered or unscored reference affects a calculation.
    /// Added in v1.
    pub missing_reference: MissingReferencePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum MissingReferencePolicy {
    /// The reference contributes 0.
    #[default]
    Zero,
    /// The whole calculation has no value until every reference has one.
    Incomplete,
}

fn default_delimiter() -> char {
    PATH_DELIMITER
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            path_delimiter: PATH_DELIMITER,
            missing_reference: MissingReferencePolicy::default(),
        }
    }
}

impl EvaluatorConfig {
    pub fn with_missing_reference(mut self, policy: MissingReferencePolicy) -> Self {
        self.missing_reference = policy;
        self
    }
}

pub fn load_config(path: &Path) -> Result<EvaluatorConfig, CoreError> {
    let contents = std::fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    tracing::debug!(path = %path.display(), "evaluator config loaded");
    Ok(config)
}

/// Parse a config document, migrating older versions first.
pub fn parse_config(contents: &str) -> Result<EvaluatorConfig, CoreError> {
    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: EvaluatorConfig = serde_json::from_value(migrated)?;
    if config.path_delimiter.is_alphanumeric() {
        return Err(CoreError::InvalidConfig(format!(
            "path_delimiter '{}' would split question codes",
            config.path_delimiter
        )));
    }
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> Result<serde_json::Value, CoreError> {
    if from_version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedConfigVersion {
            found: from_version,
            supported: CURRENT_VERSION,
        });
    }

    // v0 → v1: add missing_reference (zero, the pre-versioned behavior)
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| CoreError::InvalidConfig("config is not a JSON object".to_string()))?;
        obj.entry("missing_reference")
            .or_insert(serde_json::Value::String("zero".to_string()));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated evaluator config v0 → v1 (added missing_reference)");
    }

    Ok(json)
}

pub fn save_config(path: &Path, config: &EvaluatorConfig) -> Result<(), CoreError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp_name);
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "evaluator config saved");
    Ok(())
}

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A unit of measure offered by (or selected on) a REAL/QTY item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unit {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
}

impl Unit {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: None,
            system: None,
            default: None,
        }
    }

    /// Matches by display name or by code.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.code.as_deref() == Some(name)
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One selectable choice of a coded item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Short code shown next to the text (e.g. "01"). Often null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Contribution to score calculations. `None` means not scorable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnswerOption {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Same coded identity: equal `code`, and equal `system` when both
    /// sides carry one.
    pub fn same_code(&self, other: &AnswerOption) -> bool {
        if self.code.is_none() || self.code != other.code {
            return false;
        }
        match (&self.system, &other.system) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

/// Where an item's answer options come from: listed inline, or named in
/// the form-level `answerLists` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerSource {
    Inline(Vec<AnswerOption>),
    Named(String),
}

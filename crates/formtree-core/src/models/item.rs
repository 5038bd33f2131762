use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::answer::{AnswerOption, AnswerSource};
use super::calculation::Calculation;
use super::data_type::DataType;
use super::unit::Unit;

/// A question or section as it appears in the form document.
///
/// Only the fields the evaluator reads are typed. Everything else
/// (`question`, `codingInstructions`, `skipLogic`, `displayControl`, ...)
/// lands in `extra` and is written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<AnswerSource>,
    #[serde(
        default,
        alias = "children",
        deserialize_with = "super::null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_method: Option<Calculation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<Unit>>,
    /// Selected unit for REAL/QTY answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<StoredValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    pub fn new(question_code: impl Into<String>, data_type: DataType) -> Self {
        Self {
            question_code: Some(question_code.into()),
            link_id: None,
            data_type,
            answers: None,
            items: Vec::new(),
            calculation_method: None,
            units: None,
            unit: None,
            value: None,
            extra: Map::new(),
        }
    }

    pub fn with_link_id(mut self, link_id: impl Into<String>) -> Self {
        self.link_id = Some(link_id.into());
        self
    }

    pub fn with_answers(mut self, answers: Vec<AnswerOption>) -> Self {
        self.answers = Some(AnswerSource::Inline(answers));
        self
    }

    pub fn with_answer_list(mut self, name: impl Into<String>) -> Self {
        self.answers = Some(AnswerSource::Named(name.into()));
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    pub fn with_calculation(mut self, calculation: Calculation) -> Self {
        self.calculation_method = Some(calculation);
        self
    }

    pub fn with_units(mut self, units: Vec<Unit>) -> Self {
        self.units = Some(units);
        self
    }

    pub fn with_value(mut self, value: StoredValue) -> Self {
        self.value = Some(value);
        self
    }
}

/// The `value` field of an item: a number, a string, a quantity object,
/// or the selected answer option object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredValue {
    Number(f64),
    Text(String),
    Quantity(StoredQuantity),
    Coded(AnswerOption),
}

/// A QTY answer as `{"value": 154, "unit": {"name": "lbs"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuantity {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<Unit>,
}

impl StoredValue {
    pub fn quantity(value: f64, unit: Unit) -> Self {
        Self::Quantity(StoredQuantity {
            value,
            unit: Some(unit),
        })
    }
}

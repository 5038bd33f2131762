use std::fmt;

use serde::{Deserialize, Serialize};

/// Named operation applied to the values of the referenced items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CalculationName {
    /// Sum of the referenced items' scores.
    TotalScore,
    /// Body mass index from a weight and a height reference.
    Bmi,
    /// Anything else. Kept so the document round-trips; evaluating it fails.
    Other(String),
}

impl CalculationName {
    pub fn as_str(&self) -> &str {
        match self {
            Self::TotalScore => "TOTALSCORE",
            Self::Bmi => "BMI",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for CalculationName {
    fn from(name: String) -> Self {
        match name.as_str() {
            "TOTALSCORE" => Self::TotalScore,
            "BMI" => Self::Bmi,
            _ => Self::Other(name),
        }
    }
}

impl From<CalculationName> for String {
    fn from(name: CalculationName) -> Self {
        name.as_str().to_string()
    }
}

impl fmt::Display for CalculationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `calculationMethod` of an item: an operation over absolute link paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub name: CalculationName,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub value: Vec<String>,
}

impl Calculation {
    pub fn total_score<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: CalculationName::TotalScore,
            value: paths.into_iter().map(Into::into).collect(),
        }
    }
}

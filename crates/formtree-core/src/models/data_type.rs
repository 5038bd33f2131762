use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Kind of answer a form item accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum DataType {
    /// Grouping node. Holds children, never an answer.
    Section,
    /// Coded, no extensions: pick one of the item's answer options.
    Cne,
    /// Coded with extensions: an answer option or free text.
    Cwe,
    /// Free text.
    St,
    /// Decimal number.
    Real,
    /// Whole number.
    Int,
    /// Number with a unit of measure.
    Qty,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Section => "SECTION",
            Self::Cne => "CNE",
            Self::Cwe => "CWE",
            Self::St => "ST",
            Self::Real => "REAL",
            Self::Int => "INT",
            Self::Qty => "QTY",
        }
    }

    pub fn is_coded(self) -> bool {
        matches!(self, Self::Cne | Self::Cwe)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Real | Self::Int | Self::Qty)
    }

    /// Whether a value of this type can feed a calculation.
    pub fn is_scorable(self) -> bool {
        self.is_coded() || self.is_numeric()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

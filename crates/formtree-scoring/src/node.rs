use std::cell::Cell;
use std::fmt;

use formtree_core::models::calculation::Calculation;
use formtree_core::models::data_type::DataType;
use formtree_core::models::item::Item;
use formtree_core::models::unit::Unit;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Index of a node inside the [`Form`](crate::form::Form) that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An answer as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerInput {
    /// Code of one of the item's answer options (CNE/CWE). When a list
    /// carries the same code under several systems, the first option with
    /// that code is selected; use [`AnswerInput::Coding`] to pick one.
    Code(String),
    /// Code qualified by its code system. Only an option with both the same
    /// code and the same system matches.
    Coding { system: String, code: String },
    /// Free text (ST, or CWE off-list answer).
    Text(String),
    /// REAL/INT/QTY value in the item's default unit.
    Number(f64),
    /// REAL/QTY value with an explicit unit name or code.
    Quantity { value: f64, unit: String },
}

impl AnswerInput {
    pub fn code(code: impl Into<String>) -> Self {
        Self::Code(code.into())
    }

    pub fn coding(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Coding {
            system: system.into(),
            code: code.into(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn quantity(value: f64, unit: impl Into<String>) -> Self {
        Self::Quantity {
            value,
            unit: unit.into(),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Code(_) | Self::Coding { .. } => "coded",
            Self::Text(_) => "text",
            Self::Number(_) => "numeric",
            Self::Quantity { .. } => "quantity",
        }
    }
}

/// Validated answer held by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    /// Index into the node's answer options.
    Selected(usize),
    Text(String),
    Number(f64),
    Quantity { value: f64, unit: Unit },
}

/// What [`Form::value`](crate::form::Form::value) reports for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum NodeValue {
    Number(f64),
    Text(String),
}

impl NodeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum CalcState {
    Stale,
    Fresh(Option<f64>),
}

/// One question or section in the arena.
#[derive(Debug)]
pub struct Node {
    pub(crate) link_id: String,
    pub(crate) local_code: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Definition with `items` and `value` stripped. `None` for the root.
    pub(crate) item: Option<Item>,
    pub(crate) answer: Option<Answer>,
    pub(crate) calc: Cell<CalcState>,
}

impl Node {
    pub(crate) fn root() -> Self {
        Self {
            link_id: String::new(),
            local_code: String::new(),
            parent: None,
            children: Vec::new(),
            item: None,
            answer: None,
            calc: Cell::new(CalcState::Fresh(None)),
        }
    }

    pub fn link_id(&self) -> &str {
        &self.link_id
    }

    /// Last segment of the link id.
    pub fn local_code(&self) -> &str {
        &self.local_code
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// The form root reports `SECTION`.
    pub fn data_type(&self) -> DataType {
        self.item.as_ref().map_or(DataType::Section, |i| i.data_type)
    }

    pub fn calculation(&self) -> Option<&Calculation> {
        self.item.as_ref()?.calculation_method.as_ref()
    }

    pub fn is_calculated(&self) -> bool {
        self.calculation().is_some()
    }

    pub fn answer(&self) -> Option<&Answer> {
        self.answer.as_ref()
    }

    /// True when a calculated node must be re-evaluated before it is read.
    pub fn is_stale(&self) -> bool {
        self.calc.get() == CalcState::Stale
    }

    /// Unit the current numeric answer is expressed in: the one given with
    /// the answer, else the item's selected unit, else its default unit.
    pub fn unit(&self) -> Option<&Unit> {
        if let Some(Answer::Quantity { unit, .. }) = &self.answer {
            return Some(unit);
        }
        let item = self.item.as_ref()?;
        item.unit.as_ref().or_else(|| {
            item.units
                .as_deref()?
                .iter()
                .find(|u| u.default == Some(true))
        })
    }
}

use formtree_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("invalid answer for '{link_id}': {reason}")]
    InvalidAnswer { link_id: String, reason: String },

    #[error("no item with linkId '{path}'{}", referenced_by(.referrer))]
    PathNotFound {
        path: String,
        referrer: Option<String>,
    },

    #[error("calculation cycle: {}", .cycle.join(" → "))]
    CalculationCycle { cycle: Vec<String> },

    #[error("'{calculation}' references '{reference}': {reason}")]
    InvalidReference {
        calculation: String,
        reference: String,
        reason: String,
    },

    #[error("'{link_id}': unsupported calculation '{name}'")]
    UnsupportedCalculation { link_id: String, name: String },

    #[error("'{link_id}': {reason}")]
    InvalidCalculation { link_id: String, reason: String },

    #[error("'{link_id}' has no calculationMethod")]
    NotCalculated { link_id: String },

    #[error("duplicate linkId '{0}'")]
    DuplicateLinkId(String),

    #[error("linkId '{link_id}' is not a direct child path of '{parent}'")]
    LinkIdMismatch { link_id: String, parent: String },

    #[error("'{link_id}' uses unknown answer list '{name}'")]
    UnknownAnswerList { link_id: String, name: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl FormError {
    /// Attach the calculation node that followed a dangling path.
    pub fn referenced_from(self, link_id: &str) -> Self {
        match self {
            Self::PathNotFound { path, .. } => Self::PathNotFound {
                path,
                referrer: Some(link_id.to_string()),
            },
            other => other,
        }
    }
}

fn referenced_by(referrer: &Option<String>) -> String {
    match referrer {
        Some(link_id) => format!(" (referenced by '{link_id}')"),
        None => String::new(),
    }
}

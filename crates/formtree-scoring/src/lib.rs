//! formtree-scoring
//!
//! Evaluator for hierarchical assessment forms. Builds an arena tree from a
//! [`FormDefinition`], holds the answer state of a single form session,
//! resolves absolute `linkId` paths and computes calculated items such as
//! `TOTALSCORE` summary scores.
//!
//! ```no_run
//! use formtree_scoring::{build_tree, AnswerInput};
//!
//! # fn main() -> Result<(), formtree_scoring::FormError> {
//! # let json = "{}";
//! let mut form = build_tree(json)?;
//! let item = form.resolve("/54522-8/57244-6")?;
//! form.set_answer(item, AnswerInput::code("LA6568-5"))?;
//! let total = form.resolve("/54522-8/total")?;
//! println!("{:?}", form.evaluate(total)?);
//! # Ok(())
//! # }
//! ```

pub mod calculation;
pub mod error;
pub mod form;
pub mod node;
mod path;
mod validate;

pub use calculation::CalculationOutcome;
pub use error::FormError;
pub use form::Form;
pub use formtree_core::config::{EvaluatorConfig, MissingReferencePolicy};
pub use formtree_core::models::form::FormDefinition;
pub use node::{Answer, AnswerInput, Node, NodeId, NodeValue};

/// Parse a form document and build its tree with the default config.
pub fn build_tree(json: &str) -> Result<Form, FormError> {
    Form::from_json(json)
}

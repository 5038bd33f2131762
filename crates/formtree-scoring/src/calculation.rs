//! Calculated items.
//!
//! A calculated item carries a `calculationMethod`: an operation name plus
//! the absolute link paths of the items it reads. Values are cached on the
//! node and only recomputed after an answer they depend on has changed.

use formtree_core::config::MissingReferencePolicy;
use formtree_core::models::calculation::{Calculation, CalculationName};
use formtree_core::models::data_type::DataType;
use formtree_core::models::unit::Unit;
use tracing::{debug, trace};

use crate::error::FormError;
use crate::form::Form;
use crate::node::{CalcState, NodeId};

/// Result of evaluating one calculated item during [`Form::evaluate_all`].
#[derive(Debug)]
pub struct CalculationOutcome {
    pub node: NodeId,
    pub link_id: String,
    pub result: Result<Option<f64>, FormError>,
}

/// Value read from one referenced item.
struct Input<'a> {
    link_id: &'a str,
    value: Option<f64>,
    unit: Option<&'a Unit>,
}

impl Form {
    /// Value of a calculated item, recomputing it if an input changed.
    ///
    /// `None` means the calculation has no value yet (a BMI without a
    /// height, or any unanswered input under
    /// [`MissingReferencePolicy::Incomplete`]). A failed evaluation leaves
    /// the item stale and touches no other item.
    pub fn evaluate(&self, id: NodeId) -> Result<Option<f64>, FormError> {
        let node = self.node(id);
        if !node.is_calculated() {
            return Err(FormError::NotCalculated {
                link_id: node.link_id().to_string(),
            });
        }
        self.evaluate_in(id, &mut Vec::new())
    }

    /// Evaluate every calculated item in document order. Failures are
    /// reported per item.
    pub fn evaluate_all(&self) -> Vec<CalculationOutcome> {
        self.nodes()
            .filter(|(_, node)| node.is_calculated())
            .map(|(id, node)| CalculationOutcome {
                node: id,
                link_id: node.link_id().to_string(),
                result: self.evaluate(id),
            })
            .collect()
    }

    fn evaluate_in(&self, id: NodeId, stack: &mut Vec<NodeId>) -> Result<Option<f64>, FormError> {
        let node = self.node(id);
        if let CalcState::Fresh(value) = node.calc.get() {
            return Ok(value);
        }
        if let Some(start) = stack.iter().position(|&n| n == id) {
            let mut cycle: Vec<String> = stack[start..]
                .iter()
                .map(|&n| self.node(n).link_id().to_string())
                .collect();
            cycle.push(node.link_id().to_string());
            return Err(FormError::CalculationCycle { cycle });
        }
        let Some(calculation) = node.calculation() else {
            return Err(FormError::NotCalculated {
                link_id: node.link_id().to_string(),
            });
        };

        stack.push(id);
        let result = self.compute(node.link_id(), calculation, stack);
        stack.pop();

        let value = result?;
        node.calc.set(CalcState::Fresh(value));
        debug!(link_id = %node.link_id(), value = ?value, "calculated");
        Ok(value)
    }

    fn compute(
        &self,
        link_id: &str,
        calculation: &Calculation,
        stack: &mut Vec<NodeId>,
    ) -> Result<Option<f64>, FormError> {
        let combine: Combine = match &calculation.name {
            CalculationName::TotalScore => total_score,
            CalculationName::Bmi => bmi,
            CalculationName::Other(name) => {
                return Err(FormError::UnsupportedCalculation {
                    link_id: link_id.to_string(),
                    name: name.clone(),
                });
            }
        };

        let inputs = calculation
            .value
            .iter()
            .map(|path| self.input(link_id, path, stack))
            .collect::<Result<Vec<_>, _>>()?;

        combine(link_id, &inputs, self.config().missing_reference)
    }

    fn input(
        &self,
        calculation: &str,
        path: &str,
        stack: &mut Vec<NodeId>,
    ) -> Result<Input<'_>, FormError> {
        let target = self
            .resolve(path)
            .map_err(|e| e.referenced_from(calculation))?;
        let node = self.node(target);

        let value = if node.is_calculated() {
            self.evaluate_in(target, stack)?
        } else {
            match node.data_type() {
                DataType::Section | DataType::St => {
                    return Err(FormError::InvalidReference {
                        calculation: calculation.to_string(),
                        reference: path.to_string(),
                        reason: format!("{} items cannot be scored", node.data_type()),
                    });
                }
                _ => self.value(target)?.and_then(|v| v.as_number()),
            }
        };

        Ok(Input {
            link_id: node.link_id(),
            value,
            unit: node.unit(),
        })
    }
}

type Combine =
    fn(&str, &[Input<'_>], MissingReferencePolicy) -> Result<Option<f64>, FormError>;

fn total_score(
    _link_id: &str,
    inputs: &[Input<'_>],
    policy: MissingReferencePolicy,
) -> Result<Option<f64>, FormError> {
    let mut total = 0.0;
    for input in inputs {
        match (input.value, policy) {
            (Some(value), _) => total += value,
            (None, MissingReferencePolicy::Zero) => {
                trace!(link_id = input.link_id, "no score, counted as 0");
            }
            (None, MissingReferencePolicy::Incomplete) => {
                trace!(link_id = input.link_id, "no score, total incomplete");
                return Ok(None);
            }
        }
    }
    Ok(Some(total))
}

/// weight / height², rounded to two decimals. Inputs are converted to
/// kilograms and metres from the unit of each referenced item. Missing
/// inputs always leave the BMI without a value.
fn bmi(
    link_id: &str,
    inputs: &[Input<'_>],
    _policy: MissingReferencePolicy,
) -> Result<Option<f64>, FormError> {
    let [weight, height] = inputs else {
        return Err(FormError::InvalidCalculation {
            link_id: link_id.to_string(),
            reason: format!(
                "BMI needs a weight and a height reference, got {}",
                inputs.len()
            ),
        });
    };
    let (Some(w), Some(h)) = (weight.value, height.value) else {
        return Ok(None);
    };

    let unknown_unit = |input: &Input<'_>| FormError::InvalidCalculation {
        link_id: link_id.to_string(),
        reason: format!(
            "unsupported unit '{}' on '{}'",
            input.unit.map_or("", |u| u.name.as_str()),
            input.link_id
        ),
    };
    let kg = w * conversion(weight.unit, KILOGRAMS).ok_or_else(|| unknown_unit(weight))?;
    let m = h * conversion(height.unit, METRES).ok_or_else(|| unknown_unit(height))?;
    if kg <= 0.0 || m <= 0.0 {
        return Ok(None);
    }

    Ok(Some((kg / (m * m) * 100.0).round() / 100.0))
}

const KILOGRAMS: &[(&str, f64)] = &[
    ("kg", 1.0),
    ("g", 0.001),
    ("lb", 0.453_592_37),
    ("lbs", 0.453_592_37),
    ("[lb_av]", 0.453_592_37),
];

const METRES: &[(&str, f64)] = &[
    ("m", 1.0),
    ("cm", 0.01),
    ("in", 0.0254),
    ("inches", 0.0254),
    ("[in_i]", 0.0254),
    ("ft", 0.3048),
    ("[ft_i]", 0.3048),
];

/// Factor into the table's base unit. No unit means the base unit.
fn conversion(unit: Option<&Unit>, table: &[(&str, f64)]) -> Option<f64> {
    let Some(unit) = unit else {
        return Some(1.0);
    };
    [unit.code.as_deref(), Some(unit.name.as_str())]
        .into_iter()
        .flatten()
        .find_map(|key| {
            table
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(key))
                .map(|&(_, factor)| factor)
        })
}

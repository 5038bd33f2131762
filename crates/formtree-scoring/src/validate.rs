use formtree_core::models::calculation::CalculationName;
use formtree_core::models::data_type::DataType;
use petgraph::algo::{astar, is_cyclic_directed, tarjan_scc};

use crate::error::FormError;
use crate::form::Form;
use crate::node::NodeId;

impl Form {
    /// Report every data-integrity problem in the form's calculations
    /// without evaluating anything: unknown operations, dangling or
    /// unscorable references, malformed BMI inputs and reference cycles.
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();

        for (_, node) in self.nodes() {
            let Some(calculation) = node.calculation() else {
                continue;
            };
            let link_id = node.link_id();

            match &calculation.name {
                CalculationName::Other(name) => errors.push(FormError::UnsupportedCalculation {
                    link_id: link_id.to_string(),
                    name: name.clone(),
                }),
                CalculationName::Bmi if calculation.value.len() != 2 => {
                    errors.push(FormError::InvalidCalculation {
                        link_id: link_id.to_string(),
                        reason: format!(
                            "BMI needs a weight and a height reference, got {}",
                            calculation.value.len()
                        ),
                    })
                }
                _ => {}
            }

            for path in &calculation.value {
                let target = match self.resolve(path) {
                    Ok(target) => self.node(target),
                    Err(e) => {
                        errors.push(e.referenced_from(link_id));
                        continue;
                    }
                };
                if !target.is_calculated()
                    && matches!(target.data_type(), DataType::Section | DataType::St)
                {
                    errors.push(FormError::InvalidReference {
                        calculation: link_id.to_string(),
                        reference: path.clone(),
                        reason: format!("{} items cannot be scored", target.data_type()),
                    });
                }
            }
        }

        errors.extend(self.find_cycles());
        errors
    }

    /// One `CalculationCycle` per strongly connected group of calculations,
    /// listed from the group's first node in document order and closed back
    /// onto it.
    fn find_cycles(&self) -> Vec<FormError> {
        let graph = self.dependencies();
        if !is_cyclic_directed(graph) {
            return Vec::new();
        }

        let mut cycles: Vec<Vec<NodeId>> = tarjan_scc(graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .filter_map(|scc| {
                let start = *scc.iter().min()?;
                let next = graph.neighbors(start).filter(|n| scc.contains(n)).min()?;
                let (_, path) = astar(graph, next, |n| n == start, |_| 1u32, |_| 0)?;
                Some(std::iter::once(start).chain(path).collect())
            })
            .collect();
        cycles.sort();

        cycles
            .into_iter()
            .map(|cycle| FormError::CalculationCycle {
                cycle: cycle
                    .into_iter()
                    .map(|id| self.node(id).link_id().to_string())
                    .collect(),
            })
            .collect()
    }
}

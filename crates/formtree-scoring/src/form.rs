use std::collections::HashSet;

use formtree_core::config::EvaluatorConfig;
use formtree_core::error::CoreError;
use formtree_core::models::answer::{AnswerOption, AnswerSource};
use formtree_core::models::data_type::DataType;
use formtree_core::models::form::FormDefinition;
use formtree_core::models::item::{Item, StoredValue};
use formtree_core::models::unit::Unit;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Bfs, Reversed};
use tracing::{debug, info, warn};

use crate::error::FormError;
use crate::node::{Answer, AnswerInput, CalcState, Node, NodeId, NodeValue};

/// A form session: immutable topology plus mutable answer state.
///
/// Node 0 is the synthetic root; its children are the document's top-level
/// items. Calculated values are cached per node and recomputed lazily after
/// an answer they depend on changes.
#[derive(Debug)]
pub struct Form {
    /// Document envelope with `items` stripped (name, code, answerLists, ...).
    envelope: FormDefinition,
    nodes: Vec<Node>,
    /// Calculation -> every node its `calculationMethod` reads.
    dependencies: DiGraphMap<NodeId, ()>,
    config: EvaluatorConfig,
}

impl Form {
    pub fn from_json(json: &str) -> Result<Self, FormError> {
        Self::from_definition(FormDefinition::from_json(json)?)
    }

    pub fn from_definition(definition: FormDefinition) -> Result<Self, FormError> {
        Self::build(definition, EvaluatorConfig::default())
    }

    /// Build the tree, check link ids and answer-list references, and load
    /// any `value` already present in the document.
    pub fn build(
        mut definition: FormDefinition,
        config: EvaluatorConfig,
    ) -> Result<Self, FormError> {
        let items = std::mem::take(&mut definition.items);
        let mut form = Self {
            envelope: definition,
            nodes: vec![Node::root()],
            dependencies: DiGraphMap::new(),
            config,
        };

        let mut seen = HashSet::new();
        let mut stored = Vec::new();
        for item in items {
            form.add_item(item, NodeId(0), &mut seen, &mut stored)?;
        }

        for (id, value) in stored {
            let answer = form.stored_answer(id, value)?;
            form.nodes[id.0].answer = Some(answer);
        }

        form.link_dependencies();
        info!(
            name = form.envelope.name.as_deref().unwrap_or(""),
            nodes = form.nodes.len() - 1,
            "form built"
        );
        Ok(form)
    }

    fn add_item(
        &mut self,
        mut item: Item,
        parent: NodeId,
        seen: &mut HashSet<String>,
        stored: &mut Vec<(NodeId, StoredValue)>,
    ) -> Result<NodeId, FormError> {
        let delimiter = self.config.path_delimiter;
        let parent_link = self.nodes[parent.0].link_id.clone();

        let (link_id, local_code) = match &item.link_id {
            Some(link_id) => {
                let local = link_id
                    .strip_prefix(parent_link.as_str())
                    .and_then(|rest| rest.strip_prefix(delimiter))
                    .filter(|rest| !rest.is_empty() && !rest.contains(delimiter))
                    .ok_or_else(|| FormError::LinkIdMismatch {
                        link_id: link_id.clone(),
                        parent: parent_link.clone(),
                    })?;
                (link_id.clone(), local.to_string())
            }
            None => {
                let code = item
                    .question_code
                    .clone()
                    .filter(|c| !c.is_empty() && !c.contains(delimiter))
                    .ok_or_else(|| {
                        CoreError::MissingField(format!(
                            "questionCode of an item under '{parent_link}'"
                        ))
                    })?;
                (format!("{parent_link}{delimiter}{code}"), code)
            }
        };

        if !seen.insert(link_id.clone()) {
            return Err(FormError::DuplicateLinkId(link_id));
        }
        if let Some(AnswerSource::Named(name)) = &item.answers
            && !self.envelope.answer_lists.contains_key(name)
        {
            return Err(FormError::UnknownAnswerList {
                link_id,
                name: name.clone(),
            });
        }

        let id = NodeId(self.nodes.len());
        let children = std::mem::take(&mut item.items);
        if let Some(value) = item.value.take() {
            if item.calculation_method.is_some() {
                debug!(link_id = %link_id, "ignoring stored value of calculated item");
            } else {
                stored.push((id, value));
            }
        }
        item.link_id = Some(link_id.clone());

        let mut node = Node::root();
        node.link_id = link_id;
        node.local_code = local_code;
        node.parent = Some(parent);
        if item.calculation_method.is_some() {
            node.calc.set(CalcState::Stale);
        }
        node.item = Some(item);
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);

        for child in children {
            self.add_item(child, id, seen, stored)?;
        }
        Ok(id)
    }

    /// Add an edge for every resolvable calculation reference. Dangling
    /// paths are left for evaluation/validation to report.
    fn link_dependencies(&mut self) {
        let mut graph = DiGraphMap::new();
        for (id, node) in self.nodes() {
            let Some(calculation) = node.calculation() else {
                continue;
            };
            graph.add_node(id);
            for path in &calculation.value {
                if let Ok(target) = self.resolve(path) {
                    graph.add_edge(id, target, ());
                }
            }
        }
        debug!(
            calculations = graph.node_count(),
            references = graph.edge_count(),
            "dependency graph built"
        );
        self.dependencies = graph;
    }

    pub(crate) fn dependencies(&self) -> &DiGraphMap<NodeId, ()> {
        &self.dependencies
    }

    fn stored_answer(&self, id: NodeId, value: StoredValue) -> Result<Answer, FormError> {
        let node = self.node(id);
        match value {
            StoredValue::Coded(option) if node.data_type().is_coded() => {
                let options = self.answer_options(id);
                let exact = options
                    .iter()
                    .position(|o| o.code == option.code && o.system == option.system);
                let index = exact.or_else(|| options.iter().position(|o| o.same_code(&option)));
                if let Some(index) = index {
                    return Ok(Answer::Selected(index));
                }
                match (node.data_type(), option.text) {
                    (DataType::Cwe, Some(text)) if option.code.is_none() => Ok(Answer::Text(text)),
                    _ => Err(FormError::InvalidAnswer {
                        link_id: node.link_id.clone(),
                        reason: format!(
                            "stored code {:?} is not one of the item's answer options",
                            option.code
                        ),
                    }),
                }
            }
            StoredValue::Quantity(qty) => match qty.unit {
                Some(unit) => self.check_answer(id, AnswerInput::quantity(qty.value, unit.name)),
                None => self.check_answer(id, AnswerInput::Number(qty.value)),
            },
            StoredValue::Coded(_) => Err(FormError::InvalidAnswer {
                link_id: node.link_id.clone(),
                reason: format!("stored answer object on a {} item", node.data_type()),
            }),
            StoredValue::Number(n) => self.check_answer(id, AnswerInput::Number(n)),
            StoredValue::Text(t) => self.check_answer(id, AnswerInput::Text(t)),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics if `id` did not come from this form.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Number of items, excluding the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn name(&self) -> Option<&str> {
        self.envelope.name.as_deref()
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Answer options of a coded item, with named lists resolved. Empty for
    /// every other item.
    pub fn answer_options(&self, id: NodeId) -> &[AnswerOption] {
        let Some(item) = self.node(id).item.as_ref() else {
            return &[];
        };
        match &item.answers {
            Some(AnswerSource::Inline(answers)) => answers,
            Some(AnswerSource::Named(name)) => self
                .envelope
                .answer_lists
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            None => &[],
        }
    }

    /// The answer option currently selected on a coded item.
    pub fn selected_option(&self, id: NodeId) -> Option<&AnswerOption> {
        match self.node(id).answer {
            Some(Answer::Selected(index)) => self.answer_options(id).get(index),
            _ => None,
        }
    }

    /// Validate and store an answer, then mark every calculation that
    /// depends on this node (directly or through other calculations) stale.
    /// On error the tree is unchanged.
    pub fn set_answer(&mut self, id: NodeId, input: AnswerInput) -> Result<(), FormError> {
        let answer = self.check_answer(id, input)?;
        debug!(link_id = %self.node(id).link_id, answer = ?answer, "answer set");
        self.nodes[id.0].answer = Some(answer);
        self.mark_dependents_stale(id);
        Ok(())
    }

    pub fn clear_answer(&mut self, id: NodeId) {
        if self.nodes[id.0].answer.take().is_some() {
            debug!(link_id = %self.node(id).link_id, "answer cleared");
            self.mark_dependents_stale(id);
        }
    }

    fn check_answer(&self, id: NodeId, input: AnswerInput) -> Result<Answer, FormError> {
        let node = self.node(id);
        let data_type = node.data_type();
        let invalid = |reason: String| FormError::InvalidAnswer {
            link_id: node.link_id.clone(),
            reason,
        };

        if node.is_calculated() {
            return Err(invalid("calculated items take no direct answer".to_string()));
        }

        match (data_type, input) {
            (DataType::Section, _) => Err(invalid("sections take no answer".to_string())),
            (DataType::Cne | DataType::Cwe, AnswerInput::Code(code)) => self
                .answer_options(id)
                .iter()
                .position(|o| o.code.as_deref() == Some(code.as_str()))
                .map(Answer::Selected)
                .ok_or_else(|| {
                    invalid(format!("'{code}' is not one of the item's answer options"))
                }),
            (DataType::Cne | DataType::Cwe, AnswerInput::Coding { system, code }) => self
                .answer_options(id)
                .iter()
                .position(|o| {
                    o.code.as_deref() == Some(code.as_str())
                        && o.system.as_deref() == Some(system.as_str())
                })
                .map(Answer::Selected)
                .ok_or_else(|| {
                    invalid(format!(
                        "'{code}' in '{system}' is not one of the item's answer options"
                    ))
                }),
            (DataType::Cwe | DataType::St, AnswerInput::Text(text)) => Ok(Answer::Text(text)),
            (DataType::Real | DataType::Qty, AnswerInput::Number(n)) if n.is_finite() => {
                Ok(Answer::Number(n))
            }
            (DataType::Int, AnswerInput::Number(n)) if n.is_finite() && n.fract() == 0.0 => {
                Ok(Answer::Number(n))
            }
            (DataType::Real | DataType::Qty, AnswerInput::Quantity { value, unit })
                if value.is_finite() =>
            {
                let declared = node.item.as_ref().and_then(|i| i.units.as_deref());
                let unit = match declared {
                    Some(units) if !units.is_empty() => units
                        .iter()
                        .find(|u| u.matches(&unit))
                        .cloned()
                        .ok_or_else(|| invalid(format!("unit '{unit}' is not offered")))?,
                    _ => Unit::named(unit),
                };
                Ok(Answer::Quantity { value, unit })
            }
            (_, input) => Err(invalid(format!(
                "{} answer does not fit a {data_type} item",
                input.kind()
            ))),
        }
    }

    /// Walk the dependency graph backwards from `id`; every calculation
    /// reached reads `id` directly or through other calculations.
    fn mark_dependents_stale(&self, id: NodeId) {
        if !self.dependencies.contains_node(id) {
            return;
        }
        let reversed = Reversed(&self.dependencies);
        let mut bfs = Bfs::new(reversed, id);
        let mut stale = 0;
        while let Some(dependent) = bfs.next(reversed) {
            if dependent != id {
                self.nodes[dependent.0].calc.set(CalcState::Stale);
                stale += 1;
            }
        }
        if stale > 0 {
            debug!(
                link_id = %self.node(id).link_id,
                stale,
                "dependent calculations invalidated"
            );
        }
    }

    /// Current value of a node. Coded items report the selected option's
    /// score, numeric items their number, ST items their text. Calculated
    /// items are evaluated first if stale.
    pub fn value(&self, id: NodeId) -> Result<Option<NodeValue>, FormError> {
        let node = self.node(id);
        if node.is_calculated() {
            return Ok(self.evaluate(id)?.map(NodeValue::Number));
        }
        Ok(match &node.answer {
            Some(Answer::Selected(_)) => self
                .selected_option(id)
                .and_then(|o| o.score)
                .map(NodeValue::Number),
            Some(Answer::Text(text)) => Some(NodeValue::Text(text.clone())),
            Some(Answer::Number(n)) | Some(Answer::Quantity { value: n, .. }) => {
                Some(NodeValue::Number(*n))
            }
            None => None,
        })
    }

    /// Rebuild the document with every answer and every calculated value
    /// written into `value`. A calculation that fails is written without a
    /// value.
    pub fn to_definition(&self) -> FormDefinition {
        let mut definition = self.envelope.clone();
        definition.items = self
            .children(self.root())
            .iter()
            .map(|&child| self.export_item(child))
            .collect();
        definition
    }

    pub fn to_json(&self) -> Result<String, FormError> {
        Ok(self.to_definition().to_json_pretty()?)
    }

    fn export_item(&self, id: NodeId) -> Item {
        let node = self.node(id);
        let mut item = node.item.clone().unwrap_or_else(|| Item::new("", DataType::Section));

        if node.is_calculated() {
            match self.evaluate(id) {
                Ok(value) => item.value = value.map(StoredValue::Number),
                Err(e) => {
                    warn!(link_id = %node.link_id, error = %e, "calculation skipped on export")
                }
            }
        } else {
            item.value = match &node.answer {
                Some(Answer::Selected(_)) => {
                    self.selected_option(id).cloned().map(StoredValue::Coded)
                }
                Some(Answer::Text(text)) => Some(StoredValue::Text(text.clone())),
                Some(Answer::Number(n)) => Some(StoredValue::Number(*n)),
                Some(Answer::Quantity { value, unit }) => {
                    Some(StoredValue::quantity(*value, unit.clone()))
                }
                None => None,
            };
        }

        item.items = node.children.iter().map(|&c| self.export_item(c)).collect();
        item
    }
}

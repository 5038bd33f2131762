use formtree_core::config::EvaluatorConfig;
use formtree_core::models::data_type::DataType;
use formtree_core::models::form::FormDefinition;
use formtree_core::models::item::Item;
use formtree_scoring::{Form, FormError};
use proptest::prelude::*;

const OASIS: &str = include_str!("fixtures/oasis_excerpt.json");

#[test]
fn every_node_resolves_to_itself() {
    let form = Form::from_json(OASIS).unwrap();

    for (id, node) in form.nodes().skip(1) {
        assert_eq!(form.resolve(node.link_id()).unwrap(), id, "{}", node.link_id());
    }
}

#[test]
fn nested_path_walks_each_level() {
    let form = Form::from_json(OASIS).unwrap();

    let hearing = form.resolve("/86843-0/54636-6").unwrap();
    let node = form.node(hearing);
    assert_eq!(node.local_code(), "54636-6");
    assert_eq!(node.data_type(), DataType::Cne);

    let section = node.parent().unwrap();
    assert_eq!(form.node(section).link_id(), "/86843-0");
    assert_eq!(form.node(section).parent(), Some(form.root()));
}

#[test]
fn unknown_paths_are_not_found() {
    let form = Form::from_json(OASIS).unwrap();

    for path in [
        "",
        "/",
        "/nope",
        "86843-0",
        "/86843-0/",
        "/86843-0//54636-6",
        "/86843-0/54636-6/extra",
        "/54636-6",
    ] {
        match form.resolve(path) {
            Err(FormError::PathNotFound { path: reported, referrer: None }) => {
                assert_eq!(reported, path)
            }
            other => panic!("{path:?} resolved to {other:?}"),
        }
    }
}

#[test]
fn derived_link_ids_follow_the_configured_delimiter() {
    let definition = FormDefinition::new(vec![Item::new("A", DataType::Section).with_items(vec![
        Item::new("x", DataType::Real),
        Item::new("y", DataType::Real),
    ])]);
    let config = EvaluatorConfig {
        path_delimiter: '.',
        ..EvaluatorConfig::default()
    };

    let form = Form::build(definition, config).unwrap();

    let y = form.resolve(".A.y").unwrap();
    assert_eq!(form.node(y).link_id(), ".A.y");
    assert!(form.resolve("/A/y").is_err());
}

#[derive(Debug, Clone)]
struct Shape(Vec<Shape>);

fn shapes() -> impl Strategy<Value = Shape> {
    Just(Shape(Vec::new())).prop_recursive(5, 120, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Shape)
    })
}

fn to_items(shape: &Shape, prefix: &str) -> Vec<Item> {
    shape
        .0
        .iter()
        .enumerate()
        .map(|(i, child)| {
            let code = format!("{prefix}{i}");
            if child.0.is_empty() {
                Item::new(code, DataType::Real)
            } else {
                Item::new(code.clone(), DataType::Section).with_items(to_items(child, &code))
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn resolve_round_trips_for_any_tree(shape in shapes(), prefix in "[A-Z][0-9]{0,3}-") {
        let definition = FormDefinition::new(to_items(&shape, &prefix));
        let expected = definition.item_count();
        let form = Form::from_definition(definition).unwrap();

        prop_assert_eq!(form.len(), expected);
        for (id, node) in form.nodes().skip(1) {
            prop_assert_eq!(form.resolve(node.link_id()).unwrap(), id);
        }
    }
}

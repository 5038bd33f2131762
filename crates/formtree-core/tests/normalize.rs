use formtree_core::models::answer::{AnswerOption, AnswerSource};
use formtree_core::models::data_type::DataType;
use formtree_core::models::form::FormDefinition;
use formtree_core::models::item::Item;
use formtree_core::normalize::{inline_answer_lists, intern_answer_lists};
use pretty_assertions::assert_eq;

fn gg_scale() -> Vec<AnswerOption> {
    vec![
        AnswerOption::new("LA22585-4", "Independent").with_score(6.0),
        AnswerOption::new("LA22586-2", "Setup or clean-up assistance").with_score(5.0),
        AnswerOption::new("LA22587-0", "Supervision or touching assistance").with_score(4.0),
    ]
}

fn gg_form() -> FormDefinition {
    FormDefinition::new(vec![Item::new("GG0130", DataType::Section).with_items(vec![
        Item::new("A", DataType::Cne).with_answers(gg_scale()),
        Item::new("B", DataType::Cne).with_answers(gg_scale()),
        Item::new("C", DataType::Cne).with_answers(gg_scale()),
        Item::new("D", DataType::Cne).with_answers(vec![AnswerOption::new("Y", "Yes")]),
    ])])
}

#[test]
fn repeated_lists_are_interned_once() {
    let mut form = gg_form();

    let rewritten = intern_answer_lists(&mut form).unwrap();

    assert_eq!(rewritten, 3);
    assert_eq!(form.answer_lists.len(), 1);
    let (name, answers) = form.answer_lists.iter().next().unwrap();
    assert_eq!(answers, &gg_scale());

    let section = &form.items[0];
    for item in &section.items[..3] {
        assert_eq!(item.answers, Some(AnswerSource::Named(name.clone())));
    }
    assert!(matches!(section.items[3].answers, Some(AnswerSource::Inline(_))));
}

#[test]
fn existing_named_list_is_reused() {
    let mut form = gg_form();
    form.answer_lists.insert("gg-self-care".to_string(), gg_scale());

    intern_answer_lists(&mut form).unwrap();

    assert_eq!(form.answer_lists.len(), 1);
    assert_eq!(
        form.items[0].items[0].answers,
        Some(AnswerSource::Named("gg-self-care".to_string()))
    );
}

#[test]
fn generated_names_avoid_existing_ones() {
    let mut form = gg_form();
    form.answer_lists
        .insert("answers1".to_string(), vec![AnswerOption::new("N", "No")]);

    intern_answer_lists(&mut form).unwrap();

    assert!(form.answer_lists.contains_key("answers2"));
}

#[test]
fn inlining_restores_the_original_tree() {
    let original = gg_form();
    let mut form = original.clone();

    intern_answer_lists(&mut form).unwrap();
    inline_answer_lists(&mut form).unwrap();

    assert_eq!(form, original);
}

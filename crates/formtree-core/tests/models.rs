use formtree_core::models::answer::{AnswerOption, AnswerSource};
use formtree_core::models::calculation::{Calculation, CalculationName};
use formtree_core::models::data_type::DataType;
use formtree_core::models::form::FormDefinition;
use formtree_core::models::item::{Item, StoredQuantity, StoredValue};
use formtree_core::models::unit::Unit;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn null_lists_read_as_empty() {
    let item: Item = serde_json::from_value(json!({
        "questionCode": "54636-6",
        "dataType": "CNE",
        "answers": null,
        "items": null,
        "units": null
    }))
    .unwrap();

    assert!(item.answers.is_none());
    assert!(item.items.is_empty());
    assert!(item.units.is_none());
}

#[test]
fn children_alias_is_accepted() {
    let item: Item = serde_json::from_value(json!({
        "questionCode": "A",
        "dataType": "SECTION",
        "children": [{ "questionCode": "x", "dataType": "ST" }]
    }))
    .unwrap();

    assert_eq!(item.items.len(), 1);
    assert_eq!(item.items[0].data_type, DataType::St);
}

#[test]
fn opaque_fields_survive_a_round_trip() {
    let source = json!({
        "questionCode": "44250-9",
        "linkId": "/54635-8/44250-9",
        "dataType": "CNE",
        "question": "Little interest or pleasure in doing things",
        "codingInstructions": "Ask the patient.",
        "displayControl": { "answerLayout": { "type": "RADIO_CHECKBOX" } },
        "skipLogic": { "conditions": [{ "source": "/54635-8/x", "trigger": { "value": 1 } }] },
        "answers": [
            { "label": "0", "code": "LA6568-5", "text": "Not at all", "score": 0, "other": null }
        ]
    });

    let item: Item = serde_json::from_value(source.clone()).unwrap();
    assert_eq!(item.extra["question"], "Little interest or pleasure in doing things");
    assert_eq!(item.extra["skipLogic"]["conditions"][0]["source"], "/54635-8/x");

    let back = serde_json::to_value(&item).unwrap();
    assert_eq!(back["displayControl"], source["displayControl"]);
    assert_eq!(back["codingInstructions"], source["codingInstructions"]);
    assert_eq!(back["answers"][0]["score"], 0.0);
}

#[test]
fn answers_can_name_a_shared_list() {
    let item: Item = serde_json::from_value(json!({
        "questionCode": "GG0130A",
        "dataType": "CNE",
        "answers": "gg-self-care"
    }))
    .unwrap();

    assert_eq!(item.answers, Some(AnswerSource::Named("gg-self-care".to_string())));
}

#[test]
fn calculation_names_round_trip() {
    let calc: Calculation = serde_json::from_value(json!({
        "name": "TOTALSCORE",
        "value": ["/A/x", "/A/y"]
    }))
    .unwrap();
    assert_eq!(calc, Calculation::total_score(["/A/x", "/A/y"]));

    let other: Calculation = serde_json::from_value(json!({ "name": "MEDIAN", "value": null })).unwrap();
    assert_eq!(other.name, CalculationName::Other("MEDIAN".to_string()));
    assert!(other.value.is_empty());
    assert_eq!(serde_json::to_value(&other).unwrap()["name"], "MEDIAN");
}

#[test]
fn stored_values_keep_their_shape() {
    let number: StoredValue = serde_json::from_value(json!(3)).unwrap();
    assert_eq!(number, StoredValue::Number(3.0));

    let text: StoredValue = serde_json::from_value(json!("lives alone")).unwrap();
    assert_eq!(text, StoredValue::Text("lives alone".to_string()));

    let coded: StoredValue =
        serde_json::from_value(json!({ "code": "LA6569-3", "text": "Several days" })).unwrap();
    assert_eq!(
        coded,
        StoredValue::Coded(AnswerOption::new("LA6569-3", "Several days"))
    );
}

#[test]
fn stored_quantity_reads_as_quantity_not_option() {
    let qty: StoredValue =
        serde_json::from_value(json!({ "value": 154, "unit": { "name": "lbs" } })).unwrap();
    assert_eq!(qty, StoredValue::quantity(154.0, Unit::named("lbs")));

    let bare: StoredValue = serde_json::from_value(json!({ "value": 70.5 })).unwrap();
    assert_eq!(
        bare,
        StoredValue::Quantity(StoredQuantity {
            value: 70.5,
            unit: None
        })
    );

    assert_eq!(
        serde_json::to_value(&qty).unwrap(),
        json!({ "value": 154.0, "unit": { "name": "lbs" } })
    );
}

#[test]
fn same_code_ignores_system_when_one_side_lacks_it() {
    let option = AnswerOption::new("LA6569-3", "Several days").with_system("http://loinc.org");
    let bare = AnswerOption::new("LA6569-3", "");
    let other_system = AnswerOption::new("LA6569-3", "").with_system("urn:local");

    assert!(option.same_code(&bare));
    assert!(!option.same_code(&other_system));
    assert!(!AnswerOption::default().same_code(&AnswerOption::default()));
}

#[test]
fn form_envelope_keeps_unknown_fields() {
    let form = FormDefinition::from_json(
        r#"{
            "lformsVersion": "29.0.0",
            "name": "OASIS-E",
            "copyrightNotice": "public domain",
            "items": [
                { "questionCode": "A", "dataType": "SECTION", "items": [
                    { "questionCode": "x", "dataType": "REAL" }
                ]}
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(form.name.as_deref(), Some("OASIS-E"));
    assert_eq!(form.item_count(), 2);
    assert_eq!(form.extra["copyrightNotice"], "public domain");

    let json = form.to_json_pretty().unwrap();
    assert!(json.contains("\"lformsVersion\": \"29.0.0\""));
    assert!(!json.contains("answerLists"));
}

#[test]
fn data_type_display_uses_wire_names() {
    assert_eq!(DataType::Qty.to_string(), "QTY");
    assert_eq!(serde_json::to_value(DataType::Cwe).unwrap(), "CWE");
    assert!(DataType::Int.is_numeric());
    assert!(DataType::Cne.is_scorable());
    assert!(!DataType::St.is_scorable());
}

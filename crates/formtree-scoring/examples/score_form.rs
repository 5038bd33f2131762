//! Score a form document from the command line.
//!
//! Loads a form, applies answers from a JSON object keyed by linkId, and
//! prints every calculated item. Strings answer coded items by code and
//! ST items as text; `{"code": "1", "system": "urn:local"}` picks a coded
//! option from one system; numbers answer numeric items; `{"value": 180,
//! "unit": "cm"}` answers QTY items.
//!
//! Usage:
//!   RUST_LOG=formtree_scoring=debug \
//!   cargo run -p formtree-scoring --example score_form -- form.json answers.json [config.json]

use std::path::Path;

use formtree_core::config::{load_config, EvaluatorConfig};
use formtree_core::models::form::FormDefinition;
use formtree_scoring::{AnswerInput, Form};
use serde_json::Value;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let form_path = args
        .next()
        .ok_or_else(|| eyre::eyre!("usage: score_form <form.json> [answers.json] [config.json]"))?;
    let answers_path = args.next();
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path))?,
        None => EvaluatorConfig::default(),
    };

    let contents = std::fs::read_to_string(&form_path)
        .map_err(|e| eyre::eyre!("failed to read form at {form_path}: {e}"))?;
    let mut form = Form::build(FormDefinition::from_json(&contents)?, config)?;

    for problem in form.validate() {
        tracing::warn!(%problem, "form definition problem");
    }

    if let Some(path) = answers_path {
        let answers: serde_json::Map<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        for (link_id, raw) in answers {
            let id = form.resolve(&link_id)?;
            let input = to_input(&form, id, raw)
                .ok_or_else(|| eyre::eyre!("cannot read answer for {link_id}"))?;
            if let Err(e) = form.set_answer(id, input) {
                tracing::warn!(error = %e, "answer rejected");
            }
        }
    }

    for outcome in form.evaluate_all() {
        match outcome.result {
            Ok(Some(value)) => println!("{:<50} {value}", outcome.link_id),
            Ok(None) => println!("{:<50} (incomplete)", outcome.link_id),
            Err(e) => println!("{:<50} error: {e}", outcome.link_id),
        }
    }

    Ok(())
}

fn to_input(form: &Form, id: formtree_scoring::NodeId, raw: Value) -> Option<AnswerInput> {
    let data_type = form.node(id).data_type();
    match raw {
        Value::String(s) if data_type.is_coded() => Some(AnswerInput::Code(s)),
        Value::String(s) => Some(AnswerInput::Text(s)),
        Value::Number(n) => n.as_f64().map(AnswerInput::Number),
        Value::Object(obj) if data_type.is_coded() => {
            let code = obj.get("code")?.as_str()?;
            match obj.get("system").and_then(Value::as_str) {
                Some(system) => Some(AnswerInput::coding(system, code)),
                None => Some(AnswerInput::code(code)),
            }
        }
        Value::Object(obj) => {
            let value = obj.get("value")?.as_f64()?;
            match obj.get("unit").and_then(Value::as_str) {
                Some(unit) => Some(AnswerInput::quantity(value, unit)),
                None => Some(AnswerInput::Number(value)),
            }
        }
        _ => None,
    }
}

//! Answer-list normalization.
//!
//! Assessment forms repeat the same option set (e.g. the GG-series
//! "Independent / Setup / Supervision / ..." scale) verbatim on dozens of
//! items. [`intern_answer_lists`] moves every inline list that occurs more
//! than once into the form's `answerLists` table and points the items at it
//! by name.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::CoreError;
use crate::models::answer::{AnswerOption, AnswerSource};
use crate::models::form::FormDefinition;
use crate::models::item::Item;

/// Returns the number of items whose inline answers were replaced by a
/// named reference.
pub fn intern_answer_lists(form: &mut FormDefinition) -> Result<usize, CoreError> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    visit_inline(&form.items, &mut |answers: &[AnswerOption]| {
        let key = content_key(answers)?;
        *counts.entry(key).or_default() += 1;
        Ok(())
    })?;

    // Existing named lists are reused when an inline list has the same content.
    let mut names: HashMap<String, String> = HashMap::new();
    for (name, answers) in &form.answer_lists {
        names.entry(content_key(answers)?).or_insert_with(|| name.clone());
    }

    let mut next = 1usize;
    let mut rewritten = 0usize;
    let mut items = std::mem::take(&mut form.items);
    let mut intern = |answers: &[AnswerOption]| -> Result<Option<String>, CoreError> {
        let key = content_key(answers)?;
        if let Some(name) = names.get(&key) {
            return Ok(Some(name.clone()));
        }
        if counts.get(&key).copied().unwrap_or(0) < 2 {
            return Ok(None);
        }
        let name = loop {
            let candidate = format!("answers{next}");
            next += 1;
            if !form.answer_lists.contains_key(&candidate) {
                break candidate;
            }
        };
        debug!(name = %name, options = answers.len(), "interned answer list");
        form.answer_lists.insert(name.clone(), answers.to_vec());
        names.insert(key, name.clone());
        Ok(Some(name))
    };
    let result = rewrite(&mut items, &mut intern, &mut rewritten);
    form.items = items;
    result?;

    Ok(rewritten)
}

/// Expand every named reference back into an inline list.
pub fn inline_answer_lists(form: &mut FormDefinition) -> Result<(), CoreError> {
    fn expand(
        items: &mut [Item],
        lists: &BTreeMap<String, Vec<AnswerOption>>,
    ) -> Result<(), CoreError> {
        for item in items {
            if let Some(AnswerSource::Named(name)) = &item.answers {
                let answers = lists
                    .get(name)
                    .ok_or_else(|| CoreError::MissingField(format!("answerLists.{name}")))?;
                item.answers = Some(AnswerSource::Inline(answers.clone()));
            }
            expand(&mut item.items, lists)?;
        }
        Ok(())
    }

    expand(&mut form.items, &form.answer_lists)?;
    form.answer_lists.clear();
    Ok(())
}

fn content_key(answers: &[AnswerOption]) -> Result<String, CoreError> {
    Ok(serde_json::to_string(answers)?)
}

fn visit_inline<F>(items: &[Item], f: &mut F) -> Result<(), CoreError>
where
    F: FnMut(&[AnswerOption]) -> Result<(), CoreError>,
{
    for item in items {
        if let Some(AnswerSource::Inline(answers)) = &item.answers
            && !answers.is_empty()
        {
            f(answers)?;
        }
        visit_inline(&item.items, f)?;
    }
    Ok(())
}

fn rewrite<F>(items: &mut [Item], f: &mut F, rewritten: &mut usize) -> Result<(), CoreError>
where
    F: FnMut(&[AnswerOption]) -> Result<Option<String>, CoreError>,
{
    for item in items.iter_mut() {
        if let Some(AnswerSource::Inline(answers)) = &item.answers
            && !answers.is_empty()
            && let Some(name) = f(answers)?
        {
            item.answers = Some(AnswerSource::Named(name));
            *rewritten += 1;
        }
        rewrite(&mut item.items, f, rewritten)?;
    }
    Ok(())
}

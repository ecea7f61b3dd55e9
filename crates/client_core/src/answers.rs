//! Answer map keyed by question number, with the per-input-type mutation rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{InputType, QuestionNumber},
    protocol::AnswerValue,
};

/// A multi-choice answer never holds more than this many values.
pub const MAX_MULTI_CHOICES: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<QuestionNumber, AnswerValue>);

/// Profile answers share the survey answer shape.
pub type ProfileAnswers = AnswerMap;

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, num: QuestionNumber) -> Option<&AnswerValue> {
        self.0.get(&num)
    }

    pub fn insert(&mut self, num: QuestionNumber, value: AnswerValue) {
        self.0.insert(num, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<QuestionNumber, AnswerValue> {
        &self.0
    }

    /// Applies one user interaction.
    ///
    /// Single choice and free text overwrite. Multi choice toggles `value`
    /// in the stored list and, once the list grows past
    /// [`MAX_MULTI_CHOICES`], drops its oldest entry.
    pub fn set_answer(
        &mut self,
        input_type: InputType,
        num: QuestionNumber,
        value: impl Into<String>,
    ) {
        let value = value.into();
        match input_type {
            InputType::MultiChoice => {
                let Some(AnswerValue::Many(list)) = self.0.get_mut(&num) else {
                    self.0.insert(num, AnswerValue::Many(vec![value]));
                    return;
                };
                match list.iter().position(|existing| *existing == value) {
                    Some(index) => {
                        list.remove(index);
                    }
                    None => list.push(value),
                }
                if list.len() > MAX_MULTI_CHOICES {
                    list.remove(0);
                }
            }
            InputType::SingleChoice | InputType::FreeText | InputType::Other(_) => {
                self.0.insert(num, AnswerValue::One(value));
            }
        }
    }

    /// Whether `value` is the selected option of a choice field.
    /// Always false for free-text and unknown input types.
    pub fn is_checked(&self, input_type: InputType, num: QuestionNumber, value: &str) -> bool {
        match (input_type, self.0.get(&num)) {
            (InputType::SingleChoice, Some(AnswerValue::One(stored))) => stored == value,
            (InputType::MultiChoice, Some(AnswerValue::Many(list))) => {
                list.iter().any(|item| item == value)
            }
            _ => false,
        }
    }

    /// True when the question has no answer or an empty string.
    pub fn is_blank(&self, num: QuestionNumber) -> bool {
        !self.0.get(&num).is_some_and(AnswerValue::is_truthy)
    }

    /// Joins list values with `,` in place, e.g. `["a", "b"]` becomes `"a,b"`.
    pub fn flatten_lists(&mut self) {
        for value in self.0.values_mut() {
            if let AnswerValue::Many(items) = value {
                *value = AnswerValue::One(items.join(","));
            }
        }
    }
}

impl FromIterator<(QuestionNumber, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (QuestionNumber, AnswerValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[path = "tests/answers_tests.rs"]
mod tests;

//! Multiple-choice questions: one answer that is always one of the choices.
//!
//! # Invariants
//! - A present `answer` is an element of `choices` after every linked edit.
//! - `choices` is shuffled at most once, at construction.

use crate::model::attribute::{AttributeError, AttributeStore, Editable};
use crate::model::link::{RelationError, RelationLink};
use crate::model::value::{AttributeShape, ScalarKind, Value};
use crate::question::{
    expect_bool, expect_texts, QuestionCommon, QuestionVariant, VariantKind, ATTR_ANSWER,
    ATTR_CHOICES, ATTR_HELP, ATTR_ID, ATTR_IMAGE, ATTR_NAME, ATTR_SHUFFLE, ATTR_TEXT,
    ATTR_TYPE_HELP, ATTR_VERSION,
};
use rand::seq::SliceRandom;
use rand::Rng;

const MULTIPLE_CHOICE_NAME: &str = "Multiple Choice";
const MULTIPLE_CHOICE_TYPE_HELP: &str = "To answer a multiple choice question, enter the character that is paired with the option you choose";

pub(crate) const CHOICE_ATTRIBUTES: &[&str] = &[
    ATTR_NAME,
    ATTR_VERSION,
    ATTR_TEXT,
    ATTR_ANSWER,
    ATTR_IMAGE,
    ATTR_ID,
    ATTR_HELP,
    ATTR_TYPE_HELP,
    ATTR_CHOICES,
    ATTR_SHUFFLE,
];

/// Pairs options with `a`, `b`, `c`, ... for display.
pub(crate) fn label_choices(choices: &[String]) -> Vec<(char, &str)> {
    ('a'..='z')
        .zip(choices.iter().map(String::as_str))
        .collect()
}

/// Question answered by picking one option.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleChoice {
    common: QuestionCommon,
    choices: Vec<String>,
    shuffle: bool,
    answer_in_choices: RelationLink,
}

impl MultipleChoice {
    pub fn answer(&self) -> Option<&str> {
        self.common.answer().as_str()
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Option letters paired with their choices, at most 26.
    pub fn labeled_choices(&self) -> Vec<(char, &str)> {
        label_choices(&self.choices)
    }

    /// Returns whether `response` is the answer's text.
    pub fn check_text(&self, response: &str) -> bool {
        self.answer() == Some(response)
    }

    /// Returns whether the option at `index` is the answer.
    pub fn check_index(&self, index: usize) -> bool {
        match (self.choices.get(index), self.answer()) {
            (Some(choice), Some(answer)) => choice == answer,
            _ => false,
        }
    }

    pub fn add_choice(&mut self, choice: impl Into<Value>) -> bool {
        self.add_element(ATTR_CHOICES, choice)
    }

    pub fn insert_choice(&mut self, choice: impl Into<Value>, index: isize) -> bool {
        self.insert_element(ATTR_CHOICES, choice, index)
    }

    /// Edits one choice; editing the answer's choice edits the answer too.
    pub fn edit_choice(
        &mut self,
        choice: impl Into<Value>,
        index: isize,
    ) -> Result<bool, RelationError> {
        let choice = choice.into();
        self.linked(|question| question.edit_element(ATTR_CHOICES, choice, index))
    }

    /// Deletes one choice by index or value; deleting the answer's choice
    /// clears the answer.
    pub fn delete_choice(
        &mut self,
        choice: Option<Value>,
        index: Option<isize>,
    ) -> Result<bool, RelationError> {
        self.linked(|question| question.delete_element(ATTR_CHOICES, choice, index))
    }

    /// Removes every choice and the answer.
    pub fn clear_choices(&mut self) -> Result<bool, RelationError> {
        self.linked(|question| question.clear_attribute(ATTR_CHOICES, Value::Sequence(Vec::new())))
    }

    pub fn edit_shuffle(&mut self, shuffle: impl Into<Value>) -> bool {
        self.edit_scalar_bool(ATTR_SHUFFLE, shuffle)
    }

    /// Edits the answer and its paired choice.
    pub fn edit_answer(&mut self, answer: impl Into<Value>) -> Result<bool, RelationError> {
        let answer = answer.into();
        self.linked(|question| question.edit_scalar_string(ATTR_ANSWER, answer))
    }

    fn linked<F>(&mut self, edit: F) -> Result<bool, RelationError>
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let mut link = self.answer_in_choices;
        let outcome = link.apply(self, edit);
        self.answer_in_choices = link;
        outcome
    }
}

impl QuestionVariant for MultipleChoice {
    const KIND: VariantKind = VariantKind::MultipleChoice;

    fn defaults() -> Self {
        Self {
            common: QuestionCommon::new(MULTIPLE_CHOICE_NAME, MULTIPLE_CHOICE_TYPE_HELP),
            choices: Vec::new(),
            shuffle: true,
            answer_in_choices: RelationLink::new(ATTR_ANSWER, ATTR_CHOICES),
        }
    }

    fn common(&self) -> &QuestionCommon {
        &self.common
    }

    /// Keeps exactly one answer and makes sure it is a choice.
    fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let raw = std::mem::take(&mut self.common.answer);
        let answer = match raw {
            Value::Sequence(items) => {
                let kept = items.choose(rng).and_then(Value::text_form);
                for item in &items {
                    let Some(text) = item.text_form() else {
                        continue;
                    };
                    if Some(&text) == kept.as_ref() {
                        continue;
                    }
                    if let Some(position) = self.choices.iter().position(|choice| *choice == text)
                    {
                        self.choices.remove(position);
                    }
                }
                kept
            }
            other => other.text_form(),
        };

        if let Some(answer) = &answer {
            if !self.choices.contains(answer) {
                self.choices.push(answer.clone());
            }
        }
        self.common.answer = answer.map(Value::Text).unwrap_or_default();
    }

    fn after_construct<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.shuffle {
            self.choices.shuffle(rng);
        }
    }
}

impl Editable for MultipleChoice {
    fn attribute_names(&self) -> &'static [&'static str] {
        CHOICE_ATTRIBUTES
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            ATTR_CHOICES => Some(Value::from(self.choices.clone())),
            ATTR_SHUFFLE => Some(Value::from(self.shuffle)),
            _ => self.common.attribute(name),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            ATTR_CHOICES => self.choices = expect_texts(name, value)?,
            ATTR_SHUFFLE => self.shuffle = expect_bool(name, value)?,
            _ => self.common.set_attribute(name, value)?,
        }
        Ok(())
    }

    fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
        match name {
            ATTR_ANSWER => Some(AttributeShape::Scalar(ScalarKind::Text)),
            ATTR_CHOICES => Some(AttributeShape::Sequence),
            ATTR_SHUFFLE => Some(AttributeShape::Scalar(ScalarKind::Bool)),
            _ => self.common.declared_shape(name),
        }
    }
}

//! Multiple-response questions: several answers, all drawn from the choices.
//!
//! # Invariants
//! - Every answer is an element of `choices` after every linked edit.
//! - `check_*` compares answer sets; order and repetition are ignored.

use crate::model::attribute::{resolve_index, AttributeError, AttributeStore, Editable};
use crate::model::link::{RelationError, RelationLink};
use crate::model::value::{AttributeShape, ScalarKind, Value};
use crate::question::multiple_choice::{label_choices, CHOICE_ATTRIBUTES};
use crate::question::{
    expect_bool, expect_texts, text_answers, QuestionCommon, QuestionVariant, VariantKind,
    ATTR_ANSWER, ATTR_CHOICES, ATTR_SHUFFLE,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

const MULTIPLE_RESPONSE_NAME: &str = "Multiple Response";
const MULTIPLE_RESPONSE_TYPE_HELP: &str = "To answer a multiple response question, enter every character that is paired with an option you choose";

/// Question answered by picking every correct option.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleResponse {
    common: QuestionCommon,
    choices: Vec<String>,
    shuffle: bool,
    answers_in_choices: RelationLink,
}

impl MultipleResponse {
    pub fn answers(&self) -> Vec<&str> {
        self.common
            .answer()
            .as_sequence()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn labeled_choices(&self) -> Vec<(char, &str)> {
        label_choices(&self.choices)
    }

    /// Returns whether `responses` names exactly the answers.
    pub fn check_texts(&self, responses: &[String]) -> bool {
        let expected: BTreeSet<&str> = self.answers().into_iter().collect();
        let given: BTreeSet<&str> = responses.iter().map(String::as_str).collect();
        expected == given
    }

    /// Returns whether the options at `indices` are exactly the answers.
    ///
    /// Any index outside the choices fails the check.
    pub fn check_indices(&self, indices: &[usize]) -> bool {
        let mut given = BTreeSet::new();
        for index in indices {
            match self.choices.get(*index) {
                Some(choice) => {
                    given.insert(choice.as_str());
                }
                None => return false,
            }
        }
        let expected: BTreeSet<&str> = self.answers().into_iter().collect();
        expected == given
    }

    pub fn add_choice(&mut self, choice: impl Into<Value>) -> bool {
        self.add_element(ATTR_CHOICES, choice)
    }

    pub fn insert_choice(&mut self, choice: impl Into<Value>, index: isize) -> bool {
        self.insert_element(ATTR_CHOICES, choice, index)
    }

    /// Edits one choice; an answer naming it is edited too.
    pub fn edit_choice(
        &mut self,
        choice: impl Into<Value>,
        index: isize,
    ) -> Result<bool, RelationError> {
        let choice = choice.into();
        self.linked(|question| question.edit_element(ATTR_CHOICES, choice, index))
    }

    /// Deletes one choice by index or value; an answer naming it is removed.
    pub fn delete_choice(
        &mut self,
        choice: Option<Value>,
        index: Option<isize>,
    ) -> Result<bool, RelationError> {
        self.linked(|question| question.delete_element(ATTR_CHOICES, choice, index))
    }

    /// Resets the choices to the current answers.
    pub fn clear_choices(&mut self) -> Result<bool, RelationError> {
        let answers = self.common.answer().clone();
        self.linked(|question| question.clear_attribute(ATTR_CHOICES, answers))
    }

    pub fn edit_shuffle(&mut self, shuffle: impl Into<Value>) -> bool {
        self.edit_scalar_bool(ATTR_SHUFFLE, shuffle)
    }

    /// Adds one text answer, appending it to the choices when missing.
    pub fn add_answer(&mut self, answer: impl Into<Value>) -> Result<bool, RelationError> {
        let answer = answer.into();
        if !matches!(answer, Value::Text(_)) {
            return Ok(false);
        }
        self.linked(|question| question.add_element(ATTR_ANSWER, answer))
    }

    /// Replaces the answer at `index` and its paired choice.
    pub fn edit_answer(
        &mut self,
        answer: impl Into<Value>,
        index: isize,
    ) -> Result<bool, RelationError> {
        let answer = answer.into();
        if !matches!(answer, Value::Text(_)) {
            return Ok(false);
        }
        self.linked(|question| question.edit_element(ATTR_ANSWER, answer, index))
    }

    /// Deletes one answer by index or value, together with its choice.
    pub fn delete_answer(
        &mut self,
        answer: Option<Value>,
        index: Option<isize>,
    ) -> Result<bool, RelationError> {
        self.linked(|question| question.delete_element(ATTR_ANSWER, answer, index))
    }

    /// Removes every answer; their choices go with them.
    pub fn clear_answers(&mut self) -> Result<bool, RelationError> {
        self.linked(|question| question.clear_attribute(ATTR_ANSWER, Value::Sequence(Vec::new())))
    }

    /// Index of `answer` within the choices.
    pub fn choice_index(&self, answer: &str) -> Option<usize> {
        self.choices.iter().position(|choice| choice == answer)
    }

    /// Answer at a possibly negative `index`.
    pub fn answer_at(&self, index: isize) -> Option<&str> {
        let answers = self.answers();
        resolve_index(answers.len(), index).map(|position| answers[position])
    }

    fn linked<F>(&mut self, edit: F) -> Result<bool, RelationError>
    where
        F: FnOnce(&mut Self) -> bool,
    {
        let mut link = self.answers_in_choices;
        let outcome = link.apply(self, edit);
        self.answers_in_choices = link;
        outcome
    }
}

impl QuestionVariant for MultipleResponse {
    const KIND: VariantKind = VariantKind::MultipleResponse;

    fn defaults() -> Self {
        Self {
            common: QuestionCommon::new(MULTIPLE_RESPONSE_NAME, MULTIPLE_RESPONSE_TYPE_HELP),
            choices: Vec::new(),
            shuffle: true,
            answers_in_choices: RelationLink::new(ATTR_ANSWER, ATTR_CHOICES),
        }
    }

    fn common(&self) -> &QuestionCommon {
        &self.common
    }

    /// Wraps the answer into a sequence of texts and appends missing answers
    /// to the choices.
    fn build<R: Rng + ?Sized>(&mut self, _rng: &mut R) {
        let answers = text_answers(&self.common.answer);
        for answer in &answers {
            if !self.choices.contains(answer) {
                self.choices.push(answer.clone());
            }
        }
        self.common.answer = Value::from(answers);
    }

    fn after_construct<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.shuffle {
            self.choices.shuffle(rng);
        }
    }
}

impl Editable for MultipleResponse {
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
            ATTR_ANSWER | ATTR_CHOICES => Some(AttributeShape::Sequence),
            ATTR_SHUFFLE => Some(AttributeShape::Scalar(ScalarKind::Bool)),
            _ => self.common.declared_shape(name),
        }
    }
}

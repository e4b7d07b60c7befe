//! Question variants and the `Question` sum type.
//!
//! # Responsibility
//! - Hold the attributes every variant shares (`QuestionCommon`).
//! - Define the per-variant contract (`QuestionVariant`): defaults, one
//!   normalization entry point, shared editing methods.
//! - Dispatch over the five variants through `Question`.
//!
//! # Invariants
//! - `build` runs once at construction and after every morph into a variant.
//! - After `build`, `answer` has the variant's legal shape.
//! - Link state is owned per variant instance and is never an attribute.

pub mod free_response;
pub mod morph;
pub mod multiple_choice;
pub mod multiple_free_response;
pub mod multiple_response;
pub mod numeric;

use crate::model::attribute::{AttributeError, AttributeStore, Editable};
use crate::model::value::{AttributeShape, Attributes, Number, ScalarKind, Value};
use crate::scoring::Scorer;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub use free_response::FreeResponse;
pub use morph::{morph, MorphError};
pub use multiple_choice::MultipleChoice;
pub use multiple_free_response::MultipleFreeResponse;
pub use multiple_response::MultipleResponse;
pub use numeric::Numeric;

pub const ATTR_NAME: &str = "name";
pub const ATTR_VERSION: &str = "version";
pub const ATTR_TEXT: &str = "text";
pub const ATTR_ANSWER: &str = "answer";
pub const ATTR_IMAGE: &str = "image";
pub const ATTR_ID: &str = "id";
pub const ATTR_HELP: &str = "help";
pub const ATTR_TYPE_HELP: &str = "type_help";
pub const ATTR_EXACT: &str = "exact";
pub const ATTR_ROUND: &str = "round";
pub const ATTR_CHOICES: &str = "choices";
pub const ATTR_SHUFFLE: &str = "shuffle";

const DEFAULT_HELP: &str = "Hmmm... It seems this question doesn't offer help.";

/// The five question variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    FreeResponse,
    Numeric,
    MultipleChoice,
    MultipleResponse,
    MultipleFreeResponse,
}

impl VariantKind {
    pub const ALL: [VariantKind; 5] = [
        Self::FreeResponse,
        Self::Numeric,
        Self::MultipleChoice,
        Self::MultipleResponse,
        Self::MultipleFreeResponse,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FreeResponse => "free_response",
            Self::Numeric => "numeric",
            Self::MultipleChoice => "multiple_choice",
            Self::MultipleResponse => "multiple_response",
            Self::MultipleFreeResponse => "multiple_free_response",
        }
    }
}

impl Display for VariantKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-assigned question id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Int(i64),
    Text(String),
}

impl Default for QuestionId {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl From<i64> for QuestionId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<QuestionId> for Value {
    fn from(value: QuestionId) -> Self {
        match value {
            QuestionId::Int(id) => Value::from(id),
            QuestionId::Text(id) => Value::Text(id),
        }
    }
}

/// Attributes shared by every variant.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionCommon {
    name: String,
    version: i64,
    text: String,
    answer: Value,
    image: Option<Vec<u8>>,
    id: QuestionId,
    help: String,
    type_help: String,
}

impl QuestionCommon {
    pub(crate) fn new(name: &str, type_help: &str) -> Self {
        Self {
            name: name.to_string(),
            version: 1,
            text: String::new(),
            answer: Value::Absent,
            image: None,
            id: QuestionId::default(),
            help: DEFAULT_HELP.to_string(),
            type_help: type_help.to_string(),
        }
    }

    /// Display label of the variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Prompt shown to the respondent.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Raw answer; its shape depends on the variant.
    pub fn answer(&self) -> &Value {
        &self.answer
    }

    pub fn image(&self) -> Option<&[u8]> {
        self.image.as_deref()
    }

    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    /// Text shown after answering.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Text describing the expected answer format.
    pub fn type_help(&self) -> &str {
        &self.type_help
    }

    pub(crate) fn attribute(&self, name: &str) -> Option<Value> {
        let value = match name {
            ATTR_NAME => Value::from(self.name.as_str()),
            ATTR_VERSION => Value::from(self.version),
            ATTR_TEXT => Value::from(self.text.as_str()),
            ATTR_ANSWER => self.answer.clone(),
            ATTR_IMAGE => self.image.clone().map(Value::Bytes).unwrap_or_default(),
            ATTR_ID => Value::from(self.id.clone()),
            ATTR_HELP => Value::from(self.help.as_str()),
            ATTR_TYPE_HELP => Value::from(self.type_help.as_str()),
            _ => return None,
        };
        Some(value)
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            ATTR_NAME => self.name = expect_text(name, value)?,
            ATTR_VERSION => self.version = expect_int(name, value)?,
            ATTR_TEXT => self.text = expect_text(name, value)?,
            ATTR_ANSWER => self.answer = value,
            ATTR_IMAGE => {
                self.image = match value {
                    Value::Bytes(bytes) => Some(bytes),
                    Value::Absent => None,
                    other => return Err(AttributeError::mismatch(name, "bytes or absent", &other)),
                }
            }
            ATTR_ID => {
                self.id = match value {
                    Value::Text(id) => QuestionId::Text(id),
                    Value::Number(Number::Int(id)) => QuestionId::Int(id),
                    other => return Err(AttributeError::mismatch(name, "text or integer", &other)),
                }
            }
            ATTR_HELP => self.help = expect_text(name, value)?,
            ATTR_TYPE_HELP => self.type_help = expect_text(name, value)?,
            other => return Err(AttributeError::Unknown(other.to_string())),
        }
        Ok(())
    }

    /// Shapes of the shared attributes; `answer` is declared by the variant.
    pub(crate) fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
        match name {
            ATTR_NAME | ATTR_TEXT | ATTR_HELP | ATTR_TYPE_HELP => {
                Some(AttributeShape::Scalar(ScalarKind::Text))
            }
            ATTR_VERSION => Some(AttributeShape::Scalar(ScalarKind::Number)),
            ATTR_IMAGE => Some(AttributeShape::Scalar(ScalarKind::Bytes)),
            ATTR_ID => Some(AttributeShape::Scalar(match self.id {
                QuestionId::Int(_) => ScalarKind::Number,
                QuestionId::Text(_) => ScalarKind::Text,
            })),
            _ => None,
        }
    }
}

pub(crate) fn expect_text(name: &str, value: Value) -> Result<String, AttributeError> {
    match value {
        Value::Text(text) => Ok(text),
        other => Err(AttributeError::mismatch(name, "text", &other)),
    }
}

pub(crate) fn expect_bool(name: &str, value: Value) -> Result<bool, AttributeError> {
    match value {
        Value::Bool(flag) => Ok(flag),
        other => Err(AttributeError::mismatch(name, "bool", &other)),
    }
}

pub(crate) fn expect_int(name: &str, value: Value) -> Result<i64, AttributeError> {
    match value {
        Value::Number(Number::Int(number)) => Ok(number),
        other => Err(AttributeError::mismatch(name, "integer", &other)),
    }
}

pub(crate) fn expect_texts(name: &str, value: Value) -> Result<Vec<String>, AttributeError> {
    match value {
        Value::Sequence(items) => items
            .into_iter()
            .map(|item| expect_text(name, item))
            .collect(),
        other => Err(AttributeError::mismatch(name, "sequence of text", &other)),
    }
}

/// Coerces a raw answer into one text value.
///
/// Numbers are stringified; a sequence contributes one random element.
pub(crate) fn single_text_answer<R: Rng + ?Sized>(answer: Value, rng: &mut R) -> Value {
    let picked = match answer {
        Value::Sequence(items) => match items.choose(rng) {
            Some(item) => item.clone(),
            None => return Value::Absent,
        },
        other => other,
    };
    picked.text_form().map(Value::Text).unwrap_or_default()
}

/// Coerces a raw answer into a sequence of text values.
///
/// Scalars are wrapped; elements without a text form are dropped.
pub(crate) fn text_answers(answer: &Value) -> Vec<String> {
    match answer {
        Value::Sequence(items) => items.iter().filter_map(Value::text_form).collect(),
        other => other.text_form().into_iter().collect(),
    }
}

/// Per-variant contract.
pub trait QuestionVariant: Editable + Sized {
    const KIND: VariantKind;

    /// Unbuilt instance holding the variant defaults.
    fn defaults() -> Self;

    fn common(&self) -> &QuestionCommon;

    /// Normalizes `answer` (and related attributes) into legal shapes.
    fn build<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// One-time presentation work after the first build.
    fn after_construct<R: Rng + ?Sized>(&mut self, _rng: &mut R) {}

    /// Builds an instance from defaults plus `overrides`.
    ///
    /// # Errors
    /// - Returns an error when an override names an unknown attribute or
    ///   carries a value the attribute cannot hold.
    fn with_rng<R: Rng + ?Sized>(overrides: Attributes, rng: &mut R) -> Result<Self, AttributeError> {
        let mut question = Self::defaults();
        for (name, value) in overrides {
            question.set_attribute(&name, value)?;
        }
        question.build(rng);
        question.after_construct(rng);
        Ok(question)
    }

    fn new(overrides: Attributes) -> Result<Self, AttributeError> {
        Self::with_rng(overrides, &mut rand::thread_rng())
    }

    fn edit_text(&mut self, text: impl Into<Value>) -> bool {
        self.edit_scalar_string(ATTR_TEXT, text)
    }

    fn edit_help(&mut self, help: impl Into<Value>) -> bool {
        self.edit_scalar_string(ATTR_HELP, help)
    }

    fn edit_image(&mut self, image: impl Into<Value>) -> bool {
        let image = image.into();
        matches!(image, Value::Bytes(_)) && self.edit_arbitrary(ATTR_IMAGE, image)
    }

    fn clear_image(&mut self) -> bool {
        self.clear_attribute(ATTR_IMAGE, Value::Absent)
    }
}

/// Response given to a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Free text, or the text of one option.
    Text(String),
    /// Index of one option.
    Choice(usize),
    /// Texts of several options.
    Texts(Vec<String>),
    /// Indices of several options.
    Choices(Vec<usize>),
}

/// One question of any variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Question {
    FreeResponse(FreeResponse),
    Numeric(Numeric),
    MultipleChoice(MultipleChoice),
    MultipleResponse(MultipleResponse),
    MultipleFreeResponse(MultipleFreeResponse),
}

macro_rules! dispatch {
    ($question:expr, $variant:ident => $body:expr) => {
        match $question {
            Question::FreeResponse($variant) => $body,
            Question::Numeric($variant) => $body,
            Question::MultipleChoice($variant) => $body,
            Question::MultipleResponse($variant) => $body,
            Question::MultipleFreeResponse($variant) => $body,
        }
    };
}

impl Question {
    /// Builds a question of `kind` from defaults plus `overrides`.
    pub fn new(kind: VariantKind, overrides: Attributes) -> Result<Self, AttributeError> {
        Self::with_rng(kind, overrides, &mut rand::thread_rng())
    }

    pub fn with_rng<R: Rng + ?Sized>(
        kind: VariantKind,
        overrides: Attributes,
        rng: &mut R,
    ) -> Result<Self, AttributeError> {
        let question = match kind {
            VariantKind::FreeResponse => Self::FreeResponse(FreeResponse::with_rng(overrides, rng)?),
            VariantKind::Numeric => Self::Numeric(Numeric::with_rng(overrides, rng)?),
            VariantKind::MultipleChoice => {
                Self::MultipleChoice(MultipleChoice::with_rng(overrides, rng)?)
            }
            VariantKind::MultipleResponse => {
                Self::MultipleResponse(MultipleResponse::with_rng(overrides, rng)?)
            }
            VariantKind::MultipleFreeResponse => {
                Self::MultipleFreeResponse(MultipleFreeResponse::with_rng(overrides, rng)?)
            }
        };
        Ok(question)
    }

    pub fn kind(&self) -> VariantKind {
        match self {
            Self::FreeResponse(_) => FreeResponse::KIND,
            Self::Numeric(_) => Numeric::KIND,
            Self::MultipleChoice(_) => MultipleChoice::KIND,
            Self::MultipleResponse(_) => MultipleResponse::KIND,
            Self::MultipleFreeResponse(_) => MultipleFreeResponse::KIND,
        }
    }

    pub fn common(&self) -> &QuestionCommon {
        dispatch!(self, question => question.common())
    }

    pub fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        dispatch!(self, question => question.build(rng))
    }

    /// Checks a response; mismatched response kinds never match.
    pub fn check<S: Scorer + ?Sized>(&self, response: &Response, scorer: &S) -> bool {
        match (self, response) {
            (Self::FreeResponse(question), Response::Text(text)) => question.check(text, scorer),
            (Self::Numeric(question), Response::Text(text)) => question.check(text),
            (Self::MultipleChoice(question), Response::Text(text)) => question.check_text(text),
            (Self::MultipleChoice(question), Response::Choice(index)) => {
                question.check_index(*index)
            }
            (Self::MultipleResponse(question), Response::Texts(texts)) => {
                question.check_texts(texts)
            }
            (Self::MultipleResponse(question), Response::Choices(indices)) => {
                question.check_indices(indices)
            }
            (Self::MultipleFreeResponse(question), Response::Text(text)) => {
                question.check(text, scorer)
            }
            _ => false,
        }
    }

    pub fn edit_text(&mut self, text: impl Into<Value>) -> bool {
        dispatch!(self, question => question.edit_text(text))
    }

    pub fn edit_help(&mut self, help: impl Into<Value>) -> bool {
        dispatch!(self, question => question.edit_help(help))
    }

    pub fn edit_image(&mut self, image: impl Into<Value>) -> bool {
        dispatch!(self, question => question.edit_image(image))
    }

    pub fn clear_image(&mut self) -> bool {
        dispatch!(self, question => question.clear_image())
    }
}

impl Editable for Question {
    fn attribute_names(&self) -> &'static [&'static str] {
        dispatch!(self, question => question.attribute_names())
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        dispatch!(self, question => question.attribute(name))
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        dispatch!(self, question => question.set_attribute(name, value))
    }

    fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
        dispatch!(self, question => question.declared_shape(name))
    }
}

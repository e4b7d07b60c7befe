//! Free-response questions: one text answer matched by similarity.

use crate::model::attribute::{AttributeError, AttributeStore, Editable};
use crate::model::value::{AttributeShape, ScalarKind, Value};
use crate::question::{
    expect_bool, single_text_answer, QuestionCommon, QuestionVariant, VariantKind, ATTR_ANSWER,
    ATTR_EXACT, ATTR_HELP, ATTR_ID, ATTR_IMAGE, ATTR_NAME, ATTR_TEXT, ATTR_TYPE_HELP,
    ATTR_VERSION,
};
use crate::scoring::Scorer;
use rand::Rng;

pub(crate) const FREE_RESPONSE_NAME: &str = "Free Response";
const FREE_RESPONSE_TYPE_HELP: &str = "To answer a free response question, enter, in precise words, your response. Be careful! Not all quiz builders are lenient on punctuation, capitalization, and spelling.";

/// Lowest similarity ever accepted for a non-exact answer.
pub(crate) const MIN_PRECISION: i64 = 70;

const ATTRIBUTES: &[&str] = &[
    ATTR_NAME,
    ATTR_VERSION,
    ATTR_TEXT,
    ATTR_ANSWER,
    ATTR_IMAGE,
    ATTR_ID,
    ATTR_HELP,
    ATTR_TYPE_HELP,
    ATTR_EXACT,
];

/// Question answered with free text.
///
/// # Invariants
/// - After build, `answer` is text or absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeResponse {
    common: QuestionCommon,
    exact: bool,
}

impl FreeResponse {
    pub fn answer(&self) -> Option<&str> {
        self.common.answer().as_str()
    }

    pub fn exact(&self) -> bool {
        self.exact
    }

    /// Similarity a response must reach.
    ///
    /// `max(70, round(100 - 100 / sqrt(len)))` over the answer's characters,
    /// or 100 when `exact` is set.
    pub fn precision(&self) -> i64 {
        if self.exact {
            return 100;
        }
        let len = self.answer().map(|answer| answer.chars().count()).unwrap_or(0);
        let scaled = (100.0 - 100.0 / (len as f64).sqrt()).round();
        MIN_PRECISION.max(scaled as i64)
    }

    /// Returns whether `response` is close enough to the answer.
    pub fn check<S: Scorer + ?Sized>(&self, response: &str, scorer: &S) -> bool {
        match self.answer() {
            Some(answer) => i64::from(scorer.score(response, answer)) >= self.precision(),
            None => false,
        }
    }

    pub fn edit_answer(&mut self, answer: impl Into<Value>) -> bool {
        self.edit_scalar_string(ATTR_ANSWER, answer)
    }

    pub fn edit_exact(&mut self, exact: impl Into<Value>) -> bool {
        self.edit_scalar_bool(ATTR_EXACT, exact)
    }
}

impl QuestionVariant for FreeResponse {
    const KIND: VariantKind = VariantKind::FreeResponse;

    fn defaults() -> Self {
        Self {
            common: QuestionCommon::new(FREE_RESPONSE_NAME, FREE_RESPONSE_TYPE_HELP),
            exact: false,
        }
    }

    fn common(&self) -> &QuestionCommon {
        &self.common
    }

    fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let raw = std::mem::take(&mut self.common.answer);
        self.common.answer = single_text_answer(raw, rng);
    }
}

impl Editable for FreeResponse {
    fn attribute_names(&self) -> &'static [&'static str] {
        ATTRIBUTES
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            ATTR_EXACT => Some(Value::from(self.exact)),
            _ => self.common.attribute(name),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            ATTR_EXACT => self.exact = expect_bool(name, value)?,
            _ => self.common.set_attribute(name, value)?,
        }
        Ok(())
    }

    fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
        match name {
            ATTR_ANSWER => Some(AttributeShape::Scalar(ScalarKind::Text)),
            ATTR_EXACT => Some(AttributeShape::Scalar(ScalarKind::Bool)),
            _ => self.common.declared_shape(name),
        }
    }
}

//! Multiple-free-response questions: several accepted texts, one response.

use crate::model::attribute::{AttributeError, AttributeStore, Editable};
use crate::model::value::{AttributeShape, ScalarKind, Value};
use crate::question::free_response::MIN_PRECISION;
use crate::question::{
    expect_bool, text_answers, QuestionCommon, QuestionVariant, VariantKind, ATTR_ANSWER,
    ATTR_EXACT, ATTR_HELP, ATTR_ID, ATTR_IMAGE, ATTR_NAME, ATTR_TEXT, ATTR_TYPE_HELP,
    ATTR_VERSION,
};
use crate::scoring::Scorer;
use rand::Rng;

const MULTIPLE_FREE_RESPONSE_NAME: &str = "Multiple Free Response";
const MULTIPLE_FREE_RESPONSE_TYPE_HELP: &str = "To answer a multiple free response question, enter, in precise words, your response. There are multiple correct answers to this question, you should only give one. Be careful! Not all quiz builders are lenient on punctuation, capitalization, and spelling.";

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

/// Question accepting any one of several texts.
///
/// # Invariants
/// - After build, `answer` is a sequence of texts.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipleFreeResponse {
    common: QuestionCommon,
    exact: bool,
}

impl MultipleFreeResponse {
    pub fn answers(&self) -> Vec<&str> {
        self.common
            .answer()
            .as_sequence()
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn exact(&self) -> bool {
        self.exact
    }

    /// Similarity a response must exceed to match `answer`.
    ///
    /// `max(70, round(100 - 100 / len^2))`, or 100 when `exact` is set.
    pub fn precision_for(&self, answer: &str) -> i64 {
        if self.exact {
            return 100;
        }
        let len = answer.chars().count() as f64;
        let scaled = (100.0 - 100.0 / (len * len)).round();
        MIN_PRECISION.max(scaled as i64)
    }

    /// Returns whether `response` matches any accepted answer.
    ///
    /// Non-exact matches must score strictly above the precision; exact
    /// matches must score 100.
    pub fn check<S: Scorer + ?Sized>(&self, response: &str, scorer: &S) -> bool {
        self.answers().into_iter().any(|answer| {
            let score = i64::from(scorer.score(response, answer));
            if self.exact {
                score == 100
            } else {
                score > self.precision_for(answer)
            }
        })
    }

    /// Appends one text answer.
    pub fn add_answer(&mut self, answer: impl Into<Value>) -> bool {
        let answer = answer.into();
        matches!(answer, Value::Text(_)) && self.add_element(ATTR_ANSWER, answer)
    }

    pub fn edit_answer(&mut self, answer: impl Into<Value>, index: isize) -> bool {
        let answer = answer.into();
        matches!(answer, Value::Text(_)) && self.edit_element(ATTR_ANSWER, answer, index)
    }

    pub fn delete_answer(&mut self, answer: Option<Value>, index: Option<isize>) -> bool {
        self.delete_element(ATTR_ANSWER, answer, index)
    }

    pub fn clear_answers(&mut self) -> bool {
        self.clear_attribute(ATTR_ANSWER, Value::Sequence(Vec::new()))
    }

    pub fn edit_exact(&mut self, exact: impl Into<Value>) -> bool {
        self.edit_scalar_bool(ATTR_EXACT, exact)
    }
}

impl QuestionVariant for MultipleFreeResponse {
    const KIND: VariantKind = VariantKind::MultipleFreeResponse;

    fn defaults() -> Self {
        Self {
            common: QuestionCommon::new(
                MULTIPLE_FREE_RESPONSE_NAME,
                MULTIPLE_FREE_RESPONSE_TYPE_HELP,
            ),
            exact: false,
        }
    }

    fn common(&self) -> &QuestionCommon {
        &self.common
    }

    fn build<R: Rng + ?Sized>(&mut self, _rng: &mut R) {
        self.common.answer = Value::from(text_answers(&self.common.answer));
    }
}

impl Editable for MultipleFreeResponse {
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
            ATTR_ANSWER => Some(AttributeShape::Sequence),
            ATTR_EXACT => Some(AttributeShape::Scalar(ScalarKind::Bool)),
            _ => self.common.declared_shape(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MultipleFreeResponse;
    use crate::model::value::{Attributes, Value};
    use crate::question::QuestionVariant;
    use crate::scoring::IndelRatio;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn multiple_free_response(overrides: Attributes) -> MultipleFreeResponse {
        MultipleFreeResponse::with_rng(overrides, &mut StdRng::seed_from_u64(17))
            .expect("multiple free response should build")
    }

    #[test]
    fn build_wraps_answers_into_text_sequences() {
        let question = multiple_free_response(Attributes::new().with("answer", "one"));
        assert_eq!(question.answers(), vec!["one"]);

        let question = multiple_free_response(Attributes::new().with("answer", 9));
        assert_eq!(question.answers(), vec!["9"]);

        let question = multiple_free_response(Attributes::new());
        assert!(question.answers().is_empty());
    }

    #[test]
    fn precision_grows_quickly_with_length() {
        let question = multiple_free_response(Attributes::new());
        assert_eq!(question.precision_for("ab"), 75);
        assert_eq!(question.precision_for("abcd"), 94);
        assert_eq!(question.precision_for("a"), 70);
        assert_eq!(question.precision_for(""), 70);
    }

    #[test]
    fn check_accepts_any_close_answer() {
        let question =
            multiple_free_response(Attributes::new().with("answer", vec!["colour", "color"]));
        assert!(question.check("color", &IndelRatio));
        assert!(question.check("colour", &IndelRatio));
        assert!(!question.check("hue", &IndelRatio));

        let borderline = |_: &str, _: &str| 100u8;
        assert!(question.check("anything", &borderline));
    }

    #[test]
    fn check_requires_strictly_higher_score() {
        // precision_for("ab") == 75
        let question = multiple_free_response(Attributes::new().with("answer", vec!["ab"]));
        let at_threshold = |_: &str, _: &str| 75u8;
        let above = |_: &str, _: &str| 76u8;
        assert!(!question.check("ab", &at_threshold));
        assert!(question.check("ab", &above));
    }

    #[test]
    fn exact_accepts_only_identical_responses() {
        let mut question =
            multiple_free_response(Attributes::new().with("answer", vec!["Oslo", "Bergen"]));
        assert!(question.edit_exact(true));
        assert!(question.check("Oslo", &IndelRatio));
        assert!(!question.check("oslo", &IndelRatio));
    }

    #[test]
    fn answer_edits() {
        let mut question = multiple_free_response(Attributes::new().with("answer", vec!["a"]));
        assert!(question.add_answer("b"));
        assert!(!question.add_answer(3));
        assert!(question.edit_answer("B", -1));
        assert!(!question.edit_answer("x", 5));
        assert_eq!(question.answers(), vec!["a", "B"]);

        assert!(question.delete_answer(Some(Value::from("a")), None));
        assert_eq!(question.answers(), vec!["B"]);

        assert!(question.clear_answers());
        assert!(question.answers().is_empty());
    }
}

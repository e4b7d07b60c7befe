//! Numeric questions: one number, optionally compared after rounding.

use crate::model::attribute::{AttributeError, AttributeStore, Editable};
use crate::model::value::{AttributeShape, Number, ScalarKind, Value};
use crate::numeric::parse_numeric;
use crate::question::{
    QuestionCommon, QuestionVariant, VariantKind, ATTR_ANSWER, ATTR_HELP, ATTR_ID, ATTR_IMAGE,
    ATTR_NAME, ATTR_ROUND, ATTR_TEXT, ATTR_TYPE_HELP, ATTR_VERSION,
};
use rand::seq::SliceRandom;
use rand::Rng;

const NUMERIC_NAME: &str = "Numeric";
const NUMERIC_TYPE_HELP: &str = "To answer a numeric question, enter the number that answers the question (digits, not words). Be careful! Some quiz builders may round your answer to a particular decimal.";

const ATTRIBUTES: &[&str] = &[
    ATTR_NAME,
    ATTR_VERSION,
    ATTR_TEXT,
    ATTR_ANSWER,
    ATTR_IMAGE,
    ATTR_ID,
    ATTR_HELP,
    ATTR_TYPE_HELP,
    ATTR_ROUND,
];

/// Question answered with a number.
///
/// # Invariants
/// - After build, `answer` is a number or absent.
/// - `round`, when set, is a count of decimal places.
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    common: QuestionCommon,
    round: Option<i64>,
}

impl Numeric {
    pub fn answer(&self) -> Option<Number> {
        self.common.answer().as_number()
    }

    pub fn round(&self) -> Option<i64> {
        self.round
    }

    /// Parses `response` and compares it with the answer.
    ///
    /// Unparseable responses never match. With `round` set both sides are
    /// rounded to that many decimal places first.
    pub fn check(&self, response: &str) -> bool {
        let (Some(answer), Some(response)) = (self.answer(), parse_numeric(response)) else {
            return false;
        };
        match self.round {
            Some(places) => answer.round_to(places) == response.round_to(places),
            None => answer == response,
        }
    }

    /// Replaces the answer with a parsed numeric literal.
    pub fn edit_answer(&mut self, literal: &str) -> bool {
        match parse_numeric(literal) {
            Some(number) => self.edit_scalar_number(ATTR_ANSWER, number),
            None => false,
        }
    }

    /// Sets the rounding precision from an integer literal.
    pub fn edit_round(&mut self, literal: &str) -> bool {
        match parse_numeric(literal) {
            Some(number @ Number::Int(_)) => self.edit_scalar_number(ATTR_ROUND, number),
            _ => false,
        }
    }

    pub fn clear_round(&mut self) -> bool {
        self.clear_attribute(ATTR_ROUND, Value::Absent)
    }
}

fn numeric_value(value: &Value) -> Option<Number> {
    match value {
        Value::Number(number) => Some(*number),
        Value::Text(text) => parse_numeric(text),
        _ => None,
    }
}

impl QuestionVariant for Numeric {
    const KIND: VariantKind = VariantKind::Numeric;

    fn defaults() -> Self {
        Self {
            common: QuestionCommon::new(NUMERIC_NAME, NUMERIC_TYPE_HELP),
            round: None,
        }
    }

    fn common(&self) -> &QuestionCommon {
        &self.common
    }

    fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let normalized = match &self.common.answer {
            Value::Sequence(items) => {
                let candidates: Vec<Number> = items.iter().filter_map(numeric_value).collect();
                candidates.choose(rng).copied()
            }
            other => numeric_value(other),
        };
        self.common.answer = normalized.map(Value::Number).unwrap_or_default();
    }
}

impl Editable for Numeric {
    fn attribute_names(&self) -> &'static [&'static str] {
        ATTRIBUTES
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            ATTR_ROUND => Some(Value::from(self.round)),
            _ => self.common.attribute(name),
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
        match name {
            ATTR_ROUND => {
                self.round = match value {
                    Value::Number(Number::Int(places)) => Some(places),
                    Value::Absent => None,
                    other => {
                        return Err(AttributeError::mismatch(name, "integer or absent", &other))
                    }
                }
            }
            _ => self.common.set_attribute(name, value)?,
        }
        Ok(())
    }

    fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
        match name {
            ATTR_ANSWER | ATTR_ROUND => Some(AttributeShape::Scalar(ScalarKind::Number)),
            _ => self.common.declared_shape(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Numeric;
    use crate::model::value::{Attributes, Number, Value};
    use crate::question::QuestionVariant;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn numeric(overrides: Attributes) -> Numeric {
        Numeric::with_rng(overrides, &mut StdRng::seed_from_u64(3)).expect("numeric should build")
    }

    #[test]
    fn build_parses_string_answers() {
        assert_eq!(
            numeric(Attributes::new().with("answer", "42")).answer(),
            Some(Number::Int(42))
        );
        assert_eq!(
            numeric(Attributes::new().with("answer", "2.5")).answer(),
            Some(Number::Float(2.5))
        );
        assert_eq!(numeric(Attributes::new().with("answer", "forty")).answer(), None);
        assert_eq!(numeric(Attributes::new().with("answer", true)).answer(), None);
    }

    #[test]
    fn build_picks_among_parseable_sequence_elements() {
        let question = numeric(Attributes::new().with(
            "answer",
            Value::Sequence(vec![
                Value::from("x"),
                Value::from("7"),
                Value::from(false),
                Value::from("y"),
            ]),
        ));
        assert_eq!(question.answer(), Some(Number::Int(7)));

        let question = numeric(Attributes::new().with("answer", vec!["x", "y"]));
        assert_eq!(question.answer(), None);
    }

    #[test]
    fn build_is_idempotent() {
        let mut question = numeric(Attributes::new().with("answer", vec!["1", "2", "3"]));
        let first = question.answer();
        question.build(&mut StdRng::seed_from_u64(99));
        assert_eq!(question.answer(), first);
    }

    #[test]
    fn check_rounds_when_round_is_set() {
        let question = numeric(Attributes::new().with("answer", 1.23456).with("round", 2));
        assert!(question.check("1.23"));
        assert!(!question.check("1.2"));
        assert!(!question.check("pi"));
    }

    #[test]
    fn check_with_huge_round_still_compares_values() {
        let question = numeric(Attributes::new().with("answer", 2).with("round", 308));
        assert!(!question.check("3"));
        assert!(question.check("2"));

        let question = numeric(Attributes::new().with("answer", 2_000_000_000).with("round", 300));
        assert!(!question.check("3000000000"));
        assert!(question.check("2000000000"));
    }

    #[test]
    fn check_rounds_ties_to_even() {
        let question = numeric(Attributes::new().with("answer", 2.5).with("round", 0));
        assert!(question.check("2"));
        assert!(!question.check("3"));

        let question = numeric(Attributes::new().with("answer", 0.125).with("round", 2));
        assert!(question.check("0.12"));
    }

    #[test]
    fn check_compares_exactly_without_round() {
        let question = numeric(Attributes::new().with("answer", 12));
        assert!(question.check("12"));
        assert!(question.check("12.0"));
        assert!(!question.check("12.01"));
        assert!(!question.check("-12"));
    }

    #[test]
    fn check_without_answer_never_matches() {
        assert!(!numeric(Attributes::new()).check("0"));
    }

    #[test]
    fn edits_parse_literals() {
        let mut question = numeric(Attributes::new().with("answer", 1));
        assert!(question.edit_answer("2.75"));
        assert_eq!(question.answer(), Some(Number::Float(2.75)));
        assert!(!question.edit_answer("two"));
        assert_eq!(question.answer(), Some(Number::Float(2.75)));

        assert!(question.edit_round("1"));
        assert_eq!(question.round(), Some(1));
        assert!(!question.edit_round("1.5"));
        assert!(question.check("2.8"));

        assert!(question.clear_round());
        assert_eq!(question.round(), None);
        assert!(!question.check("2.8"));
    }

    #[test]
    fn round_override_must_be_an_integer() {
        let err = Numeric::with_rng(
            Attributes::new().with("round", "two"),
            &mut StdRng::seed_from_u64(3),
        )
        .expect_err("text round must be rejected");
        assert!(err.to_string().contains("round"));
    }
}

//! Numeric-literal parsing for numeric answers and responses.
//!
//! # Invariants
//! - Parsing never fails loudly; unparseable input yields `None`.
//! - Only unsigned decimal literals are accepted (`42`, `2.75`).

use crate::model::value::Number;
use once_cell::sync::Lazy;
use regex::Regex;

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid integer regex"));
static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("valid decimal regex"));

/// Parses a numeric literal.
///
/// Digits only parse as an integer (falling back to a float when the value
/// does not fit `i64`). Two digit runs joined by exactly one `.` parse as a
/// float. Anything else, including signs, whitespace and exponents, yields
/// `None`.
pub fn parse_numeric(input: &str) -> Option<Number> {
    if INTEGER_RE.is_match(input) {
        return match input.parse::<i64>() {
            Ok(value) => Some(Number::Int(value)),
            Err(_) => input.parse::<f64>().ok().map(Number::Float),
        };
    }
    if DECIMAL_RE.is_match(input) {
        return input.parse::<f64>().ok().map(Number::Float);
    }
    None
}

//! Dynamic attribute values.
//!
//! # Responsibility
//! - Define the value shapes an editable attribute can hold.
//! - Provide the name -> value mapping used for overrides and snapshots.
//!
//! # Invariants
//! - `Number` equality is numeric: `Int(3) == Float(3.0)`.
//! - `Value::Absent` is the only representation of a missing optional value.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Magnitude from which every `f64` is already an integer.
const F64_INTEGRAL_THRESHOLD: f64 = 4_503_599_627_370_496.0;

/// Integer or floating point number.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// Rounds to `places` decimal places; negative places round to tens,
    /// hundreds and so on. Ties go to the even neighbour.
    ///
    /// Values already integral at that scale, or whose scaled form leaves
    /// the finite range, are returned unrounded.
    pub fn round_to(self, places: i64) -> f64 {
        let value = self.as_f64();
        let places = places.clamp(-308, 308) as i32;
        let factor = 10f64.powi(places);
        let scaled = value * factor;
        if !scaled.is_finite() || scaled.abs() >= F64_INTEGRAL_THRESHOLD {
            return value;
        }
        scaled.round_ties_even() / factor
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(left), Self::Int(right)) => left == right,
            (left, right) => left.as_f64() == right.as_f64(),
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            // Debug keeps the trailing `.0` on integral floats.
            Self::Float(value) => write!(f, "{value:?}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Scalar kinds a declared attribute can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Text,
    Number,
    Bool,
    Bytes,
}

impl ScalarKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Bool => "bool",
            Self::Bytes => "bytes",
        }
    }
}

/// Declared shape of one attribute.
///
/// Optional scalars share the shape of their scalar kind; absence is a value,
/// not a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeShape {
    Scalar(ScalarKind),
    Sequence,
}

impl Display for AttributeShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{}", kind.as_str()),
            Self::Sequence => write!(f, "sequence"),
        }
    }
}

/// One attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Absent,
    Text(String),
    Number(Number),
    Bool(bool),
    Bytes(Vec<u8>),
    Sequence(Vec<Value>),
}

impl Value {
    pub fn bytes(value: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(value.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Scalar kind of a present scalar; `None` for absent values and
    /// sequences.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Number(_) => Some(ScalarKind::Number),
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Bytes(_) => Some(ScalarKind::Bytes),
            Self::Absent | Self::Sequence(_) => None,
        }
    }

    /// Text form of strings and numbers. Other values have none.
    pub fn text_form(&self) -> Option<String> {
        match self {
            Self::Text(value) => Some(value.clone()),
            Self::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }

    /// Short type label used in error messages.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Sequence(_) => "sequence",
            other => other
                .scalar_kind()
                .map(ScalarKind::as_str)
                .unwrap_or("unknown"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(Number::Int(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(Number::Int(i64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(Number::Float(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Sequence(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Self::Sequence(value.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::Sequence(value.into_iter().map(Value::Text).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Absent)
    }
}

/// Ordered attribute name -> value mapping.
///
/// Used both for constructor overrides and for attribute snapshots handed to
/// renderers and persistence layers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Attributes {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

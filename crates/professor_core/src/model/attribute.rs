//! Named attribute access and the generic editing primitives.
//!
//! # Responsibility
//! - Define `Editable`, the named get/set contract every question implements.
//! - Provide the shared mutation vocabulary (`AttributeStore`) on top of it.
//!
//! # Invariants
//! - Primitives report rejection as `false` and never mutate on rejection.
//! - Delete and edit share one bounds rule: `index` in `[-len, len)`.

use crate::model::value::{AttributeShape, Attributes, Value};
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Attribute access error.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeError {
    /// The object has no attribute with this name.
    Unknown(String),
    /// The value cannot be stored in the attribute.
    TypeMismatch {
        attribute: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl AttributeError {
    pub fn mismatch(attribute: &str, expected: &'static str, found: &Value) -> Self {
        Self::TypeMismatch {
            attribute: attribute.to_string(),
            expected,
            found: found.type_label(),
        }
    }
}

impl Display for AttributeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown attribute: {name}"),
            Self::TypeMismatch {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "attribute `{attribute}` expects {expected}, got {found}"
            ),
        }
    }
}

impl Error for AttributeError {}

/// Named attribute access with declared shapes.
///
/// Implementors map names onto their own typed fields. `set_attribute` stores
/// any value the field can hold without further validation; normalization is
/// the owner's job.
pub trait Editable {
    /// Attribute names in a stable order.
    fn attribute_names(&self) -> &'static [&'static str];

    /// Current value of one attribute.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// Stores a value into one attribute.
    ///
    /// # Errors
    /// - `Unknown` when the attribute does not exist.
    /// - `TypeMismatch` when the field cannot hold `value`.
    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError>;

    /// Declared shape of one attribute.
    fn declared_shape(&self, name: &str) -> Option<AttributeShape>;

    /// Snapshot of every attribute, for renderers and persistence layers.
    fn attributes(&self) -> Attributes {
        self.attribute_names()
            .iter()
            .filter_map(|name| self.attribute(name).map(|value| (*name, value)))
            .collect()
    }
}

/// Resolves a possibly negative index against `len`.
///
/// Returns `None` unless `index` is in `[-len, len)`.
pub fn resolve_index(len: usize, index: isize) -> Option<usize> {
    let len = isize::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Insert position with list-insert semantics: negative counts from the
/// end, out-of-range clamps to either end.
fn insert_position(len: usize, index: isize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

/// Generic editing primitives available on every `Editable`.
pub trait AttributeStore: Editable {
    /// Appends `value` to the sequence at `attr`.
    fn add_element(&mut self, attr: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.edit_sequence(attr, move |items| {
            items.push(value);
            true
        })
    }

    /// Inserts `value` into the sequence at `attr`.
    fn insert_element(&mut self, attr: &str, value: impl Into<Value>, index: isize) -> bool {
        let value = value.into();
        self.edit_sequence(attr, move |items| {
            let position = insert_position(items.len(), index);
            items.insert(position, value);
            true
        })
    }

    /// Deletes one element by index, or else by value.
    ///
    /// An index, when given, must be in bounds; a value is only consulted
    /// when no index is given.
    fn delete_element(&mut self, attr: &str, value: Option<Value>, index: Option<isize>) -> bool {
        self.edit_sequence(attr, move |items| {
            let position = match (index, value) {
                (Some(index), _) => resolve_index(items.len(), index),
                (None, Some(value)) => items.iter().position(|item| *item == value),
                (None, None) => None,
            };
            match position {
                Some(position) => {
                    items.remove(position);
                    true
                }
                None => false,
            }
        })
    }

    /// Replaces the element at `index`.
    fn edit_element(&mut self, attr: &str, value: impl Into<Value>, index: isize) -> bool {
        let value = value.into();
        self.edit_sequence(attr, move |items| match resolve_index(items.len(), index) {
            Some(position) => {
                items[position] = value;
                true
            }
            None => false,
        })
    }

    fn edit_scalar_string(&mut self, attr: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        matches!(value, Value::Text(_)) && self.edit_arbitrary(attr, value)
    }

    fn edit_scalar_number(&mut self, attr: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        matches!(value, Value::Number(_)) && self.edit_arbitrary(attr, value)
    }

    fn edit_scalar_bool(&mut self, attr: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        matches!(value, Value::Bool(_)) && self.edit_arbitrary(attr, value)
    }

    /// Unchecked assignment; fails only when the field cannot hold `value`.
    fn edit_arbitrary(&mut self, attr: &str, value: impl Into<Value>) -> bool {
        match self.set_attribute(attr, value.into()) {
            Ok(()) => true,
            Err(err) => {
                debug!("event=attribute_edit module=attribute status=rejected reason={err}");
                false
            }
        }
    }

    /// Resets `attr` to `default`.
    fn clear_attribute(&mut self, attr: &str, default: impl Into<Value>) -> bool {
        self.edit_arbitrary(attr, default)
    }

    /// Runs `edit` on a copy of the sequence at `attr` and stores it back
    /// when `edit` succeeds.
    fn edit_sequence<F>(&mut self, attr: &str, edit: F) -> bool
    where
        F: FnOnce(&mut Vec<Value>) -> bool,
    {
        let mut items = match self.attribute(attr) {
            Some(Value::Sequence(items)) => items,
            _ => return false,
        };
        edit(&mut items) && self.edit_arbitrary(attr, Value::Sequence(items))
    }
}

impl<T: Editable + ?Sized> AttributeStore for T {}

#[cfg(test)]
mod tests {
    use super::{resolve_index, AttributeError, AttributeStore, Editable};
    use crate::model::value::{AttributeShape, ScalarKind, Value};

    #[derive(Debug, Default)]
    struct Card {
        title: String,
        count: i64,
        pinned: bool,
        tags: Vec<String>,
    }

    impl Editable for Card {
        fn attribute_names(&self) -> &'static [&'static str] {
            &["title", "count", "pinned", "tags"]
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "title" => Some(Value::from(self.title.as_str())),
                "count" => Some(Value::from(self.count)),
                "pinned" => Some(Value::from(self.pinned)),
                "tags" => Some(Value::from(self.tags.clone())),
                _ => None,
            }
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
            match (name, value) {
                ("title", Value::Text(text)) => self.title = text,
                ("count", Value::Number(number)) => self.count = number.as_f64() as i64,
                ("pinned", Value::Bool(flag)) => self.pinned = flag,
                ("tags", Value::Sequence(items)) => {
                    self.tags = items
                        .into_iter()
                        .map(|item| match item {
                            Value::Text(text) => Ok(text),
                            other => Err(AttributeError::mismatch("tags", "text", &other)),
                        })
                        .collect::<Result<_, _>>()?;
                }
                (name @ ("title" | "count" | "pinned" | "tags"), other) => {
                    return Err(AttributeError::mismatch(name, "declared type", &other));
                }
                (other, _) => return Err(AttributeError::Unknown(other.to_string())),
            }
            Ok(())
        }

        fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
            match name {
                "title" => Some(AttributeShape::Scalar(ScalarKind::Text)),
                "count" => Some(AttributeShape::Scalar(ScalarKind::Number)),
                "pinned" => Some(AttributeShape::Scalar(ScalarKind::Bool)),
                "tags" => Some(AttributeShape::Sequence),
                _ => None,
            }
        }
    }

    fn card_with_tags(tags: &[&str]) -> Card {
        Card {
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            ..Card::default()
        }
    }

    #[test]
    fn resolve_index_accepts_negative_indices_within_bounds() {
        assert_eq!(resolve_index(3, 0), Some(0));
        assert_eq!(resolve_index(3, 2), Some(2));
        assert_eq!(resolve_index(3, -1), Some(2));
        assert_eq!(resolve_index(3, -3), Some(0));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(3, -4), None);
        assert_eq!(resolve_index(0, 0), None);
    }

    #[test]
    fn add_and_insert_follow_list_semantics() {
        let mut card = card_with_tags(&["b"]);
        assert!(card.add_element("tags", "d"));
        assert!(card.insert_element("tags", "a", 0));
        assert!(card.insert_element("tags", "c", -1));
        assert!(card.insert_element("tags", "e", 99));
        assert_eq!(card.tags, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn sequence_primitives_reject_scalar_attributes() {
        let mut card = Card::default();
        assert!(!card.add_element("title", "x"));
        assert!(!card.insert_element("count", 1, 0));
        assert!(!card.delete_element("title", Some(Value::from("x")), None));
        assert!(!card.edit_element("missing", "x", 0));
        assert_eq!(card.title, "");
    }

    #[test]
    fn add_element_rejects_unstorable_values_without_mutation() {
        let mut card = card_with_tags(&["a"]);
        assert!(!card.add_element("tags", 7));
        assert_eq!(card.tags, vec!["a"]);
    }

    #[test]
    fn delete_element_prefers_index_then_value() {
        let mut card = card_with_tags(&["a", "b", "c", "b"]);
        assert!(card.delete_element("tags", None, Some(-1)));
        assert_eq!(card.tags, vec!["a", "b", "c"]);

        assert!(card.delete_element("tags", Some(Value::from("b")), None));
        assert_eq!(card.tags, vec!["a", "c"]);

        assert!(!card.delete_element("tags", Some(Value::from("a")), Some(5)));
        assert!(!card.delete_element("tags", Some(Value::from("z")), None));
        assert!(!card.delete_element("tags", None, None));
        assert_eq!(card.tags, vec!["a", "c"]);
    }

    #[test]
    fn edit_element_requires_index_in_bounds() {
        let mut card = card_with_tags(&["a", "b"]);
        assert!(card.edit_element("tags", "z", -2));
        assert!(!card.edit_element("tags", "y", 2));
        assert_eq!(card.tags, vec!["z", "b"]);
    }

    #[test]
    fn scalar_edits_are_type_checked_without_coercion() {
        let mut card = Card::default();
        assert!(card.edit_scalar_string("title", "hello"));
        assert!(!card.edit_scalar_string("title", 5));
        assert!(card.edit_scalar_number("count", 5));
        assert!(!card.edit_scalar_number("count", "5"));
        assert!(card.edit_scalar_bool("pinned", true));
        assert!(!card.edit_scalar_bool("pinned", 1));
        assert_eq!(card.title, "hello");
        assert_eq!(card.count, 5);
        assert!(card.pinned);
    }

    #[test]
    fn edit_arbitrary_and_clear_fail_only_on_unstorable_values() {
        let mut card = card_with_tags(&["a"]);
        assert!(card.clear_attribute("tags", Value::Sequence(Vec::new())));
        assert!(card.tags.is_empty());
        assert!(!card.edit_arbitrary("unknown", "x"));
        assert!(!card.edit_arbitrary("pinned", "yes"));
    }

    #[test]
    fn attributes_snapshot_lists_every_declared_name() {
        let card = card_with_tags(&["a"]);
        let snapshot = card.attributes();
        let names: Vec<&str> = snapshot.names().collect();
        assert_eq!(names, vec!["count", "pinned", "tags", "title"]);
    }
}

//! Linked-attribute invariants.
//!
//! # Responsibility
//! - Bind a `(domain, codomain)` attribute pair on one object.
//! - Classify the pair once and repair the paired side after every edit
//!   routed through [`RelationLink::apply`].
//!
//! # Invariants
//! - `ValueEqValue`: domain == codomain after every call.
//! - `ValueInArray`: a present domain value is an element of codomain.
//! - `ArrayInArray`: every domain element is an element of codomain.
//! - Classification happens once per link instance and is never redone.
//! - Edits to a target value already present in the codomain never create a
//!   duplicate slot.

use crate::model::attribute::{AttributeError, Editable};
use crate::model::value::{AttributeShape, Value};
use log::{debug, error};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Relationship enforced between a domain and a codomain attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Two scalars of the same kind that mirror each other.
    ValueEqValue,
    /// A scalar that must be one of the codomain's elements.
    ValueInArray,
    /// A sequence whose elements must all appear in the codomain.
    ArrayInArray,
}

impl RelationKind {
    /// Classifies a pair of declared shapes.
    pub fn classify(domain: AttributeShape, codomain: AttributeShape) -> Option<Self> {
        match (domain, codomain) {
            (AttributeShape::Scalar(left), AttributeShape::Scalar(right)) if left == right => {
                Some(Self::ValueEqValue)
            }
            (AttributeShape::Scalar(_), AttributeShape::Sequence) => Some(Self::ValueInArray),
            (AttributeShape::Sequence, AttributeShape::Sequence) => Some(Self::ArrayInArray),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValueEqValue => "value_eq_value",
            Self::ValueInArray => "value_in_array",
            Self::ArrayInArray => "array_in_array",
        }
    }
}

/// Link configuration or reconciliation failure.
///
/// Unlike an edit rejection, this indicates a programming defect.
#[derive(Debug, Clone, PartialEq)]
pub enum RelationError {
    /// The object declares no attribute with this name.
    UnknownAttribute(String),
    /// The declared shapes fit none of the supported relation kinds.
    IncompatibleShapes {
        domain: String,
        codomain: String,
        domain_shape: AttributeShape,
        codomain_shape: AttributeShape,
    },
    /// The object refused a reconciling write.
    Attribute(AttributeError),
}

impl Display for RelationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownAttribute(name) => write!(f, "linked attribute does not exist: {name}"),
            Self::IncompatibleShapes {
                domain,
                codomain,
                domain_shape,
                codomain_shape,
            } => write!(
                f,
                "cannot link `{domain}` ({domain_shape}) to `{codomain}` ({codomain_shape})"
            ),
            Self::Attribute(err) => write!(f, "link reconciliation failed: {err}"),
        }
    }
}

impl Error for RelationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Attribute(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AttributeError> for RelationError {
    fn from(value: AttributeError) -> Self {
        Self::Attribute(value)
    }
}

/// One `(domain, codomain)` binding with its lazily classified kind.
///
/// Each owning object holds its own link instance; a link must never be
/// shared between objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationLink {
    domain: &'static str,
    codomain: &'static str,
    kind: Option<RelationKind>,
}

impl RelationLink {
    pub fn new(domain: &'static str, codomain: &'static str) -> Self {
        Self {
            domain,
            codomain,
            kind: None,
        }
    }

    pub fn domain(&self) -> &'static str {
        self.domain
    }

    pub fn codomain(&self) -> &'static str {
        self.codomain
    }

    /// Classified kind, or `None` before first use.
    pub fn kind(&self) -> Option<RelationKind> {
        self.kind
    }

    /// Runs `edit` on `target` and repairs the paired attribute afterwards.
    ///
    /// Returns the edit's own success flag.
    ///
    /// When a scalar domain moves onto a value the codomain already holds,
    /// the codomain is left as is: the previous domain value stays on as a
    /// distractor instead of being replaced or duplicated.
    ///
    /// # Errors
    /// - Configuration errors when the pair cannot be classified (first use).
    /// - `Attribute` when `target` refuses a reconciling write.
    pub fn apply<T, F>(&mut self, target: &mut T, edit: F) -> Result<bool, RelationError>
    where
        T: Editable + ?Sized,
        F: FnOnce(&mut T) -> bool,
    {
        let kind = self.ensure_classified(target)?;

        let domain_before = self.read(target, self.domain)?;
        let codomain_before = self.read(target, self.codomain)?;

        let success = edit(target);

        let domain_after = self.read(target, self.domain)?;
        let codomain_after = self.read(target, self.codomain)?;

        match kind {
            RelationKind::ValueEqValue => {
                if domain_after != domain_before {
                    target.set_attribute(self.codomain, domain_after)?;
                } else if codomain_after != codomain_before {
                    target.set_attribute(self.domain, codomain_after)?;
                }
            }
            RelationKind::ValueInArray => {
                let before = sequence_of(codomain_before);
                let after = sequence_of(codomain_after);
                self.reconcile_value_in_array(target, &domain_before, domain_after, &before, after)?;
            }
            RelationKind::ArrayInArray => {
                let domain_before = sequence_of(domain_before);
                let domain_after = sequence_of(domain_after);
                let before = sequence_of(codomain_before);
                let after = sequence_of(codomain_after);
                if domain_after != domain_before {
                    let codomain = propagate_domain_edit(&domain_before, &domain_after, after);
                    target.set_attribute(self.codomain, Value::Sequence(codomain))?;
                } else if after != before {
                    let domain = propagate_codomain_edit(domain_after, &before, &after);
                    target.set_attribute(self.domain, Value::Sequence(domain))?;
                }
            }
        }

        self.resolve(target, kind)?;
        Ok(success)
    }

    fn ensure_classified<T: Editable + ?Sized>(
        &mut self,
        target: &mut T,
    ) -> Result<RelationKind, RelationError> {
        if let Some(kind) = self.kind {
            return Ok(kind);
        }

        let domain_shape = target
            .declared_shape(self.domain)
            .ok_or_else(|| RelationError::UnknownAttribute(self.domain.to_string()))?;
        let codomain_shape = target
            .declared_shape(self.codomain)
            .ok_or_else(|| RelationError::UnknownAttribute(self.codomain.to_string()))?;

        let kind = match RelationKind::classify(domain_shape, codomain_shape) {
            Some(kind) => kind,
            None => {
                error!(
                    "event=link_classify module=link status=error domain={} codomain={} domain_shape={} codomain_shape={}",
                    self.domain, self.codomain, domain_shape, codomain_shape
                );
                return Err(RelationError::IncompatibleShapes {
                    domain: self.domain.to_string(),
                    codomain: self.codomain.to_string(),
                    domain_shape,
                    codomain_shape,
                });
            }
        };

        debug!(
            "event=link_classify module=link status=ok domain={} codomain={} kind={}",
            self.domain,
            self.codomain,
            kind.as_str()
        );
        self.resolve(target, kind)?;
        self.kind = Some(kind);
        Ok(kind)
    }

    /// Appends whatever the domain holds that the codomain lacks.
    fn resolve<T: Editable + ?Sized>(
        &self,
        target: &mut T,
        kind: RelationKind,
    ) -> Result<(), RelationError> {
        let missing: Vec<Value> = match kind {
            RelationKind::ValueEqValue => return Ok(()),
            RelationKind::ValueInArray => match self.read(target, self.domain)? {
                Value::Absent => Vec::new(),
                value => vec![value],
            },
            RelationKind::ArrayInArray => sequence_of(self.read(target, self.domain)?),
        };

        let mut codomain = sequence_of(self.read(target, self.codomain)?);
        let mut changed = false;
        for value in missing {
            if !codomain.contains(&value) {
                codomain.push(value);
                changed = true;
            }
        }
        if changed {
            target.set_attribute(self.codomain, Value::Sequence(codomain))?;
        }
        Ok(())
    }

    fn reconcile_value_in_array<T: Editable + ?Sized>(
        &self,
        target: &mut T,
        domain_before: &Value,
        domain_after: Value,
        codomain_before: &[Value],
        mut codomain_after: Vec<Value>,
    ) -> Result<(), RelationError> {
        let slot = codomain_before
            .iter()
            .position(|item| item == domain_before);

        if domain_after != *domain_before {
            if domain_after.is_absent() || codomain_after.contains(&domain_after) {
                return Ok(());
            }
            match slot.filter(|index| codomain_after.get(*index) == Some(domain_before)) {
                Some(index) => codomain_after[index] = domain_after,
                None => codomain_after.push(domain_after),
            }
            target.set_attribute(self.codomain, Value::Sequence(codomain_after))?;
        } else if let Some(index) = slot {
            if codomain_after.contains(domain_before) {
                return Ok(());
            }
            // The linked element was edited in place or removed.
            let replacement = if codomain_after.len() == codomain_before.len() {
                codomain_after.get(index).cloned().unwrap_or_default()
            } else {
                Value::Absent
            };
            target.set_attribute(self.domain, replacement)?;
        }
        Ok(())
    }

    fn read<T: Editable + ?Sized>(&self, target: &T, name: &str) -> Result<Value, RelationError> {
        target
            .attribute(name)
            .ok_or_else(|| RelationError::UnknownAttribute(name.to_string()))
    }
}

fn sequence_of(value: Value) -> Vec<Value> {
    match value {
        Value::Sequence(items) => items,
        Value::Absent => Vec::new(),
        other => vec![other],
    }
}

fn removed_values(before: &[Value], after: &[Value]) -> Vec<Value> {
    let mut removed: Vec<Value> = Vec::new();
    for value in before {
        if !after.contains(value) && !removed.contains(value) {
            removed.push(value.clone());
        }
    }
    removed
}

/// Mirrors a domain-side edit onto the codomain.
fn propagate_domain_edit(
    domain_before: &[Value],
    domain_after: &[Value],
    mut codomain: Vec<Value>,
) -> Vec<Value> {
    let removed = removed_values(domain_before, domain_after);
    if removed.is_empty() {
        for value in domain_after {
            if !domain_before.contains(value) && !codomain.contains(value) {
                codomain.push(value.clone());
            }
        }
        return codomain;
    }

    let edited = domain_before.len() == domain_after.len();
    for value in removed {
        let Some(slot) = codomain.iter().position(|item| *item == value) else {
            continue;
        };
        if edited {
            let Some(replacement) = domain_before
                .iter()
                .position(|item| *item == value)
                .and_then(|index| domain_after.get(index))
            else {
                continue;
            };
            if !codomain.contains(replacement) {
                codomain[slot] = replacement.clone();
            }
        } else {
            codomain.remove(slot);
        }
    }
    codomain
}

/// Mirrors a codomain-side edit onto the domain for linked elements only.
fn propagate_codomain_edit(
    mut domain: Vec<Value>,
    codomain_before: &[Value],
    codomain_after: &[Value],
) -> Vec<Value> {
    let edited = codomain_before.len() == codomain_after.len();
    for value in removed_values(codomain_before, codomain_after) {
        let Some(index) = domain.iter().position(|item| *item == value) else {
            continue;
        };
        let replacement = if edited {
            codomain_before
                .iter()
                .position(|item| *item == value)
                .and_then(|slot| codomain_after.get(slot))
                .cloned()
        } else {
            None
        };
        match replacement {
            Some(replacement) if !domain.contains(&replacement) => domain[index] = replacement,
            _ => {
                domain.remove(index);
            }
        }
    }
    domain
}

#[cfg(test)]
mod tests {
    use super::{RelationError, RelationKind, RelationLink};
    use crate::model::attribute::{AttributeError, AttributeStore, Editable};
    use crate::model::value::{AttributeShape, ScalarKind, Value};

    /// Minimal editable with one attribute of every linkable shape.
    #[derive(Debug, Default)]
    struct Sheet {
        left: String,
        right: String,
        flag: bool,
        pick: Option<String>,
        picks: Vec<String>,
        pool: Vec<String>,
    }

    const SHEET_ATTRIBUTES: &[&str] = &["left", "right", "flag", "pick", "picks", "pool"];

    fn texts(items: Vec<Value>, name: &str) -> Result<Vec<String>, AttributeError> {
        items
            .into_iter()
            .map(|item| match item {
                Value::Text(text) => Ok(text),
                other => Err(AttributeError::mismatch(name, "text", &other)),
            })
            .collect()
    }

    impl Editable for Sheet {
        fn attribute_names(&self) -> &'static [&'static str] {
            SHEET_ATTRIBUTES
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "left" => Some(Value::from(self.left.as_str())),
                "right" => Some(Value::from(self.right.as_str())),
                "flag" => Some(Value::from(self.flag)),
                "pick" => Some(Value::from(self.pick.clone())),
                "picks" => Some(Value::from(self.picks.clone())),
                "pool" => Some(Value::from(self.pool.clone())),
                _ => None,
            }
        }

        fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), AttributeError> {
            match (name, value) {
                ("left", Value::Text(text)) => self.left = text,
                ("right", Value::Text(text)) => self.right = text,
                ("flag", Value::Bool(flag)) => self.flag = flag,
                ("pick", Value::Text(text)) => self.pick = Some(text),
                ("pick", Value::Absent) => self.pick = None,
                ("picks", Value::Sequence(items)) => self.picks = texts(items, "picks")?,
                ("pool", Value::Sequence(items)) => self.pool = texts(items, "pool")?,
                (name, other) if SHEET_ATTRIBUTES.contains(&name) => {
                    return Err(AttributeError::mismatch(name, "declared type", &other));
                }
                (name, _) => return Err(AttributeError::Unknown(name.to_string())),
            }
            Ok(())
        }

        fn declared_shape(&self, name: &str) -> Option<AttributeShape> {
            match name {
                "left" | "right" | "pick" => Some(AttributeShape::Scalar(ScalarKind::Text)),
                "flag" => Some(AttributeShape::Scalar(ScalarKind::Bool)),
                "picks" | "pool" => Some(AttributeShape::Sequence),
                _ => None,
            }
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    fn sheet(pick: Option<&str>, picks: &[&str], pool: &[&str]) -> Sheet {
        Sheet {
            pick: pick.map(str::to_string),
            picks: strings(picks),
            pool: strings(pool),
            ..Sheet::default()
        }
    }

    #[test]
    fn classify_covers_supported_and_rejected_shapes() {
        let text = AttributeShape::Scalar(ScalarKind::Text);
        let bytes = AttributeShape::Scalar(ScalarKind::Bytes);
        let seq = AttributeShape::Sequence;
        assert_eq!(RelationKind::classify(text, text), Some(RelationKind::ValueEqValue));
        assert_eq!(RelationKind::classify(bytes, seq), Some(RelationKind::ValueInArray));
        assert_eq!(RelationKind::classify(seq, seq), Some(RelationKind::ArrayInArray));
        assert_eq!(RelationKind::classify(text, bytes), None);
        assert_eq!(RelationKind::classify(seq, text), None);
    }

    #[test]
    fn link_classifies_lazily_on_first_apply() {
        let mut target = sheet(Some("a"), &[], &["b"]);
        let mut link = RelationLink::new("pick", "pool");
        assert_eq!(link.kind(), None);

        link.apply(&mut target, |_| true).expect("link should classify");
        assert_eq!(link.kind(), Some(RelationKind::ValueInArray));
        assert_eq!(target.pool, vec!["b", "a"]);
    }

    #[test]
    fn incompatible_shapes_are_configuration_errors() {
        let mut target = Sheet::default();
        let mut link = RelationLink::new("flag", "left");
        let err = link
            .apply(&mut target, |_| true)
            .expect_err("bool and text scalars cannot be linked");
        assert!(matches!(err, RelationError::IncompatibleShapes { .. }));
        assert_eq!(link.kind(), None);

        let mut reversed = RelationLink::new("pool", "pick");
        let err = reversed
            .apply(&mut target, |_| true)
            .expect_err("sequence domain with scalar codomain cannot be linked");
        assert!(matches!(err, RelationError::IncompatibleShapes { .. }));

        let mut unknown = RelationLink::new("nope", "pool");
        let err = unknown
            .apply(&mut target, |_| true)
            .expect_err("unknown attribute cannot be linked");
        assert_eq!(err, RelationError::UnknownAttribute("nope".to_string()));
    }

    #[test]
    fn value_eq_value_mirrors_both_directions() {
        let mut target = Sheet::default();
        let mut link = RelationLink::new("left", "right");

        for value in ["x", "", "longer value"] {
            assert!(link
                .apply(&mut target, |t| t.edit_scalar_string("left", value))
                .expect("link apply"));
            assert_eq!(target.right, value);
        }

        assert!(link
            .apply(&mut target, |t| t.edit_scalar_string("right", "from right"))
            .expect("link apply"));
        assert_eq!(target.left, "from right");
    }

    #[test]
    fn value_eq_value_domain_wins_when_both_change() {
        let mut target = Sheet::default();
        let mut link = RelationLink::new("left", "right");
        link.apply(&mut target, |t| {
            t.edit_scalar_string("left", "domain") && t.edit_scalar_string("right", "codomain")
        })
        .expect("link apply");
        assert_eq!(target.left, "domain");
        assert_eq!(target.right, "domain");
    }

    #[test]
    fn value_in_array_domain_edit_updates_matching_slot() {
        let mut target = sheet(Some("a"), &[], &["a", "b", "c"]);
        let mut link = RelationLink::new("pick", "pool");
        link.apply(&mut target, |t| t.edit_scalar_string("pick", "z"))
            .expect("link apply");
        assert_eq!(target.pool, vec!["z", "b", "c"]);

        link.apply(&mut target, |t| t.edit_scalar_string("pick", "c"))
            .expect("link apply");
        assert_eq!(target.pick.as_deref(), Some("c"));
        assert_eq!(target.pool, vec!["z", "b", "c"]);
    }

    #[test]
    fn value_in_array_codomain_edit_and_delete_update_domain() {
        let mut target = sheet(Some("b"), &[], &["a", "b", "c"]);
        let mut link = RelationLink::new("pick", "pool");

        link.apply(&mut target, |t| t.edit_element("pool", "B", 1))
            .expect("link apply");
        assert_eq!(target.pick.as_deref(), Some("B"));

        link.apply(&mut target, |t| t.edit_element("pool", "A", 0))
            .expect("link apply");
        assert_eq!(target.pick.as_deref(), Some("B"));

        link.apply(&mut target, |t| {
            t.delete_element("pool", Some(Value::from("B")), None)
        })
        .expect("link apply");
        assert_eq!(target.pick, None);
        assert_eq!(target.pool, vec!["A", "c"]);
    }

    #[test]
    fn value_in_array_appends_new_domain_when_previously_absent() {
        let mut target = sheet(None, &[], &["a"]);
        let mut link = RelationLink::new("pick", "pool");
        link.apply(&mut target, |t| t.edit_scalar_string("pick", "new"))
            .expect("link apply");
        assert_eq!(target.pool, vec!["a", "new"]);
    }

    #[test]
    fn array_in_array_resolves_missing_elements_on_first_use() {
        let mut target = sheet(None, &["x", "a"], &["a", "b"]);
        let mut link = RelationLink::new("picks", "pool");
        link.apply(&mut target, |_| true).expect("link apply");
        assert_eq!(link.kind(), Some(RelationKind::ArrayInArray));
        assert_eq!(target.pool, vec!["a", "b", "x"]);
    }

    #[test]
    fn array_in_array_domain_edits_propagate_positionally() {
        let mut target = sheet(None, &["a", "c"], &["a", "b", "c"]);
        let mut link = RelationLink::new("picks", "pool");

        link.apply(&mut target, |t| t.edit_element("picks", "C", 1))
            .expect("link apply");
        assert_eq!(target.pool, vec!["a", "b", "C"]);

        link.apply(&mut target, |t| t.add_element("picks", "d"))
            .expect("link apply");
        assert_eq!(target.pool, vec!["a", "b", "C", "d"]);

        link.apply(&mut target, |t| t.delete_element("picks", None, Some(0)))
            .expect("link apply");
        assert_eq!(target.picks, vec!["C", "d"]);
        assert_eq!(target.pool, vec!["b", "C", "d"]);
    }

    #[test]
    fn array_in_array_codomain_edits_touch_only_linked_values() {
        let mut target = sheet(None, &["a", "c"], &["a", "b", "c"]);
        let mut link = RelationLink::new("picks", "pool");

        link.apply(&mut target, |t| t.edit_element("pool", "B", 1))
            .expect("link apply");
        assert_eq!(target.picks, vec!["a", "c"]);

        link.apply(&mut target, |t| t.edit_element("pool", "A", 0))
            .expect("link apply");
        assert_eq!(target.picks, vec!["A", "c"]);

        link.apply(&mut target, |t| {
            t.delete_element("pool", Some(Value::from("c")), None)
        })
        .expect("link apply");
        assert_eq!(target.picks, vec!["A"]);
        assert_eq!(target.pool, vec!["A", "B"]);
    }

    #[test]
    fn apply_returns_the_edit_flag_unchanged() {
        let mut target = sheet(None, &["a"], &["a"]);
        let mut link = RelationLink::new("picks", "pool");
        let success = link
            .apply(&mut target, |t| t.edit_element("picks", "z", 9))
            .expect("link apply");
        assert!(!success);
        assert_eq!(target.picks, vec!["a"]);
        assert_eq!(target.pool, vec!["a"]);
    }
}

//! Live conversion between question variants.
//!
//! # Responsibility
//! - Rebuild a question as another variant while carrying over every
//!   attribute both variants share.
//!
//! # Invariants
//! - `morph` never mutates its input; callers commit the result only on
//!   success.
//! - `name` and `type_help` always come from the target variant.
//! - Attributes named in `args` win over carried-over values.

use crate::model::attribute::{AttributeError, Editable};
use crate::model::value::Attributes;
use crate::question::{Question, VariantKind, ATTR_NAME, ATTR_TYPE_HELP};
use log::{error, info};
use rand::Rng;
use std::error::Error;
use std::fmt::{Display, Formatter};

const NO_CARRYOVER: &[&str] = &[ATTR_TYPE_HELP, ATTR_NAME];

/// Morph failure. The source question is left as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum MorphError {
    /// The target could not be built from `args`.
    Construct {
        target: VariantKind,
        source: AttributeError,
    },
    /// A shared attribute could not be carried into the target.
    Carryover {
        attribute: String,
        source: AttributeError,
    },
}

impl Display for MorphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Construct { target, source } => {
                write!(f, "failed to construct {target} question: {source}")
            }
            Self::Carryover { attribute, source } => {
                write!(f, "failed to carry over `{attribute}`: {source}")
            }
        }
    }
}

impl Error for MorphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Construct { source, .. } | Self::Carryover { source, .. } => Some(source),
        }
    }
}

/// Builds `question` as a `target` variant.
///
/// The target is constructed from `args`, then every attribute the two
/// variants share is copied over unless it is `name`, `type_help` or named in
/// `args`, and the target is built once more.
///
/// # Errors
/// - `Construct` when `args` holds an unknown name or unstorable value.
/// - `Carryover` when a shared attribute cannot be stored in the target.
pub fn morph<R: Rng + ?Sized>(
    question: &Question,
    target: VariantKind,
    args: Attributes,
    rng: &mut R,
) -> Result<Question, MorphError> {
    let previous = question.attributes();

    let mut morphed = Question::with_rng(target, args.clone(), rng)
        .map_err(|source| MorphError::Construct { target, source })?;

    let shared: Vec<&'static str> = morphed
        .attribute_names()
        .iter()
        .copied()
        .filter(|name| previous.contains(name))
        .filter(|name| !NO_CARRYOVER.contains(name) && !args.contains(name))
        .collect();

    for name in shared {
        let Some(value) = previous.get(name) else {
            continue;
        };
        morphed
            .set_attribute(name, value.clone())
            .map_err(|source| MorphError::Carryover {
                attribute: name.to_string(),
                source,
            })?;
    }

    morphed.build(rng);
    Ok(morphed)
}

impl Question {
    /// Replaces `self` with its `target` form.
    ///
    /// On error `self` is left untouched.
    pub fn morph_in_place<R: Rng + ?Sized>(
        &mut self,
        target: VariantKind,
        args: Attributes,
        rng: &mut R,
    ) -> Result<(), MorphError> {
        let from = self.kind();
        match morph(self, target, args, rng) {
            Ok(morphed) => {
                *self = morphed;
                info!(
                    "event=question_morph module=question status=ok from={} to={}",
                    from, target
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=question_morph module=question status=error from={} to={} error={}",
                    from, target, err
                );
                Err(err)
            }
        }
    }
}

//! In-process question arena with stable handles.
//!
//! # Responsibility
//! - Own questions behind opaque handles so morphs keep identity.
//! - Own the random source used by build and shuffle.
//!
//! # Invariants
//! - A handle keeps pointing at the same logical question across morphs.
//! - A failed morph leaves the stored question untouched.

use crate::config::CoreConfig;
use crate::model::attribute::AttributeError;
use crate::model::value::Attributes;
use crate::question::{MorphError, Question, VariantKind};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one stored question.
pub type QuestionHandle = Uuid;

/// Registry operation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    NotFound(QuestionHandle),
    Construct(AttributeError),
    Morph(MorphError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(handle) => write!(f, "question not found: {handle}"),
            Self::Construct(err) => write!(f, "question construction failed: {err}"),
            Self::Morph(err) => write!(f, "question morph failed: {err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Construct(err) => Some(err),
            Self::Morph(err) => Some(err),
        }
    }
}

impl From<AttributeError> for RegistryError {
    fn from(value: AttributeError) -> Self {
        Self::Construct(value)
    }
}

impl From<MorphError> for RegistryError {
    fn from(value: MorphError) -> Self {
        Self::Morph(value)
    }
}

/// Question arena keyed by [`QuestionHandle`].
pub struct QuestionRegistry {
    questions: BTreeMap<QuestionHandle, Question>,
    rng: StdRng,
}

impl Default for QuestionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl QuestionRegistry {
    /// Registry seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(None)
    }

    /// Registry with a reproducible random source when `seed` is set.
    pub fn with_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            questions: BTreeMap::new(),
            rng,
        }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::with_seed(config.seed)
    }

    /// Builds and stores a new question.
    pub fn create(
        &mut self,
        kind: VariantKind,
        overrides: Attributes,
    ) -> Result<QuestionHandle, RegistryError> {
        let question = Question::with_rng(kind, overrides, &mut self.rng).map_err(|err| {
            warn!(
                "event=question_create module=registry status=error kind={} error={}",
                kind, err
            );
            RegistryError::Construct(err)
        })?;
        let handle = self.insert(question);
        info!(
            "event=question_create module=registry status=ok kind={} handle={}",
            kind, handle
        );
        Ok(handle)
    }

    /// Stores an already built question.
    pub fn insert(&mut self, question: Question) -> QuestionHandle {
        let handle = Uuid::new_v4();
        self.questions.insert(handle, question);
        handle
    }

    pub fn get(&self, handle: QuestionHandle) -> Option<&Question> {
        self.questions.get(&handle)
    }

    pub fn get_mut(&mut self, handle: QuestionHandle) -> Option<&mut Question> {
        self.questions.get_mut(&handle)
    }

    pub fn remove(&mut self, handle: QuestionHandle) -> Option<Question> {
        self.questions.remove(&handle)
    }

    /// Returns handles in sorted order.
    pub fn handles(&self) -> Vec<QuestionHandle> {
        self.questions.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Morphs the stored question in place; the handle stays valid.
    pub fn morph(
        &mut self,
        handle: QuestionHandle,
        target: VariantKind,
        args: Attributes,
    ) -> Result<(), RegistryError> {
        let question = self
            .questions
            .get_mut(&handle)
            .ok_or(RegistryError::NotFound(handle))?;
        question.morph_in_place(target, args, &mut self.rng)?;
        Ok(())
    }
}

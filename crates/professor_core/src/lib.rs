//! Core domain logic for Professor quiz questions.
//! This crate is the single source of truth for question invariants.

pub mod config;
pub mod logging;
pub mod model;
pub mod numeric;
pub mod question;
pub mod registry;
pub mod scoring;

pub use config::{default_log_level, ConfigError, CoreConfig};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::attribute::{AttributeError, AttributeStore, Editable};
pub use model::link::{RelationError, RelationKind, RelationLink};
pub use model::value::{AttributeShape, Attributes, Number, ScalarKind, Value};
pub use numeric::parse_numeric;
pub use question::{
    morph, FreeResponse, MorphError, MultipleChoice, MultipleFreeResponse, MultipleResponse,
    Numeric, Question, QuestionCommon, QuestionId, QuestionVariant, Response, VariantKind,
};
pub use registry::{QuestionHandle, QuestionRegistry, RegistryError};
pub use scoring::{IndelRatio, Scorer};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

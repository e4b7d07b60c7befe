//! Attribute model shared by every question variant.
//!
//! # Responsibility
//! - Define the dynamic `Value` carried by named attributes.
//! - Define named attribute access (`Editable`) and its editing primitives.
//! - Enforce linked-attribute invariants (`RelationLink`).
//!
//! # Invariants
//! - Editing primitives never mutate on rejection.
//! - Link state is never exposed as an attribute.

pub mod attribute;
pub mod link;
pub mod value;

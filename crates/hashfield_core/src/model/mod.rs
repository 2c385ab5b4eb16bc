//! Domain model and derived hash columns.
//!
//! # Responsibility
//! - Define hash field descriptors and the record trait they operate on.
//! - Define the concrete records persisted by core.
//!
//! # Invariants
//! - Every hash field a record type owns is listed in its static registry.

pub mod hash_field;
pub mod record;
pub mod resource;

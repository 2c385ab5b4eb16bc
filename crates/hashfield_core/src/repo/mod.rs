//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Derived hash columns are recomputed on every write, never trusted from
//!   callers.

pub mod resource_repo;

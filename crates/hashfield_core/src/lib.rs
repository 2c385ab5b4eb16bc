//! Derived hash columns for exact-match lookups on long text.
//!
//! A [`HashField`] stores the SHA-1 digest of a sibling attribute so that
//! storage can index a fixed 40-character key instead of the full value.
//! Record types implement [`HashedRecord`] to declare their hash fields and
//! recompute them explicitly before every write.

pub mod db;
pub mod digest;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use digest::{hash_text, is_hex_digest, DIGEST_LEN};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::hash_field::{FieldDescription, FieldError, FieldResult, HashField};
pub use model::record::HashedRecord;
pub use model::resource::{Resource, ResourceId, ResourceValidationError, URL_HASH};
pub use repo::resource_repo::{
    RepoError, RepoResult, ResourceRepository, SqliteResourceRepository, RESOURCES_TABLE,
};
pub use service::resource_service::ResourceService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

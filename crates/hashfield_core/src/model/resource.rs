//! Resource domain model.
//!
//! # Responsibility
//! - Define a persisted record keyed by a long URL.
//! - Declare the `url_hash` column used for exact-match URL lookups.
//!
//! # Invariants
//! - `uuid` is stable and never nil.
//! - `url` is never empty.
//! - `url_hash` is derived from `url` and must not be assigned by callers.

use crate::model::hash_field::HashField;
use crate::model::record::HashedRecord;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a stored resource.
pub type ResourceId = Uuid;

/// Digest of `url`, indexed for lookups.
pub const URL_HASH: HashField = HashField::new("url_hash", "url");

static RESOURCE_HASH_FIELDS: [HashField; 1] = [URL_HASH];

/// Domain validation errors for `Resource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValidationError {
    NilUuid,
    EmptyUrl,
}

impl Display for ResourceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "resource uuid must not be nil"),
            Self::EmptyUrl => write!(f, "resource url must not be empty"),
        }
    }
}

impl Error for ResourceValidationError {}

/// A stored URL together with its lookup digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub uuid: ResourceId,
    /// Arbitrary-length URL. Too long to index directly.
    pub url: String,
    /// Empty until hashes are calculated.
    #[serde(default)]
    pub url_hash: String,
}

impl Resource {
    /// Creates a resource with a generated ID and no hash yet.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            url: url.into(),
            url_hash: String::new(),
        }
    }

    /// Creates a resource with a caller-provided ID.
    ///
    /// # Errors
    /// - Returns `NilUuid` when `uuid` is nil.
    pub fn with_id(
        uuid: ResourceId,
        url: impl Into<String>,
    ) -> Result<Self, ResourceValidationError> {
        let resource = Self {
            uuid,
            url: url.into(),
            url_hash: String::new(),
        };
        resource.validate()?;
        Ok(resource)
    }

    pub fn validate(&self) -> Result<(), ResourceValidationError> {
        if self.uuid.is_nil() {
            return Err(ResourceValidationError::NilUuid);
        }
        if self.url.is_empty() {
            return Err(ResourceValidationError::EmptyUrl);
        }
        Ok(())
    }
}

impl HashedRecord for Resource {
    fn hash_fields() -> &'static [HashField] {
        &RESOURCE_HASH_FIELDS
    }

    fn text_attribute(&self, name: &str) -> Option<&str> {
        match name {
            "url" => Some(&self.url),
            "url_hash" => Some(&self.url_hash),
            _ => None,
        }
    }

    fn set_text_attribute(&mut self, name: &str, value: String) -> bool {
        match name {
            "url" => self.url = value,
            "url_hash" => self.url_hash = value,
            _ => return false,
        }
        true
    }
}

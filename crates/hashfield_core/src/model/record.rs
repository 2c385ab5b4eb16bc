//! Record-side support for hash fields.
//!
//! # Responsibility
//! - Let a record type declare its hash fields in one static registry.
//! - Expose named text attributes to field descriptors.
//! - Recompute all declared hashes on demand.
//!
//! # Invariants
//! - `hash_fields()` is fixed per type; it never depends on instance state.
//! - `calculate_hashes()` only mutates memory; persistence is the caller's job.

use crate::digest::hash_text;
use crate::model::hash_field::{FieldResult, HashField};
use log::debug;

/// Record type owning zero or more [`HashField`]s.
pub trait HashedRecord {
    /// Hash fields declared on this record type.
    fn hash_fields() -> &'static [HashField]
    where
        Self: Sized;

    /// Returns the current value of a text attribute, or `None` when the
    /// record has no attribute with that name.
    fn text_attribute(&self, name: &str) -> Option<&str>;

    /// Assigns a text attribute. Returns `false` when the record has no
    /// attribute with that name.
    fn set_text_attribute(&mut self, name: &str, value: String) -> bool;

    /// Recomputes every declared hash field from its source attribute.
    ///
    /// Repeated calls with unchanged sources leave the hashes unchanged.
    ///
    /// # Errors
    /// - Propagates `FieldError::MissingAttribute` from a misconfigured field.
    fn calculate_hashes(&mut self) -> FieldResult<()>
    where
        Self: Sized,
    {
        let fields = Self::hash_fields();
        for field in fields {
            field.calculate_hash(self)?;
        }
        debug!(
            "event=hash_recompute module=model status=ok record={} fields={}",
            std::any::type_name::<Self>(),
            fields.len()
        );
        Ok(())
    }

    /// Hashes a value that belongs to no field, e.g. to build a lookup key.
    fn calculate_hash(value: &str) -> String
    where
        Self: Sized,
    {
        hash_text(value)
    }
}

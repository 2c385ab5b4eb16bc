//! Derived digest column descriptor.
//!
//! # Responsibility
//! - Describe a persisted column that stores the digest of a sibling attribute.
//! - Recompute that digest on a record in memory.
//! - Describe itself for schema snapshots and rebuild from that description.
//!
//! # Invariants
//! - Length is always `DIGEST_LEN`, nullability is always `false`.
//! - The stored value is never authored directly; it is always derived from
//!   the `original` attribute.
//! - `from_description(deconstruct())` reproduces an equal field.

use crate::digest::{hash_text, DIGEST_LEN};
use crate::model::record::HashedRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Import path reported in field descriptions.
pub const HASH_FIELD_PATH: &str = "hashfield_core::HashField";

const KWARG_DB_INDEX: &str = "db_index";
const KWARG_EDITABLE: &str = "editable";
const DEFAULT_DB_INDEX: bool = true;
const DEFAULT_EDITABLE: bool = false;

pub type FieldResult<T> = Result<T, FieldError>;

/// Configuration errors raised by hash field operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A field names an attribute the record type does not expose.
    MissingAttribute {
        record: &'static str,
        attribute: String,
    },
    /// A field description cannot be turned back into a field.
    InvalidDescription(String),
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAttribute { record, attribute } => {
                write!(f, "`{record}` has no text attribute `{attribute}`")
            }
            Self::InvalidDescription(message) => {
                write!(f, "invalid hash field description: {message}")
            }
        }
    }
}

impl Error for FieldError {}

/// Serializable self-description used by schema snapshots.
///
/// Only the source attribute and caller overrides are reported; everything
/// the field fixes internally is left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescription {
    pub name: String,
    pub path: String,
    pub args: Vec<String>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, Value>,
}

/// Column holding the digest of another attribute on the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashField {
    name: Cow<'static, str>,
    original: Cow<'static, str>,
    db_index: bool,
    editable: bool,
}

impl HashField {
    /// Creates an indexed, non-editable hash field.
    ///
    /// `name` is the attribute this field writes to; `original` is the
    /// attribute whose value gets hashed.
    pub const fn new(name: &'static str, original: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            original: Cow::Borrowed(original),
            db_index: DEFAULT_DB_INDEX,
            editable: DEFAULT_EDITABLE,
        }
    }

    pub fn with_db_index(mut self, db_index: bool) -> Self {
        self.db_index = db_index;
        self
    }

    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub const fn max_length(&self) -> usize {
        DIGEST_LEN
    }

    pub const fn is_nullable(&self) -> bool {
        false
    }

    pub const fn db_index(&self) -> bool {
        self.db_index
    }

    pub const fn editable(&self) -> bool {
        self.editable
    }

    /// Writes the digest of the `original` attribute into this field's slot.
    ///
    /// # Errors
    /// - `FieldError::MissingAttribute` when the record does not expose either
    ///   the source attribute or this field's own attribute.
    pub fn calculate_hash<R: HashedRecord + ?Sized>(&self, record: &mut R) -> FieldResult<()> {
        let digest = hash_text(record.text_attribute(&self.original).ok_or_else(|| {
            FieldError::MissingAttribute {
                record: std::any::type_name::<R>(),
                attribute: self.original.to_string(),
            }
        })?);

        if !record.set_text_attribute(&self.name, digest) {
            return Err(FieldError::MissingAttribute {
                record: std::any::type_name::<R>(),
                attribute: self.name.to_string(),
            });
        }
        Ok(())
    }

    /// Describes this field for schema snapshots.
    pub fn deconstruct(&self) -> FieldDescription {
        let mut kwargs = BTreeMap::new();
        if self.db_index != DEFAULT_DB_INDEX {
            kwargs.insert(KWARG_DB_INDEX.to_string(), Value::Bool(self.db_index));
        }
        if self.editable != DEFAULT_EDITABLE {
            kwargs.insert(KWARG_EDITABLE.to_string(), Value::Bool(self.editable));
        }

        FieldDescription {
            name: self.name.to_string(),
            path: HASH_FIELD_PATH.to_string(),
            args: vec![self.original.to_string()],
            kwargs,
        }
    }

    /// Rebuilds a field from a description produced by [`HashField::deconstruct`].
    ///
    /// # Errors
    /// - `FieldError::InvalidDescription` for a foreign path, a wrong number of
    ///   positional args, unknown keyword args or non-boolean overrides.
    pub fn from_description(description: &FieldDescription) -> FieldResult<Self> {
        if description.path != HASH_FIELD_PATH {
            return Err(FieldError::InvalidDescription(format!(
                "unexpected path `{}`",
                description.path
            )));
        }
        let original = match description.args.as_slice() {
            [original] if !original.is_empty() => original.clone(),
            _ => {
                return Err(FieldError::InvalidDescription(format!(
                    "expected exactly one source attribute, got {:?}",
                    description.args
                )));
            }
        };

        let mut field = Self {
            name: Cow::Owned(description.name.clone()),
            original: Cow::Owned(original),
            db_index: DEFAULT_DB_INDEX,
            editable: DEFAULT_EDITABLE,
        };
        for (key, value) in &description.kwargs {
            let flag = value.as_bool().ok_or_else(|| {
                FieldError::InvalidDescription(format!("`{key}` must be a boolean, got {value}"))
            })?;
            match key.as_str() {
                KWARG_DB_INDEX => field.db_index = flag,
                KWARG_EDITABLE => field.editable = flag,
                other => {
                    return Err(FieldError::InvalidDescription(format!(
                        "unsupported keyword argument `{other}`"
                    )));
                }
            }
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldDescription, FieldError, HashField, HASH_FIELD_PATH};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    #[test]
    fn new_fixes_length_and_nullability_with_defaults() {
        let field = HashField::new("url_hash", "url");
        assert_eq!(field.name(), "url_hash");
        assert_eq!(field.original(), "url");
        assert_eq!(field.max_length(), 40);
        assert!(!field.is_nullable());
        assert!(field.db_index());
        assert!(!field.editable());
    }

    #[test]
    fn deconstruct_reports_only_source_for_defaults() {
        let description = HashField::new("url_hash", "url").deconstruct();
        assert_eq!(description.name, "url_hash");
        assert_eq!(description.path, HASH_FIELD_PATH);
        assert_eq!(description.args, vec!["url".to_string()]);
        assert!(description.kwargs.is_empty());
    }

    #[test]
    fn deconstruct_reports_caller_overrides() {
        let field = HashField::new("title_hash", "title")
            .with_db_index(false)
            .with_editable(true);
        let description = field.deconstruct();
        assert_eq!(description.kwargs.get("db_index"), Some(&Value::Bool(false)));
        assert_eq!(description.kwargs.get("editable"), Some(&Value::Bool(true)));
        assert!(!description.kwargs.contains_key("max_length"));
        assert!(!description.kwargs.contains_key("null"));
    }

    #[test]
    fn reconstruct_reproduces_identical_configuration() {
        for field in [
            HashField::new("url_hash", "url"),
            HashField::new("url_hash", "url").with_db_index(false),
            HashField::new("url_hash", "url").with_editable(true),
        ] {
            let rebuilt = HashField::from_description(&field.deconstruct()).unwrap();
            assert_eq!(rebuilt, field);
        }
    }

    #[test]
    fn description_serializes_for_snapshots() {
        let description = HashField::new("url_hash", "url")
            .with_db_index(false)
            .deconstruct();
        let snapshot = serde_json::to_value(&description).unwrap();
        assert_eq!(
            snapshot,
            json!({
                "name": "url_hash",
                "path": HASH_FIELD_PATH,
                "args": ["url"],
                "kwargs": { "db_index": false },
            })
        );

        let decoded: FieldDescription = serde_json::from_value(snapshot).unwrap();
        assert_eq!(decoded, description);
    }

    #[test]
    fn reconstruct_rejects_unknown_kwargs_and_missing_source() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("max_length".to_string(), json!(64));
        let with_length = FieldDescription {
            name: "url_hash".to_string(),
            path: HASH_FIELD_PATH.to_string(),
            args: vec!["url".to_string()],
            kwargs,
        };
        assert!(matches!(
            HashField::from_description(&with_length),
            Err(FieldError::InvalidDescription(_))
        ));

        let without_source = FieldDescription {
            name: "url_hash".to_string(),
            path: HASH_FIELD_PATH.to_string(),
            args: Vec::new(),
            kwargs: BTreeMap::new(),
        };
        assert!(matches!(
            HashField::from_description(&without_source),
            Err(FieldError::InvalidDescription(_))
        ));
    }
}

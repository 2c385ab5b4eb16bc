//! Resource repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and URL lookup APIs over `resources` storage.
//! - Recompute derived hash columns immediately before each write.
//!
//! # Invariants
//! - Write paths call `Resource::validate()` and then `calculate_hashes()`
//!   before any SQL mutation.
//! - URL lookups go through the indexed `url_hash` column.
//! - Read paths reject rows whose hash does not match their URL.

use crate::db::snapshot::{diff_field_snapshots, store_field_snapshots, FieldChange};
use crate::db::DbError;
use crate::digest::{hash_text, is_hex_digest};
use crate::model::hash_field::FieldError;
use crate::model::record::HashedRecord;
use crate::model::resource::{Resource, ResourceId, ResourceValidationError};
use log::{debug, warn};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Table backing `Resource` records.
pub const RESOURCES_TABLE: &str = "resources";

const RESOURCE_SELECT_SQL: &str = "SELECT
    uuid,
    url,
    url_hash
FROM resources";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for resource persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ResourceValidationError),
    Field(FieldError),
    Db(DbError),
    NotFound(ResourceId),
    InvalidData(String),
    /// Stored hash field descriptions disagree with the declared fields.
    SchemaDrift(Vec<FieldChange>),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Field(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "resource not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted resource data: {message}")
            }
            Self::SchemaDrift(changes) => {
                write!(f, "hash fields changed since last snapshot: {changes:?}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Field(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::SchemaDrift(_) => None,
        }
    }
}

impl From<ResourceValidationError> for RepoError {
    fn from(value: ResourceValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<FieldError> for RepoError {
    fn from(value: FieldError) -> Self {
        Self::Field(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for resource operations.
///
/// Write methods take `&mut Resource` so the recomputed hash is visible to
/// the caller after a successful save.
pub trait ResourceRepository {
    fn create_resource(&self, resource: &mut Resource) -> RepoResult<ResourceId>;
    fn update_resource(&self, resource: &mut Resource) -> RepoResult<()>;
    fn get_resource(&self, id: ResourceId) -> RepoResult<Option<Resource>>;
    /// Exact-match lookup by full URL.
    fn find_by_url(&self, url: &str) -> RepoResult<Option<Resource>>;
    /// Lookup by a precomputed URL digest.
    fn find_by_url_hash(&self, url_hash: &str) -> RepoResult<Vec<Resource>>;
}

/// SQLite-backed resource repository.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    /// Creates a repository after checking stored hash field descriptions.
    ///
    /// The first call on a fresh database records the descriptions.
    ///
    /// # Errors
    /// - `RepoError::SchemaDrift` when a stored description was altered or
    ///   removed since it was recorded.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let fields = Resource::hash_fields();
        let changes = diff_field_snapshots(conn, RESOURCES_TABLE, fields)?;

        if changes
            .iter()
            .any(|change| !matches!(change, FieldChange::Added(_)))
        {
            warn!(
                "event=repo_init module=repo status=error table={} error_code=schema_drift changes={}",
                RESOURCES_TABLE,
                changes.len()
            );
            return Err(RepoError::SchemaDrift(changes));
        }
        if !changes.is_empty() {
            store_field_snapshots(conn, RESOURCES_TABLE, fields)?;
        }

        Ok(Self { conn })
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn create_resource(&self, resource: &mut Resource) -> RepoResult<ResourceId> {
        resource.validate()?;
        resource.calculate_hashes()?;

        self.conn.execute(
            "INSERT INTO resources (
                uuid,
                url,
                url_hash
            ) VALUES (?1, ?2, ?3);",
            params![
                resource.uuid.to_string(),
                resource.url.as_str(),
                resource.url_hash.as_str(),
            ],
        )?;

        debug!(
            "event=resource_create module=repo status=ok uuid={}",
            resource.uuid
        );
        Ok(resource.uuid)
    }

    fn update_resource(&self, resource: &mut Resource) -> RepoResult<()> {
        resource.validate()?;
        resource.calculate_hashes()?;

        let changed = self.conn.execute(
            "UPDATE resources
             SET
                url = ?1,
                url_hash = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?3;",
            params![
                resource.url.as_str(),
                resource.url_hash.as_str(),
                resource.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(resource.uuid));
        }

        debug!(
            "event=resource_update module=repo status=ok uuid={}",
            resource.uuid
        );
        Ok(())
    }

    fn get_resource(&self, id: ResourceId) -> RepoResult<Option<Resource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOURCE_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }

        Ok(None)
    }

    fn find_by_url(&self, url: &str) -> RepoResult<Option<Resource>> {
        let url_hash = Resource::calculate_hash(url);
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL}
             WHERE url_hash = ?1
               AND url = ?2
             ORDER BY created_at ASC, uuid ASC
             LIMIT 1;"
        ))?;

        let mut rows = stmt.query(params![url_hash, url])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_resource_row(row)?));
        }

        Ok(None)
    }

    fn find_by_url_hash(&self, url_hash: &str) -> RepoResult<Vec<Resource>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESOURCE_SELECT_SQL}
             WHERE url_hash = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([url_hash])?;
        let mut resources = Vec::new();
        while let Some(row) = rows.next()? {
            resources.push(parse_resource_row(row)?);
        }

        Ok(resources)
    }
}

fn parse_resource_row(row: &Row<'_>) -> RepoResult<Resource> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in resources.uuid"
        ))
    })?;

    let url: String = row.get("url")?;
    let url_hash: String = row.get("url_hash")?;
    if !is_hex_digest(&url_hash) {
        return Err(RepoError::InvalidData(format!(
            "malformed digest `{url_hash}` in resources.url_hash"
        )));
    }
    if url_hash != hash_text(&url) {
        return Err(RepoError::InvalidData(format!(
            "resources.url_hash does not match url for {uuid}"
        )));
    }

    let resource = Resource {
        uuid,
        url,
        url_hash,
    };
    resource.validate()?;
    Ok(resource)
}

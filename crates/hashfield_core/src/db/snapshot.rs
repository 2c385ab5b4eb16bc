//! Stored hash field descriptions.
//!
//! # Responsibility
//! - Record the `deconstruct()` output of each hash field per table.
//! - Report differences between stored and declared fields.
//!
//! # Invariants
//! - One row per `(table_name, field_name)`; storing again replaces it.
//! - Descriptions are stored as JSON produced by `serde_json`.

use super::DbResult;
use crate::model::hash_field::{FieldDescription, HashField};
use log::info;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;

/// Difference between a stored description and the declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Declared but never stored.
    Added(String),
    /// Stored but no longer declared.
    Removed(String),
    /// Stored description no longer matches the declared one.
    Altered {
        stored: FieldDescription,
        declared: FieldDescription,
    },
}

/// Stores the descriptions of `fields` for `table`, replacing earlier rows.
pub fn store_field_snapshots(conn: &Connection, table: &str, fields: &[HashField]) -> DbResult<()> {
    for field in fields {
        let description = serde_json::to_string(&field.deconstruct())?;
        conn.execute(
            "INSERT INTO field_snapshots (table_name, field_name, description)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(table_name, field_name) DO UPDATE SET
                description = excluded.description,
                recorded_at = (strftime('%s', 'now') * 1000);",
            params![table, field.name(), description],
        )?;
    }
    info!(
        "event=field_snapshot_store module=db status=ok table={} fields={}",
        table,
        fields.len()
    );
    Ok(())
}

/// Loads every stored description for `table`, keyed by field name.
pub fn load_field_snapshots(
    conn: &Connection,
    table: &str,
) -> DbResult<BTreeMap<String, FieldDescription>> {
    let mut stmt = conn.prepare(
        "SELECT field_name, description
         FROM field_snapshots
         WHERE table_name = ?1
         ORDER BY field_name ASC;",
    )?;
    let mut rows = stmt.query([table])?;
    let mut snapshots = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let field_name: String = row.get(0)?;
        let description: String = row.get(1)?;
        snapshots.insert(field_name, serde_json::from_str(&description)?);
    }
    Ok(snapshots)
}

/// Compares stored descriptions for `table` with the declared `fields`.
///
/// Returns an empty list when nothing changed.
pub fn diff_field_snapshots(
    conn: &Connection,
    table: &str,
    fields: &[HashField],
) -> DbResult<Vec<FieldChange>> {
    let mut stored = load_field_snapshots(conn, table)?;
    let mut changes = Vec::new();

    for field in fields {
        let declared = field.deconstruct();
        match stored.remove(field.name()) {
            None => changes.push(FieldChange::Added(declared.name)),
            Some(previous) if previous != declared => changes.push(FieldChange::Altered {
                stored: previous,
                declared,
            }),
            Some(_) => {}
        }
    }
    changes.extend(stored.into_keys().map(FieldChange::Removed));

    Ok(changes)
}

use hashfield_core::db::open_db_in_memory;
use hashfield_core::db::snapshot::{load_field_snapshots, store_field_snapshots};
use hashfield_core::{
    hash_text, HashField, HashedRecord, RepoError, Resource, ResourceRepository,
    ResourceValidationError, SqliteResourceRepository, RESOURCES_TABLE,
};
use rusqlite::params;

const LONG_URL: &str = "https://example.com/search?q=derived+hash+columns&page=42&sort=relevance";

#[test]
fn create_sets_hash_in_memory_and_in_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new(LONG_URL);
    assert!(resource.url_hash.is_empty());
    let id = repo.create_resource(&mut resource).unwrap();

    assert_eq!(resource.url_hash, hash_text(LONG_URL));
    let stored: String = conn
        .query_row(
            "SELECT url_hash FROM resources WHERE uuid = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, hash_text(LONG_URL));
}

#[test]
fn caller_assigned_hash_is_overwritten_on_save() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/a");
    resource.url_hash = "0".repeat(40);
    repo.create_resource(&mut resource).unwrap();

    let loaded = repo.get_resource(resource.uuid).unwrap().unwrap();
    assert_eq!(loaded.url_hash, hash_text("https://example.com/a"));
}

#[test]
fn update_recomputes_hash_for_new_url() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/old");
    repo.create_resource(&mut resource).unwrap();
    let old_hash = resource.url_hash.clone();

    resource.url = "https://example.com/new".to_string();
    repo.update_resource(&mut resource).unwrap();

    let loaded = repo.get_resource(resource.uuid).unwrap().unwrap();
    assert_eq!(loaded.url_hash, hash_text("https://example.com/new"));
    assert_ne!(loaded.url_hash, old_hash);
    assert!(repo.find_by_url("https://example.com/old").unwrap().is_none());
}

#[test]
fn calculate_hashes_without_save_does_not_persist() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/first");
    repo.create_resource(&mut resource).unwrap();

    resource.url = "https://example.com/second".to_string();
    resource.calculate_hashes().unwrap();
    assert_eq!(resource.url_hash, hash_text("https://example.com/second"));

    let loaded = repo.get_resource(resource.uuid).unwrap().unwrap();
    assert_eq!(loaded.url, "https://example.com/first");
    assert_eq!(loaded.url_hash, hash_text("https://example.com/first"));
}

#[test]
fn find_by_url_uses_type_level_hash() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new(LONG_URL);
    repo.create_resource(&mut resource).unwrap();
    repo.create_resource(&mut Resource::new("https://example.com/other"))
        .unwrap();

    let found = repo.find_by_url(LONG_URL).unwrap().unwrap();
    assert_eq!(found, resource);

    let by_hash = repo
        .find_by_url_hash(&Resource::calculate_hash(LONG_URL))
        .unwrap();
    assert_eq!(by_hash, vec![resource]);

    assert!(repo.find_by_url("https://example.com/missing").unwrap().is_none());
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/missing");
    let err = repo.update_resource(&mut resource).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == resource.uuid));
}

#[test]
fn create_rejects_empty_url_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("");
    let err = repo.create_resource(&mut resource).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ResourceValidationError::EmptyUrl)
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM resources;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn read_rejects_hash_that_does_not_match_url() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/tampered");
    repo.create_resource(&mut resource).unwrap();
    conn.execute(
        "UPDATE resources SET url = ?1 WHERE uuid = ?2;",
        params!["https://example.com/changed", resource.uuid.to_string()],
    )
    .unwrap();

    let err = repo.get_resource(resource.uuid).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn read_rejects_malformed_hash() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteResourceRepository::try_new(&conn).unwrap();

    let mut resource = Resource::new("https://example.com/upper");
    repo.create_resource(&mut resource).unwrap();
    conn.execute(
        "UPDATE resources SET url_hash = upper(url_hash) WHERE uuid = ?1;",
        [resource.uuid.to_string()],
    )
    .unwrap();

    let err = repo.get_resource(resource.uuid).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("malformed")));
}

#[test]
fn try_new_records_field_snapshots_once() {
    let conn = open_db_in_memory().unwrap();
    assert!(load_field_snapshots(&conn, RESOURCES_TABLE)
        .unwrap()
        .is_empty());

    SqliteResourceRepository::try_new(&conn).unwrap();
    let stored = load_field_snapshots(&conn, RESOURCES_TABLE).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored["url_hash"], Resource::hash_fields()[0].deconstruct());

    SqliteResourceRepository::try_new(&conn).unwrap();
}

#[test]
fn try_new_rejects_drifted_field_snapshot() {
    let conn = open_db_in_memory().unwrap();
    store_field_snapshots(
        &conn,
        RESOURCES_TABLE,
        &[HashField::new("url_hash", "url").with_db_index(false)],
    )
    .unwrap();

    let err = SqliteResourceRepository::try_new(&conn)
        .err()
        .expect("drifted snapshot should be rejected");
    assert!(matches!(err, RepoError::SchemaDrift(changes) if changes.len() == 1));
}

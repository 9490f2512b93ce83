// src/db/identity_db_conn.rs
use std::{fs, path::Path};

use rusqlite::{Connection, OpenFlags};

use crate::consts::DB_KDF_ITERATIONS;
use crate::error::StoreError;

/// Open an existing identity database for a migration run
///
/// Never creates the file: pointing the tool at the wrong path must fail
/// at setup, not look like an empty store.
pub fn open_identity_db(path: &Path, key: Option<&str>) -> Result<Connection, StoreError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    apply_key(&conn, key)?;

    // First real read: a wrong SQLCipher key surfaces here
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |r| {
        r.get::<_, i64>(0)
    })?;

    Ok(conn)
}

/// Create (or open) an identity database and make sure the schema exists
pub fn create_identity_db(path: &Path, key: Option<&str>) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;
    apply_key(&conn, key)?;
    ensure_schema(&conn)?;
    Ok(conn)
}

fn apply_key(conn: &Connection, key: Option<&str>) -> rusqlite::Result<()> {
    let Some(key) = key else {
        return Ok(());
    };
    let key = key.replace('\'', "''");

    conn.execute_batch(&format!("PRAGMA key = '{key}';"))?;
    conn.execute_batch(&format!(
        r#"
        PRAGMA cipher_page_size = 4096;
        PRAGMA kdf_iter = {DB_KDF_ITERATIONS};
        PRAGMA cipher_hmac_algorithm = HMAC_SHA512;
        PRAGMA cipher_kdf_algorithm = PBKDF2_HMAC_SHA512;
        PRAGMA cipher_plaintext_header_size = 0;
        "#
    ))
}

pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS auth_identities (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id    INTEGER NOT NULL,
            type       TEXT NOT NULL,
            name       TEXT,
            secret     TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_auth_identities_type_id ON auth_identities(type, id);
        "#,
    )
}

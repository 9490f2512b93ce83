//! SQLite-backed identity store
//!
//! Keyset pagination (`id > last_seen`) keeps each page independent of
//! rows rewritten earlier in the run, and no statement stays open between
//! pages, so one connection handles both reads and writes.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::trace;

use super::identity_db_conn::{create_identity_db, open_identity_db};
use crate::config::DatabaseConfig;
use crate::enums::IdentityType;
use crate::error::StoreError;
use crate::store::{Identity, IdentityCursor, IdentityStore, Page};

type RawIdentity = (i64, i64, String, Option<String>, String);

pub struct SqliteIdentityStore {
    conn: Connection,
}

impl SqliteIdentityStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open the configured database; it must already exist
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        open_identity_db(&config.path, config.key.as_deref()).map(Self::new)
    }

    /// Open or create the configured database, creating the schema if needed
    pub fn create(config: &DatabaseConfig) -> Result<Self, StoreError> {
        create_identity_db(&config.path, config.key.as_deref()).map(Self::new)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Insert a new identity and return its id
    pub fn insert(
        &self,
        user_id: i64,
        kind: IdentityType,
        name: Option<&str>,
        secret: &str,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO auth_identities (user_id, type, name, secret) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, kind.as_str(), name, secret],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn find(&self, id: i64) -> Result<Option<Identity>, StoreError> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, user_id, type, name, secret FROM auth_identities WHERE id = ?1",
                [id],
                read_row,
            )
            .optional()?;
        raw.map(into_identity).transpose()
    }

    /// Rows of one kind: used for reporting how many records a run will visit
    pub fn count(&self, kind: IdentityType) -> Result<u64, StoreError> {
        let n: i64 = self.conn.query_row(
            "SELECT count(*) FROM auth_identities WHERE type = ?1",
            [kind.as_str()],
            |r| r.get(0),
        )?;
        Ok(n as u64)
    }
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawIdentity> {
    Ok((
        row.get(0)?, // id
        row.get(1)?, // user_id
        row.get(2)?, // type
        row.get(3)?, // name
        row.get(4)?, // secret
    ))
}

fn into_identity((id, user_id, kind, name, secret): RawIdentity) -> Result<Identity, StoreError> {
    Ok(Identity {
        id,
        user_id,
        kind: kind.parse()?,
        name,
        secret,
    })
}

impl IdentityStore for SqliteIdentityStore {
    fn fetch_page(&self, cursor: &mut IdentityCursor, size: usize) -> Result<Page, StoreError> {
        if cursor.is_exhausted() {
            return Ok(Page::default());
        }

        // One extra row tells us whether another page exists
        let limit = i64::try_from(size).unwrap_or(i64::MAX - 1) + 1;
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, user_id, type, name, secret
            FROM auth_identities
            WHERE type = ?1 AND id > ?2
            ORDER BY id ASC
            LIMIT ?3
            "#,
        )?;
        let rows = stmt.query_map(
            params![
                cursor.kind.as_str(),
                cursor.after_id.unwrap_or(i64::MIN),
                limit
            ],
            read_row,
        )?;

        let mut identities = Vec::with_capacity(size.min(1024) + 1);
        for row in rows {
            identities.push(into_identity(row?)?);
        }

        let has_more = identities.len() > size;
        identities.truncate(size);

        let page = Page {
            identities,
            has_more,
        };
        cursor.advance(&page);
        trace!(fetched = page.len(), has_more, after_id = ?cursor.after_id, "fetched page");
        Ok(page)
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        let updated_at = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let rows = self.conn.execute(
            "UPDATE auth_identities SET secret = ?1, updated_at = ?2 WHERE id = ?3 AND type = ?4",
            params![
                identity.secret,
                updated_at,
                identity.id,
                identity.kind.as_str()
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(identity.id));
        }
        Ok(())
    }
}

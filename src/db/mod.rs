//! Identity database: connection setup and the SQLite store

pub mod identity_db_conn;
pub mod identity_db_ops;

pub use identity_db_conn::{create_identity_db, ensure_schema, open_identity_db};
pub use identity_db_ops::SqliteIdentityStore;

// src/lib.rs
//! hmac-secret-migrate: resumable, idempotent migration of HMAC secret keys
//!
//! Features:
//! - AES Crypt v3 encryption of `hmac_sha256` identity secrets
//! - Cheap `is_encrypted` idempotency gate (`<key>:$b64:` prefix)
//! - Chunked, id-ordered iteration with per-record failure isolation
//! - Key rotation via `reencrypt`
//! - SQLite / SQLCipher identity store

pub mod aliases;
pub mod config;
pub mod consts;
pub mod crypto;
pub mod db;
pub mod enums;
pub mod migrate;
pub mod store;

pub mod error;

// Re-export everything users need at the crate root
pub use aliases::SecretKey32;
pub use config::{load as load_config, Config};
pub use crypto::{HmacEncrypter, Keyring, SecretCipher};
pub use db::SqliteIdentityStore;
pub use enums::{Direction, IdentityType};
pub use error::{CipherError, ConfigError, MigrateError, StoreError};
pub use migrate::{process_identity, ConsoleReporter, Migrator, Outcome, Reporter, RunSummary};
pub use store::{Identity, IdentityCursor, IdentityStore, Page};

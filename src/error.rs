//! Public error types for the entire crate
//!
//! `CipherError` is record-scoped: the migration driver catches it per
//! identity and keeps going. Everything else ends the run.

use aescrypt_rs::AescryptError;
use thiserror::Error;

/// Failure transforming a single secret
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("encryption failed: {0}")]
    Encryption(AescryptError),

    #[error("decryption failed: {0}")]
    Decryption(AescryptError),

    #[error("malformed encrypted secret: {0}")]
    Malformed(&'static str),

    #[error("secret was encrypted with unknown key {0:?}")]
    UnknownKey(String),

    #[error("decrypted secret is not valid UTF-8")]
    InvalidUtf8,
}

/// Failure reading or writing the identity store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown identity type {0:?}")]
    UnknownIdentityType(String),

    #[error("identity {0} not found on save")]
    NotFound(i64),
}

/// Configuration or key material that prevents a run from starting
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("no encryption keys configured")]
    NoKeys,

    #[error("invalid key name {0:?} (expected letters, digits or '_')")]
    InvalidKeyName(String),

    #[error("invalid key {name:?}: {reason}")]
    InvalidKey { name: String, reason: String },

    #[error("current key {0:?} is not in the keyring")]
    UnknownCurrentKey(String),
}

/// Run-level error: aborts the migration
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Setup error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<rusqlite::Error> for MigrateError {
    fn from(err: rusqlite::Error) -> Self {
        MigrateError::Store(StoreError::Sql(err))
    }
}

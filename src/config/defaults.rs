use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::app::{DatabaseConfig, EncryptionConfig, MigrationConfig};
use crate::consts::{DEFAULT_CHUNK_SIZE, SECRET_KDF_ITERATIONS};

pub const ENV_CONFIG: &str = "HMAC_MIGRATE_CONFIG";
pub const ENV_DB_PATH: &str = "HMAC_MIGRATE_DB";
pub const ENV_DB_KEY: &str = "HMAC_MIGRATE_DB_KEY";
pub const ENV_CHUNK_SIZE: &str = "HMAC_MIGRATE_CHUNK_SIZE";

pub const DEFAULT_CONFIG_FILE: &str = "hmac-migrate.toml";
pub const CONFIG_DIR_NAME: &str = "hmac-migrate";
pub const DEFAULT_DB_PATH: &str = "writable/identities.db";
pub const DEFAULT_CURRENT_KEY: &str = "k1";

pub fn default_database() -> DatabaseConfig {
    DatabaseConfig {
        path: PathBuf::from(DEFAULT_DB_PATH),
        key: None,
    }
}

// No built-in key material: a run without configured keys fails at setup
pub fn default_encryption() -> EncryptionConfig {
    EncryptionConfig {
        current_key: DEFAULT_CURRENT_KEY.into(),
        kdf_iterations: SECRET_KDF_ITERATIONS,
        keys: BTreeMap::new(),
    }
}

pub fn default_migration() -> MigrationConfig {
    MigrationConfig {
        chunk_size: DEFAULT_CHUNK_SIZE,
    }
}

//! Configuration system for hmac-secret-migrate
//!
//! TOML file + `HMAC_MIGRATE_*` env overrides, with built-in defaults
//! for everything except key material.

pub use app::{config_path, load, load_from, Config, DatabaseConfig, EncryptionConfig, MigrationConfig};
pub use defaults::{ENV_CHUNK_SIZE, ENV_CONFIG, ENV_DB_KEY, ENV_DB_PATH};

mod app;
mod defaults;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use super::defaults::*;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub encryption: EncryptionConfig,
    pub migration: MigrationConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    /// SQLCipher passphrase; `None` opens the database unencrypted
    pub key: Option<String>,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    pub current_key: String,
    pub kdf_iterations: u32,
    pub keys: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: default_database(),
            encryption: default_encryption(),
            migration: default_migration(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        default_database()
    }
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        default_encryption()
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        default_migration()
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("path", &self.path)
            .field("key", &self.key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for EncryptionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionConfig")
            .field("current_key", &self.current_key)
            .field("kdf_iterations", &self.kdf_iterations)
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Config {
    /// Parse a TOML document; missing sections fall back to defaults
    pub fn from_toml(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })
    }

    /// Apply `HMAC_MIGRATE_*` overrides using the given lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database.path = PathBuf::from(path);
        }
        if let Some(key) = lookup(ENV_DB_KEY) {
            self.database.key = Some(key);
        }
        if let Some(size) = lookup(ENV_CHUNK_SIZE) {
            self.migration.chunk_size =
                size.trim().parse().map_err(|e| ConfigError::InvalidValue {
                    name: ENV_CHUNK_SIZE,
                    reason: format!("{e}"),
                })?;
        }
        Ok(())
    }

    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.migration.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "migration.chunk_size",
                reason: "must be greater than zero".into(),
            });
        }
        if self.encryption.keys.is_empty() {
            return Err(ConfigError::NoKeys);
        }
        Ok(())
    }
}

/// Locate the config file: `$HMAC_MIGRATE_CONFIG`, then `./hmac-migrate.toml`,
/// then `<config dir>/hmac-migrate/config.toml`
pub fn config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME).join("config.toml"))
        .filter(|p| p.exists())
}

/// Read one config file, without env overrides
pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let origin = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: origin.clone(),
        source,
    })?;
    Config::from_toml(&content, &origin)
}

/// Load config for a run: file (or built-in defaults) plus env overrides
///
/// An explicit `path` must exist; otherwise the usual locations are tried.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut conf = match path.map(Path::to_path_buf).or_else(config_path) {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            load_from(&path)?
        }
        None => {
            warn!("no config file found: using built-in defaults");
            Config::default()
        }
    };
    conf.apply_env()?;
    Ok(conf)
}

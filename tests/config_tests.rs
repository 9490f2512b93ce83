// tests/config_tests.rs
mod common;
use common::{KEY_A_HEX, KEY_B_HEX};

use std::collections::HashMap;
use std::path::Path;

use hmac_secret_migrate::config::{self, Config, ENV_CHUNK_SIZE, ENV_DB_KEY, ENV_DB_PATH};
use hmac_secret_migrate::consts::DEFAULT_CHUNK_SIZE;
use hmac_secret_migrate::{ConfigError, HmacEncrypter, SecretCipher};

fn full_toml() -> String {
    format!(
        r#"
        [database]
        path = "/var/lib/app/identities.db"
        key = "db-passphrase"

        [encryption]
        current_key = "k2"
        kdf_iterations = 3
        [encryption.keys]
        k1 = "{KEY_A_HEX}"
        k2 = "hex:{KEY_B_HEX}"

        [migration]
        chunk_size = 250
        "#
    )
}

#[test]
fn parses_every_section() {
    let conf = Config::from_toml(&full_toml(), "inline").unwrap();

    assert_eq!(conf.database.path, Path::new("/var/lib/app/identities.db"));
    assert_eq!(conf.database.key.as_deref(), Some("db-passphrase"));
    assert_eq!(conf.encryption.current_key, "k2");
    assert_eq!(conf.encryption.kdf_iterations, 3);
    assert_eq!(conf.encryption.keys.len(), 2);
    assert_eq!(conf.migration.chunk_size, 250);
    conf.validate().unwrap();

    let cipher = HmacEncrypter::from_config(&conf.encryption).unwrap();
    let blob = cipher.encrypt("secret").unwrap();
    assert!(blob.starts_with("k2:$b64:"));
}

#[test]
fn missing_sections_fall_back_to_defaults() {
    let conf = Config::from_toml(
        &format!("[encryption.keys]\nk1 = \"{KEY_A_HEX}\"\n"),
        "inline",
    )
    .unwrap();

    assert_eq!(conf.migration.chunk_size, DEFAULT_CHUNK_SIZE);
    assert_eq!(conf.encryption.current_key, "k1");
    assert_eq!(conf.encryption.kdf_iterations, 1);
    assert!(conf.database.key.is_none());
    conf.validate().unwrap();
}

#[test]
fn defaults_alone_are_not_runnable() {
    assert!(matches!(
        Config::default().validate(),
        Err(ConfigError::NoKeys)
    ));
}

#[test]
fn env_overrides_win_over_file() {
    let mut conf = Config::from_toml(&full_toml(), "inline").unwrap();
    let env: HashMap<&str, &str> = [
        (ENV_DB_PATH, "/tmp/other.db"),
        (ENV_DB_KEY, "from-env"),
        (ENV_CHUNK_SIZE, " 7 "),
    ]
    .into_iter()
    .collect();

    conf.apply_env_from(|name| env.get(name).map(|v| v.to_string()))
        .unwrap();

    assert_eq!(conf.database.path, Path::new("/tmp/other.db"));
    assert_eq!(conf.database.key.as_deref(), Some("from-env"));
    assert_eq!(conf.migration.chunk_size, 7);
}

#[test]
fn invalid_chunk_sizes_are_rejected() {
    let mut conf = Config::from_toml(&full_toml(), "inline").unwrap();
    let bad = conf.apply_env_from(|name| (name == ENV_CHUNK_SIZE).then(|| "lots".to_string()));
    assert!(matches!(bad, Err(ConfigError::InvalidValue { .. })));

    conf.migration.chunk_size = 0;
    assert!(matches!(
        conf.validate(),
        Err(ConfigError::InvalidValue { name, .. }) if name == "migration.chunk_size"
    ));
}

#[test]
fn load_from_reports_io_and_parse_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.toml");
    assert!(matches!(
        config::load_from(&missing),
        Err(ConfigError::Read { .. })
    ));

    let broken = dir.path().join("broken.toml");
    std::fs::write(&broken, "[migration\nchunk_size = ").unwrap();
    assert!(matches!(
        config::load_from(&broken),
        Err(ConfigError::Parse { .. })
    ));

    let good = dir.path().join("good.toml");
    std::fs::write(&good, full_toml()).unwrap();
    assert_eq!(config::load_from(&good).unwrap().migration.chunk_size, 250);
}

#[test]
fn debug_output_redacts_secrets() {
    let conf = Config::from_toml(&full_toml(), "inline").unwrap();
    let dbg = format!("{conf:?}");
    assert!(dbg.contains("k2"));
    assert!(!dbg.contains("db-passphrase"));
    assert!(!dbg.contains(KEY_A_HEX));
}

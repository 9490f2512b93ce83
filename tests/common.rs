// tests/common.rs
//! Shared test utilities: logging setup, fixtures and fakes
#![allow(dead_code)] // Each test binary uses a different subset

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io;

use hmac_secret_migrate::config::{DatabaseConfig, EncryptionConfig};
use hmac_secret_migrate::crypto::keyring::decode_key;
use hmac_secret_migrate::{
    CipherError, HmacEncrypter, Identity, IdentityCursor, IdentityStore, IdentityType, Keyring,
    Outcome, Page, Reporter, SecretCipher, SqliteIdentityStore, StoreError,
};
use tempfile::TempDir;

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const KEY_A_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";
pub const KEY_B_HEX: &str = "c0ffeec0ffeec0ffeec0ffeec0ffeec0ffeec0ffeec0ffeec0ffeec0ffee0101";

/// Initialize test-friendly logging
/// Call once at the start of any test that needs logs
pub fn setup() {
    #[cfg(feature = "logging")]
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer()) // works in `cargo test`
        .with(EnvFilter::from_default_env()) // respects RUST_LOG=
        .try_init()
        .ok(); // idempotent: safe to call multiple times

    #[cfg(not(feature = "logging"))]
    { /* no-op */ }
}

/// Cipher whose only (and current) key is `k1` = key A
pub fn encrypter() -> HmacEncrypter {
    encrypter_with(&[("k1", KEY_A_HEX)], "k1")
}

pub fn encrypter_with(keys: &[(&str, &str)], current: &str) -> HmacEncrypter {
    HmacEncrypter::from_config(&encryption_config(keys, current)).expect("valid test keys")
}

pub fn encryption_config(keys: &[(&str, &str)], current: &str) -> EncryptionConfig {
    EncryptionConfig {
        current_key: current.to_owned(),
        kdf_iterations: 1,
        keys: keys
            .iter()
            .map(|(n, k)| (n.to_string(), k.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

pub fn keyring_single(name: &str, hex: &str) -> Keyring {
    Keyring::single(name, decode_key(name, hex).unwrap()).unwrap()
}

/// What a reporter saw, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seen {
    Skipped(i64),
    Transformed(i64),
    Failed(i64, String),
}

#[derive(Default)]
pub struct RecordingReporter {
    pub seen: Vec<Seen>,
    pub lines: Vec<String>,
}

impl RecordingReporter {
    pub fn ids(&self) -> Vec<i64> {
        self.seen
            .iter()
            .map(|s| match s {
                Seen::Skipped(id) | Seen::Transformed(id) | Seen::Failed(id, _) => *id,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<i64> {
        self.seen
            .iter()
            .filter_map(|s| match s {
                Seen::Failed(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&mut self, outcome: &Outcome) {
        self.lines.push(outcome.to_string());
        self.seen.push(match outcome {
            Outcome::Skipped { id, .. } => Seen::Skipped(*id),
            Outcome::Transformed { id, .. } => Seen::Transformed(*id),
            Outcome::Failed { id, error } => Seen::Failed(*id, error.to_string()),
        });
    }
}

/// SQLite identity database in a throwaway directory
pub struct TestDb {
    pub dir: TempDir,
    pub config: DatabaseConfig,
    pub store: SqliteIdentityStore,
}

impl TestDb {
    pub fn new() -> Self {
        Self::with_key(None)
    }

    pub fn with_key(key: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DatabaseConfig {
            path: dir.path().join("data").join("identities.db"),
            key: key.map(str::to_owned),
        };
        let store = SqliteIdentityStore::create(&config).expect("create identity db");
        Self { dir, config, store }
    }

    pub fn add_hmac(&self, secret: &str) -> i64 {
        self.add(IdentityType::HmacSha256, secret)
    }

    pub fn add(&self, kind: IdentityType, secret: &str) -> i64 {
        self.store
            .insert(1, kind, Some("test"), secret)
            .expect("insert identity")
    }

    pub fn secret(&self, id: i64) -> String {
        self.store
            .find(id)
            .expect("find identity")
            .expect("identity exists")
            .secret
    }

    pub fn kind(&self, id: i64) -> IdentityType {
        self.store.find(id).unwrap().unwrap().kind
    }
}

/// In-memory store that records every fetch and save
#[derive(Default)]
pub struct MemoryStore {
    pub rows: RefCell<Vec<Identity>>,
    pub fetched: RefCell<Vec<(i64, IdentityType)>>,
    pub pages_served: Cell<usize>,
    pub saves: Cell<usize>,
    pub fail_save_for: Option<i64>,
    pub fail_fetch_on_page: Option<usize>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<(i64, IdentityType, &str)>) -> Self {
        let rows = rows
            .into_iter()
            .map(|(id, kind, secret)| Identity {
                id,
                user_id: 1,
                kind,
                name: None,
                secret: secret.to_owned(),
            })
            .collect();
        Self {
            rows: RefCell::new(rows),
            ..Self::default()
        }
    }

    pub fn secret(&self, id: i64) -> String {
        self.rows
            .borrow()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.secret.clone())
            .expect("row exists")
    }
}

impl IdentityStore for MemoryStore {
    fn fetch_page(&self, cursor: &mut IdentityCursor, size: usize) -> Result<Page, StoreError> {
        let page_no = self.pages_served.get() + 1;
        if self.fail_fetch_on_page == Some(page_no) {
            return Err(StoreError::Io(io::Error::other("connection lost")));
        }
        self.pages_served.set(page_no);

        let mut matching: Vec<Identity> = self
            .rows
            .borrow()
            .iter()
            .filter(|r| r.kind == cursor.kind && cursor.after_id.map_or(true, |a| r.id > a))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.id);

        let has_more = matching.len() > size;
        matching.truncate(size);
        self.fetched
            .borrow_mut()
            .extend(matching.iter().map(|r| (r.id, r.kind)));

        let page = Page {
            identities: matching,
            has_more,
        };
        cursor.advance(&page);
        Ok(page)
    }

    fn save(&self, identity: &Identity) -> Result<(), StoreError> {
        if self.fail_save_for == Some(identity.id) {
            return Err(StoreError::Io(io::Error::other("disk full")));
        }
        let mut rows = self.rows.borrow_mut();
        let row = rows
            .iter_mut()
            .find(|r| r.id == identity.id && r.kind == identity.kind)
            .ok_or(StoreError::NotFound(identity.id))?;
        row.secret = identity.secret.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Wraps a real cipher and fails `encrypt` for one poisoned plaintext
pub struct PoisonedCipher<C> {
    pub inner: C,
    pub poison: &'static str,
}

impl<C: SecretCipher> SecretCipher for PoisonedCipher<C> {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        if plaintext == self.poison {
            return Err(CipherError::Malformed("poisoned plaintext"));
        }
        self.inner.encrypt(plaintext)
    }

    fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        self.inner.decrypt(blob)
    }

    fn is_encrypted(&self, value: &str) -> bool {
        self.inner.is_encrypted(value)
    }

    fn is_encrypted_with_current_key(&self, value: &str) -> bool {
        self.inner.is_encrypted_with_current_key(value)
    }
}

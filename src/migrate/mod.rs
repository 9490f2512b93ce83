//! Chunked migration driver: the core of hmac-secret-migrate
//!
//! Walks HMAC identities page by page in id order and moves each secret
//! to the requested state exactly once. Per record:
//!
//! ```text
//! FETCHED -> SKIPPED      already in the target state, nothing written
//!         -> TRANSFORMED  cipher applied, record saved
//!         -> FAILED       cipher error reported, record untouched
//! ```
//!
//! Cipher errors stay with their record in every direction. Store errors
//! end the run: continuing without durable writes would lose work silently.

pub mod report;

pub use report::{ConsoleReporter, Outcome, Reporter, RunSummary, SkipReason};

use tracing::{debug, info, info_span, trace, warn};

use crate::consts::DEFAULT_CHUNK_SIZE;
use crate::crypto::SecretCipher;
use crate::enums::{Direction, IdentityType};
use crate::error::{ConfigError, MigrateError, StoreError};
use crate::store::{Identity, IdentityStore};

pub struct Migrator<S, C> {
    store: S,
    cipher: C,
    chunk_size: usize,
}

impl<S: IdentityStore, C: SecretCipher> Migrator<S, C> {
    pub fn new(store: S, cipher: C) -> Self {
        Self {
            store,
            cipher,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                name: "chunk_size",
                reason: "must be greater than zero".into(),
            });
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn run_encrypt(&self, reporter: &mut dyn Reporter) -> Result<RunSummary, MigrateError> {
        self.run(Direction::Encrypt, reporter)
    }

    pub fn run_decrypt(&self, reporter: &mut dyn Reporter) -> Result<RunSummary, MigrateError> {
        self.run(Direction::Decrypt, reporter)
    }

    pub fn run_reencrypt(&self, reporter: &mut dyn Reporter) -> Result<RunSummary, MigrateError> {
        self.run(Direction::Reencrypt, reporter)
    }

    /// Process every HMAC identity once, holding one page in memory at a time
    pub fn run(
        &self,
        direction: Direction,
        reporter: &mut dyn Reporter,
    ) -> Result<RunSummary, MigrateError> {
        let span = info_span!("migration", %direction, chunk_size = self.chunk_size);
        let _enter = span.enter();

        let mut summary = RunSummary::start(direction);
        let mut cursor = self.store.query(IdentityType::HmacSha256);

        while !cursor.is_exhausted() {
            let page = self.store.fetch_page(&mut cursor, self.chunk_size)?;
            if page.is_empty() {
                break;
            }
            summary.pages += 1;
            debug!(page = summary.pages, records = page.len(), "processing page");

            for identity in page.identities {
                let outcome = process_identity(identity, direction, &self.cipher, &self.store)?;
                match &outcome {
                    Outcome::Failed { id, error } => warn!(id, %error, "record failed"),
                    other => trace!(id = other.id(), "{other}"),
                }
                summary.record(&outcome);
                reporter.report(&outcome);
            }
        }

        summary.finish();
        info!(
            transformed = summary.transformed,
            skipped = summary.skipped,
            failed = summary.failed,
            pages = summary.pages,
            "migration finished"
        );
        Ok(summary)
    }
}

/// Decide whether a secret already sits in the state `direction` targets
pub fn skip_reason<C: SecretCipher + ?Sized>(
    direction: Direction,
    cipher: &C,
    secret: &str,
) -> Option<SkipReason> {
    match direction {
        Direction::Encrypt if cipher.is_encrypted(secret) => Some(SkipReason::AlreadyEncrypted),
        Direction::Decrypt | Direction::Reencrypt if !cipher.is_encrypted(secret) => {
            Some(SkipReason::NotEncrypted)
        }
        Direction::Reencrypt if cipher.is_encrypted_with_current_key(secret) => {
            Some(SkipReason::AlreadyCurrentKey)
        }
        _ => None,
    }
}

/// Classify, transform and save one identity
///
/// Only a failed `save` is returned as an error; cipher failures come back
/// as [`Outcome::Failed`] with the record left as it was.
pub fn process_identity<S, C>(
    mut identity: Identity,
    direction: Direction,
    cipher: &C,
    store: &S,
) -> Result<Outcome, StoreError>
where
    S: IdentityStore + ?Sized,
    C: SecretCipher + ?Sized,
{
    let id = identity.id;
    if let Some(reason) = skip_reason(direction, cipher, &identity.secret) {
        return Ok(Outcome::Skipped { id, reason });
    }

    let transformed = match direction {
        Direction::Encrypt => cipher.encrypt(&identity.secret),
        Direction::Decrypt => cipher.decrypt(&identity.secret),
        Direction::Reencrypt => cipher
            .decrypt(&identity.secret)
            .and_then(|plain| cipher.encrypt(&plain)),
    };

    match transformed {
        Ok(secret) => {
            identity.secret = secret;
            store.save(&identity)?;
            Ok(Outcome::Transformed { id, direction })
        }
        Err(error) => Ok(Outcome::Failed { id, error }),
    }
}

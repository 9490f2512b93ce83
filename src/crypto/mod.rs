//! Secret cipher: encrypt, decrypt and detect encrypted HMAC secrets
//!
//! Everything here works on in-memory strings; no database access.
//! Blobs are AES-Crypt v3 streams, base64-encoded and prefixed with the
//! name of the key that produced them (see [`blob`]).

pub mod blob;
pub mod encrypter;
pub mod keyring;

pub use blob::is_encrypted;
pub use encrypter::HmacEncrypter;
pub use keyring::Keyring;

use crate::error::CipherError;

/// Symmetric cipher for identity secrets
///
/// `is_encrypted` is the idempotency gate of the migration: it must be
/// true for everything `encrypt` returns and must not need a decrypt.
pub trait SecretCipher {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError>;

    fn decrypt(&self, blob: &str) -> Result<String, CipherError>;

    fn is_encrypted(&self, value: &str) -> bool;

    /// Encrypted *and* under the key `encrypt` currently uses
    fn is_encrypted_with_current_key(&self, value: &str) -> bool {
        self.is_encrypted(value)
    }
}

impl<C: SecretCipher + ?Sized> SecretCipher for &C {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        (**self).decrypt(blob)
    }

    fn is_encrypted(&self, value: &str) -> bool {
        (**self).is_encrypted(value)
    }

    fn is_encrypted_with_current_key(&self, value: &str) -> bool {
        (**self).is_encrypted_with_current_key(value)
    }
}

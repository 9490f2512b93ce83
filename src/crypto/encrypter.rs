//! AES-Crypt v3 backed cipher for HMAC secret keys

use std::io::Cursor;

use aescrypt_rs::aliases::Password;
use aescrypt_rs::{decrypt, encrypt};
use tracing::debug;

use super::blob;
use super::keyring::Keyring;
use super::SecretCipher;
use crate::aliases::{SecretKey32, SecureConversionsExt};
use crate::config::EncryptionConfig;
use crate::consts::SECRET_KDF_ITERATIONS;
use crate::error::{CipherError, ConfigError};

#[derive(Debug)]
pub struct HmacEncrypter {
    keyring: Keyring,
    kdf_iterations: u32,
}

impl HmacEncrypter {
    pub fn new(keyring: Keyring) -> Self {
        Self {
            keyring,
            kdf_iterations: SECRET_KDF_ITERATIONS,
        }
    }

    pub fn with_kdf_iterations(mut self, iterations: u32) -> Self {
        self.kdf_iterations = iterations;
        self
    }

    /// Build the keyring from config: any key problem is a setup error
    pub fn from_config(config: &EncryptionConfig) -> Result<Self, ConfigError> {
        if config.kdf_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                name: "encryption.kdf_iterations",
                reason: "must be at least 1".into(),
            });
        }
        let keyring = Keyring::from_encoded(&config.keys, &config.current_key)?;
        for (name, fingerprint) in keyring.fingerprints() {
            debug!(key = %name, %fingerprint, "loaded encryption key");
        }
        Ok(Self::new(keyring).with_kdf_iterations(config.kdf_iterations))
    }

    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    fn password(key: &SecretKey32) -> Password {
        Password::new(key.expose_secret().to_hex())
    }
}

impl SecretCipher for HmacEncrypter {
    fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let (name, key) = self.keyring.current();
        let mut out = Vec::new();
        encrypt(
            Cursor::new(plaintext.as_bytes()),
            &mut out,
            &Self::password(key),
            self.kdf_iterations,
        )
        .map_err(CipherError::Encryption)?;
        Ok(blob::format(name, &out))
    }

    fn decrypt(&self, value: &str) -> Result<String, CipherError> {
        let parts = blob::split(value).ok_or(CipherError::Malformed("missing key prefix"))?;
        let key = self
            .keyring
            .get(parts.key_name)
            .ok_or_else(|| CipherError::UnknownKey(parts.key_name.to_owned()))?;
        let ciphertext = parts.ciphertext()?;

        let mut out = Vec::new();
        decrypt(Cursor::new(ciphertext), &mut out, &Self::password(key))
            .map_err(CipherError::Decryption)?;
        String::from_utf8(out).map_err(|_| CipherError::InvalidUtf8)
    }

    fn is_encrypted(&self, value: &str) -> bool {
        blob::is_encrypted(value)
    }

    fn is_encrypted_with_current_key(&self, value: &str) -> bool {
        blob::split(value).is_some_and(|parts| parts.key_name == self.keyring.current_name())
    }
}

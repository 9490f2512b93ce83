//! Named 256-bit keys for HMAC secret encryption
//!
//! One key is *current* and used for every new blob; the others stay
//! around so blobs written before a rotation can still be decrypted.

use std::collections::BTreeMap;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::blob::is_valid_key_name;
use crate::aliases::SecretKey32;
use crate::consts::{FINGERPRINT_LEN_HEX, KEY_LEN};
use crate::error::ConfigError;

pub struct Keyring {
    current_name: String,
    current_key: SecretKey32,
    previous: BTreeMap<String, SecretKey32>,
}

impl Keyring {
    /// Keyring holding a single key, which is also current
    pub fn single(name: &str, key: SecretKey32) -> Result<Self, ConfigError> {
        if !is_valid_key_name(name) {
            return Err(ConfigError::InvalidKeyName(name.to_owned()));
        }
        Ok(Self {
            current_name: name.to_owned(),
            current_key: key,
            previous: BTreeMap::new(),
        })
    }

    /// Build from config-style encoded keys (`<hex>`, `hex:<hex>` or `base64:<b64>`)
    pub fn from_encoded(keys: &BTreeMap<String, String>, current: &str) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(ConfigError::NoKeys);
        }

        let mut decoded = BTreeMap::new();
        for (name, encoded) in keys {
            if !is_valid_key_name(name) {
                return Err(ConfigError::InvalidKeyName(name.clone()));
            }
            decoded.insert(name.clone(), decode_key(name, encoded)?);
        }

        let current_key = decoded
            .remove(current)
            .ok_or_else(|| ConfigError::UnknownCurrentKey(current.to_owned()))?;

        Ok(Self {
            current_name: current.to_owned(),
            current_key,
            previous: decoded,
        })
    }

    /// Add an older key kept for decryption only
    pub fn with_previous(mut self, name: &str, key: SecretKey32) -> Result<Self, ConfigError> {
        if !is_valid_key_name(name) || name == self.current_name {
            return Err(ConfigError::InvalidKeyName(name.to_owned()));
        }
        self.previous.insert(name.to_owned(), key);
        Ok(self)
    }

    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    pub fn current(&self) -> (&str, &SecretKey32) {
        (&self.current_name, &self.current_key)
    }

    pub fn get(&self, name: &str) -> Option<&SecretKey32> {
        if name == self.current_name {
            Some(&self.current_key)
        } else {
            self.previous.get(name)
        }
    }

    pub fn len(&self) -> usize {
        self.previous.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// `(name, fingerprint)` for every key, current first: safe to log
    pub fn fingerprints(&self) -> Vec<(String, String)> {
        std::iter::once((self.current_name.as_str(), &self.current_key))
            .chain(self.previous.iter().map(|(n, k)| (n.as_str(), k)))
            .map(|(name, key)| (name.to_owned(), key_fingerprint(key)))
            .collect()
    }
}

impl fmt::Debug for Keyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyring")
            .field("current", &self.current_name)
            .field("previous", &self.previous.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Truncated BLAKE3 of the raw key: identifies a key in logs without exposing it
pub fn key_fingerprint(key: &SecretKey32) -> String {
    let mut hex = blake3::hash(key.expose_secret()).to_hex().to_string();
    hex.truncate(FINGERPRINT_LEN_HEX);
    hex
}

/// Decode one configured key into a fixed 32-byte secret
pub fn decode_key(name: &str, encoded: &str) -> Result<SecretKey32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidKey {
        name: name.to_owned(),
        reason,
    };

    let encoded = encoded.trim();
    let bytes = match encoded.strip_prefix("base64:") {
        Some(b64) => STANDARD
            .decode(b64)
            .map_err(|e| invalid(format!("bad base64: {e}")))?,
        None => {
            let hex_str = encoded.strip_prefix("hex:").unwrap_or(encoded);
            hex::decode(hex_str).map_err(|e| invalid(format!("bad hex: {e}")))?
        }
    };

    let raw: [u8; KEY_LEN] = bytes
        .try_into()
        .map_err(|v: Vec<u8>| invalid(format!("expected {KEY_LEN} bytes, got {}", v.len())))?;
    Ok(SecretKey32::new(raw))
}

//! Public enum types used throughout the crate
//!
//! Closed sets that replace stringly-typed discriminators: identity
//! kinds as stored in the database and the migration direction an
//! operator asks for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::HMAC_IDENTITY_TYPE;
use crate::error::{MigrateError, StoreError};

/// Kind of a stored identity (`auth_identities.type`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentityType {
    EmailPassword,
    MagicLink,
    AccessToken,
    HmacSha256,
    Email2fa,
    EmailActivate,
}

impl IdentityType {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityType::EmailPassword => "email_password",
            IdentityType::MagicLink => "magic-link",
            IdentityType::AccessToken => "access_token",
            IdentityType::HmacSha256 => HMAC_IDENTITY_TYPE,
            IdentityType::Email2fa => "email_2fa",
            IdentityType::EmailActivate => "email_activate",
        }
    }
}

impl fmt::Display for IdentityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentityType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email_password" => Ok(IdentityType::EmailPassword),
            "magic-link" => Ok(IdentityType::MagicLink),
            "access_token" => Ok(IdentityType::AccessToken),
            HMAC_IDENTITY_TYPE => Ok(IdentityType::HmacSha256),
            "email_2fa" => Ok(IdentityType::Email2fa),
            "email_activate" => Ok(IdentityType::EmailActivate),
            other => Err(StoreError::UnknownIdentityType(other.to_owned())),
        }
    }
}

/// What a migration run does to each HMAC secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Plaintext → encrypted blob
    Encrypt,
    /// Encrypted blob → plaintext
    Decrypt,
    /// Blob under an older key → blob under the current key
    Reencrypt,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Encrypt => "encrypt",
            Direction::Decrypt => "decrypt",
            Direction::Reencrypt => "reencrypt",
        }
    }

    /// Past-tense verb used in per-record success lines
    pub fn past_tense(self) -> &'static str {
        match self {
            Direction::Encrypt => "encrypted",
            Direction::Decrypt => "decrypted",
            Direction::Reencrypt => "re-encrypted",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "encrypt" => Ok(Direction::Encrypt),
            "decrypt" => Ok(Direction::Decrypt),
            "reencrypt" => Ok(Direction::Reencrypt),
            other => Err(MigrateError::InvalidInput(format!(
                "Unrecognized command: {other:?} (expected encrypt, decrypt or reencrypt)"
            ))),
        }
    }
}

//! Textual blob format: `<key-name>:$b64:<base64 AES-Crypt v3 stream>`
//!
//! Detection only looks at the prefix, so it costs at most the length of
//! the key name. A plaintext secret that happens to start with
//! `word:$b64:` is misclassified as encrypted; generated HMAC secrets
//! never contain `$`, so this is accepted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::consts::{AESCRYPT_V3_HEADER, BLOB_MARKER};
use crate::error::CipherError;

/// Borrowed view of a structurally valid blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlobParts<'a> {
    pub key_name: &'a str,
    pub payload: &'a str,
}

impl<'a> BlobParts<'a> {
    /// Decode the payload and check it is an AES-Crypt v3 stream
    pub fn ciphertext(&self) -> Result<Vec<u8>, CipherError> {
        let bytes = STANDARD
            .decode(self.payload)
            .map_err(|_| CipherError::Malformed("payload is not valid base64"))?;
        if !bytes.starts_with(AESCRYPT_V3_HEADER) {
            return Err(CipherError::Malformed("payload is not an AES-Crypt v3 stream"));
        }
        Ok(bytes)
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Key names are restricted to `[A-Za-z0-9_]+` so the prefix stays unambiguous
pub fn is_valid_key_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_word_byte)
}

/// Split a value into key name and payload if it carries the blob prefix
pub fn split(value: &str) -> Option<BlobParts<'_>> {
    let name_len = value.bytes().take_while(|&b| is_word_byte(b)).count();
    if name_len == 0 {
        return None;
    }
    let rest = value[name_len..].strip_prefix(':')?;
    let payload = rest.strip_prefix(BLOB_MARKER)?;
    Some(BlobParts {
        key_name: &value[..name_len],
        payload,
    })
}

/// Cheap structural check: never attempts a decrypt
pub fn is_encrypted(value: &str) -> bool {
    split(value).is_some()
}

/// Assemble a blob from a key name and raw AES-Crypt output
pub fn format(key_name: &str, ciphertext: &[u8]) -> String {
    format!("{key_name}:{BLOB_MARKER}{}", STANDARD.encode(ciphertext))
}

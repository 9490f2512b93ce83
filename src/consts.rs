//! Shared constants: identity discriminators, blob format and defaults

/// Discriminator stored in `auth_identities.type` for HMAC-SHA256 credentials
pub const HMAC_IDENTITY_TYPE: &str = "hmac_sha256";

/// Default number of identities fetched per page
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Marker separating the key name from the encoded ciphertext: `<key>:$b64:<base64>`
pub const BLOB_MARKER: &str = "$b64:";

/// PBKDF2 iterations for the AES-Crypt v3 stream
// Keys are random 256-bit values, so stretching buys nothing
pub const SECRET_KDF_ITERATIONS: u32 = 1;

/// Header magic for AES-Crypt v3 streams
pub const AESCRYPT_V3_HEADER: &[u8; 5] = b"AES\x03\x00";

/// Raw key length in bytes (AES-256)
pub const KEY_LEN: usize = 32;

/// Hex characters shown when logging a key fingerprint
pub const FINGERPRINT_LEN_HEX: usize = 12;

/// Recommended KDF iterations when the identity database is SQLCipher-encrypted
pub const DB_KDF_ITERATIONS: u32 = 256_000;

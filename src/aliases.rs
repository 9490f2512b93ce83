//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical secret holders used by the cipher.

pub use secure_gate::{fixed_alias, SecureConversionsExt};

// Fixed-size secrets
fixed_alias!(SecretKey32, 32); // 256-bit AES-Crypt v3 key for HMAC secrets

//! Secret key handling.

use std::fmt;

use secrecy::{ExposeSecret, Secret};

/// Key length the legacy policy forces every key to.
pub const LEGACY_KEY_LEN: usize = 16;

/// How a caller-supplied key is turned into key-schedule input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Use the key bytes as given.
    #[default]
    Native,
    /// Zero-pad or truncate to 16 bytes, for ciphertext compatible with
    /// systems that fix the key size.
    Legacy16,
}

/// Raw key bytes. Wiped on drop and never printed.
pub struct SecretKey(Secret<Vec<u8>>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        SecretKey(Secret::new(bytes.into()))
    }

    /// Builds a key from `bytes` after applying `policy`.
    pub fn with_policy(bytes: &[u8], policy: KeyPolicy) -> Self {
        match policy {
            KeyPolicy::Native => SecretKey::new(bytes),
            KeyPolicy::Legacy16 => {
                let mut fitted = vec![0u8; LEGACY_KEY_LEN];
                let n = bytes.len().min(LEGACY_KEY_LEN);
                fitted[..n].copy_from_slice(&bytes[..n]);
                SecretKey::new(fitted)
            }
        }
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for SecretKey {
    fn from(s: &str) -> Self {
        SecretKey::new(s.as_bytes())
    }
}

impl From<&[u8]> for SecretKey {
    fn from(b: &[u8]) -> Self {
        SecretKey::new(b)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED; {} bytes])", self.len())
    }
}

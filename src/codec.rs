//! Text boundary: base64 ciphertext and a shareable, re-keyable cipher handle.

use std::sync::{Arc, PoisonError, RwLock};

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use log::info;

use crate::blowfast::Blowfish;
use crate::error::CipherError;
use crate::key::{KeyPolicy, SecretKey};
use crate::mode::{Mode, ModeDriver};

/// Encrypts `plaintext` with Blowfish/ECB/PKCS#5 and returns standard base64.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<String, CipherError> {
    let cipher = Blowfish::new(key)?;
    let ciphertext = ModeDriver::new(&cipher, Mode::Ecb).encrypt(plaintext);
    Ok(B64.encode(ciphertext))
}

/// Inverse of [`encrypt`].
pub fn decrypt(key: &[u8], ciphertext: &str) -> Result<Vec<u8>, CipherError> {
    let cipher = Blowfish::new(key)?;
    let raw = B64.decode(ciphertext.trim())?;
    ModeDriver::new(&cipher, Mode::Ecb).decrypt(&raw)
}

/// A keyed Blowfish instance plus a mode, safe to share between threads.
///
/// Encryption and decryption clone the current `Arc<Blowfish>` and run without
/// holding the lock; [`rotate`](Self::rotate) schedules the new key first and
/// then swaps the reference, so calls already running finish on the old key.
pub struct Codec {
    cipher: RwLock<Arc<Blowfish>>,
    mode: Mode,
    policy: KeyPolicy,
}

impl Codec {
    pub fn new(key: &SecretKey, mode: Mode) -> Result<Self, CipherError> {
        Self::with_policy(key, mode, KeyPolicy::Native)
    }

    /// Builds a codec whose keys (initial and rotated) pass through `policy` first.
    pub fn with_policy(key: &SecretKey, mode: Mode, policy: KeyPolicy) -> Result<Self, CipherError> {
        let cipher = Self::schedule(key, policy)?;
        Ok(Codec {
            cipher: RwLock::new(Arc::new(cipher)),
            mode,
            policy,
        })
    }

    fn schedule(key: &SecretKey, policy: KeyPolicy) -> Result<Blowfish, CipherError> {
        let fitted = SecretKey::with_policy(key.expose_secret(), policy);
        Blowfish::new(fitted.expose_secret())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The key schedule new operations will use.
    pub fn cipher(&self) -> Arc<Blowfish> {
        Arc::clone(&self.cipher.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Replaces the key. On error the previous key stays in place.
    pub fn rotate(&self, key: &SecretKey) -> Result<(), CipherError> {
        let next = Arc::new(Self::schedule(key, self.policy)?);
        *self.cipher.write().unwrap_or_else(PoisonError::into_inner) = next;
        info!("codec key rotated ({} mode)", self.mode);
        Ok(())
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        let cipher = self.cipher();
        ModeDriver::new(cipher.as_ref(), self.mode).encrypt(plaintext)
    }

    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let cipher = self.cipher();
        ModeDriver::new(cipher.as_ref(), self.mode).decrypt(ciphertext)
    }

    pub fn encrypt_base64(&self, plaintext: &[u8]) -> String {
        B64.encode(self.encrypt(plaintext))
    }

    pub fn decrypt_base64(&self, ciphertext: &str) -> Result<Vec<u8>, CipherError> {
        let raw = B64.decode(ciphertext.trim())?;
        self.decrypt(&raw)
    }
}

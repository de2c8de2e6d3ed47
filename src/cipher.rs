//! The block cipher interface consumed by padding, modes and the harness.

use crate::error::CipherError;

/// A keyed block cipher operating in place on fixed-size blocks.
///
/// Implementors are immutable once keyed, so a single instance may be shared
/// across threads and used by concurrent calls on independent buffers.
pub trait BlockCipher: Send + Sync + Sized {
    /// Human readable algorithm name, used in reports.
    const NAME: &'static str;
    /// Block size in bytes.
    const BLOCK_SIZE: usize;

    /// Runs the key schedule for `key`.
    fn with_key(key: &[u8]) -> Result<Self, CipherError>;

    /// Encrypts exactly one block in place.
    ///
    /// # Panics
    /// Panics if `block.len() != Self::BLOCK_SIZE`.
    fn encrypt_block(&self, block: &mut [u8]);

    /// Decrypts exactly one block in place.
    ///
    /// # Panics
    /// Panics if `block.len() != Self::BLOCK_SIZE`.
    fn decrypt_block(&self, block: &mut [u8]);

    /// Encrypts every block of `data` independently, in place.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of `Self::BLOCK_SIZE`.
    fn encrypt_blocks(&self, data: &mut [u8]) {
        assert!(data.len().is_multiple_of(Self::BLOCK_SIZE));
        data.chunks_exact_mut(Self::BLOCK_SIZE)
            .for_each(|b| self.encrypt_block(b));
    }

    /// Decrypts every block of `data` independently, in place.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of `Self::BLOCK_SIZE`.
    fn decrypt_blocks(&self, data: &mut [u8]) {
        assert!(data.len().is_multiple_of(Self::BLOCK_SIZE));
        data.chunks_exact_mut(Self::BLOCK_SIZE)
            .for_each(|b| self.decrypt_block(b));
    }
}

//! PKCS#5/PKCS#7 padding.
//!
//! Padding is always present: an already aligned message gains a whole block of
//! value `block_size`, so removal is never ambiguous.

use crate::error::CipherError;

/// Returns `message` followed by `n` bytes of value `n`, `n = block_size - len % block_size`.
pub fn pad(message: &[u8], block_size: usize) -> Vec<u8> {
    debug_assert!((1..=255).contains(&block_size));
    let n = block_size - message.len() % block_size;
    let mut out = Vec::with_capacity(message.len() + n);
    out.extend_from_slice(message);
    out.resize(message.len() + n, n as u8);
    out
}

/// Strips the padding added by [`pad`].
///
/// Fails with [`CipherError::InvalidPadding`] when the trailing byte is zero,
/// exceeds `block_size` or the buffer, or the padding bytes disagree.
pub fn unpad(padded: &[u8], block_size: usize) -> Result<&[u8], CipherError> {
    let &last = padded.last().ok_or(CipherError::InvalidPadding)?;
    let n = last as usize;
    if n == 0 || n > block_size || n > padded.len() {
        return Err(CipherError::InvalidPadding);
    }

    let (message, padding) = padded.split_at(padded.len() - n);
    if padding.iter().any(|&b| b != last) {
        return Err(CipherError::InvalidPadding);
    }
    Ok(message)
}

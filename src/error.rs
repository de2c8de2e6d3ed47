//! Error types for the blowfast library.

use thiserror::Error;

/// Errors produced by key scheduling, padding, modes and the text boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// Key is shorter or longer than the cipher accepts.
    #[error("key length {len} is outside the valid range [{min}, {max}] bytes")]
    InvalidKeyLength { len: usize, min: usize, max: usize },
    /// Trailing padding bytes are missing, zero, too large or inconsistent.
    #[error("invalid padding")]
    InvalidPadding,
    /// Ciphertext cannot be split into whole blocks (or is too short to hold one).
    #[error("ciphertext length {len} is not a positive multiple of {block_size} bytes")]
    InvalidCiphertextLength { len: usize, block_size: usize },
    /// An explicit initialization vector of the wrong size.
    #[error("initialization vector must be {expected} bytes, got {len}")]
    InvalidIv { len: usize, expected: usize },
    /// Malformed base64 at the text boundary.
    #[error("malformed base64 ciphertext: {0}")]
    Encoding(#[from] base64::DecodeError),
}

/// Errors produced by the benchmark harness.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error(transparent)]
    Cipher(#[from] CipherError),
    /// Decryption did not reproduce the generated plaintext.
    #[error("round trip mismatch for input size {size}")]
    RoundTripMismatch { size: usize },
    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
    #[error("no input sizes configured")]
    NoSizes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_key_length() {
        let err = CipherError::InvalidKeyLength {
            len: 57,
            min: 1,
            max: 56,
        };
        assert_eq!(
            format!("{}", err),
            "key length 57 is outside the valid range [1, 56] bytes"
        );
    }

    #[test]
    fn test_display_invalid_ciphertext_length() {
        let err = CipherError::InvalidCiphertextLength {
            len: 13,
            block_size: 8,
        };
        assert_eq!(
            format!("{}", err),
            "ciphertext length 13 is not a positive multiple of 8 bytes"
        );
    }

    #[test]
    fn test_encoding_from_decode_error() {
        let err: CipherError = base64::DecodeError::InvalidLength(3).into();
        assert!(matches!(err, CipherError::Encoding(_)));
    }

    #[test]
    fn test_bench_error_wraps_cipher_error() {
        let err: BenchError = CipherError::InvalidPadding.into();
        assert_eq!(format!("{}", err), "invalid padding");
    }
}

//! Modes of operation.
//!
//! Every mode pads its input, so ciphertext is always a whole number of blocks
//! and decryption always checks padding. CBC and CTR prepend the IV/nonce they
//! used as the first ciphertext block.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use thiserror::Error;

use crate::cipher::BlockCipher;
use crate::error::CipherError;
use crate::padding::{pad, unpad};

/// Selects how blocks are chained across a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Electronic codebook: blocks are independent. Equal plaintext blocks give
    /// equal ciphertext blocks; kept for compatibility.
    Ecb,
    /// Cipher block chaining with a fresh random IV per message.
    #[default]
    Cbc,
    /// Counter mode with a fresh random nonce per message.
    Ctr,
}

impl Mode {
    /// Whether ciphertext starts with an IV/nonce block.
    pub fn uses_iv(self) -> bool {
        !matches!(self, Mode::Ecb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Ecb => "ecb",
            Mode::Cbc => "cbc",
            Mode::Ctr => "ctr",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode `{0}` (expected ecb, cbc or ctr)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ecb" => Ok(Mode::Ecb),
            "cbc" => Ok(Mode::Cbc),
            "ctr" => Ok(Mode::Ctr),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

/// Chains block operations of a keyed cipher across whole messages.
pub struct ModeDriver<'c, C: BlockCipher> {
    cipher: &'c C,
    mode: Mode,
}

impl<'c, C: BlockCipher> ModeDriver<'c, C> {
    pub fn new(cipher: &'c C, mode: Mode) -> Self {
        ModeDriver { cipher, mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Pads and encrypts `message`. CBC and CTR draw a fresh IV from the thread RNG.
    pub fn encrypt(&self, message: &[u8]) -> Vec<u8> {
        let mut iv = vec![0u8; C::BLOCK_SIZE];
        if self.mode.uses_iv() {
            rand::rng().fill_bytes(&mut iv);
        }
        self.seal(message, &iv)
    }

    /// Like [`encrypt`](Self::encrypt) with a caller-chosen IV. ECB ignores `iv`.
    ///
    /// Reusing an IV across messages under one key leaks plaintext relations.
    pub fn encrypt_with_iv(&self, message: &[u8], iv: &[u8]) -> Result<Vec<u8>, CipherError> {
        if self.mode.uses_iv() && iv.len() != C::BLOCK_SIZE {
            return Err(CipherError::InvalidIv {
                len: iv.len(),
                expected: C::BLOCK_SIZE,
            });
        }
        Ok(self.seal(message, iv))
    }

    fn seal(&self, message: &[u8], iv: &[u8]) -> Vec<u8> {
        let bs = C::BLOCK_SIZE;
        let mut body = pad(message, bs);

        match self.mode {
            Mode::Ecb => {
                self.cipher.encrypt_blocks(&mut body);
                body
            }
            Mode::Cbc => {
                let mut prev = iv.to_vec();
                for block in body.chunks_exact_mut(bs) {
                    xor_in_place(block, &prev);
                    self.cipher.encrypt_block(block);
                    prev.copy_from_slice(block);
                }
                prepend(iv, body)
            }
            Mode::Ctr => {
                self.apply_keystream(&mut body, iv);
                prepend(iv, body)
            }
        }
    }

    /// Decrypts and unpads. Fails with [`CipherError::InvalidCiphertextLength`]
    /// if the input is not a whole number of blocks or holds no data block, and
    /// with [`CipherError::InvalidPadding`] if the recovered padding is corrupt.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CipherError> {
        let bs = C::BLOCK_SIZE;
        let min_len = if self.mode.uses_iv() { 2 * bs } else { bs };
        if !ciphertext.len().is_multiple_of(bs) || ciphertext.len() < min_len {
            return Err(CipherError::InvalidCiphertextLength {
                len: ciphertext.len(),
                block_size: bs,
            });
        }

        let mut body = match self.mode {
            Mode::Ecb => {
                let mut body = ciphertext.to_vec();
                self.cipher.decrypt_blocks(&mut body);
                body
            }
            Mode::Cbc => {
                let mut body = ciphertext[bs..].to_vec();
                self.cipher.decrypt_blocks(&mut body);
                // Block i is whitened by ciphertext block i, counting the IV as block 0.
                for (block, prev) in body
                    .chunks_exact_mut(bs)
                    .zip(ciphertext.chunks_exact(bs))
                {
                    xor_in_place(block, prev);
                }
                body
            }
            Mode::Ctr => {
                let (nonce, rest) = ciphertext.split_at(bs);
                let mut body = rest.to_vec();
                self.apply_keystream(&mut body, nonce);
                body
            }
        };

        let len = unpad(&body, bs)?.len();
        body.truncate(len);
        Ok(body)
    }

    /// XORs `data` with E(nonce + 0), E(nonce + 1), ... where the counter is the
    /// low 64 bits of the nonce, big-endian and wrapping.
    fn apply_keystream(&self, data: &mut [u8], nonce: &[u8]) {
        let bs = C::BLOCK_SIZE;
        let split = bs.saturating_sub(8);
        let mut low = [0u8; 8];
        low[8 - (bs - split)..].copy_from_slice(&nonce[split..]);
        let base = u64::from_be_bytes(low);

        let mut stream = Vec::with_capacity(data.len());
        for i in 0..(data.len() / bs) as u64 {
            let counter = base.wrapping_add(i).to_be_bytes();
            stream.extend_from_slice(&nonce[..split]);
            stream.extend_from_slice(&counter[8 - (bs - split)..]);
        }
        self.cipher.encrypt_blocks(&mut stream);
        xor_in_place(data, &stream);
    }
}

fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s);
}

fn prepend(iv: &[u8], body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(iv.len() + body.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&body);
    out
}

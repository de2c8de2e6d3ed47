use std::fmt;

use log::debug;
use rayon::prelude::*;
use zeroize::Zeroize;

use crate::cipher::BlockCipher;
use crate::consts::{P_INIT, S_INIT};
use crate::error::CipherError;

pub const BLOCK_SIZE: usize = 8;
pub const MIN_KEY_LEN: usize = 1;
pub const MAX_KEY_LEN: usize = 56;

const ROUNDS: usize = 16;
const P_LEN: usize = ROUNDS + 2;
const AUTO_PAR_THRESHOLD: usize = 32_768;

/// Must be power of 2; match statement implementation is limited to 64
const MAX_BLOCKS_PER_BATCH: usize = 64;

type SBoxes = [[u32; 256]; 4];

/// Scheduled Blowfish state: the 18-entry P-array and four 256-entry S-boxes.
///
/// Built once per key by [`Blowfish::new`] and immutable afterwards. Every
/// encrypt/decrypt method takes `&self`, so one instance can be shared behind an
/// `Arc` by any number of threads. The tables are wiped when the value drops.
#[derive(Clone)]
#[repr(C, align(64))]
pub struct Blowfish {
    s: SBoxes,
    p: [u32; P_LEN],
}

impl Blowfish {
    /// Runs the Blowfish key schedule.
    ///
    /// Fails with [`CipherError::InvalidKeyLength`] unless `key` is 1 to 56 bytes.
    pub fn new(key: &[u8]) -> Result<Self, CipherError> {
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key.len()) {
            return Err(CipherError::InvalidKeyLength {
                len: key.len(),
                min: MIN_KEY_LEN,
                max: MAX_KEY_LEN,
            });
        }

        let mut bf = Blowfish { s: S_INIT, p: P_INIT };
        bf.key_set(key);
        debug!("blowfish key schedule complete ({} byte key)", key.len());
        Ok(bf)
    }

    /// XOR the key into the P-array, then replace all 1042 table words with
    /// the output of 521 chained encryptions starting from the zero block.
    fn key_set(&mut self, key: &[u8]) {
        let mut cycle = key.iter().copied().cycle();
        for p in self.p.iter_mut() {
            let word = (&mut cycle)
                .take(4)
                .fold(0u32, |acc, b| (acc << 8) | u32::from(b));
            *p ^= word;
        }

        let (mut l, mut r) = (0u32, 0u32);
        for i in (0..P_LEN).step_by(2) {
            (l, r) = self.encrypt_pair(l, r);
            self.p[i] = l;
            self.p[i + 1] = r;
        }

        for sbox in 0..4 {
            for j in (0..256).step_by(2) {
                (l, r) = self.encrypt_pair(l, r);
                self.s[sbox][j] = l;
                self.s[sbox][j + 1] = r;
            }
        }
    }

    #[inline(always)]
    fn f(&self, x: u32) -> u32 {
        let s = &self.s;
        let [a, b, c, d] = x.to_be_bytes();
        (s[0][a as usize].wrapping_add(s[1][b as usize]) ^ s[2][c as usize])
            .wrapping_add(s[3][d as usize])
    }

    /// Encrypts one block given as its big-endian halves, returning the output halves.
    #[inline(always)]
    pub fn encrypt_pair(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for pair in self.p[..ROUNDS].chunks_exact(2) {
            l ^= pair[0];
            r ^= self.f(l);
            r ^= pair[1];
            l ^= self.f(r);
        }
        l ^= self.p[ROUNDS];
        r ^= self.p[ROUNDS + 1];
        (r, l)
    }

    /// Inverse of [`encrypt_pair`](Self::encrypt_pair): same rounds, P-array reversed.
    #[inline(always)]
    pub fn decrypt_pair(&self, mut l: u32, mut r: u32) -> (u32, u32) {
        for pair in self.p[2..].rchunks_exact(2) {
            l ^= pair[1];
            r ^= self.f(l);
            r ^= pair[0];
            l ^= self.f(r);
        }
        l ^= self.p[1];
        r ^= self.p[0];
        (r, l)
    }

    fn process_chunk<const B: usize, const DECRYPT: bool>(&self, chunk: &mut [u8]) {
        // This assertion allows the compiler to eliminate all bounds checks from the hot loop.
        assert!(chunk.len() == B * BLOCK_SIZE);

        let mut l = [0u32; B];
        let mut r = [0u32; B];

        for i in 0..B {
            let off = i * BLOCK_SIZE;
            l[i] = u32::from_be_bytes([chunk[off], chunk[off + 1], chunk[off + 2], chunk[off + 3]]);
            r[i] = u32::from_be_bytes([
                chunk[off + 4],
                chunk[off + 5],
                chunk[off + 6],
                chunk[off + 7],
            ]);
        }

        if DECRYPT {
            for pair in self.p[2..].rchunks_exact(2) {
                for i in 0..B {
                    l[i] ^= pair[1];
                    r[i] ^= self.f(l[i]);
                    r[i] ^= pair[0];
                    l[i] ^= self.f(r[i]);
                }
            }
            for i in 0..B {
                l[i] ^= self.p[1];
                r[i] ^= self.p[0];
            }
        } else {
            for pair in self.p[..ROUNDS].chunks_exact(2) {
                for i in 0..B {
                    l[i] ^= pair[0];
                    r[i] ^= self.f(l[i]);
                    r[i] ^= pair[1];
                    l[i] ^= self.f(r[i]);
                }
            }
            for i in 0..B {
                l[i] ^= self.p[ROUNDS];
                r[i] ^= self.p[ROUNDS + 1];
            }
        }

        for i in 0..B {
            let off = i * BLOCK_SIZE;
            chunk[off..off + 4].copy_from_slice(&r[i].to_be_bytes());
            chunk[off + 4..off + 8].copy_from_slice(&l[i].to_be_bytes());
        }
    }

    /// Encrypts one 8-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.process_chunk::<1, false>(block);
    }

    /// Decrypts one 8-byte block in place.
    pub fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.process_chunk::<1, true>(block);
    }

    /// Encrypts every block of `data` in place (ECB, no padding).
    ///
    /// Switches between serial and parallel processing based on input length (32 KB).
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn encrypt_blocks(&self, data: &mut [u8]) {
        self.dispatch_auto::<false>(data);
    }

    /// Decrypts every block of `data` in place (ECB, no padding).
    ///
    /// Switches between serial and parallel processing based on input length (32 KB).
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn decrypt_blocks(&self, data: &mut [u8]) {
        self.dispatch_auto::<true>(data);
    }

    /// Encrypts the provided data in-place on the calling thread.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn encrypt_blocks_serial(&self, data: &mut [u8]) {
        self.dispatch::<false, false>(data);
    }

    /// Decrypts the provided data in-place on the calling thread.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn decrypt_blocks_serial(&self, data: &mut [u8]) {
        self.dispatch::<true, false>(data);
    }

    /// Encrypts the provided data in-place in parallel.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn encrypt_blocks_par(&self, data: &mut [u8]) {
        self.dispatch::<false, true>(data);
    }

    /// Decrypts the provided data in-place in parallel.
    ///
    /// # Panics
    /// Panics if `data.len()` is not a multiple of 8.
    pub fn decrypt_blocks_par(&self, data: &mut [u8]) {
        self.dispatch::<true, true>(data);
    }

    fn dispatch_auto<const DECRYPT: bool>(&self, data: &mut [u8]) {
        if data.len() >= AUTO_PAR_THRESHOLD && rayon::current_num_threads() > 1 {
            self.dispatch::<DECRYPT, true>(data);
        } else {
            self.dispatch::<DECRYPT, false>(data);
        }
    }

    fn dispatch<const DECRYPT: bool, const PAR: bool>(&self, data: &mut [u8]) {
        let len = data.len();

        assert!(len.is_multiple_of(BLOCK_SIZE));
        if len == 0 {
            return;
        }

        let blocks = len / BLOCK_SIZE;
        let prev_pow_2 = std::cmp::min(1usize << blocks.ilog2(), MAX_BLOCKS_PER_BATCH);

        match prev_pow_2.ilog2() {
            0 => self.process::<1, DECRYPT, PAR>(data),
            1 => self.process::<2, DECRYPT, PAR>(data),
            2 => self.process::<4, DECRYPT, PAR>(data),
            3 => self.process::<8, DECRYPT, PAR>(data),
            4 => self.process::<16, DECRYPT, PAR>(data),
            5 => self.process::<32, DECRYPT, PAR>(data),
            6 => self.process::<64, DECRYPT, PAR>(data),
            _ => unreachable!("batch exponent should be guaranteed to be between 0 and 6"),
        }
    }

    fn process<const B: usize, const DECRYPT: bool, const PAR: bool>(&self, data: &mut [u8]) {
        let len = data.len();
        let chunk_size: usize = B * BLOCK_SIZE;
        let (head, tail) = data.split_at_mut((len / chunk_size) * chunk_size);

        if PAR {
            head.par_chunks_exact_mut(chunk_size)
                .for_each(|c| self.process_chunk::<B, DECRYPT>(c));
        } else {
            head.chunks_exact_mut(chunk_size)
                .for_each(|c| self.process_chunk::<B, DECRYPT>(c));
        }

        if tail.len() >= BLOCK_SIZE {
            self.dispatch::<DECRYPT, PAR>(tail);
        }
    }
}

impl BlockCipher for Blowfish {
    const NAME: &'static str = "Blowfish";
    const BLOCK_SIZE: usize = BLOCK_SIZE;

    fn with_key(key: &[u8]) -> Result<Self, CipherError> {
        Blowfish::new(key)
    }

    fn encrypt_block(&self, block: &mut [u8]) {
        self.process_chunk::<1, false>(block);
    }

    fn decrypt_block(&self, block: &mut [u8]) {
        self.process_chunk::<1, true>(block);
    }

    fn encrypt_blocks(&self, data: &mut [u8]) {
        self.dispatch_auto::<false>(data);
    }

    fn decrypt_blocks(&self, data: &mut [u8]) {
        self.dispatch_auto::<true>(data);
    }
}

impl fmt::Debug for Blowfish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blowfish").finish_non_exhaustive()
    }
}

impl Drop for Blowfish {
    fn drop(&mut self) {
        self.p.zeroize();
        self.s.zeroize();
    }
}

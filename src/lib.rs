//! # Blowfast
//!
//! A from-scratch implementation of the Blowfish block cipher with padding,
//! ECB/CBC/CTR modes of operation and a latency benchmarking harness.
//!
//! ## Layout
//!
//! ```text
//! SecretKey ──> Blowfish::new (key schedule: 521 self-encryptions)
//!                   │
//!                   ▼
//!              Blowfish (P-array + S-boxes, immutable, shareable)
//!                   │  encrypt_block / encrypt_blocks (batched, rayon above 32 KB)
//!                   ▼
//!              ModeDriver (ECB | CBC | CTR) <── padding (PKCS#5)
//!                   │
//!          ┌────────┴─────────┐
//!          ▼                  ▼
//!     Codec / base64      Harness (timings -> Reporter)
//! ```
//!
//! Everything past the key schedule reads the scheduled tables through `&self`,
//! so a single [`Blowfish`] can serve many threads. Re-keying means building a
//! new one; [`Codec::rotate`] does that and swaps it in.
//!
//! ## Requirements
//! * Keys are 1 to 56 bytes.
//! * The raw block APIs (`encrypt_blocks`, `decrypt_blocks`, ...) require buffers
//!   that are multiples of the 8-byte block size and panic otherwise. The
//!   [`ModeDriver`] and [`Codec`] APIs pad and validate instead.
//!
//! ## Examples
//!
//! ```rust
//! let ct = blowfast::encrypt(b"mysecretkey12345", b"Hello, this is a test message!").unwrap();
//! let pt = blowfast::decrypt(b"mysecretkey12345", &ct).unwrap();
//! assert_eq!(pt, b"Hello, this is a test message!");
//! ```
//!
//! ```rust
//! use blowfast::{Blowfish, Mode, ModeDriver};
//!
//! let bf = Blowfish::new(b"a variable length key").unwrap();
//! let driver = ModeDriver::new(&bf, Mode::Cbc);
//! let ct = driver.encrypt(b"attack at dawn");
//! assert_eq!(driver.decrypt(&ct).unwrap(), b"attack at dawn");
//! ```

pub mod blowfast;
pub mod cipher;
mod codec;
mod consts;
pub mod error;
pub mod harness;
pub mod key;
pub mod mode;
pub mod padding;

pub use blowfast::Blowfish;
pub use cipher::BlockCipher;
pub use codec::{decrypt, encrypt, Codec};
pub use error::{BenchError, CipherError};
pub use key::{KeyPolicy, SecretKey};
pub use mode::{Mode, ModeDriver};

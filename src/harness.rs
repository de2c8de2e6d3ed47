//! Encrypt/decrypt latency measurement over a range of input sizes.

use std::io::Write;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cipher::BlockCipher;
use crate::error::BenchError;
use crate::key::SecretKey;
use crate::mode::{Mode, ModeDriver};

/// Default input sizes, in bytes.
pub const DEFAULT_SIZES: [usize; 5] = [16, 64, 256, 1024, 4096];

/// How benchmark plaintext is generated. Both are deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fill {
    /// Every byte is the given value.
    Repeat(u8),
    /// Alphanumeric ASCII from an RNG seeded with the given value.
    Random(u64),
}

impl Fill {
    pub fn generate(self, size: usize) -> Vec<u8> {
        match self {
            Fill::Repeat(b) => vec![b; size],
            Fill::Random(seed) => StdRng::seed_from_u64(seed)
                .sample_iter(Alphanumeric)
                .take(size)
                .collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    pub sizes: Vec<usize>,
    pub mode: Mode,
    /// Timed repetitions per size; reported times are the mean.
    pub iterations: u32,
    pub fill: Fill,
    /// Caller-supplied plaintext, measured before the generated sizes.
    pub text: Option<Vec<u8>>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            sizes: DEFAULT_SIZES.to_vec(),
            mode: Mode::Ecb,
            iterations: 1,
            fill: Fill::Repeat(b'A'),
            text: None,
        }
    }
}

/// Timings for one input size.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    pub size: usize,
    pub ciphertext_len: usize,
    pub key_setup: Duration,
    pub encrypt: Duration,
    pub decrypt: Duration,
}

impl Measurement {
    pub fn encrypt_mib_per_sec(&self) -> f64 {
        mib_per_sec(self.size, self.encrypt)
    }

    pub fn decrypt_mib_per_sec(&self) -> f64 {
        mib_per_sec(self.size, self.decrypt)
    }
}

fn mib_per_sec(bytes: usize, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return f64::INFINITY;
    }
    bytes as f64 / (1024.0 * 1024.0) / secs
}

/// Averages across all measured sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub cipher: &'static str,
    pub mode: Mode,
    pub runs: usize,
    pub mean_key_setup: Duration,
    pub mean_encrypt: Duration,
    pub mean_decrypt: Duration,
}

impl Summary {
    pub fn from_measurements(cipher: &'static str, mode: Mode, ms: &[Measurement]) -> Self {
        let mean = |f: fn(&Measurement) -> Duration| -> Duration {
            if ms.is_empty() {
                return Duration::ZERO;
            }
            ms.iter().map(f).sum::<Duration>() / ms.len() as u32
        };
        Summary {
            cipher,
            mode,
            runs: ms.len(),
            mean_key_setup: mean(|m| m.key_setup),
            mean_encrypt: mean(|m| m.encrypt),
            mean_decrypt: mean(|m| m.decrypt),
        }
    }
}

/// Receives results as the harness produces them.
pub trait Reporter {
    fn record(&mut self, cipher: &str, mode: Mode, m: &Measurement) -> std::io::Result<()>;
    fn summarize(&mut self, summary: &Summary) -> std::io::Result<()>;
}

/// Writes human readable timing lines.
pub struct TextReporter<W: Write> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        TextReporter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn record(&mut self, cipher: &str, mode: Mode, m: &Measurement) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{cipher}/{mode} input size: {} bytes", m.size)?;
        writeln!(self.out, "Key setup time:  {:.8} seconds", m.key_setup.as_secs_f64())?;
        writeln!(
            self.out,
            "Encryption time: {:.8} seconds ({:.2} MiB/s)",
            m.encrypt.as_secs_f64(),
            m.encrypt_mib_per_sec()
        )?;
        writeln!(
            self.out,
            "Decryption time: {:.8} seconds ({:.2} MiB/s)",
            m.decrypt.as_secs_f64(),
            m.decrypt_mib_per_sec()
        )
    }

    fn summarize(&mut self, s: &Summary) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}/{} over {} sizes", s.cipher, s.mode, s.runs)?;
        writeln!(self.out, "Mean key setup:  {:.8} seconds", s.mean_key_setup.as_secs_f64())?;
        writeln!(self.out, "Mean encryption: {:.8} seconds", s.mean_encrypt.as_secs_f64())?;
        writeln!(self.out, "Mean decryption: {:.8} seconds", s.mean_decrypt.as_secs_f64())?;
        self.out.flush()
    }
}

/// Drives one cipher over every configured size.
pub struct Harness<C: BlockCipher> {
    config: HarnessConfig,
    _cipher: PhantomData<C>,
}

impl<C: BlockCipher> Harness<C> {
    pub fn new(config: HarnessConfig) -> Self {
        Harness {
            config,
            _cipher: PhantomData,
        }
    }

    /// Measures the configured text, then every size in order, forwarding each
    /// result to `reporter`.
    ///
    /// The first failure (bad key, round-trip mismatch, reporter I/O) aborts the
    /// run; sizes already reported stay reported.
    pub fn run(&self, key: &SecretKey, reporter: &mut dyn Reporter) -> Result<Vec<Measurement>, BenchError> {
        if self.config.sizes.is_empty() && self.config.text.is_none() {
            return Err(BenchError::NoSizes);
        }

        let mut results = Vec::with_capacity(self.config.sizes.len() + 1);
        if let Some(text) = &self.config.text {
            let m = self.measure_input(key, text)?;
            self.emit(reporter, &m)?;
            results.push(m);
        }
        for &size in &self.config.sizes {
            let m = self.measure(key, size)?;
            self.emit(reporter, &m)?;
            results.push(m);
        }

        let summary = Summary::from_measurements(C::NAME, self.config.mode, &results);
        reporter.summarize(&summary)?;
        Ok(results)
    }

    fn emit(&self, reporter: &mut dyn Reporter, m: &Measurement) -> Result<(), BenchError> {
        info!(
            "{}/{} size={} encrypt={:?} decrypt={:?}",
            C::NAME,
            self.config.mode,
            m.size,
            m.encrypt,
            m.decrypt
        );
        reporter.record(C::NAME, self.config.mode, m)?;
        Ok(())
    }

    /// Times key setup, encryption and decryption of one generated plaintext.
    pub fn measure(&self, key: &SecretKey, size: usize) -> Result<Measurement, BenchError> {
        self.measure_input(key, &self.config.fill.generate(size))
    }

    /// Times key setup, encryption and decryption of `plaintext`.
    pub fn measure_input(&self, key: &SecretKey, plaintext: &[u8]) -> Result<Measurement, BenchError> {
        let size = plaintext.len();
        let iterations = self.config.iterations.max(1);

        let start = Instant::now();
        let cipher = C::with_key(key.expose_secret())?;
        let key_setup = start.elapsed();
        debug!("{} key setup took {:?}", C::NAME, key_setup);

        let driver = ModeDriver::new(&cipher, self.config.mode);
        let mut encrypt = Duration::ZERO;
        let mut decrypt = Duration::ZERO;
        let mut ciphertext_len = 0;

        for _ in 0..iterations {
            let start = Instant::now();
            let ciphertext = driver.encrypt(plaintext);
            encrypt += start.elapsed();

            let start = Instant::now();
            let recovered = driver.decrypt(&ciphertext)?;
            decrypt += start.elapsed();

            if recovered != plaintext {
                return Err(BenchError::RoundTripMismatch { size });
            }
            ciphertext_len = ciphertext.len();
        }

        Ok(Measurement {
            size,
            ciphertext_len,
            key_setup,
            encrypt: encrypt / iterations,
            decrypt: decrypt / iterations,
        })
    }
}

use std::io;
use std::time::Instant;

use anyhow::{Context, Result};
use blowfast::harness::{Fill, Harness, HarnessConfig, TextReporter, DEFAULT_SIZES};
use blowfast::{Blowfish, Codec, KeyPolicy, Mode, SecretKey};
use clap::{Args, Parser, Subcommand};
use log::info;
use mimalloc::MiMalloc;
use secrecy::{ExposeSecret, SecretString};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[command(name = "blowfast", version, about = "Blowfish encryption and latency benchmarks")]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Args)]
struct KeyArgs {
    /// Secret key (1 to 56 bytes unless --legacy-key)
    #[arg(short, long)]
    key: SecretString,

    /// Zero-pad or truncate the key to 16 bytes first
    #[arg(long)]
    legacy_key: bool,
}

impl KeyArgs {
    fn secret(&self) -> SecretKey {
        let policy = if self.legacy_key {
            KeyPolicy::Legacy16
        } else {
            KeyPolicy::Native
        };
        SecretKey::with_policy(self.key.expose_secret().as_bytes(), policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Time encryption and decryption across input sizes
    Bench {
        #[command(flatten)]
        key: KeyArgs,

        /// Comma separated input sizes in bytes
        #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_SIZES)]
        sizes: Vec<usize>,

        /// Mode of operation: ecb, cbc or ctr
        #[arg(short, long, default_value_t = Mode::Ecb)]
        mode: Mode,

        /// Timed repetitions per size
        #[arg(short, long, default_value_t = 1)]
        iterations: u32,

        /// Use seeded random alphanumeric plaintext instead of repeated 'A'
        #[arg(long)]
        random_seed: Option<u64>,

        /// Text to measure before the generated sizes
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Encrypt text and print base64 ciphertext
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,

        #[arg(short, long)]
        text: String,

        #[arg(short, long, default_value_t = Mode::Ecb)]
        mode: Mode,
    },
    /// Decrypt base64 ciphertext and print the text
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        #[arg(short, long)]
        ciphertext: String,

        #[arg(short, long, default_value_t = Mode::Ecb)]
        mode: Mode,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Bench {
            key,
            sizes,
            mode,
            iterations,
            random_seed,
            text,
        } => {
            let config = HarnessConfig {
                sizes,
                mode,
                iterations,
                fill: random_seed.map_or(Fill::Repeat(b'A'), Fill::Random),
                text: text.map(String::into_bytes),
            };
            info!(
                "benchmarking Blowfish/{} over {} sizes, {} iteration(s) each",
                mode,
                config.sizes.len(),
                config.iterations
            );
            let mut reporter = TextReporter::new(io::stdout().lock());
            Harness::<Blowfish>::new(config)
                .run(&key.secret(), &mut reporter)
                .context("benchmark aborted")?;
        }
        Commands::Encrypt { key, text, mode } => {
            let codec = Codec::new(&key.secret(), mode).context("building cipher")?;
            let start = Instant::now();
            let ciphertext = codec.encrypt_base64(text.as_bytes());
            info!("encrypted {} bytes in {:.8} seconds", text.len(), start.elapsed().as_secs_f64());
            println!("{ciphertext}");
        }
        Commands::Decrypt {
            key,
            ciphertext,
            mode,
        } => {
            let codec = Codec::new(&key.secret(), mode).context("building cipher")?;
            let start = Instant::now();
            let plaintext = codec
                .decrypt_base64(&ciphertext)
                .context("decrypting ciphertext")?;
            info!(
                "decrypted {} bytes in {:.8} seconds",
                plaintext.len(),
                start.elapsed().as_secs_f64()
            );
            let text = String::from_utf8(plaintext).context("plaintext is not UTF-8")?;
            println!("{text}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_argument_is_held_as_secret() {
        let cli = Cli::try_parse_from(["blowfast", "encrypt", "--key", "hunter2hunter2", "--text", "hi"]).unwrap();
        let Commands::Encrypt { key, .. } = cli.cmd else {
            panic!("expected encrypt");
        };
        assert!(!format!("{:?}", key.key).contains("hunter2"));
        assert_eq!(key.secret().expose_secret(), b"hunter2hunter2");
    }

    #[test]
    fn legacy_flag_fits_key_to_sixteen_bytes() {
        let cli = Cli::try_parse_from(["blowfast", "decrypt", "-k", "short", "-c", "AA==", "--legacy-key"]).unwrap();
        let Commands::Decrypt { key, .. } = cli.cmd else {
            panic!("expected decrypt");
        };
        assert_eq!(key.secret().len(), 16);
    }

    #[test]
    fn bench_accepts_custom_text() {
        let cli = Cli::try_parse_from(["blowfast", "bench", "-k", "key", "--text", "Hello", "--sizes", "8,16"]).unwrap();
        let Commands::Bench { text, sizes, mode, .. } = cli.cmd else {
            panic!("expected bench");
        };
        assert_eq!(text.as_deref(), Some("Hello"));
        assert_eq!(sizes, vec![8, 16]);
        assert_eq!(mode, Mode::Ecb);
    }
}

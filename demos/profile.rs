//! Profile the Blowfish engine
//! Usage: cargo run --release --example profile serial 1000000
//! Usage: cargo run --release --example profile par 1000000
//! Usage: cargo run --release --example profile cbc 1000000
use std::env;
use std::process;

use blowfast::{Blowfish, Mode, ModeDriver};
use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} <serial|par|ecb|cbc|ctr> <blocks>", args[0]);
        process::exit(2);
    }
    let test = &args[1];
    let Ok(blocks) = args[2].parse::<usize>() else {
        eprintln!("invalid block count: {}", args[2]);
        process::exit(2);
    };

    let bf = Blowfish::new(b"mysecretkey12345").unwrap();
    let text = "abcdefgh".repeat(blocks);

    match &test[..] {
        "serial" => {
            let mut data = text.as_bytes().to_owned();
            bf.encrypt_blocks_serial(&mut data);
            bf.decrypt_blocks_serial(&mut data);
            assert_eq!(data, text.as_bytes());
        }
        "par" => {
            let mut data = text.as_bytes().to_owned();
            bf.encrypt_blocks_par(&mut data);
            bf.decrypt_blocks_par(&mut data);
            assert_eq!(data, text.as_bytes());
        }
        mode => {
            let Ok(mode) = mode.parse::<Mode>() else {
                eprintln!("unknown test: {mode}");
                process::exit(2);
            };
            let driver = ModeDriver::new(&bf, mode);
            let ct = driver.encrypt(text.as_bytes());
            assert_eq!(driver.decrypt(&ct).unwrap(), text.as_bytes());
        }
    }
}

// Known-answer and consistency tests for the Blowfish block engine.
use blowfast::{BlockCipher, Blowfish, CipherError};

struct Vector {
    key: &'static str,
    plain: &'static str,
    cipher: &'static str,
}

// Eric Young's published Blowfish ECB vectors.
static ECB_VECTORS: [Vector; 12] = [
    Vector { key: "0000000000000000", plain: "0000000000000000", cipher: "4ef997456198dd78" },
    Vector { key: "ffffffffffffffff", plain: "ffffffffffffffff", cipher: "51866fd5b85ecb8a" },
    Vector { key: "3000000000000000", plain: "1000000000000001", cipher: "7d856f9a613063f2" },
    Vector { key: "1111111111111111", plain: "1111111111111111", cipher: "2466dd878b963c9d" },
    Vector { key: "0123456789abcdef", plain: "1111111111111111", cipher: "61f9c3802281b096" },
    Vector { key: "1111111111111111", plain: "0123456789abcdef", cipher: "7d0cc630afda1ec7" },
    Vector { key: "fedcba9876543210", plain: "0123456789abcdef", cipher: "0aceab0fc6a0a28d" },
    Vector { key: "7ca110454a1a6e57", plain: "01a1d6d039776742", cipher: "59c68245eb05282b" },
    Vector { key: "0131d9619dc1376e", plain: "5cd54ca83def57da", cipher: "b1b8cc0b250f09a0" },
    Vector { key: "07a1133e4a0b2686", plain: "0248d43806f67172", cipher: "1730e5778bea1da4" },
    Vector { key: "0123456789abcdef", plain: "0000000000000000", cipher: "245946885754369a" },
    Vector { key: "fedcba9876543210", plain: "ffffffffffffffff", cipher: "6b5c5a9c5d9e0a5a" },
];

// Eric Young's variable key length set: prefixes of one 24-byte key, fixed plaintext.
static SET_KEY: &str = "f0e1d2c3b4a5968778695a4b3c2d1e0f0011223344556677";
static SET_KEY_PLAIN: &str = "fedcba9876543210";
static SET_KEY_VECTORS: [(usize, &str); 11] = [
    (1, "f9ad597c49db005e"),
    (2, "e91d21c1d961a6d6"),
    (3, "e9c2b70a1bc65cf3"),
    (4, "be1e639408640f05"),
    (5, "b39e44481bdb1e6e"),
    (8, "e87a244e2cc85e82"),
    (12, "9409da87a90f6bf2"),
    (16, "93142887ee3be15c"),
    (17, "03429e838ce2d14b"),
    (20, "10851c0e3858da9f"),
    (24, "05044b62fa52d080"),
];

fn block(hex_str: &str) -> [u8; 8] {
    hex::decode(hex_str).unwrap().try_into().unwrap()
}

#[test]
fn encrypt_ecb_vectors() {
    for v in ECB_VECTORS.iter() {
        let bf = Blowfish::new(&hex::decode(v.key).unwrap()).unwrap();
        let mut data = block(v.plain);
        bf.encrypt_block(&mut data);
        assert_eq!(data, block(v.cipher), "key {}", v.key);
    }
}

#[test]
fn decrypt_ecb_vectors() {
    for v in ECB_VECTORS.iter() {
        let bf = Blowfish::new(&hex::decode(v.key).unwrap()).unwrap();
        let mut data = block(v.cipher);
        bf.decrypt_block(&mut data);
        assert_eq!(data, block(v.plain), "key {}", v.key);
    }
}

#[test]
fn variable_length_keys() {
    let full = hex::decode(SET_KEY).unwrap();
    for &(len, expected) in SET_KEY_VECTORS.iter() {
        let bf = Blowfish::new(&full[..len]).unwrap();
        let mut data = block(SET_KEY_PLAIN);
        bf.encrypt_block(&mut data);
        assert_eq!(data, block(expected), "{len} byte key");
        bf.decrypt_block(&mut data);
        assert_eq!(data, block(SET_KEY_PLAIN));
    }
}

#[test]
fn key_length_boundaries() {
    assert_eq!(
        Blowfish::new(&[]).unwrap_err(),
        CipherError::InvalidKeyLength { len: 0, min: 1, max: 56 }
    );
    assert_eq!(
        Blowfish::new(&[0xaa; 57]).unwrap_err(),
        CipherError::InvalidKeyLength { len: 57, min: 1, max: 56 }
    );

    let max_key: Vec<u8> = (0..56).collect();
    let bf = Blowfish::new(&max_key).unwrap();
    let mut data = [0u8; 8];
    bf.encrypt_block(&mut data);
    assert_eq!(data, block("5df23f8894102401"));

    assert!(Blowfish::new(b"k").is_ok());
}

#[test]
fn key_schedule_is_deterministic() {
    let a = Blowfish::new(b"same key").unwrap();
    let b = Blowfish::new(b"same key").unwrap();
    let mut x = *b"deadbeef";
    let mut y = *b"deadbeef";
    a.encrypt_block(&mut x);
    b.encrypt_block(&mut y);
    assert_eq!(x, y);
}

#[test]
fn bulk_matches_single_block() {
    let bf = Blowfish::new(b"bulk engine").unwrap();
    let plain: Vec<u8> = (0..8 * 1000).map(|i| (i % 251) as u8).collect();

    let mut expected = plain.clone();
    for chunk in expected.chunks_exact_mut(8) {
        bf.encrypt_block(chunk.try_into().unwrap());
    }

    let mut serial = plain.clone();
    bf.encrypt_blocks_serial(&mut serial);
    assert_eq!(serial, expected);

    let mut par = plain.clone();
    bf.encrypt_blocks_par(&mut par);
    assert_eq!(par, expected);

    let mut auto = plain.clone();
    bf.encrypt_blocks(&mut auto);
    assert_eq!(auto, expected);

    bf.decrypt_blocks_par(&mut par);
    bf.decrypt_blocks_serial(&mut serial);
    bf.decrypt_blocks(&mut auto);
    assert_eq!(par, plain);
    assert_eq!(serial, plain);
    assert_eq!(auto, plain);
}

#[test]
fn large_buffer_uses_parallel_path() {
    let bf = Blowfish::new(b"parallel").unwrap();
    let plain = vec![0x61u8; 1 << 20];
    let mut data = plain.clone();
    bf.encrypt_blocks(&mut data);
    let first = data[..8].to_vec();
    assert!(data.chunks_exact(8).all(|c| c == first.as_slice()));
    bf.decrypt_blocks(&mut data);
    assert_eq!(data, plain);
}

#[test]
fn trait_and_inherent_agree() {
    fn via_trait<C: BlockCipher>(c: &C, data: &mut [u8]) {
        c.encrypt_blocks(data);
    }

    let bf = Blowfish::with_key(b"trait").unwrap();
    assert_eq!(<Blowfish as BlockCipher>::BLOCK_SIZE, 8);
    assert_eq!(Blowfish::NAME, "Blowfish");

    let mut a = *b"0123456789abcdef";
    let mut b = a;
    via_trait(&bf, &mut a);
    bf.encrypt_blocks_serial(&mut b);
    assert_eq!(a, b);
}

#[test]
fn single_bit_flip_avalanche() {
    let bf = Blowfish::new(b"avalanche key").unwrap();
    let mut total = 0u32;
    let mut trials = 0u32;

    for seed in 0u64..32 {
        let base = seed.wrapping_mul(0x9e37_79b9_7f4a_7c15).to_be_bytes();
        let mut reference = base;
        bf.encrypt_block(&mut reference);

        for bit in 0..64 {
            let mut flipped = base;
            flipped[bit / 8] ^= 1 << (bit % 8);
            bf.encrypt_block(&mut flipped);
            total += reference
                .iter()
                .zip(flipped.iter())
                .map(|(a, b)| (a ^ b).count_ones())
                .sum::<u32>();
            trials += 1;
        }
    }

    let mean = f64::from(total) / f64::from(trials);
    assert!((28.0..=36.0).contains(&mean), "mean changed bits {mean}");
}

#[test]
fn shared_between_threads() {
    let bf = std::sync::Arc::new(Blowfish::new(b"shared state").unwrap());
    let handles: Vec<_> = (0u8..4)
        .map(|t| {
            let bf = std::sync::Arc::clone(&bf);
            std::thread::spawn(move || {
                let plain = vec![t; 4096];
                let mut data = plain.clone();
                bf.encrypt_blocks(&mut data);
                bf.decrypt_blocks(&mut data);
                data == plain
            })
        })
        .collect();
    for h in handles {
        assert!(h.join().unwrap());
    }
}

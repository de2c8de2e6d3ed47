// End-to-end tests through padding, modes and the base64 boundary.
use std::sync::Arc;

use blowfast::{decrypt, encrypt, Blowfish, CipherError, Codec, KeyPolicy, Mode, ModeDriver, SecretKey};

static KEY: &[u8] = b"mysecretkey12345";
static MESSAGE: &str = "Hello, this is a test message!";
static MESSAGE_ECB_B64: &str = "89snMS93fDiGs9JKUdqRBrcoyVbdcBJjnBIRSqSNYLg=";

#[test]
fn message_scenario() {
    let bf = Blowfish::new(KEY).unwrap();
    let driver = ModeDriver::new(&bf, Mode::Ecb);

    let ciphertext = driver.encrypt(MESSAGE.as_bytes());
    assert_eq!(ciphertext.len(), 32);

    let plaintext = driver.decrypt(&ciphertext).unwrap();
    assert_eq!(plaintext.len(), MESSAGE.len());
    assert_eq!(String::from_utf8(plaintext).unwrap(), MESSAGE);
}

#[test]
fn message_scenario_base64() {
    let encoded = encrypt(KEY, MESSAGE.as_bytes()).unwrap();
    assert_eq!(encoded, MESSAGE_ECB_B64);
    assert_eq!(decrypt(KEY, &encoded).unwrap(), MESSAGE.as_bytes());
}

#[test]
fn empty_message_is_one_block() {
    let encoded = encrypt(KEY, b"").unwrap();
    assert_eq!(encoded, "eeLmbm8EPAM=");
    assert_eq!(decrypt(KEY, &encoded).unwrap(), b"");
}

#[test]
fn cbc_known_answer() {
    // Eric Young's CBC vector, completed with PKCS#5 padding.
    let bf = Blowfish::new(&hex::decode("0123456789abcdeff0e1d2c3b4a59687").unwrap()).unwrap();
    let iv = hex::decode("fedcba9876543210").unwrap();
    let data = b"7654321 Now is the time for \0";

    let driver = ModeDriver::new(&bf, Mode::Cbc);
    let ct = driver.encrypt_with_iv(data, &iv).unwrap();
    assert_eq!(&ct[..8], &iv[..]);
    assert_eq!(
        hex::encode(&ct[8..]),
        "6b77b4d63006dee605b156e27403979358deb9e7154616d9749decbec05d264b"
    );
    assert_eq!(driver.decrypt(&ct).unwrap(), data);
}

#[test]
fn round_trip_all_modes_and_key_lengths() {
    for key_len in [1usize, 4, 16, 33, 56] {
        let key: Vec<u8> = (0..key_len).map(|i| (i * 31 + 7) as u8).collect();
        let bf = Blowfish::new(&key).unwrap();
        for mode in [Mode::Ecb, Mode::Cbc, Mode::Ctr] {
            let driver = ModeDriver::new(&bf, mode);
            for len in [0usize, 1, 8, 15, 16, 17, 255, 4096] {
                let msg: Vec<u8> = (0..len).map(|i| (i ^ key_len) as u8).collect();
                let ct = driver.encrypt(&msg);
                assert_eq!(driver.decrypt(&ct).unwrap(), msg, "{mode} key={key_len} len={len}");
            }
        }
    }
}

#[test]
fn encryption_is_deterministic_in_ecb() {
    let a = encrypt(b"determinism", b"same input").unwrap();
    let b = encrypt(b"determinism", b"same input").unwrap();
    assert_eq!(a, b);
}

#[test]
fn tampered_final_byte_is_detected() {
    let bf = Blowfish::new(KEY).unwrap();
    let driver = ModeDriver::new(&bf, Mode::Ecb);

    let mut detected = 0;
    let trials = 200;
    for t in 0..trials {
        let msg: Vec<u8> = (0..(t % 40)).map(|i| (i * 13 + t) as u8).collect();
        let mut ct = driver.encrypt(&msg);
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        if driver.decrypt(&ct) == Err(CipherError::InvalidPadding) {
            detected += 1;
        }
    }
    assert!(detected >= trials * 9 / 10, "detected {detected} of {trials}");
}

#[test]
fn wrong_key_does_not_decrypt() {
    let ct = encrypt(KEY, MESSAGE.as_bytes()).unwrap();
    match decrypt(b"another key", &ct) {
        Ok(pt) => assert_ne!(pt, MESSAGE.as_bytes()),
        Err(e) => assert_eq!(e, CipherError::InvalidPadding),
    }
}

#[test]
fn boundary_errors() {
    assert!(matches!(decrypt(KEY, "%%%"), Err(CipherError::Encoding(_))));
    // 12 bytes of valid base64
    assert_eq!(
        decrypt(KEY, "AAAAAAAAAAAAAAAA"),
        Err(CipherError::InvalidCiphertextLength { len: 12, block_size: 8 })
    );
    assert!(matches!(
        encrypt(&[0u8; 57], b"x"),
        Err(CipherError::InvalidKeyLength { len: 57, .. })
    ));
}

#[test]
fn concurrent_codec_use_during_rotation() {
    let codec = Arc::new(Codec::new(&SecretKey::from("rotating key one"), Mode::Ctr).unwrap());
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let codec = Arc::clone(&codec);
            std::thread::spawn(move || {
                for n in 0..50usize {
                    let msg = vec![i as u8; n];
                    let cipher = codec.cipher();
                    let driver = ModeDriver::new(cipher.as_ref(), codec.mode());
                    let ct = driver.encrypt(&msg);
                    assert_eq!(driver.decrypt(&ct).unwrap(), msg);
                }
            })
        })
        .collect();

    for n in 0..10 {
        codec
            .rotate(&SecretKey::new(format!("rotating key {n}").into_bytes()))
            .unwrap();
    }
    for w in workers {
        w.join().unwrap();
    }

    let ct = codec.encrypt_base64(b"after rotation");
    assert_eq!(codec.decrypt_base64(&ct).unwrap(), b"after rotation");
}

#[test]
fn legacy_key_policy_matches_fixed_width_key() {
    let long = SecretKey::from("mysecretkey12345678901234567890");
    let legacy = Codec::with_policy(&long, Mode::Ecb, KeyPolicy::Legacy16).unwrap();
    assert_eq!(legacy.encrypt_base64(MESSAGE.as_bytes()), MESSAGE_ECB_B64);

    let native = Codec::new(&long, Mode::Ecb).unwrap();
    assert_ne!(native.encrypt_base64(MESSAGE.as_bytes()), MESSAGE_ECB_B64);
}

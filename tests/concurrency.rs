//! Independent calls on different threads share only the random source.

use std::sync::Arc;
use std::thread;

use filecrypt::envelope;
use ring::rand::SystemRandom;

#[test]
fn test_parallel_encryptions_are_independent() {
    let rng = Arc::new(SystemRandom::new());

    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let rng = Arc::clone(&rng);
            thread::spawn(move || {
                let content = vec![i; 1024 * (i as usize + 1)];
                let password = format!("pw-{i}");
                let sealed = envelope::encrypt_with(&content, password.as_bytes(), rng.as_ref()).unwrap();
                (content, password, sealed)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (content, password, sealed) in &results {
        let plain = envelope::decrypt(&sealed.cipher_file, &sealed.key_file, password.as_bytes()).unwrap();
        assert_eq!(&plain, content);
    }

    // No two calls produced the same salt.
    for (i, a) in results.iter().enumerate() {
        for b in &results[i + 1..] {
            assert_ne!(a.2.key_file[..16], b.2.key_file[..16]);
        }
    }
}

//! Cost of one password guess.
//!
//! Run with: `cargo bench --bench kdf_benchmark`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use filecrypt::keys::{derive_key, Salt, PBKDF2_ITERATIONS, SALT_LEN};

fn bench_pbkdf2(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdf");
    group.sample_size(20);

    let salt = Salt::from_bytes([0x5A; SALT_LEN]);
    group.bench_function(format!("pbkdf2_sha256_{PBKDF2_ITERATIONS}"), |b| {
        b.iter(|| derive_key(black_box(b"correct horse battery staple"), black_box(&salt)));
    });

    group.finish();
}

criterion_group!(benches, bench_pbkdf2);
criterion_main!(benches);

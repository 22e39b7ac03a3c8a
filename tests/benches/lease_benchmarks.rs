//! # Lease Protocol Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | Seal a challenge (holder side) | < 100µs |
//! | Open a challenge (issuer side) | < 100µs |
//! | Full in-process checkin | < 1ms |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lc_01_lease_store::InMemoryLeaseStore;
use lc_02_issuer::{IssuerApi, IssuerConfig, IssuerService};
use lease_crypto::{open_challenge, seal_challenge, ChallengeKeyPair, ChallengePublicKey};
use lease_types::GrantRequest;

fn bench_challenge_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("challenge-codec");
    group.measurement_time(Duration::from_secs(5));

    let pair = ChallengeKeyPair::generate();
    let public_key = pair.public_key();
    let (_, ciphertext) = seal_challenge(&public_key).unwrap();

    group.bench_function("seal", |b| {
        b.iter(|| black_box(seal_challenge(&public_key).unwrap()))
    });
    group.bench_function("open", |b| {
        b.iter(|| black_box(open_challenge(pair.secret_key(), &ciphertext).unwrap()))
    });

    group.finish();
}

fn bench_issuer_checkin(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let service = IssuerService::new(Arc::new(InMemoryLeaseStore::new()), IssuerConfig::default());
    let view = runtime
        .block_on(service.grant(GrantRequest {
            owner: "bench".into(),
            holder: "c1".into(),
            password: None,
        }))
        .unwrap();
    let public_key = ChallengePublicKey::from_bytes(view.public_key_bytes().unwrap());

    c.bench_function("issuer-checkin", |b| {
        b.iter(|| {
            let (_, ciphertext) = seal_challenge(&public_key).unwrap();
            black_box(
                runtime
                    .block_on(service.checkin(view.id, "c1", &ciphertext))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_challenge_codec, bench_issuer_checkin);
criterion_main!(benches);

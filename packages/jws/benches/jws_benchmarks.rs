//! Signing and verification throughput for compact and JSON serializations

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use cryypt_jws::crypto::{der_to_raw, raw_to_der};
use cryypt_jws::{
    EcCurve, JwsCompactConsumer, JwsCompactProducer, JwsHeaders, JwsJsonConsumer, JwsJsonProducer,
    JwsSignatureFactory, JwsSigningKey, SignatureAlgorithm,
};

/// Compact sign and verify per algorithm family
fn benchmark_compact(c: &mut Criterion) {
    let factory = JwsSignatureFactory::default();
    let hmac = JwsSigningKey::octet(vec![0x5a; 32]);
    let ec = JwsSigningKey::ec_from_scalar(EcCurve::P256, &[0x42; 32]).expect("valid P-256 scalar");
    let keys = [
        (SignatureAlgorithm::HS256, hmac),
        (SignatureAlgorithm::ES256, ec),
    ];

    let mut group = c.benchmark_group("compact");
    for size in [64usize, 4096] {
        let payload = vec![0x61u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        for (algorithm, key) in &keys {
            let provider = factory
                .signature_provider(key, Some(*algorithm))
                .expect("provider");
            let verifier = factory
                .signature_verifier(&key.verification_key(), Some(*algorithm))
                .expect("verifier");

            group.bench_with_input(
                BenchmarkId::new(format!("sign_{algorithm}"), size),
                &payload,
                |b, payload| {
                    b.iter(|| {
                        let token = JwsCompactProducer::new(JwsHeaders::new(), payload.clone())
                            .sign_with(&provider)
                            .expect("signing should succeed");
                        std::hint::black_box(token);
                    });
                },
            );

            let token = JwsCompactProducer::new(JwsHeaders::new(), payload.clone())
                .sign_with(&provider)
                .expect("signing should succeed");
            group.bench_with_input(
                BenchmarkId::new(format!("verify_{algorithm}"), size),
                &token,
                |b, token| {
                    b.iter(|| {
                        let consumer = JwsCompactConsumer::new(token).expect("token should parse");
                        let valid = consumer
                            .verify_signature_with(&verifier)
                            .expect("verification should not error");
                        std::hint::black_box(valid);
                    });
                },
            );
        }
    }
    group.finish();
}

/// JSON verification cost as the number of non-matching entries grows
fn benchmark_json_multi_signature(c: &mut Criterion) {
    let factory = JwsSignatureFactory::default();
    let mut group = c.benchmark_group("json_multi_signature");

    for entries in [1usize, 4, 16] {
        let mut producer = JwsJsonProducer::new(b"multi signature payload");
        for index in 0..entries {
            let key = JwsSigningKey::octet(format!("key-{index}").into_bytes());
            let provider = factory
                .signature_provider(&key, Some(SignatureAlgorithm::HS256))
                .expect("provider");
            producer.sign_with(&provider).expect("signing should succeed");
        }
        let document = producer.render().expect("render");
        let last = JwsSigningKey::octet(format!("key-{}", entries - 1).into_bytes());
        let verifier = factory
            .signature_verifier(&last.verification_key(), Some(SignatureAlgorithm::HS256))
            .expect("verifier");

        group.bench_with_input(
            BenchmarkId::new("verify_last_entry", entries),
            &document,
            |b, document| {
                b.iter(|| {
                    let consumer = JwsJsonConsumer::new(document).expect("document should parse");
                    let valid = consumer
                        .verify_signature_with(&verifier)
                        .expect("verification should not error");
                    std::hint::black_box(valid);
                });
            },
        );
    }
    group.finish();
}

/// DER to raw conversion for each curve size
fn benchmark_der_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa_der");
    for len in [64usize, 96, 132] {
        let raw: Vec<u8> = (0..len).map(|i| (i * 37 % 251) as u8 | 0x80).collect();
        let der = raw_to_der(&raw, len).expect("raw_to_der");

        group.bench_with_input(BenchmarkId::new("raw_to_der", len), &raw, |b, raw| {
            b.iter(|| std::hint::black_box(raw_to_der(raw, len).expect("raw_to_der")));
        });
        group.bench_with_input(BenchmarkId::new("der_to_raw", len), &der, |b, der| {
            b.iter(|| std::hint::black_box(der_to_raw(der, len).expect("der_to_raw")));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_compact,
    benchmark_json_multi_signature,
    benchmark_der_conversion
);
criterion_main!(benches);

//! Compact serialization: producing, parsing and verifying tokens

mod common;

use common::*;
use cryypt_jws::utils::{sign_compact, verify_compact, verify_with};
use cryypt_jws::{
    JwsCompactConsumer, JwsCompactProducer, JwsConfig, JwsError, JwsHeaders, JwsSignatureFactory,
    JwsSigningKey, JwsVerificationKey, SignatureAlgorithm,
};

fn hs256_pair(secret: &[u8]) -> (cryypt_jws::SignatureProvider, cryypt_jws::SignatureVerifier) {
    let factory = JwsSignatureFactory::default();
    let provider = factory
        .signature_provider(&JwsSigningKey::octet(secret), Some(SignatureAlgorithm::HS256))
        .expect("HS256 provider");
    let verifier = factory
        .signature_verifier(&JwsVerificationKey::octet(secret), Some(SignatureAlgorithm::HS256))
        .expect("HS256 verifier");
    (provider, verifier)
}

#[test]
fn test_hs256_round_trip_with_shared_secret() {
    init_tracing();
    let (provider, verifier) = hs256_pair(b"secret");
    let payload = r#"{"iss":"joe","exp":1300819380,"http://example.com/is_root":true}"#;

    let mut producer = JwsCompactProducer::new(JwsHeaders::new(), payload);
    let token = producer.sign_with(&provider).expect("signing should succeed");
    assert_eq!(token.split('.').count(), 3);
    assert_eq!(producer.headers().algorithm(), Some("HS256"));

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert_eq!(consumer.decoded_payload_str().expect("utf-8 payload"), payload);
    assert!(
        consumer
            .verify_signature_with(&verifier)
            .expect("verification should not error")
    );

    let (_, wrong) = hs256_pair(b"wrong");
    assert!(
        !consumer
            .verify_signature_with(&wrong)
            .expect("a wrong key is a rejection, not an error")
    );
}

#[test]
fn test_rfc7515_hs256_vector_verifies() {
    let token = format!(
        "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.{RFC7515_PAYLOAD}.dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"
    );
    let (_, verifier) = hs256_pair(&unb64(RFC7515_HMAC_KEY));

    let consumer = JwsCompactConsumer::new(&token).expect("RFC token should parse");
    assert_eq!(consumer.headers().header_type(), Some("JWT"));
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));
    assert!(
        consumer
            .decoded_payload_str()
            .expect("utf-8 payload")
            .contains("\"iss\":\"joe\"")
    );
}

#[test]
fn test_rfc7797_unencoded_detached_payload() {
    let (provider, verifier) = hs256_pair(&unb64(RFC7515_HMAC_KEY));
    let mut headers = JwsHeaders::with_algorithm(SignatureAlgorithm::HS256);
    headers.set_payload_encoding_status(false);

    let mut producer = JwsCompactProducer::new(headers, "$.02").detached(true);
    let token = producer.sign_with(&provider).expect("signing should succeed");
    assert_eq!(
        token,
        "eyJhbGciOiJIUzI1NiIsImI2NCI6ZmFsc2UsImNyaXQiOlsiYjY0Il19..A5dxf2s96_n5FLueVuW1Z_vh161FwXZC4YLPff6dmDY"
    );

    let consumer =
        JwsCompactConsumer::with_detached_payload(&token, b"$.02").expect("token should parse");
    assert!(consumer.is_detached());
    assert_eq!(consumer.encoded_payload(), "$.02");
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));
}

#[test]
fn test_unencoded_payload_with_dot_must_be_detached() {
    let (provider, _) = hs256_pair(b"secret");
    let mut headers = JwsHeaders::new();
    headers.set_payload_encoding_status(false);

    let err = JwsCompactProducer::new(headers, "$.02")
        .sign_with(&provider)
        .expect_err("attached unencoded payload with '.' must fail");
    assert!(matches!(err, JwsError::Serialization(_)));
}

#[test]
fn test_unencoded_attached_payload_round_trip() {
    let (provider, verifier) = hs256_pair(b"secret");
    let mut headers = JwsHeaders::new();
    headers.set_payload_encoding_status(false);

    let token = JwsCompactProducer::new(headers, "plain text payload")
        .sign_with(&provider)
        .expect("signing should succeed");
    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert_eq!(consumer.decoded_payload(), b"plain text payload");
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));
}

#[test]
fn test_detached_payload_round_trip() {
    let (provider, verifier) = hs256_pair(b"secret");
    let token = JwsCompactProducer::from_payload("detached content")
        .detached(true)
        .sign_with(&provider)
        .expect("signing should succeed");
    let parts: Vec<&str> = token.split('.').collect();
    assert_eq!(parts[1], "");

    let consumer = JwsCompactConsumer::with_detached_payload(&token, b"detached content")
        .expect("token should parse");
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));

    let other = JwsCompactConsumer::with_detached_payload(&token, b"other content")
        .expect("token should parse");
    assert!(!other.verify_signature_with(&verifier).expect("verify"));
}

#[test]
fn test_detached_payload_rejected_when_token_has_one() {
    let (provider, _) = hs256_pair(b"secret");
    let token = JwsCompactProducer::from_payload("attached")
        .sign_with(&provider)
        .expect("signing should succeed");
    let err = JwsCompactConsumer::with_detached_payload(&token, b"attached")
        .expect_err("two payloads must be rejected");
    assert!(matches!(err, JwsError::MalformedCompactToken(_)));
}

#[test]
fn test_rfc7515_rs256_vector() {
    let token = format!(
        "eyJhbGciOiJSUzI1NiJ9.{RFC7515_PAYLOAD}.cC4hiUPoj9Eetdgtv3hF80EGrhuB__dzERat0XF9g2VtQgr9PJbu3XOiZj5RZmh7AAuHIm4Bh-0Qc_lF5YKt_O8W2Fp5jujGbds9uJdbF9CUAr7t1dnZcAcQjbKBYNX4BAynRFdiuB--f_nZLgrnbyTyWzO75vRK5h6xBArLIARNPvkSjtQBMHlb1L07Qe7K0GarZRmB_eSN9383LcOLn6_dO--xi12jzDwusC-eOkHWEsqtFZESc6BfI7noOPqvhJ1phCnvWh6IeYI2w9QOYEUipUTI8np6LbgGY9Fs98rqVt5AXLIhWkWywlVmtVrBp0igcN_IoypGlUPQGe77Rw"
    );
    let factory = JwsSignatureFactory::default();

    let verifier = factory
        .signature_verifier(&rsa_verification_key("rsa_rfc7515_public.pem"), None)
        .expect("RS256 verifier");
    let consumer = JwsCompactConsumer::new(&token).expect("RFC token should parse");
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));

    // PKCS#1 v1.5 is deterministic, so re-signing reproduces the vector
    let provider = factory
        .signature_provider(&rsa_signing_key("rsa_rfc7515_private.pem"), None)
        .expect("RS256 provider");
    let resigned = JwsCompactProducer::from_payload(unb64(RFC7515_PAYLOAD))
        .sign_with(&provider)
        .expect("signing should succeed");
    assert_eq!(resigned, token);
}

#[test]
fn test_rsa_round_trip_for_each_hash() {
    let factory = JwsSignatureFactory::default();
    let signing = rsa_signing_key("rsa_2048_private.pem");
    let verification = rsa_verification_key("rsa_2048_public.pem");

    for algorithm in [
        SignatureAlgorithm::RS256,
        SignatureAlgorithm::RS384,
        SignatureAlgorithm::RS512,
    ] {
        let provider = factory
            .signature_provider(&signing, Some(algorithm))
            .expect("RSA provider");
        let verifier = factory
            .signature_verifier(&verification, Some(algorithm))
            .expect("RSA verifier");
        let token = JwsCompactProducer::from_payload("rsa payload")
            .sign_with(&provider)
            .expect("signing should succeed");
        let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
        assert_eq!(consumer.decoded_signature().len(), 256);
        assert!(consumer.verify_signature_with(&verifier).expect("verify"));
    }
}

#[test]
fn test_hmac_round_trip_for_each_hash() {
    let factory = JwsSignatureFactory::default();
    let secret = vec![0x0b; 64];

    for (algorithm, mac_len) in [
        (SignatureAlgorithm::HS256, 32),
        (SignatureAlgorithm::HS384, 48),
        (SignatureAlgorithm::HS512, 64),
    ] {
        let provider = factory
            .signature_provider(&JwsSigningKey::octet(secret.clone()), Some(algorithm))
            .expect("HMAC provider");
        let verifier = factory
            .signature_verifier(&JwsVerificationKey::octet(secret.clone()), Some(algorithm))
            .expect("HMAC verifier");
        let token = JwsCompactProducer::from_payload("hmac payload")
            .sign_with(&provider)
            .expect("signing should succeed");

        let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
        assert_eq!(consumer.headers().algorithm(), Some(algorithm.name()));
        assert_eq!(consumer.decoded_signature().len(), mac_len, "{algorithm}");
        assert!(consumer.verify_signature_with(&verifier).expect("verify"));
    }
}

#[test]
fn test_rfc7515_es256_vector_verifies() {
    let token = format!(
        "eyJhbGciOiJFUzI1NiJ9.{RFC7515_PAYLOAD}.DtEhU3ljbEg8L38VWAfUAqOyKAM6-Xx-F4GawxaepmXFCgfTjDxw5djxLa8ISlSApmWQxfKTUJqPP3-Kg6NU1Q"
    );
    let verifier = JwsSignatureFactory::default()
        .signature_verifier(&ec_verification_key("ec_p256_rfc7515_public.pem"), None)
        .expect("ES256 verifier");

    let consumer = JwsCompactConsumer::new(&token).expect("RFC token should parse");
    assert_eq!(consumer.decoded_signature().len(), 64);
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));

    let other = JwsSignatureFactory::default()
        .signature_verifier(&ec_verification_key("ec_p256_other_public.pem"), None)
        .expect("ES256 verifier");
    assert!(!consumer.verify_signature_with(&other).expect("verify"));
}

#[test]
fn test_ecdsa_round_trip_for_each_curve() {
    init_tracing();
    let factory = JwsSignatureFactory::default();
    let cases = [
        ("p256_rfc7515", SignatureAlgorithm::ES256, 64),
        ("p384", SignatureAlgorithm::ES384, 96),
        ("p521", SignatureAlgorithm::ES512, 132),
    ];

    for (stem, algorithm, raw_len) in cases {
        let private = format!("ec_{stem}_private.pem");
        let public = format!("ec_{stem}_public.pem");
        let provider = factory
            .signature_provider(&ec_signing_key(&private), None)
            .expect("EC provider");
        assert_eq!(
            cryypt_jws::JwsSignatureProvider::algorithm(&provider),
            algorithm
        );
        let verifier = factory
            .signature_verifier(&ec_verification_key(&public), Some(algorithm))
            .expect("EC verifier");

        let token = JwsCompactProducer::from_payload("ecdsa payload")
            .sign_with(&provider)
            .expect("signing should succeed");
        let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
        assert_eq!(consumer.decoded_signature().len(), raw_len);
        assert!(consumer.verify_signature_with(&verifier).expect("verify"));
    }
}

#[test]
fn test_ecdsa_wrong_signature_length_is_an_error() {
    let token = format!(
        "eyJhbGciOiJFUzI1NiJ9.{RFC7515_PAYLOAD}.{}",
        b64(&[7u8; 63])
    );
    let verifier = JwsSignatureFactory::default()
        .signature_verifier(&ec_verification_key("ec_p256_rfc7515_public.pem"), None)
        .expect("ES256 verifier");

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    let err = consumer
        .verify_signature_with(&verifier)
        .expect_err("length mismatch is structural");
    assert_eq!(
        err,
        JwsError::SignatureLengthMismatch {
            expected: 64,
            actual: 63
        }
    );
}

#[test]
fn test_segment_count_rules() {
    let err = JwsCompactConsumer::new("a.b.c.d").expect_err("four segments");
    assert!(matches!(err, JwsError::MalformedCompactToken(_)));

    let header = b64(br#"{"alg":"none"}"#);
    let payload = b64(b"hello");
    let err = JwsCompactConsumer::new(&format!("{header}.{payload}")).expect_err("two segments");
    assert!(matches!(err, JwsError::MalformedCompactToken(_)));

    let consumer = JwsCompactConsumer::new(&format!("{header}.{payload}."))
        .expect("trailing dot is an empty signature");
    assert!(consumer.is_unsigned());
    assert_eq!(consumer.decoded_payload(), b"hello");
}

#[test]
fn test_malformed_segments() {
    let payload = b64(b"hello");
    let err = JwsCompactConsumer::new(&format!("!!.{payload}.")).expect_err("bad base64");
    assert!(matches!(err, JwsError::MalformedCompactToken(_)));

    let not_object = b64(b"[1,2]");
    let err = JwsCompactConsumer::new(&format!("{not_object}.{payload}."))
        .expect_err("header must be an object");
    assert!(matches!(err, JwsError::MalformedCompactToken(_)));
}

#[test]
fn test_unsigned_token_round_trip() {
    let factory = JwsSignatureFactory::new(JwsConfig::default().with_unsigned_allowed(true));
    let provider = factory.unsigned_provider().expect("none provider");
    let verifier = factory.unsigned_verifier().expect("none verifier");

    let token = JwsCompactProducer::from_payload("hello")
        .sign_with(&provider)
        .expect("signing should succeed");
    assert!(token.ends_with('.'));
    assert_eq!(
        token,
        format!("{}.{}.", b64(br#"{"alg":"none"}"#), b64(b"hello"))
    );

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert!(consumer.verify_signature_with(&verifier).expect("verify"));

    let forged = format!("{token}AAAA");
    let consumer = JwsCompactConsumer::new(&forged).expect("token should parse");
    assert!(!consumer.verify_signature_with(&verifier).expect("verify"));

    let (_, hs256) = hs256_pair(b"secret");
    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert!(matches!(
        consumer.verify_signature_with(&hs256),
        Err(JwsError::InvalidAlgorithm(_))
    ));
}

#[test]
fn test_unsigned_disabled_by_default() {
    let factory = JwsSignatureFactory::default();
    assert!(matches!(
        factory.unsigned_provider(),
        Err(JwsError::InvalidAlgorithm(_))
    ));
    assert!(matches!(
        factory.unsigned_verifier(),
        Err(JwsError::InvalidAlgorithm(_))
    ));
}

#[test]
fn test_tampering_is_rejected_without_error() {
    let (provider, verifier) = hs256_pair(b"secret");
    let token = JwsCompactProducer::from_payload("hello world")
        .sign_with(&provider)
        .expect("signing should succeed");
    let parts: Vec<&str> = token.split('.').collect();

    let tampered_payload = format!("{}.{}.{}", parts[0], b64(b"hello worle"), parts[2]);
    let consumer = JwsCompactConsumer::new(&tampered_payload).expect("token should parse");
    assert!(!consumer.verify_signature_with(&verifier).expect("verify"));

    let mut signature = unb64(parts[2]);
    signature[0] ^= 0x01;
    let tampered_signature = format!("{}.{}.{}", parts[0], parts[1], b64(&signature));
    let consumer = JwsCompactConsumer::new(&tampered_signature).expect("token should parse");
    assert!(!consumer.verify_signature_with(&verifier).expect("verify"));
}

#[test]
fn test_ecdsa_tampered_signature_is_rejected_without_error() {
    let factory = JwsSignatureFactory::default();
    let provider = factory
        .signature_provider(&ec_signing_key("ec_p384_private.pem"), None)
        .expect("ES384 provider");
    let verifier = factory
        .signature_verifier(&ec_verification_key("ec_p384_public.pem"), None)
        .expect("ES384 verifier");
    let token = JwsCompactProducer::from_payload("hello world")
        .sign_with(&provider)
        .expect("signing should succeed");
    let parts: Vec<&str> = token.split('.').collect();

    let mut signature = unb64(parts[2]);
    signature[40] ^= 0x80;
    let tampered = format!("{}.{}.{}", parts[0], parts[1], b64(&signature));
    let consumer = JwsCompactConsumer::new(&tampered).expect("token should parse");
    assert!(!consumer.verify_signature_with(&verifier).expect("verify"));
}

#[test]
fn test_verifier_algorithm_mismatch_is_an_error() {
    let (provider, _) = hs256_pair(b"secret");
    let token = JwsCompactProducer::from_payload("hello")
        .sign_with(&provider)
        .expect("signing should succeed");
    let hs512 = JwsSignatureFactory::default()
        .signature_verifier(
            &JwsVerificationKey::octet(b"secret".to_vec()),
            Some(SignatureAlgorithm::HS512),
        )
        .expect("HS512 verifier");

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert!(matches!(
        consumer.verify_signature_with(&hs512),
        Err(JwsError::InvalidAlgorithm(_))
    ));

    let no_alg = format!("{}.{}.", b64(br#"{"typ":"JWT"}"#), b64(b"hello"));
    let consumer = JwsCompactConsumer::new(&no_alg).expect("token should parse");
    assert_eq!(
        consumer.verify_signature_with(&hs512),
        Err(JwsError::AlgorithmNotSet)
    );
}

#[test]
fn test_unknown_critical_header_fails_before_signature_check() {
    let (provider, verifier) = hs256_pair(b"secret");
    let header = b64(br#"{"alg":"HS256","exp":1,"crit":["exp"]}"#);
    let payload = b64(b"hello");
    let signing_input = format!("{header}.{payload}");
    let signature = cryypt_jws::JwsSignatureProvider::sign(
        &provider,
        &JwsHeaders::with_algorithm(SignatureAlgorithm::HS256),
        signing_input.as_bytes(),
    )
    .expect("raw signing");
    let token = format!("{signing_input}.{}", b64(&signature));

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert!(matches!(
        consumer.verify_signature_with(&verifier),
        Err(JwsError::InvalidCriticalHeader(_))
    ));
}

#[test]
fn test_producer_rejects_conflicting_algorithm() {
    let (provider, _) = hs256_pair(b"secret");
    let headers = JwsHeaders::with_algorithm(SignatureAlgorithm::HS512);
    let mut producer = JwsCompactProducer::new(headers, "hello");
    assert!(matches!(
        producer.sign_with(&provider),
        Err(JwsError::InvalidAlgorithm(_))
    ));
    assert_eq!(producer.signed_encoded_jws(), Err(JwsError::NotSigned));
}

#[test]
fn test_unsigned_encoded_jws_is_signing_input() {
    let (provider, _) = hs256_pair(b"secret");
    let mut producer =
        JwsCompactProducer::new(JwsHeaders::with_algorithm(SignatureAlgorithm::HS256), "hello");
    let unsigned = producer.unsigned_encoded_jws().expect("encoding");
    let token = producer.sign_with(&provider).expect("signing should succeed");
    assert!(token.starts_with(&format!("{unsigned}.")));
    assert_eq!(producer.encoded_signature(), token.rsplit('.').next());
}

#[test]
fn test_convenience_sign_and_verify() {
    let key = JwsSigningKey::octet(b"0123456789abcdef0123456789abcdef".to_vec());
    let token = sign_compact(
        &key,
        SignatureAlgorithm::HS256,
        b"{\"msg\":\"hi\"}",
        Some("application/json"),
    )
    .expect("signing should succeed");

    let consumer = JwsCompactConsumer::new(&token).expect("token should parse");
    assert_eq!(consumer.headers().content_type(), Some("application/json"));

    let payload = verify_compact(&key.verification_key(), SignatureAlgorithm::HS256, &token)
        .expect("verification should succeed");
    assert_eq!(payload, "{\"msg\":\"hi\"}");

    let other = JwsVerificationKey::octet(b"another secret".to_vec());
    assert_eq!(
        verify_compact(&other, SignatureAlgorithm::HS256, &token),
        Err(JwsError::SignatureVerificationFailed)
    );

    let (_, verifier) = hs256_pair(b"0123456789abcdef0123456789abcdef");
    let consumer = verify_with(&verifier, &token).expect("verification should succeed");
    assert_eq!(consumer.decoded_payload(), b"{\"msg\":\"hi\"}");
}

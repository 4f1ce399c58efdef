//! Shared helpers for the integration tests

#![allow(dead_code)]

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use cryypt_jws::{JwsSigningKey, JwsVerificationKey};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber honoring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Contents of a file under `tests/fixtures`
pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).expect("fixture file should be readable")
}

pub fn rsa_signing_key(name: &str) -> JwsSigningKey {
    JwsSigningKey::rsa_from_pkcs8_pem(&fixture(name)).expect("RSA private key fixture")
}

pub fn rsa_verification_key(name: &str) -> JwsVerificationKey {
    JwsVerificationKey::rsa_from_public_key_pem(&fixture(name)).expect("RSA public key fixture")
}

pub fn ec_signing_key(name: &str) -> JwsSigningKey {
    JwsSigningKey::ec_from_pkcs8_pem(&fixture(name)).expect("EC private key fixture")
}

pub fn ec_verification_key(name: &str) -> JwsVerificationKey {
    JwsVerificationKey::ec_from_public_key_pem(&fixture(name)).expect("EC public key fixture")
}

pub fn b64(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

pub fn unb64(input: &str) -> Vec<u8> {
    URL_SAFE_NO_PAD.decode(input).expect("valid base64url")
}

/// RFC 7515 appendix A.1 HMAC key
pub const RFC7515_HMAC_KEY: &str =
    "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow";

/// RFC 7520 section 4.4 HMAC key
pub const RFC7520_HMAC_KEY: &str = "hJtXIZ2uSN5kbQfbtTNWbpdmhkV8FJG-Onbc6mxCcYg";

/// RFC 7515 example payload, base64url encoded
pub const RFC7515_PAYLOAD: &str = "eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFtcGxlLmNvbS9pc19yb290Ijp0cnVlfQ";

/// RFC 7520 example payload, base64url encoded
pub const RFC7520_PAYLOAD: &str = "SXTigJlzIGEgZGFuZ2Vyb3VzIGJ1c2luZXNzLCBGcm9kbywgZ29pbmcgb3V0IHlvdXIgZG9vci4gWW91IHN0ZXAgb250byB0aGUgcm9hZCwgYW5kIGlmIHlvdSBkb24ndCBrZWVwIHlvdXIgZmVldCwgdGhlcmXigJlzIG5vIGtub3dpbmcgd2hlcmUgeW91IG1pZ2h0IGJlIHN3ZXB0IG9mZiB0by4";

//! One-call signing and verification helpers and `crit` validation

use crate::algorithms::SignatureAlgorithm;
use crate::compact::{JwsCompactConsumer, JwsCompactProducer};
use crate::error::{JwsError, JwsResult};
use crate::factory::JwsSignatureFactory;
use crate::header::{CRITICAL, JwsHeaders, PAYLOAD_ENCODING, REGISTERED_HEADERS};
use crate::keys::{JwsSigningKey, JwsVerificationKey};
use crate::traits::{JwsSignatureProvider, JwsSignatureVerifier};
use serde_json::Value;
use tracing::warn;

/// Extensions this crate understands when listed in `crit`
pub const UNDERSTOOD_CRITICAL_HEADERS: [&str; 1] = [PAYLOAD_ENCODING];

/// Sign `content` into a compact token with `key`
///
/// # Errors
/// Any factory or signing error
pub fn sign_compact(
    key: &JwsSigningKey,
    algorithm: SignatureAlgorithm,
    content: &[u8],
    content_type: Option<&str>,
) -> JwsResult<String> {
    let provider = JwsSignatureFactory::default().signature_provider(key, Some(algorithm))?;
    sign_with(&provider, content, content_type)
}

/// Sign `content` into a compact token with `provider`
///
/// # Errors
/// Any signing error
pub fn sign_with(
    provider: &dyn JwsSignatureProvider,
    content: &[u8],
    content_type: Option<&str>,
) -> JwsResult<String> {
    let mut headers = JwsHeaders::new();
    if let Some(content_type) = content_type {
        headers.set_content_type(content_type);
    }
    JwsCompactProducer::new(headers, content).sign_with(provider)
}

/// Verify a compact token with `key` and return its payload as text
///
/// # Errors
/// `SignatureVerificationFailed` on mismatch, `Serialization` if the payload
/// is not UTF-8, or any structural error
pub fn verify_compact(
    key: &JwsVerificationKey,
    algorithm: SignatureAlgorithm,
    token: &str,
) -> JwsResult<String> {
    let verifier = JwsSignatureFactory::default().signature_verifier(key, Some(algorithm))?;
    let consumer = verify_with(&verifier, token)?;
    consumer.decoded_payload_str().map(str::to_string)
}

/// Parse and verify a compact token
///
/// # Errors
/// `SignatureVerificationFailed` on mismatch, or any structural error
pub fn verify_with(
    verifier: &dyn JwsSignatureVerifier,
    token: &str,
) -> JwsResult<JwsCompactConsumer> {
    let consumer = JwsCompactConsumer::new(token)?;
    if consumer.verify_signature_with(verifier)? {
        Ok(consumer)
    } else {
        Err(JwsError::SignatureVerificationFailed)
    }
}

/// `true` when `b64` is explicitly `false`
pub fn is_payload_unencoded(headers: &JwsHeaders) -> bool {
    headers.payload_encoding_status() == Some(false)
}

/// Check `crit` and `b64` before any signature work
///
/// `crit` must be a non-empty array of strings naming only present,
/// unregistered parameters this crate understands. `b64`, when present,
/// must be a boolean, and `b64: false` must be listed in `crit`.
///
/// # Errors
/// `InvalidCriticalHeader` describing the first violation
pub fn validate_critical_headers(headers: &JwsHeaders) -> JwsResult<()> {
    let critical = match headers.get_header(CRITICAL) {
        None => None,
        Some(Value::Array(names)) if !names.is_empty() => Some(names),
        Some(_) => {
            warn!("rejected malformed crit header");
            return Err(JwsError::invalid_critical(
                "crit must be a non-empty array of names",
            ));
        }
    };

    if let Some(names) = critical {
        for name in names {
            let Some(name) = name.as_str() else {
                return Err(JwsError::invalid_critical("crit entries must be strings"));
            };
            if REGISTERED_HEADERS.contains(&name) {
                return Err(JwsError::invalid_critical(format!(
                    "crit must not list registered header {name}"
                )));
            }
            if !headers.contains(name) {
                return Err(JwsError::invalid_critical(format!(
                    "crit lists {name}, which is not present"
                )));
            }
            if !UNDERSTOOD_CRITICAL_HEADERS.contains(&name) {
                warn!(header = name, "rejected unsupported critical header");
                return Err(JwsError::invalid_critical(format!(
                    "critical header {name} is not supported"
                )));
            }
        }
    }

    match headers.get_header(PAYLOAD_ENCODING) {
        None | Some(Value::Bool(true)) => Ok(()),
        Some(Value::Bool(false)) => {
            let listed = headers
                .critical()
                .is_some_and(|names| names.iter().any(|name| name == PAYLOAD_ENCODING));
            if listed {
                Ok(())
            } else {
                Err(JwsError::invalid_critical("b64=false must be listed in crit"))
            }
        }
        Some(_) => Err(JwsError::invalid_critical("b64 must be a boolean")),
    }
}

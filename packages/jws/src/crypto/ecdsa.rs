//! ECDSA signatures (ES256, ES384, ES512)
//!
//! The curve primitives speak DER; JWS wants fixed-width `r || s`. Signing
//! converts DER to raw, verification converts raw back to DER.

use super::der::{der_to_raw, raw_to_der};
use crate::algorithms::{AlgorithmFamily, SignatureAlgorithm, validate};
use crate::error::{JwsError, JwsResult};
use crate::keys::{EcCurve, EcSigningKey, EcVerifyingKey, KeyType};
use p256::ecdsa::signature::{Signer, Verifier};
use tracing::debug;

/// Raw signature length for `algorithm`, requiring the key's curve to match
fn raw_length(algorithm: SignatureAlgorithm, curve: EcCurve) -> JwsResult<usize> {
    validate(algorithm.name(), AlgorithmFamily::EcDsa)?;
    if algorithm.ec_curve() != Some(curve) {
        return Err(JwsError::unsupported_combination(
            format!("{} {curve}", KeyType::Ec),
            algorithm,
        ));
    }
    algorithm
        .ec_signature_length()
        .ok_or_else(|| JwsError::invalid_algorithm(format!("{algorithm} has no signature length")))
}

/// ECDSA signer bound to one private key and one algorithm
#[derive(Debug, Clone)]
pub struct EcDsaSignatureProvider {
    key: EcSigningKey,
    algorithm: SignatureAlgorithm,
    raw_len: usize,
}

impl EcDsaSignatureProvider {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` for non-ECDSA algorithms and
    /// `UnsupportedKeyAlgorithmCombination` when the curve does not match
    pub fn new(key: EcSigningKey, algorithm: SignatureAlgorithm) -> JwsResult<Self> {
        let raw_len = raw_length(algorithm, key.curve())?;
        Ok(Self {
            key,
            algorithm,
            raw_len,
        })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Raw `r || s` signature over `message`
    ///
    /// # Errors
    /// Returns `SigningError` if the curve operation fails and
    /// `DerConversionError` if its output cannot be converted
    pub fn sign(&self, message: &[u8]) -> JwsResult<Vec<u8>> {
        let failed =
            |e: p256::ecdsa::Error| JwsError::signing(format!("ECDSA signing failed: {e}"));
        let der = match &self.key {
            EcSigningKey::P256(key) => {
                let signature: p256::ecdsa::Signature = key.try_sign(message).map_err(failed)?;
                signature.to_der().as_bytes().to_vec()
            }
            EcSigningKey::P384(key) => {
                let signature: p384::ecdsa::Signature = key.try_sign(message).map_err(failed)?;
                signature.to_der().as_bytes().to_vec()
            }
            EcSigningKey::P521(key) => {
                let signature: p521::ecdsa::Signature = key.try_sign(message).map_err(failed)?;
                signature.to_der().as_bytes().to_vec()
            }
        };
        debug!(algorithm = %self.algorithm, der_len = der.len(), "converting DER signature to raw");
        der_to_raw(&der, self.raw_len)
    }
}

/// ECDSA verifier bound to one public key and one algorithm
#[derive(Debug, Clone)]
pub struct EcDsaSignatureVerifier {
    key: EcVerifyingKey,
    algorithm: SignatureAlgorithm,
    raw_len: usize,
}

impl EcDsaSignatureVerifier {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` for non-ECDSA algorithms and
    /// `UnsupportedKeyAlgorithmCombination` when the curve does not match
    pub fn new(key: EcVerifyingKey, algorithm: SignatureAlgorithm) -> JwsResult<Self> {
        let raw_len = raw_length(algorithm, key.curve())?;
        Ok(Self {
            key,
            algorithm,
            raw_len,
        })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Check a raw `r || s` signature over `message`
    ///
    /// # Errors
    /// Returns `SignatureLengthMismatch` when `signature` has the wrong size
    /// for the algorithm and `SignatureVerificationFailed` on mismatch
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> JwsResult<()> {
        let der = raw_to_der(signature, self.raw_len)?;
        let rejected = |_: p256::ecdsa::Error| JwsError::SignatureVerificationFailed;
        match &self.key {
            EcVerifyingKey::P256(key) => {
                let signature = p256::ecdsa::Signature::from_der(&der).map_err(rejected)?;
                key.verify(message, &signature).map_err(rejected)
            }
            EcVerifyingKey::P384(key) => {
                let signature = p384::ecdsa::Signature::from_der(&der).map_err(rejected)?;
                key.verify(message, &signature).map_err(rejected)
            }
            EcVerifyingKey::P521(key) => {
                let signature = p521::ecdsa::Signature::from_der(&der).map_err(rejected)?;
                key.verify(message, &signature).map_err(rejected)
            }
        }
    }
}

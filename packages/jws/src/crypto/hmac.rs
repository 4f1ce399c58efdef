//! HMAC-SHA signatures (HS256, HS384, HS512)

use crate::algorithms::{AlgorithmFamily, SignatureAlgorithm, validate};
use crate::error::{JwsError, JwsResult};
use crate::keys::OctetKey;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;
type HmacSha384 = Hmac<Sha384>;
type HmacSha512 = Hmac<Sha512>;

fn compute<M: Mac + KeyInit>(secret: &[u8], message: &[u8]) -> JwsResult<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|_| JwsError::invalid_key("invalid HMAC key"))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Compute the MAC of `message` under `secret`
///
/// # Errors
/// Returns `InvalidAlgorithm` unless `algorithm` is an HMAC algorithm
pub fn sign(secret: &[u8], algorithm: SignatureAlgorithm, message: &[u8]) -> JwsResult<Vec<u8>> {
    match algorithm {
        SignatureAlgorithm::HS256 => compute::<HmacSha256>(secret, message),
        SignatureAlgorithm::HS384 => compute::<HmacSha384>(secret, message),
        SignatureAlgorithm::HS512 => compute::<HmacSha512>(secret, message),
        other => Err(JwsError::invalid_algorithm(format!(
            "{other} is not an HMAC algorithm"
        ))),
    }
}

/// Recompute the MAC and compare it in constant time
///
/// # Errors
/// Returns `SignatureVerificationFailed` on mismatch
pub fn verify(
    secret: &[u8],
    algorithm: SignatureAlgorithm,
    message: &[u8],
    signature: &[u8],
) -> JwsResult<()> {
    let expected = sign(secret, algorithm, message)?;
    if bool::from(expected.as_slice().ct_eq(signature)) {
        Ok(())
    } else {
        Err(JwsError::SignatureVerificationFailed)
    }
}

/// HMAC signer bound to one secret and one algorithm
#[derive(Debug, Clone)]
pub struct HmacSignatureProvider {
    key: OctetKey,
    algorithm: SignatureAlgorithm,
}

impl HmacSignatureProvider {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` unless `algorithm` is HS256, HS384 or HS512
    pub fn new(key: OctetKey, algorithm: SignatureAlgorithm) -> JwsResult<Self> {
        validate(algorithm.name(), AlgorithmFamily::Hmac)?;
        Ok(Self { key, algorithm })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// MAC over `message`
    ///
    /// # Errors
    /// Returns `InvalidKey` if the MAC cannot be keyed
    pub fn sign(&self, message: &[u8]) -> JwsResult<Vec<u8>> {
        sign(self.key.as_bytes(), self.algorithm, message)
    }
}

/// HMAC verifier bound to one secret and one algorithm
#[derive(Debug, Clone)]
pub struct HmacSignatureVerifier {
    key: OctetKey,
    algorithm: SignatureAlgorithm,
}

impl HmacSignatureVerifier {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` unless `algorithm` is HS256, HS384 or HS512
    pub fn new(key: OctetKey, algorithm: SignatureAlgorithm) -> JwsResult<Self> {
        validate(algorithm.name(), AlgorithmFamily::Hmac)?;
        Ok(Self { key, algorithm })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Check `signature` over `message`
    ///
    /// # Errors
    /// Returns `SignatureVerificationFailed` on mismatch
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> JwsResult<()> {
        verify(self.key.as_bytes(), self.algorithm, message, signature)
    }
}

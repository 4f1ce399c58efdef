//! RSASSA-PKCS1-v1_5 signatures (RS256, RS384, RS512)
//!
//! The PKCS#1 v1.5 signature bytes are the JWS signature as-is.

use crate::algorithms::{AlgorithmFamily, HashAlgorithm, SignatureAlgorithm, validate};
use crate::error::{JwsError, JwsResult};
use crate::keys::check_rsa_key_size;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{SignatureEncoding, Signer, Verifier};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha384, Sha512};

#[derive(Clone)]
enum PreparedSigningKey {
    Sha256(SigningKey<Sha256>),
    Sha384(SigningKey<Sha384>),
    Sha512(SigningKey<Sha512>),
}

#[derive(Debug, Clone)]
enum PreparedVerifyingKey {
    Sha256(VerifyingKey<Sha256>),
    Sha384(VerifyingKey<Sha384>),
    Sha512(VerifyingKey<Sha512>),
}

fn hash_of(algorithm: SignatureAlgorithm) -> JwsResult<HashAlgorithm> {
    validate(algorithm.name(), AlgorithmFamily::Rsa)?;
    algorithm
        .hash()
        .ok_or_else(|| JwsError::invalid_algorithm(format!("{algorithm} has no hash function")))
}

/// RSA signer bound to one private key and one algorithm
#[derive(Clone)]
pub struct RsaSignatureProvider {
    key: PreparedSigningKey,
    algorithm: SignatureAlgorithm,
}

impl RsaSignatureProvider {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` for non-RSA algorithms and `InvalidKey`
    /// when the modulus is smaller than `min_key_bits`
    pub fn new(
        key: RsaPrivateKey,
        algorithm: SignatureAlgorithm,
        min_key_bits: usize,
    ) -> JwsResult<Self> {
        let hash = hash_of(algorithm)?;
        check_rsa_key_size(key.size(), min_key_bits)?;
        let key = match hash {
            HashAlgorithm::Sha256 => PreparedSigningKey::Sha256(SigningKey::new(key)),
            HashAlgorithm::Sha384 => PreparedSigningKey::Sha384(SigningKey::new(key)),
            HashAlgorithm::Sha512 => PreparedSigningKey::Sha512(SigningKey::new(key)),
        };
        Ok(Self { key, algorithm })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// PKCS#1 v1.5 signature over `message`
    ///
    /// # Errors
    /// Returns `SigningError` if the RSA operation fails
    pub fn sign(&self, message: &[u8]) -> JwsResult<Vec<u8>> {
        let signature: Signature = match &self.key {
            PreparedSigningKey::Sha256(key) => key.try_sign(message),
            PreparedSigningKey::Sha384(key) => key.try_sign(message),
            PreparedSigningKey::Sha512(key) => key.try_sign(message),
        }
        .map_err(|e| JwsError::signing(format!("RSA signing failed: {e}")))?;
        Ok(signature.to_vec())
    }
}

impl std::fmt::Debug for RsaSignatureProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaSignatureProvider")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// RSA verifier bound to one public key and one algorithm
#[derive(Debug, Clone)]
pub struct RsaSignatureVerifier {
    key: PreparedVerifyingKey,
    algorithm: SignatureAlgorithm,
}

impl RsaSignatureVerifier {
    /// Bind `key` to `algorithm`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` for non-RSA algorithms and `InvalidKey`
    /// when the modulus is smaller than `min_key_bits`
    pub fn new(
        key: RsaPublicKey,
        algorithm: SignatureAlgorithm,
        min_key_bits: usize,
    ) -> JwsResult<Self> {
        let hash = hash_of(algorithm)?;
        check_rsa_key_size(key.size(), min_key_bits)?;
        let key = match hash {
            HashAlgorithm::Sha256 => PreparedVerifyingKey::Sha256(VerifyingKey::new(key)),
            HashAlgorithm::Sha384 => PreparedVerifyingKey::Sha384(VerifyingKey::new(key)),
            HashAlgorithm::Sha512 => PreparedVerifyingKey::Sha512(VerifyingKey::new(key)),
        };
        Ok(Self { key, algorithm })
    }

    /// Bound algorithm
    #[must_use]
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Check a PKCS#1 v1.5 `signature` over `message`
    ///
    /// # Errors
    /// Returns `SignatureVerificationFailed` on mismatch
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> JwsResult<()> {
        let signature =
            Signature::try_from(signature).map_err(|_| JwsError::SignatureVerificationFailed)?;
        match &self.key {
            PreparedVerifyingKey::Sha256(key) => key.verify(message, &signature),
            PreparedVerifyingKey::Sha384(key) => key.verify(message, &signature),
            PreparedVerifyingKey::Sha512(key) => key.verify(message, &signature),
        }
        .map_err(|_| JwsError::SignatureVerificationFailed)
    }
}

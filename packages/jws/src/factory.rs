//! Selects and builds signature providers and verifiers from key material

use crate::algorithms::{AlgorithmFamily, SignatureAlgorithm};
use crate::config::JwsConfig;
use crate::crypto::{
    EcDsaSignatureProvider, EcDsaSignatureVerifier, HmacSignatureProvider, HmacSignatureVerifier,
    RsaSignatureProvider, RsaSignatureVerifier,
};
use crate::error::{JwsError, JwsResult};
use crate::header::JwsHeaders;
use crate::keys::{EcCurve, JwsSigningKey, JwsVerificationKey, KeyType, validate_hmac_key_length};
use crate::provider::{SignatureProvider, SignatureVerifier};
use tracing::{debug, warn};

/// Factory for [`SignatureProvider`] and [`SignatureVerifier`] values
///
/// The family variant is chosen once, here; the returned values do no
/// further dispatch on key type.
#[derive(Debug, Clone, Default)]
pub struct JwsSignatureFactory {
    config: JwsConfig,
}

impl JwsSignatureFactory {
    /// Factory with the given options
    pub fn new(config: JwsConfig) -> Self {
        Self { config }
    }

    /// Active options
    pub fn config(&self) -> &JwsConfig {
        &self.config
    }

    /// Pick the algorithm for a key: the requested one, else the configured
    /// default, else (if enabled) the key type's default.
    ///
    /// # Errors
    /// `AlgorithmNotSet` if nothing applies, `UnsupportedKeyAlgorithmCombination`
    /// if the algorithm does not fit the key
    pub fn resolve_algorithm(
        &self,
        key_type: KeyType,
        curve: Option<EcCurve>,
        requested: Option<SignatureAlgorithm>,
    ) -> JwsResult<SignatureAlgorithm> {
        let algorithm = match requested.or(self.config.default_algorithm) {
            Some(algorithm) => algorithm,
            None if self.config.infer_algorithm_from_key => {
                SignatureAlgorithm::default_for_key(key_type, curve)
            }
            None => return Err(JwsError::AlgorithmNotSet),
        };

        let expected = match key_type {
            KeyType::Octet => AlgorithmFamily::Hmac,
            KeyType::Rsa => AlgorithmFamily::Rsa,
            KeyType::Ec => AlgorithmFamily::EcDsa,
        };
        let curve_matches = curve.is_none() || algorithm.ec_curve() == curve;
        if algorithm.family() != expected || !curve_matches {
            let key_desc = match curve {
                Some(curve) => format!("{key_type} {curve}"),
                None => key_type.to_string(),
            };
            warn!(key_type = %key_desc, %algorithm, "rejected key and algorithm combination");
            return Err(JwsError::unsupported_combination(key_desc, algorithm));
        }
        Ok(algorithm)
    }

    /// Provider for `key`
    ///
    /// # Errors
    /// As [`resolve_algorithm`](Self::resolve_algorithm), plus `InvalidKey`
    /// for keys rejected by the configured size limits
    pub fn signature_provider(
        &self,
        key: &JwsSigningKey,
        algorithm: Option<SignatureAlgorithm>,
    ) -> JwsResult<SignatureProvider> {
        let algorithm = self.resolve_algorithm(key.key_type(), key.ec_curve(), algorithm)?;
        debug!(key_type = %key.key_type(), %algorithm, "creating signature provider");
        Ok(match key {
            JwsSigningKey::Octet(secret) => {
                if self.config.enforce_hmac_key_length {
                    validate_hmac_key_length(secret.as_bytes(), algorithm)?;
                }
                SignatureProvider::Hmac(HmacSignatureProvider::new(secret.clone(), algorithm)?)
            }
            JwsSigningKey::Rsa(private) => SignatureProvider::Rsa(RsaSignatureProvider::new(
                private.clone(),
                algorithm,
                self.config.min_rsa_key_bits,
            )?),
            JwsSigningKey::Ec(private) => {
                SignatureProvider::EcDsa(EcDsaSignatureProvider::new(private.clone(), algorithm)?)
            }
        })
    }

    /// Verifier for `key`
    ///
    /// # Errors
    /// As [`signature_provider`](Self::signature_provider)
    pub fn signature_verifier(
        &self,
        key: &JwsVerificationKey,
        algorithm: Option<SignatureAlgorithm>,
    ) -> JwsResult<SignatureVerifier> {
        let algorithm = self.resolve_algorithm(key.key_type(), key.ec_curve(), algorithm)?;
        debug!(key_type = %key.key_type(), %algorithm, "creating signature verifier");
        Ok(match key {
            JwsVerificationKey::Octet(secret) => {
                if self.config.enforce_hmac_key_length {
                    validate_hmac_key_length(secret.as_bytes(), algorithm)?;
                }
                SignatureVerifier::Hmac(HmacSignatureVerifier::new(secret.clone(), algorithm)?)
            }
            JwsVerificationKey::Rsa(public) => SignatureVerifier::Rsa(RsaSignatureVerifier::new(
                public.clone(),
                algorithm,
                self.config.min_rsa_key_bits,
            )?),
            JwsVerificationKey::Ec(public) => {
                SignatureVerifier::EcDsa(EcDsaSignatureVerifier::new(public.clone(), algorithm)?)
            }
        })
    }

    /// Verifier for `key`, taking the algorithm from the `alg` header
    ///
    /// # Errors
    /// `InvalidAlgorithm` for an unknown `alg`, otherwise as
    /// [`signature_verifier`](Self::signature_verifier)
    pub fn signature_verifier_for_headers(
        &self,
        key: &JwsVerificationKey,
        headers: &JwsHeaders,
    ) -> JwsResult<SignatureVerifier> {
        let algorithm = headers.signature_algorithm()?;
        self.signature_verifier(key, algorithm)
    }

    /// Provider for unsigned (`none`) tokens
    ///
    /// # Errors
    /// `InvalidAlgorithm` unless unsigned tokens are allowed
    pub fn unsigned_provider(&self) -> JwsResult<SignatureProvider> {
        self.check_unsigned_allowed()?;
        Ok(SignatureProvider::None)
    }

    /// Verifier for unsigned (`none`) tokens
    ///
    /// # Errors
    /// `InvalidAlgorithm` unless unsigned tokens are allowed
    pub fn unsigned_verifier(&self) -> JwsResult<SignatureVerifier> {
        self.check_unsigned_allowed()?;
        Ok(SignatureVerifier::None)
    }

    fn check_unsigned_allowed(&self) -> JwsResult<()> {
        if self.config.allow_unsigned {
            Ok(())
        } else {
            warn!("unsigned JWS requested but not allowed by configuration");
            Err(JwsError::invalid_algorithm(
                "unsigned tokens are disabled by configuration",
            ))
        }
    }
}

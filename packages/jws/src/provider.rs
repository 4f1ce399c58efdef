//! Closed set of signature providers and verifiers, one variant per family

use crate::algorithms::SignatureAlgorithm;
use crate::crypto::{
    EcDsaSignatureProvider, EcDsaSignatureVerifier, HmacSignatureProvider, HmacSignatureVerifier,
    RsaSignatureProvider, RsaSignatureVerifier,
};
use crate::error::{JwsError, JwsResult};
use crate::header::JwsHeaders;
use crate::traits::{JwsSignatureProvider, JwsSignatureVerifier};
use tracing::debug;

/// Signature provider for one key and one algorithm
#[derive(Debug, Clone)]
pub enum SignatureProvider {
    /// HS256 / HS384 / HS512
    Hmac(HmacSignatureProvider),
    /// RS256 / RS384 / RS512
    Rsa(RsaSignatureProvider),
    /// ES256 / ES384 / ES512
    EcDsa(EcDsaSignatureProvider),
    /// `none`: empty signature
    None,
}

impl JwsSignatureProvider for SignatureProvider {
    fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            SignatureProvider::Hmac(p) => p.algorithm(),
            SignatureProvider::Rsa(p) => p.algorithm(),
            SignatureProvider::EcDsa(p) => p.algorithm(),
            SignatureProvider::None => SignatureAlgorithm::None,
        }
    }

    fn sign(&self, headers: &JwsHeaders, signing_input: &[u8]) -> JwsResult<Vec<u8>> {
        let algorithm = self.algorithm();
        if let Some(declared) = headers.algorithm()
            && declared != algorithm.name()
        {
            return Err(JwsError::invalid_algorithm(format!(
                "header declares {declared}, provider signs with {algorithm}"
            )));
        }
        debug!(%algorithm, input_len = signing_input.len(), "signing JWS input");
        match self {
            SignatureProvider::Hmac(p) => p.sign(signing_input),
            SignatureProvider::Rsa(p) => p.sign(signing_input),
            SignatureProvider::EcDsa(p) => p.sign(signing_input),
            SignatureProvider::None => Ok(Vec::new()),
        }
    }
}

/// Signature verifier for one key and one algorithm
#[derive(Debug, Clone)]
pub enum SignatureVerifier {
    /// HS256 / HS384 / HS512
    Hmac(HmacSignatureVerifier),
    /// RS256 / RS384 / RS512
    Rsa(RsaSignatureVerifier),
    /// ES256 / ES384 / ES512
    EcDsa(EcDsaSignatureVerifier),
    /// `none`: accepts only an empty signature
    None,
}

impl JwsSignatureVerifier for SignatureVerifier {
    fn algorithm(&self) -> SignatureAlgorithm {
        match self {
            SignatureVerifier::Hmac(v) => v.algorithm(),
            SignatureVerifier::Rsa(v) => v.algorithm(),
            SignatureVerifier::EcDsa(v) => v.algorithm(),
            SignatureVerifier::None => SignatureAlgorithm::None,
        }
    }

    fn verify(
        &self,
        headers: &JwsHeaders,
        signing_input: &[u8],
        signature: &[u8],
    ) -> JwsResult<()> {
        let algorithm = self.algorithm();
        match headers.algorithm() {
            None => return Err(JwsError::AlgorithmNotSet),
            Some(declared) if declared != algorithm.name() => {
                return Err(JwsError::invalid_algorithm(format!(
                    "header declares {declared}, verifier expects {algorithm}"
                )));
            }
            Some(_) => {}
        }
        let result = match self {
            SignatureVerifier::Hmac(v) => v.verify(signing_input, signature),
            SignatureVerifier::Rsa(v) => v.verify(signing_input, signature),
            SignatureVerifier::EcDsa(v) => v.verify(signing_input, signature),
            SignatureVerifier::None if signature.is_empty() => Ok(()),
            SignatureVerifier::None => Err(JwsError::SignatureVerificationFailed),
        };
        debug!(%algorithm, accepted = result.is_ok(), "verified JWS signature");
        result
    }
}

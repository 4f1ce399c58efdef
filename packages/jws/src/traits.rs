//! Provider and verifier interfaces used by the serializers.

use crate::algorithms::SignatureAlgorithm;
use crate::error::JwsResult;
use crate::header::JwsHeaders;
use std::sync::Arc;

/// Produces signatures over a JWS signing input.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait JwsSignatureProvider: Send + Sync {
    /// Algorithm written to the `alg` header.
    fn algorithm(&self) -> SignatureAlgorithm;

    /// Sign `signing_input`. `headers` are the headers of the signature being
    /// produced, already committed to the input.
    fn sign(&self, headers: &JwsHeaders, signing_input: &[u8]) -> JwsResult<Vec<u8>>;
}

/// Checks signatures over a JWS signing input.
///
/// Implementations must be thread-safe (Send + Sync).
pub trait JwsSignatureVerifier: Send + Sync {
    /// Algorithm this verifier accepts.
    fn algorithm(&self) -> SignatureAlgorithm;

    /// Verify `signature` over `signing_input`. `headers` is the union of the
    /// protected and unprotected headers of the signature being checked.
    ///
    /// A mismatch is `Err(JwsError::SignatureVerificationFailed)`; any other
    /// error is structural.
    fn verify(&self, headers: &JwsHeaders, signing_input: &[u8], signature: &[u8]) -> JwsResult<()>;
}

impl<T: JwsSignatureProvider + ?Sized> JwsSignatureProvider for Arc<T> {
    fn algorithm(&self) -> SignatureAlgorithm {
        (**self).algorithm()
    }

    fn sign(&self, headers: &JwsHeaders, signing_input: &[u8]) -> JwsResult<Vec<u8>> {
        (**self).sign(headers, signing_input)
    }
}

impl<T: JwsSignatureVerifier + ?Sized> JwsSignatureVerifier for Arc<T> {
    fn algorithm(&self) -> SignatureAlgorithm {
        (**self).algorithm()
    }

    fn verify(
        &self,
        headers: &JwsHeaders,
        signing_input: &[u8],
        signature: &[u8],
    ) -> JwsResult<()> {
        (**self).verify(headers, signing_input, signature)
    }
}

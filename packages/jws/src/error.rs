//! JWS error types

use thiserror::Error;

/// JWS operation result type
pub type JwsResult<T> = Result<T, JwsError>;

/// JWS error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwsError {
    /// No `alg` header where one is required
    #[error("Signature algorithm is not set")]
    AlgorithmNotSet,

    /// Unknown algorithm name, or an algorithm outside the expected family
    #[error("Invalid signature algorithm: {0}")]
    InvalidAlgorithm(String),

    /// The key type cannot be used with the requested algorithm
    #[error("Unsupported key and algorithm combination: {key_type} key with {algorithm}")]
    UnsupportedKeyAlgorithmCombination {
        /// Key type of the offending key
        key_type: String,
        /// Requested algorithm name
        algorithm: String,
    },

    /// The same header parameter appears in both protected and unprotected headers
    #[error("Duplicate header key: {0}")]
    DuplicateHeaderKey(String),

    /// Compact serialization could not be parsed
    #[error("Malformed compact JWS: {0}")]
    MalformedCompactToken(String),

    /// JSON serialization is missing required members or is otherwise invalid
    #[error("Invalid JWS JSON document: {0}")]
    InvalidJsonJws(String),

    /// ECDSA raw signature has the wrong size for its algorithm
    #[error("ECDSA signature length mismatch: expected {expected} bytes, got {actual}")]
    SignatureLengthMismatch {
        /// Length required by the algorithm
        expected: usize,
        /// Length actually received
        actual: usize,
    },

    /// Malformed ASN.1 DER signature structure
    #[error("DER signature conversion failed: {0}")]
    DerConversionError(String),

    /// Signature does not match the signing input
    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    /// Key material is unusable
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// `crit` header is malformed or names an unsupported extension
    #[error("Invalid critical header: {0}")]
    InvalidCriticalHeader(String),

    /// Header or document encoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A signed form was requested before any signature was computed
    #[error("JWS has not been signed")]
    NotSigned,

    /// Underlying signature primitive failed to produce a signature
    #[error("Signing error: {0}")]
    SigningError(String),
}

impl JwsError {
    /// Create an invalid algorithm error
    #[inline]
    #[must_use]
    pub fn invalid_algorithm(msg: impl Into<String>) -> Self {
        JwsError::InvalidAlgorithm(msg.into())
    }

    /// Create an unsupported key/algorithm combination error
    #[inline]
    #[must_use]
    pub fn unsupported_combination(key_type: impl ToString, algorithm: impl ToString) -> Self {
        JwsError::UnsupportedKeyAlgorithmCombination {
            key_type: key_type.to_string(),
            algorithm: algorithm.to_string(),
        }
    }

    /// Create a malformed compact token error
    #[inline]
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        JwsError::MalformedCompactToken(msg.into())
    }

    /// Create an invalid JSON JWS error
    #[inline]
    #[must_use]
    pub fn invalid_json(msg: impl Into<String>) -> Self {
        JwsError::InvalidJsonJws(msg.into())
    }

    /// Create a DER conversion error
    #[inline]
    #[must_use]
    pub fn der(msg: impl Into<String>) -> Self {
        JwsError::DerConversionError(msg.into())
    }

    /// Create an invalid key error
    #[inline]
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        JwsError::InvalidKey(msg.into())
    }

    /// Create an invalid critical header error
    #[inline]
    #[must_use]
    pub fn invalid_critical(msg: impl Into<String>) -> Self {
        JwsError::InvalidCriticalHeader(msg.into())
    }

    /// Create a serialization error
    #[inline]
    #[must_use]
    pub fn serialization(msg: impl Into<String>) -> Self {
        JwsError::Serialization(msg.into())
    }

    /// Create a signing error
    #[inline]
    #[must_use]
    pub fn signing(msg: impl Into<String>) -> Self {
        JwsError::SigningError(msg.into())
    }

    /// `true` only for a signature mismatch, the one failure that the
    /// "verify with" entry points report as `false` instead of an error.
    #[inline]
    #[must_use]
    pub fn is_verification_failure(&self) -> bool {
        matches!(self, JwsError::SignatureVerificationFailed)
    }
}

impl From<serde_json::Error> for JwsError {
    fn from(err: serde_json::Error) -> Self {
        JwsError::Serialization(err.to_string())
    }
}

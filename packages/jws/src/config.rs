//! Signature factory configuration.

use crate::algorithms::SignatureAlgorithm;
use serde::{Deserialize, Serialize};

/// Smallest RSA modulus accepted by default, in bits.
pub const DEFAULT_MIN_RSA_KEY_BITS: usize = 2048;

/// Options applied by [`JwsSignatureFactory`](crate::factory::JwsSignatureFactory)
/// when it turns key material into providers and verifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwsConfig {
    /// Algorithm used when the caller names none.
    pub default_algorithm: Option<SignatureAlgorithm>,
    /// Fall back to the key type's default algorithm.
    pub infer_algorithm_from_key: bool,
    /// Minimum RSA modulus size in bits.
    pub min_rsa_key_bits: usize,
    /// Reject HMAC secrets shorter than the hash output.
    pub enforce_hmac_key_length: bool,
    /// Hand out `none` providers and verifiers.
    pub allow_unsigned: bool,
}

impl Default for JwsConfig {
    fn default() -> Self {
        Self {
            default_algorithm: None,
            infer_algorithm_from_key: true,
            min_rsa_key_bits: DEFAULT_MIN_RSA_KEY_BITS,
            enforce_hmac_key_length: false,
            allow_unsigned: false,
        }
    }
}

impl JwsConfig {
    /// Strict options: algorithms must be named explicitly and HMAC secrets
    /// must be at least as long as the hash output.
    pub fn strict() -> Self {
        Self {
            default_algorithm: None,
            infer_algorithm_from_key: false,
            min_rsa_key_bits: DEFAULT_MIN_RSA_KEY_BITS,
            enforce_hmac_key_length: true,
            allow_unsigned: false,
        }
    }

    /// Set the fallback algorithm.
    pub fn with_default_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.default_algorithm = Some(algorithm);
        self
    }

    /// Set whether the key type decides a missing algorithm.
    pub fn with_algorithm_inference(mut self, infer: bool) -> Self {
        self.infer_algorithm_from_key = infer;
        self
    }

    /// Set the minimum RSA modulus size.
    pub fn with_min_rsa_key_bits(mut self, bits: usize) -> Self {
        self.min_rsa_key_bits = bits;
        self
    }

    /// Set whether short HMAC secrets are rejected.
    pub fn with_hmac_key_length_enforced(mut self, enforce: bool) -> Self {
        self.enforce_hmac_key_length = enforce;
        self
    }

    /// Set whether unsigned (`none`) tokens are allowed.
    pub fn with_unsigned_allowed(mut self, allow: bool) -> Self {
        self.allow_unsigned = allow;
        self
    }
}

//! JWS signature algorithm registry
//!
//! Canonical JWA names, the family each algorithm belongs to and, for ECDSA,
//! the fixed size of the raw `R || S` signature.

use crate::error::{JwsError, JwsResult};
use crate::keys::{EcCurve, KeyType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Cryptographic primitive category of a signature algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// Keyed hash (HS*)
    Hmac,
    /// RSASSA-PKCS1-v1_5 (RS*)
    Rsa,
    /// ECDSA over NIST curves (ES*)
    EcDsa,
    /// Unsigned (`none`)
    None,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlgorithmFamily::Hmac => "HMAC",
            AlgorithmFamily::Rsa => "RSA",
            AlgorithmFamily::EcDsa => "ECDSA",
            AlgorithmFamily::None => "none",
        };
        f.write_str(name)
    }
}

/// Hash function bound to an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// JWS signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
    /// RSASSA-PKCS1-v1_5 using SHA-256
    RS256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    RS384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    RS512,
    /// ECDSA using P-256 and SHA-256
    ES256,
    /// ECDSA using P-384 and SHA-384
    ES384,
    /// ECDSA using P-521 and SHA-512
    ES512,
    /// No digital signature or MAC
    None,
}

struct AlgorithmEntry {
    algorithm: SignatureAlgorithm,
    name: &'static str,
    family: AlgorithmFamily,
    hash: Option<HashAlgorithm>,
    raw_signature_len: Option<usize>,
}

const REGISTRY: [AlgorithmEntry; 10] = [
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::HS256,
        name: "HS256",
        family: AlgorithmFamily::Hmac,
        hash: Some(HashAlgorithm::Sha256),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::HS384,
        name: "HS384",
        family: AlgorithmFamily::Hmac,
        hash: Some(HashAlgorithm::Sha384),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::HS512,
        name: "HS512",
        family: AlgorithmFamily::Hmac,
        hash: Some(HashAlgorithm::Sha512),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::RS256,
        name: "RS256",
        family: AlgorithmFamily::Rsa,
        hash: Some(HashAlgorithm::Sha256),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::RS384,
        name: "RS384",
        family: AlgorithmFamily::Rsa,
        hash: Some(HashAlgorithm::Sha384),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::RS512,
        name: "RS512",
        family: AlgorithmFamily::Rsa,
        hash: Some(HashAlgorithm::Sha512),
        raw_signature_len: None,
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::ES256,
        name: "ES256",
        family: AlgorithmFamily::EcDsa,
        hash: Some(HashAlgorithm::Sha256),
        raw_signature_len: Some(64),
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::ES384,
        name: "ES384",
        family: AlgorithmFamily::EcDsa,
        hash: Some(HashAlgorithm::Sha384),
        raw_signature_len: Some(96),
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::ES512,
        name: "ES512",
        family: AlgorithmFamily::EcDsa,
        hash: Some(HashAlgorithm::Sha512),
        raw_signature_len: Some(132),
    },
    AlgorithmEntry {
        algorithm: SignatureAlgorithm::None,
        name: "none",
        family: AlgorithmFamily::None,
        hash: None,
        raw_signature_len: None,
    },
];

impl SignatureAlgorithm {
    /// All registered algorithms, in registry order
    pub const ALL: [SignatureAlgorithm; 10] = [
        SignatureAlgorithm::HS256,
        SignatureAlgorithm::HS384,
        SignatureAlgorithm::HS512,
        SignatureAlgorithm::RS256,
        SignatureAlgorithm::RS384,
        SignatureAlgorithm::RS512,
        SignatureAlgorithm::ES256,
        SignatureAlgorithm::ES384,
        SignatureAlgorithm::ES512,
        SignatureAlgorithm::None,
    ];

    fn entry(self) -> &'static AlgorithmEntry {
        // REGISTRY is declared in the same order as the enum
        &REGISTRY[self as usize]
    }

    /// Look up an algorithm by its JWA name (case-sensitive)
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` for unknown names
    pub fn from_name(name: &str) -> JwsResult<Self> {
        REGISTRY
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.algorithm)
            .ok_or_else(|| JwsError::invalid_algorithm(format!("unknown algorithm '{name}'")))
    }

    /// JWA name as it appears in the `alg` header
    #[must_use]
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Algorithm family
    #[must_use]
    pub fn family(self) -> AlgorithmFamily {
        self.entry().family
    }

    /// Hash function, `None` for the unsigned algorithm
    #[must_use]
    pub fn hash(self) -> Option<HashAlgorithm> {
        self.entry().hash
    }

    /// Required size of a raw ECDSA signature (64, 96 or 132 bytes)
    #[must_use]
    pub fn ec_signature_length(self) -> Option<usize> {
        self.entry().raw_signature_len
    }

    /// Curve an ECDSA algorithm is bound to
    #[must_use]
    pub fn ec_curve(self) -> Option<EcCurve> {
        match self {
            SignatureAlgorithm::ES256 => Some(EcCurve::P256),
            SignatureAlgorithm::ES384 => Some(EcCurve::P384),
            SignatureAlgorithm::ES512 => Some(EcCurve::P521),
            _ => None,
        }
    }

    /// Recommended key size in bytes
    ///
    /// HMAC secrets should be at least as long as the hash output, EC keys
    /// match the curve order and RSA moduli should be at least 2048 bits.
    #[must_use]
    pub fn recommended_key_size(self) -> usize {
        match self {
            SignatureAlgorithm::HS256 | SignatureAlgorithm::ES256 => 32,
            SignatureAlgorithm::HS384 | SignatureAlgorithm::ES384 => 48,
            SignatureAlgorithm::HS512 => 64,
            SignatureAlgorithm::ES512 => 66,
            SignatureAlgorithm::RS256 | SignatureAlgorithm::RS384 | SignatureAlgorithm::RS512 => {
                256
            }
            SignatureAlgorithm::None => 0,
        }
    }

    /// Default algorithm for a key type: HS256 for octet keys, RS256 for RSA
    /// keys and the curve's own ES algorithm for EC keys.
    #[must_use]
    pub fn default_for_key(key_type: KeyType, curve: Option<EcCurve>) -> Self {
        match key_type {
            KeyType::Octet => SignatureAlgorithm::HS256,
            KeyType::Rsa => SignatureAlgorithm::RS256,
            KeyType::Ec => match curve {
                Some(EcCurve::P384) => SignatureAlgorithm::ES384,
                Some(EcCurve::P521) => SignatureAlgorithm::ES512,
                Some(EcCurve::P256) | None => SignatureAlgorithm::ES256,
            },
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = JwsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl Serialize for SignatureAlgorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SignatureAlgorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

/// Resolve `name` and require it to belong to `expected_family`
///
/// # Errors
/// Returns `InvalidAlgorithm` if the name is unknown or in another family
pub fn validate(name: &str, expected_family: AlgorithmFamily) -> JwsResult<SignatureAlgorithm> {
    let algorithm = SignatureAlgorithm::from_name(name)?;
    if algorithm.family() != expected_family {
        return Err(JwsError::invalid_algorithm(format!(
            "{name} is not a {expected_family} algorithm"
        )));
    }
    Ok(algorithm)
}

/// Like [`validate`], but an absent name is `AlgorithmNotSet`
///
/// # Errors
/// Returns `AlgorithmNotSet` when `name` is `None`, otherwise as [`validate`]
pub fn check_algorithm(
    name: Option<&str>,
    expected_family: AlgorithmFamily,
) -> JwsResult<SignatureAlgorithm> {
    match name {
        Some(name) => validate(name, expected_family),
        None => Err(JwsError::AlgorithmNotSet),
    }
}

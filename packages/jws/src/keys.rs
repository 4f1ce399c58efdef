//! Key material for JWS signing and verification
//!
//! Keys are thin wrappers over the RustCrypto key types. Loading from PKCS#8
//! and SPKI (DER or PEM) and from raw SEC1/scalar bytes is supported; JWK and
//! keystore formats are not.

use crate::algorithms::SignatureAlgorithm;
use crate::error::{JwsError, JwsResult};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Key type (the JWK `kty` vocabulary)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    /// Symmetric secret
    Octet,
    /// RSA key pair
    Rsa,
    /// Elliptic curve key pair
    Ec,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyType::Octet => "oct",
            KeyType::Rsa => "RSA",
            KeyType::Ec => "EC",
        })
    }
}

/// NIST curves usable with ECDSA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcCurve {
    /// P-256 (secp256r1)
    P256,
    /// P-384 (secp384r1)
    P384,
    /// P-521 (secp521r1)
    P521,
}

impl fmt::Display for EcCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        })
    }
}

/// Symmetric secret, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct OctetKey(Vec<u8>);

impl OctetKey {
    /// Wrap secret bytes
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self(secret.into())
    }

    /// Secret bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Secret length in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for OctetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OctetKey({} bytes)", self.0.len())
    }
}

/// ECDSA private key on one of the supported curves
#[derive(Clone)]
pub enum EcSigningKey {
    /// P-256 key
    P256(p256::ecdsa::SigningKey),
    /// P-384 key
    P384(p384::ecdsa::SigningKey),
    /// P-521 key
    P521(p521::ecdsa::SigningKey),
}

impl EcSigningKey {
    /// Curve of this key
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            EcSigningKey::P256(_) => EcCurve::P256,
            EcSigningKey::P384(_) => EcCurve::P384,
            EcSigningKey::P521(_) => EcCurve::P521,
        }
    }

    /// Load from a big-endian private scalar
    ///
    /// # Errors
    /// Returns `InvalidKey` if the scalar is out of range for the curve
    pub fn from_scalar(curve: EcCurve, scalar: &[u8]) -> JwsResult<Self> {
        let invalid = |e: p256::ecdsa::Error| {
            JwsError::invalid_key(format!("invalid {curve} private scalar: {e}"))
        };
        Ok(match curve {
            EcCurve::P256 => {
                EcSigningKey::P256(p256::ecdsa::SigningKey::from_slice(scalar).map_err(invalid)?)
            }
            EcCurve::P384 => {
                EcSigningKey::P384(p384::ecdsa::SigningKey::from_slice(scalar).map_err(invalid)?)
            }
            EcCurve::P521 => {
                EcSigningKey::P521(p521::ecdsa::SigningKey::from_slice(scalar).map_err(invalid)?)
            }
        })
    }

    /// Load a PKCS#8 DER private key, detecting the curve
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn from_pkcs8_der(der: &[u8]) -> JwsResult<Self> {
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(EcSigningKey::P256(key));
        }
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_der(der) {
            return Ok(EcSigningKey::P384(key));
        }
        let secret = p521::SecretKey::from_pkcs8_der(der)
            .map_err(|e| JwsError::invalid_key(format!("invalid EC private key: {e}")))?;
        p521_from_secret(&secret)
    }

    /// Load a PKCS#8 PEM private key, detecting the curve
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn from_pkcs8_pem(pem: &str) -> JwsResult<Self> {
        if let Ok(key) = p256::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(EcSigningKey::P256(key));
        }
        if let Ok(key) = p384::ecdsa::SigningKey::from_pkcs8_pem(pem) {
            return Ok(EcSigningKey::P384(key));
        }
        let secret = p521::SecretKey::from_pkcs8_pem(pem)
            .map_err(|e| JwsError::invalid_key(format!("invalid EC private key: {e}")))?;
        p521_from_secret(&secret)
    }

    /// Matching public key
    #[must_use]
    pub fn verifying_key(&self) -> EcVerifyingKey {
        match self {
            EcSigningKey::P256(key) => EcVerifyingKey::P256(p256::ecdsa::VerifyingKey::from(key)),
            EcSigningKey::P384(key) => EcVerifyingKey::P384(p384::ecdsa::VerifyingKey::from(key)),
            EcSigningKey::P521(key) => EcVerifyingKey::P521(p521::ecdsa::VerifyingKey::from(key)),
        }
    }
}

fn p521_from_secret(secret: &p521::SecretKey) -> JwsResult<EcSigningKey> {
    p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())
        .map(EcSigningKey::P521)
        .map_err(|e| JwsError::invalid_key(format!("invalid P-521 private key: {e}")))
}

impl fmt::Debug for EcSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcSigningKey({})", self.curve())
    }
}

/// ECDSA public key on one of the supported curves
#[derive(Clone)]
pub enum EcVerifyingKey {
    /// P-256 key
    P256(p256::ecdsa::VerifyingKey),
    /// P-384 key
    P384(p384::ecdsa::VerifyingKey),
    /// P-521 key
    P521(p521::ecdsa::VerifyingKey),
}

impl EcVerifyingKey {
    /// Curve of this key
    #[must_use]
    pub fn curve(&self) -> EcCurve {
        match self {
            EcVerifyingKey::P256(_) => EcCurve::P256,
            EcVerifyingKey::P384(_) => EcCurve::P384,
            EcVerifyingKey::P521(_) => EcCurve::P521,
        }
    }

    /// Load from a SEC1 encoded point (compressed or uncompressed)
    ///
    /// # Errors
    /// Returns `InvalidKey` if the point is not on the curve
    pub fn from_sec1_bytes(curve: EcCurve, point: &[u8]) -> JwsResult<Self> {
        let invalid = |e: p256::ecdsa::Error| {
            JwsError::invalid_key(format!("invalid {curve} public point: {e}"))
        };
        Ok(match curve {
            EcCurve::P256 => EcVerifyingKey::P256(
                p256::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid)?,
            ),
            EcCurve::P384 => EcVerifyingKey::P384(
                p384::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid)?,
            ),
            EcCurve::P521 => EcVerifyingKey::P521(
                p521::ecdsa::VerifyingKey::from_sec1_bytes(point).map_err(invalid)?,
            ),
        })
    }

    /// Load an SPKI DER public key, detecting the curve
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn from_public_key_der(der: &[u8]) -> JwsResult<Self> {
        if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_der(der) {
            return Ok(EcVerifyingKey::P256(key));
        }
        if let Ok(key) = p384::ecdsa::VerifyingKey::from_public_key_der(der) {
            return Ok(EcVerifyingKey::P384(key));
        }
        let public = p521::PublicKey::from_public_key_der(der)
            .map_err(|e| JwsError::invalid_key(format!("invalid EC public key: {e}")))?;
        p521_from_public(&public)
    }

    /// Load an SPKI PEM public key, detecting the curve
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn from_public_key_pem(pem: &str) -> JwsResult<Self> {
        if let Ok(key) = p256::ecdsa::VerifyingKey::from_public_key_pem(pem) {
            return Ok(EcVerifyingKey::P256(key));
        }
        if let Ok(key) = p384::ecdsa::VerifyingKey::from_public_key_pem(pem) {
            return Ok(EcVerifyingKey::P384(key));
        }
        let public = p521::PublicKey::from_public_key_pem(pem)
            .map_err(|e| JwsError::invalid_key(format!("invalid EC public key: {e}")))?;
        p521_from_public(&public)
    }
}

fn p521_from_public(public: &p521::PublicKey) -> JwsResult<EcVerifyingKey> {
    p521::ecdsa::VerifyingKey::from_sec1_bytes(&public.to_sec1_bytes())
        .map(EcVerifyingKey::P521)
        .map_err(|e| JwsError::invalid_key(format!("invalid P-521 public key: {e}")))
}

impl fmt::Debug for EcVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcVerifyingKey({})", self.curve())
    }
}

/// Key material used to produce signatures
#[derive(Clone)]
pub enum JwsSigningKey {
    /// HMAC secret
    Octet(OctetKey),
    /// RSA private key
    Rsa(RsaPrivateKey),
    /// EC private key
    Ec(EcSigningKey),
}

impl JwsSigningKey {
    /// HMAC secret from raw bytes
    pub fn octet(secret: impl Into<Vec<u8>>) -> Self {
        JwsSigningKey::Octet(OctetKey::new(secret))
    }

    /// RSA private key from PKCS#8 DER
    ///
    /// # Errors
    /// Returns `InvalidKey` if the document is not an RSA private key
    pub fn rsa_from_pkcs8_der(der: &[u8]) -> JwsResult<Self> {
        RsaPrivateKey::from_pkcs8_der(der)
            .map(JwsSigningKey::Rsa)
            .map_err(|e| JwsError::invalid_key(format!("invalid RSA private key: {e}")))
    }

    /// RSA private key from PKCS#8 PEM
    ///
    /// # Errors
    /// Returns `InvalidKey` if the document is not an RSA private key
    pub fn rsa_from_pkcs8_pem(pem: &str) -> JwsResult<Self> {
        RsaPrivateKey::from_pkcs8_pem(pem)
            .map(JwsSigningKey::Rsa)
            .map_err(|e| JwsError::invalid_key(format!("invalid RSA private key: {e}")))
    }

    /// EC private key from PKCS#8 DER
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn ec_from_pkcs8_der(der: &[u8]) -> JwsResult<Self> {
        EcSigningKey::from_pkcs8_der(der).map(JwsSigningKey::Ec)
    }

    /// EC private key from PKCS#8 PEM
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn ec_from_pkcs8_pem(pem: &str) -> JwsResult<Self> {
        EcSigningKey::from_pkcs8_pem(pem).map(JwsSigningKey::Ec)
    }

    /// EC private key from a raw scalar
    ///
    /// # Errors
    /// Returns `InvalidKey` if the scalar is out of range
    pub fn ec_from_scalar(curve: EcCurve, scalar: &[u8]) -> JwsResult<Self> {
        EcSigningKey::from_scalar(curve, scalar).map(JwsSigningKey::Ec)
    }

    /// Key type
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            JwsSigningKey::Octet(_) => KeyType::Octet,
            JwsSigningKey::Rsa(_) => KeyType::Rsa,
            JwsSigningKey::Ec(_) => KeyType::Ec,
        }
    }

    /// Curve for EC keys
    #[must_use]
    pub fn ec_curve(&self) -> Option<EcCurve> {
        match self {
            JwsSigningKey::Ec(key) => Some(key.curve()),
            _ => None,
        }
    }

    /// Key that verifies this key's signatures
    #[must_use]
    pub fn verification_key(&self) -> JwsVerificationKey {
        match self {
            JwsSigningKey::Octet(secret) => JwsVerificationKey::Octet(secret.clone()),
            JwsSigningKey::Rsa(key) => JwsVerificationKey::Rsa(key.to_public_key()),
            JwsSigningKey::Ec(key) => JwsVerificationKey::Ec(key.verifying_key()),
        }
    }
}

impl fmt::Debug for JwsSigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwsSigningKey::Octet(secret) => f.debug_tuple("Octet").field(secret).finish(),
            JwsSigningKey::Rsa(key) => write!(f, "Rsa({} bits)", key.size() * 8),
            JwsSigningKey::Ec(key) => f.debug_tuple("Ec").field(key).finish(),
        }
    }
}

/// Key material used to check signatures
#[derive(Clone)]
pub enum JwsVerificationKey {
    /// HMAC secret
    Octet(OctetKey),
    /// RSA public key
    Rsa(RsaPublicKey),
    /// EC public key
    Ec(EcVerifyingKey),
}

impl JwsVerificationKey {
    /// HMAC secret from raw bytes
    pub fn octet(secret: impl Into<Vec<u8>>) -> Self {
        JwsVerificationKey::Octet(OctetKey::new(secret))
    }

    /// RSA public key from SPKI DER
    ///
    /// # Errors
    /// Returns `InvalidKey` if the document is not an RSA public key
    pub fn rsa_from_public_key_der(der: &[u8]) -> JwsResult<Self> {
        RsaPublicKey::from_public_key_der(der)
            .map(JwsVerificationKey::Rsa)
            .map_err(|e| JwsError::invalid_key(format!("invalid RSA public key: {e}")))
    }

    /// RSA public key from SPKI PEM
    ///
    /// # Errors
    /// Returns `InvalidKey` if the document is not an RSA public key
    pub fn rsa_from_public_key_pem(pem: &str) -> JwsResult<Self> {
        RsaPublicKey::from_public_key_pem(pem)
            .map(JwsVerificationKey::Rsa)
            .map_err(|e| JwsError::invalid_key(format!("invalid RSA public key: {e}")))
    }

    /// EC public key from SPKI DER
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn ec_from_public_key_der(der: &[u8]) -> JwsResult<Self> {
        EcVerifyingKey::from_public_key_der(der).map(JwsVerificationKey::Ec)
    }

    /// EC public key from SPKI PEM
    ///
    /// # Errors
    /// Returns `InvalidKey` if no supported curve accepts the document
    pub fn ec_from_public_key_pem(pem: &str) -> JwsResult<Self> {
        EcVerifyingKey::from_public_key_pem(pem).map(JwsVerificationKey::Ec)
    }

    /// EC public key from a SEC1 encoded point
    ///
    /// # Errors
    /// Returns `InvalidKey` if the point is not on the curve
    pub fn ec_from_sec1_bytes(curve: EcCurve, point: &[u8]) -> JwsResult<Self> {
        EcVerifyingKey::from_sec1_bytes(curve, point).map(JwsVerificationKey::Ec)
    }

    /// Key type
    #[must_use]
    pub fn key_type(&self) -> KeyType {
        match self {
            JwsVerificationKey::Octet(_) => KeyType::Octet,
            JwsVerificationKey::Rsa(_) => KeyType::Rsa,
            JwsVerificationKey::Ec(_) => KeyType::Ec,
        }
    }

    /// Curve for EC keys
    #[must_use]
    pub fn ec_curve(&self) -> Option<EcCurve> {
        match self {
            JwsVerificationKey::Ec(key) => Some(key.curve()),
            _ => None,
        }
    }
}

impl fmt::Debug for JwsVerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JwsVerificationKey::Octet(secret) => f.debug_tuple("Octet").field(secret).finish(),
            JwsVerificationKey::Rsa(key) => write!(f, "Rsa({} bits)", key.size() * 8),
            JwsVerificationKey::Ec(key) => f.debug_tuple("Ec").field(key).finish(),
        }
    }
}

/// Minimum HMAC secret length for an algorithm (the hash output size)
#[must_use]
pub fn min_hmac_key_length(algorithm: SignatureAlgorithm) -> Option<usize> {
    match algorithm {
        SignatureAlgorithm::HS256 => Some(32),
        SignatureAlgorithm::HS384 => Some(48),
        SignatureAlgorithm::HS512 => Some(64),
        _ => None,
    }
}

/// Validate HMAC secret length against the algorithm's hash size
///
/// # Errors
/// Returns `InvalidKey` if the secret is shorter than the hash output
pub fn validate_hmac_key_length(secret: &[u8], algorithm: SignatureAlgorithm) -> JwsResult<()> {
    let Some(min_length) = min_hmac_key_length(algorithm) else {
        return Err(JwsError::unsupported_combination(KeyType::Octet, algorithm));
    };

    if secret.len() < min_length {
        return Err(JwsError::invalid_key(format!(
            "HMAC key for {algorithm} must be at least {min_length} bytes, got {}",
            secret.len()
        )));
    }

    Ok(())
}

/// Validate the RSA modulus size
///
/// # Errors
/// Returns `InvalidKey` if the modulus is smaller than `min_bits`
pub fn check_rsa_key_size(modulus_bytes: usize, min_bits: usize) -> JwsResult<()> {
    let bits = modulus_bytes * 8;
    if bits < min_bits {
        return Err(JwsError::invalid_key(format!(
            "RSA key must be at least {min_bits} bits, got {bits}"
        )));
    }
    Ok(())
}

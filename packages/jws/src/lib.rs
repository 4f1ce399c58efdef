//! JSON Web Signature (JWS) producers and consumers
//!
//! This crate provides:
//! - Compact (`header.payload.signature`) and JSON (general and flattened)
//!   serializations
//! - HMAC, RSA PKCS#1 v1.5 and ECDSA signatures, with DER to raw `r || s`
//!   conversion for ECDSA
//! - Unsigned tokens, detached content and unencoded payloads (RFC 7797)
//! - A factory that turns key material into providers and verifiers
//!
//! ```no_run
//! use cryypt_jws::{JwsCompactConsumer, JwsCompactProducer, JwsHeaders, JwsSignatureFactory,
//!     JwsSigningKey, SignatureAlgorithm};
//!
//! # fn main() -> cryypt_jws::JwsResult<()> {
//! let key = JwsSigningKey::octet(b"secret".to_vec());
//! let factory = JwsSignatureFactory::default();
//! let provider = factory.signature_provider(&key, Some(SignatureAlgorithm::HS256))?;
//! let token = JwsCompactProducer::new(JwsHeaders::new(), "hello").sign_with(&provider)?;
//!
//! let verifier = factory.signature_verifier(&key.verification_key(), None)?;
//! assert!(JwsCompactConsumer::new(&token)?.verify_signature_with(&verifier)?);
//! # Ok(())
//! # }
//! ```

pub mod algorithms;
pub mod compact;
pub mod config;
pub mod crypto;
pub mod encoding;
mod error;
pub mod factory;
pub mod header;
pub mod json;
pub mod keys;
pub mod provider;
pub mod traits;
pub mod utils;

pub use algorithms::{AlgorithmFamily, HashAlgorithm, SignatureAlgorithm};
pub use compact::{JwsCompactConsumer, JwsCompactProducer};
pub use config::JwsConfig;
pub use error::*;
pub use factory::JwsSignatureFactory;
pub use header::JwsHeaders;
pub use json::{JwsJsonConsumer, JwsJsonProducer, JwsJsonSignatureEntry, signature_map};
pub use keys::{EcCurve, EcSigningKey, EcVerifyingKey, JwsSigningKey, JwsVerificationKey, KeyType};
pub use provider::{SignatureProvider, SignatureVerifier};
pub use traits::{JwsSignatureProvider, JwsSignatureVerifier};

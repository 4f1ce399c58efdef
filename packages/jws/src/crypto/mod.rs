//! Signature primitives, one module per algorithm family

pub mod der;
pub mod ecdsa;
pub mod hmac;
pub mod rsa;

pub use der::{der_to_raw, raw_to_der};
pub use ecdsa::{EcDsaSignatureProvider, EcDsaSignatureVerifier};
pub use hmac::{HmacSignatureProvider, HmacSignatureVerifier};
pub use rsa::{RsaSignatureProvider, RsaSignatureVerifier};

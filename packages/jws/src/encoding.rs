//! Base64url helpers (RFC 7515 §2: URL-safe alphabet, no padding)

use crate::error::{JwsError, JwsResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};

/// Base64url encode without padding
#[inline]
#[must_use]
pub fn base64_url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64url decode, rejecting padding and the standard alphabet
///
/// `what` names the decoded segment in the error message.
///
/// # Errors
/// Returns `Serialization` when `input` is not valid base64url
#[inline]
pub fn base64_url_decode(input: &str, what: &str) -> JwsResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| JwsError::serialization(format!("invalid base64url in {what}: {e}")))
}

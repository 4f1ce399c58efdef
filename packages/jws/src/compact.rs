//! Compact serialization: `header.payload.signature`
//!
//! The signing input is always the first two segments exactly as they appear
//! on the wire; consumers never re-encode decoded values to rebuild it.

use crate::algorithms::check_algorithm;
use crate::encoding::{base64_url_decode, base64_url_encode};
use crate::error::{JwsError, JwsResult};
use crate::header::JwsHeaders;
use crate::traits::{JwsSignatureProvider, JwsSignatureVerifier};
use crate::utils::validate_critical_headers;
use tracing::{debug, warn};

/// Builds a compact JWS
#[derive(Debug, Clone)]
pub struct JwsCompactProducer {
    headers: JwsHeaders,
    payload: Vec<u8>,
    detached: bool,
    committed: Option<CommittedSignature>,
}

#[derive(Debug, Clone)]
struct CommittedSignature {
    encoded_header: String,
    encoded_payload: String,
    encoded_signature: String,
}

impl JwsCompactProducer {
    /// Producer for `payload` under `headers`
    pub fn new(headers: JwsHeaders, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            payload: payload.into(),
            detached: false,
            committed: None,
        }
    }

    /// Producer for `payload` with an empty header set
    pub fn from_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(JwsHeaders::new(), payload)
    }

    /// Leave the payload out of the serialized token
    #[must_use]
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    /// Protected headers; after signing these are the headers covered by the
    /// signature
    pub fn headers(&self) -> &JwsHeaders {
        &self.headers
    }

    /// Payload bytes
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Sign with `provider` and return the serialized token
    ///
    /// The provider's algorithm is written to `alg` before anything is
    /// encoded.
    ///
    /// # Errors
    /// `InvalidAlgorithm` if `alg` already names another algorithm,
    /// `InvalidCriticalHeader` for unusable `crit`/`b64` values, or any
    /// error of the provider
    pub fn sign_with(&mut self, provider: &dyn JwsSignatureProvider) -> JwsResult<String> {
        let mut headers = self.headers.clone();
        headers.set_algorithm(provider.algorithm())?;
        validate_critical_headers(&headers)?;

        let encoded_header = headers.encode()?;
        let encoded_payload = encode_payload(&headers, &self.payload)?;
        if !self.detached && encoded_payload.contains('.') {
            return Err(JwsError::serialization(
                "unencoded payload containing '.' must be detached",
            ));
        }
        let mut signing_input =
            Vec::with_capacity(encoded_header.len() + 1 + encoded_payload.len());
        signing_input.extend_from_slice(encoded_header.as_bytes());
        signing_input.push(b'.');
        signing_input.extend_from_slice(encoded_payload.as_bytes());

        let signature = provider.sign(&headers, &signing_input)?;
        debug!(
            algorithm = %provider.algorithm(),
            detached = self.detached,
            "produced compact JWS"
        );

        self.headers = headers;
        self.committed = Some(CommittedSignature {
            encoded_header,
            encoded_payload,
            encoded_signature: base64_url_encode(&signature),
        });
        self.signed_encoded_jws()
    }

    /// Serialized token
    ///
    /// # Errors
    /// `NotSigned` before [`sign_with`](Self::sign_with)
    pub fn signed_encoded_jws(&self) -> JwsResult<String> {
        let committed = self.committed.as_ref().ok_or(JwsError::NotSigned)?;
        let payload = if self.detached {
            ""
        } else {
            committed.encoded_payload.as_str()
        };
        Ok(format!(
            "{}.{}.{}",
            committed.encoded_header, payload, committed.encoded_signature
        ))
    }

    /// `header.payload` as it would be signed, from the current headers
    ///
    /// # Errors
    /// `Serialization` if the headers cannot be encoded or an unencoded
    /// payload cannot be carried in a compact token
    pub fn unsigned_encoded_jws(&self) -> JwsResult<String> {
        let encoded_header = self.headers.encode()?;
        let encoded_payload = encode_payload(&self.headers, &self.payload)?;
        Ok(format!("{encoded_header}.{encoded_payload}"))
    }

    /// Base64url of the signature, once signed
    pub fn encoded_signature(&self) -> Option<&str> {
        self.committed
            .as_ref()
            .map(|committed| committed.encoded_signature.as_str())
    }
}

/// Payload segment: base64url, or the raw text when `b64` is `false`
fn encode_payload(headers: &JwsHeaders, payload: &[u8]) -> JwsResult<String> {
    if headers.is_payload_encoded() {
        return Ok(base64_url_encode(payload));
    }
    let text = std::str::from_utf8(payload)
        .map_err(|_| JwsError::serialization("unencoded payload must be valid UTF-8"))?;
    Ok(text.to_string())
}

/// Parses and verifies a compact JWS
#[derive(Debug, Clone)]
pub struct JwsCompactConsumer {
    encoded_header: String,
    encoded_payload: String,
    encoded_signature: String,
    headers: JwsHeaders,
    payload: Vec<u8>,
    signature: Vec<u8>,
    detached: bool,
}

impl JwsCompactConsumer {
    /// Parse `token`
    ///
    /// # Errors
    /// `MalformedCompactToken` unless the token has exactly three segments
    /// with valid base64url and a JSON object header
    pub fn new(token: &str) -> JwsResult<Self> {
        Self::parse(token, None)
    }

    /// Parse a token whose payload segment is empty, supplying the payload
    ///
    /// # Errors
    /// As [`new`](Self::new), and `MalformedCompactToken` if the token
    /// already carries a payload
    pub fn with_detached_payload(token: &str, payload: &[u8]) -> JwsResult<Self> {
        Self::parse(token, Some(payload))
    }

    fn parse(token: &str, detached_payload: Option<&[u8]>) -> JwsResult<Self> {
        let parts: Vec<&str> = token.split('.').collect();
        let [encoded_header, encoded_payload, encoded_signature] = parts.as_slice() else {
            warn!(segments = parts.len(), "rejected compact JWS");
            return Err(JwsError::malformed(format!(
                "expected 3 segments, found {}",
                parts.len()
            )));
        };

        let header_json = base64_url_decode(encoded_header, "header")
            .map_err(|e| JwsError::malformed(e.to_string()))?;
        let headers = JwsHeaders::from_json(&header_json)
            .map_err(|e| JwsError::malformed(format!("header is not a JSON object: {e}")))?;
        let signature = base64_url_decode(encoded_signature, "signature")
            .map_err(|e| JwsError::malformed(e.to_string()))?;

        let (encoded_payload, payload, detached) = match detached_payload {
            Some(_) if !encoded_payload.is_empty() => {
                return Err(JwsError::malformed(
                    "detached payload supplied for a token that carries one",
                ));
            }
            Some(payload) if headers.is_payload_encoded() => {
                (base64_url_encode(payload), payload.to_vec(), true)
            }
            Some(payload) => {
                let text = std::str::from_utf8(payload).map_err(|_| {
                    JwsError::malformed("unencoded detached payload must be valid UTF-8")
                })?;
                (text.to_string(), payload.to_vec(), true)
            }
            None if headers.is_payload_encoded() => {
                let payload = base64_url_decode(encoded_payload, "payload")
                    .map_err(|e| JwsError::malformed(e.to_string()))?;
                ((*encoded_payload).to_string(), payload, false)
            }
            None => (
                (*encoded_payload).to_string(),
                encoded_payload.as_bytes().to_vec(),
                false,
            ),
        };

        Ok(Self {
            encoded_header: (*encoded_header).to_string(),
            encoded_payload,
            encoded_signature: (*encoded_signature).to_string(),
            headers,
            payload,
            signature,
            detached,
        })
    }

    /// Protected headers
    pub fn headers(&self) -> &JwsHeaders {
        &self.headers
    }

    /// Header segment as received
    pub fn encoded_header(&self) -> &str {
        &self.encoded_header
    }

    /// Payload segment as signed (base64url, or raw when `b64` is `false`)
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// Signature segment as received
    pub fn encoded_signature(&self) -> &str {
        &self.encoded_signature
    }

    /// Decoded payload bytes
    pub fn decoded_payload(&self) -> &[u8] {
        &self.payload
    }

    /// Decoded payload as UTF-8 text
    ///
    /// # Errors
    /// `Serialization` if the payload is not UTF-8
    pub fn decoded_payload_str(&self) -> JwsResult<&str> {
        std::str::from_utf8(&self.payload)
            .map_err(|_| JwsError::serialization("payload is not valid UTF-8"))
    }

    /// Decoded signature bytes
    pub fn decoded_signature(&self) -> &[u8] {
        &self.signature
    }

    /// Whether the payload was supplied out of band
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Whether the token carries an empty signature
    pub fn is_unsigned(&self) -> bool {
        self.signature.is_empty()
    }

    /// `header "." payload`, the bytes the signature covers
    pub fn signing_input(&self) -> Vec<u8> {
        let mut input =
            Vec::with_capacity(self.encoded_header.len() + 1 + self.encoded_payload.len());
        input.extend_from_slice(self.encoded_header.as_bytes());
        input.push(b'.');
        input.extend_from_slice(self.encoded_payload.as_bytes());
        input
    }

    /// Verify the signature, reporting a mismatch as an error
    ///
    /// # Errors
    /// `SignatureVerificationFailed` on mismatch; `AlgorithmNotSet`,
    /// `InvalidAlgorithm`, `InvalidCriticalHeader` or
    /// `SignatureLengthMismatch` for structural problems
    pub fn verify(&self, verifier: &dyn JwsSignatureVerifier) -> JwsResult<()> {
        validate_critical_headers(&self.headers)?;
        let expected = verifier.algorithm();
        let declared = check_algorithm(self.headers.algorithm(), expected.family())?;
        if declared != expected {
            warn!(%declared, %expected, "compact JWS algorithm does not match verifier");
            return Err(JwsError::invalid_algorithm(format!(
                "token is signed with {declared}, verifier expects {expected}"
            )));
        }
        verifier.verify(&self.headers, &self.signing_input(), &self.signature)
    }

    /// Verify the signature; a mismatch is `Ok(false)`
    ///
    /// # Errors
    /// Every failure other than a signature mismatch, as [`verify`](Self::verify)
    pub fn verify_signature_with(&self, verifier: &dyn JwsSignatureVerifier) -> JwsResult<bool> {
        match self.verify(verifier) {
            Ok(()) => Ok(true),
            Err(e) if e.is_verification_failure() => {
                debug!(algorithm = %verifier.algorithm(), "compact JWS signature rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

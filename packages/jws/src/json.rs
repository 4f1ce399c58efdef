//! JSON serialization (general and flattened)
//!
//! One base64url payload is shared by every signature entry. Each entry has
//! its own optional protected header (covered by its signature) and optional
//! unprotected header (not covered).

use crate::algorithms::SignatureAlgorithm;
use crate::encoding::{base64_url_decode, base64_url_encode};
use crate::error::{JwsError, JwsResult};
use crate::header::{CRITICAL, JwsHeaders, PAYLOAD_ENCODING};
use crate::traits::{JwsSignatureProvider, JwsSignatureVerifier};
use crate::utils::validate_critical_headers;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default, Serialize, Deserialize)]
struct WireEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    protected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    header: Option<JwsHeaders>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl WireEntry {
    fn is_empty(&self) -> bool {
        self.protected.is_none() && self.header.is_none() && self.signature.is_none()
    }
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    #[serde(default)]
    payload: Option<String>,
    #[serde(default)]
    signatures: Option<Vec<WireEntry>>,
    #[serde(flatten)]
    flattened: WireEntry,
}

#[derive(Serialize)]
struct GeneralDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    signatures: Vec<WireEntry>,
}

#[derive(Serialize)]
struct FlattenedDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<&'a str>,
    #[serde(flatten)]
    entry: WireEntry,
}

/// One signature of a JSON JWS together with its headers
///
/// The encoded payload is shared with the document and every other entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JwsJsonSignatureEntry {
    encoded_payload: Arc<str>,
    encoded_protected_header: Option<String>,
    protected_header: Option<JwsHeaders>,
    unprotected_header: Option<JwsHeaders>,
    encoded_signature: String,
    signature: Vec<u8>,
    union_header: JwsHeaders,
}

impl JwsJsonSignatureEntry {
    fn from_wire(encoded_payload: &Arc<str>, wire: WireEntry) -> JwsResult<Self> {
        if wire.protected.is_none() && wire.header.is_none() {
            return Err(JwsError::invalid_json(
                "signature entry needs a protected or unprotected header",
            ));
        }
        let encoded_signature = wire
            .signature
            .ok_or_else(|| JwsError::invalid_json("signature entry has no signature"))?;
        let signature = base64_url_decode(&encoded_signature, "signature")
            .map_err(|e| JwsError::invalid_json(e.to_string()))?;
        let protected_header = wire
            .protected
            .as_deref()
            .map(|encoded| {
                JwsHeaders::decode(encoded)
                    .map_err(|e| JwsError::invalid_json(format!("protected header: {e}")))
            })
            .transpose()?;

        let union_header = checked_union(protected_header.as_ref(), wire.header.as_ref())?;
        Ok(Self {
            encoded_payload: Arc::clone(encoded_payload),
            encoded_protected_header: wire.protected,
            protected_header,
            unprotected_header: wire.header,
            encoded_signature,
            signature,
            union_header,
        })
    }

    fn to_wire(&self) -> WireEntry {
        WireEntry {
            protected: self.encoded_protected_header.clone(),
            header: self.unprotected_header.clone(),
            signature: Some(self.encoded_signature.clone()),
        }
    }

    /// Protected header, if any
    pub fn protected_header(&self) -> Option<&JwsHeaders> {
        self.protected_header.as_ref()
    }

    /// Protected header as received, base64url encoded
    pub fn encoded_protected_header(&self) -> Option<&str> {
        self.encoded_protected_header.as_deref()
    }

    /// Unprotected header, if any
    pub fn unprotected_header(&self) -> Option<&JwsHeaders> {
        self.unprotected_header.as_ref()
    }

    /// Merge of protected and unprotected headers
    pub fn union_header(&self) -> &JwsHeaders {
        &self.union_header
    }

    /// `alg` from the union header
    pub fn algorithm(&self) -> Option<&str> {
        self.union_header.algorithm()
    }

    /// `kid` from the union header
    pub fn key_id(&self) -> Option<&str> {
        self.union_header.key_id()
    }

    /// Shared payload, base64url encoded
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// Signature, base64url encoded
    pub fn encoded_signature(&self) -> &str {
        &self.encoded_signature
    }

    /// Signature bytes
    pub fn decoded_signature(&self) -> &[u8] {
        &self.signature
    }

    /// `protected "." payload`; starts with `.` when there is no protected
    /// header
    pub fn signing_input(&self) -> Vec<u8> {
        signing_input(self.encoded_protected_header.as_deref(), &self.encoded_payload)
    }

    /// Verify this entry, reporting a mismatch as an error
    ///
    /// # Errors
    /// `SignatureVerificationFailed` on mismatch; `AlgorithmNotSet`,
    /// `InvalidAlgorithm` or `InvalidCriticalHeader` for structural problems
    pub fn verify(&self, verifier: &dyn JwsSignatureVerifier) -> JwsResult<()> {
        if let Some(protected) = &self.protected_header {
            validate_critical_headers(protected)?;
        }
        let expected = verifier.algorithm();
        match self.algorithm() {
            None => return Err(JwsError::AlgorithmNotSet),
            Some(declared) if declared != expected.name() => {
                return Err(JwsError::invalid_algorithm(format!(
                    "entry is signed with {declared}, verifier expects {expected}"
                )));
            }
            Some(_) => {}
        }
        verifier.verify(&self.union_header, &self.signing_input(), &self.signature)
    }

    /// Verify this entry; a mismatch is `Ok(false)`
    ///
    /// # Errors
    /// Every failure other than a signature mismatch
    pub fn verify_signature_with(&self, verifier: &dyn JwsSignatureVerifier) -> JwsResult<bool> {
        match self.verify(verifier) {
            Ok(()) => Ok(true),
            Err(e) if e.is_verification_failure() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Re-serialize as a compact token
    ///
    /// # Errors
    /// `InvalidJsonJws` if the entry has an unprotected header or no
    /// protected header, neither of which compact form can carry
    pub fn to_compact(&self) -> JwsResult<String> {
        if self.unprotected_header.is_some() {
            return Err(JwsError::invalid_json(
                "entries with an unprotected header have no compact form",
            ));
        }
        let protected = self
            .encoded_protected_header
            .as_deref()
            .ok_or_else(|| JwsError::invalid_json("compact form needs a protected header"))?;
        Ok(format!(
            "{protected}.{}.{}",
            self.encoded_payload, self.encoded_signature
        ))
    }
}

fn signing_input(encoded_protected: Option<&str>, encoded_payload: &str) -> Vec<u8> {
    let protected = encoded_protected.unwrap_or_default();
    let mut input = Vec::with_capacity(protected.len() + 1 + encoded_payload.len());
    input.extend_from_slice(protected.as_bytes());
    input.push(b'.');
    input.extend_from_slice(encoded_payload.as_bytes());
    input
}

/// Union header with the JSON-specific restrictions applied
fn checked_union(
    protected: Option<&JwsHeaders>,
    unprotected: Option<&JwsHeaders>,
) -> JwsResult<JwsHeaders> {
    if let Some(unprotected) = unprotected {
        for name in [CRITICAL, PAYLOAD_ENCODING] {
            if unprotected.contains(name) {
                warn!(header = name, "rejected integrity-relevant unprotected header");
                return Err(JwsError::invalid_json(format!(
                    "{name} must be in the protected header"
                )));
            }
        }
    }
    let union = JwsHeaders::union(protected, unprotected)?;
    if union.payload_encoding_status() == Some(false) {
        return Err(JwsError::invalid_json(
            "unencoded payloads are not supported in JSON serialization",
        ));
    }
    Ok(union)
}

/// Group entries by signature algorithm
///
/// # Errors
/// `AlgorithmNotSet` or `InvalidAlgorithm` for an entry whose `alg` is
/// missing or unknown
pub fn signature_map(
    entries: &[JwsJsonSignatureEntry],
) -> JwsResult<HashMap<SignatureAlgorithm, Vec<&JwsJsonSignatureEntry>>> {
    let mut map: HashMap<SignatureAlgorithm, Vec<&JwsJsonSignatureEntry>> = HashMap::new();
    for entry in entries {
        let algorithm = entry
            .union_header()
            .signature_algorithm()?
            .ok_or(JwsError::AlgorithmNotSet)?;
        map.entry(algorithm).or_default().push(entry);
    }
    Ok(map)
}

/// Builds a JSON JWS one signature at a time
#[derive(Debug, Clone)]
pub struct JwsJsonProducer {
    encoded_payload: Arc<str>,
    detached: bool,
    flattened: bool,
    entries: Vec<JwsJsonSignatureEntry>,
}

impl JwsJsonProducer {
    /// Producer for `payload`
    pub fn new(payload: &[u8]) -> Self {
        Self {
            encoded_payload: Arc::from(base64_url_encode(payload)),
            detached: false,
            flattened: false,
            entries: Vec::new(),
        }
    }

    /// Leave the payload out of the rendered document
    #[must_use]
    pub fn detached(mut self, detached: bool) -> Self {
        self.detached = detached;
        self
    }

    /// Render the flattened form when there is exactly one signature
    #[must_use]
    pub fn flattened(mut self, flattened: bool) -> Self {
        self.flattened = flattened;
        self
    }

    /// Shared payload, base64url encoded
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// Committed signature entries
    pub fn signature_entries(&self) -> &[JwsJsonSignatureEntry] {
        &self.entries
    }

    /// Append a signature whose protected header holds only `alg`
    ///
    /// # Errors
    /// Any error of the provider
    pub fn sign_with(
        &mut self,
        provider: &dyn JwsSignatureProvider,
    ) -> JwsResult<&JwsJsonSignatureEntry> {
        let protected = JwsHeaders::with_algorithm(provider.algorithm());
        self.sign_with_headers(provider, Some(protected), None)
    }

    /// Append a signature with explicit headers
    ///
    /// `alg` must be present in the union of the two headers and match the
    /// provider. Previously committed entries are untouched.
    ///
    /// # Errors
    /// `AlgorithmNotSet` if the union has no `alg`, `InvalidAlgorithm` if it
    /// differs from the provider, `DuplicateHeaderKey` for overlapping
    /// headers, `InvalidJsonJws` for `crit`/`b64` outside the protected
    /// header or `b64=false`, or any error of the provider
    pub fn sign_with_headers(
        &mut self,
        provider: &dyn JwsSignatureProvider,
        protected: Option<JwsHeaders>,
        unprotected: Option<JwsHeaders>,
    ) -> JwsResult<&JwsJsonSignatureEntry> {
        let union = checked_union(protected.as_ref(), unprotected.as_ref())?;
        let declared = union.algorithm().ok_or(JwsError::AlgorithmNotSet)?;
        let algorithm = provider.algorithm();
        if declared != algorithm.name() {
            return Err(JwsError::invalid_algorithm(format!(
                "headers declare {declared}, provider signs with {algorithm}"
            )));
        }
        if let Some(protected) = &protected {
            validate_critical_headers(protected)?;
        }

        let encoded_protected_header = protected.as_ref().map(JwsHeaders::encode).transpose()?;
        let input = signing_input(encoded_protected_header.as_deref(), &self.encoded_payload);
        let signature = provider.sign(&union, &input)?;
        debug!(
            %algorithm,
            index = self.entries.len(),
            "appended JSON JWS signature"
        );

        let entry = JwsJsonSignatureEntry {
            encoded_payload: Arc::clone(&self.encoded_payload),
            encoded_protected_header,
            protected_header: protected,
            unprotected_header: unprotected,
            encoded_signature: base64_url_encode(&signature),
            signature,
            union_header: union,
        };
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Render the document
    ///
    /// # Errors
    /// `NotSigned` with no entries, `Serialization` if encoding fails
    pub fn render(&self) -> JwsResult<String> {
        let payload = (!self.detached).then_some(&*self.encoded_payload);
        match self.entries.as_slice() {
            [] => Err(JwsError::NotSigned),
            [entry] if self.flattened => Ok(serde_json::to_string(&FlattenedDocument {
                payload,
                entry: entry.to_wire(),
            })?),
            entries => Ok(serde_json::to_string(&GeneralDocument {
                payload,
                signatures: entries.iter().map(JwsJsonSignatureEntry::to_wire).collect(),
            })?),
        }
    }
}

/// Parses and verifies a JSON JWS
#[derive(Debug, Clone)]
pub struct JwsJsonConsumer {
    encoded_payload: Arc<str>,
    payload: Vec<u8>,
    entries: Vec<JwsJsonSignatureEntry>,
    flattened: bool,
    detached: bool,
}

impl JwsJsonConsumer {
    /// Parse a general or flattened document
    ///
    /// # Errors
    /// `InvalidJsonJws` for missing or mistyped members or a document mixing
    /// both forms, `DuplicateHeaderKey` for overlapping headers
    pub fn new(json: &str) -> JwsResult<Self> {
        Self::parse(json, None)
    }

    /// Parse a document without `payload`, supplying it out of band
    ///
    /// # Errors
    /// As [`new`](Self::new), and `InvalidJsonJws` if the document carries a
    /// payload
    pub fn with_detached_payload(json: &str, payload: &[u8]) -> JwsResult<Self> {
        Self::parse(json, Some(payload))
    }

    fn parse(json: &str, detached_payload: Option<&[u8]>) -> JwsResult<Self> {
        let document: WireDocument = serde_json::from_str(json)
            .map_err(|e| JwsError::invalid_json(format!("not a JWS JSON document: {e}")))?;

        let (encoded_payload, payload, detached) = match (document.payload, detached_payload) {
            (Some(_), Some(_)) => {
                return Err(JwsError::invalid_json(
                    "detached payload supplied for a document that carries one",
                ));
            }
            (Some(encoded), None) => {
                let payload = base64_url_decode(&encoded, "payload")
                    .map_err(|e| JwsError::invalid_json(e.to_string()))?;
                (Arc::from(encoded), payload, false)
            }
            (None, Some(payload)) => (
                Arc::from(base64_url_encode(payload)),
                payload.to_vec(),
                true,
            ),
            (None, None) => return Err(JwsError::invalid_json("missing payload")),
        };

        let (wire_entries, flattened) = match document.signatures {
            Some(_) if !document.flattened.is_empty() => {
                warn!("rejected JSON JWS mixing general and flattened members");
                return Err(JwsError::invalid_json(
                    "document mixes general and flattened members",
                ));
            }
            Some(signatures) if signatures.is_empty() => {
                return Err(JwsError::invalid_json("signatures array is empty"));
            }
            Some(signatures) => (signatures, false),
            None => (vec![document.flattened], true),
        };

        let entries = wire_entries
            .into_iter()
            .map(|wire| JwsJsonSignatureEntry::from_wire(&encoded_payload, wire))
            .collect::<JwsResult<Vec<_>>>()?;

        Ok(Self {
            encoded_payload,
            payload,
            entries,
            flattened,
            detached,
        })
    }

    /// Signature entries in document order
    pub fn signature_entries(&self) -> &[JwsJsonSignatureEntry] {
        &self.entries
    }

    /// Entries grouped by algorithm
    ///
    /// # Errors
    /// As [`signature_map`]
    pub fn signature_map(
        &self,
    ) -> JwsResult<HashMap<SignatureAlgorithm, Vec<&JwsJsonSignatureEntry>>> {
        signature_map(&self.entries)
    }

    /// Payload, base64url encoded
    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
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

    /// Whether the document was in flattened form
    pub fn is_flattened(&self) -> bool {
        self.flattened
    }

    /// Whether the payload was supplied out of band
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// `true` if at least one entry signed with the verifier's algorithm
    /// verifies
    ///
    /// Entries declaring another algorithm are skipped. A mismatch counts as
    /// `false`; structural errors in a candidate entry are returned.
    ///
    /// # Errors
    /// `AlgorithmNotSet` for an entry without `alg`, or any structural error
    /// of a candidate entry
    pub fn verify_signature_with(&self, verifier: &dyn JwsSignatureVerifier) -> JwsResult<bool> {
        let expected = verifier.algorithm();
        for (index, entry) in self.entries.iter().enumerate() {
            let declared = entry.algorithm().ok_or(JwsError::AlgorithmNotSet)?;
            if declared != expected.name() {
                debug!(index, %declared, %expected, "skipping JSON JWS entry");
                continue;
            }
            if entry.verify_signature_with(verifier)? {
                debug!(index, %expected, "JSON JWS entry verified");
                return Ok(true);
            }
        }
        debug!(%expected, entries = self.entries.len(), "no JSON JWS entry verified");
        Ok(false)
    }
}

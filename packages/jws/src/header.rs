//! JOSE header model
//!
//! [`JwsHeaders`] is an insertion-ordered map of header parameter names to
//! JSON values with typed accessors for the registered parameters.

use crate::algorithms::SignatureAlgorithm;
use crate::encoding::{base64_url_decode, base64_url_encode};
use crate::error::{JwsError, JwsResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `alg` header parameter
pub const ALGORITHM: &str = "alg";
/// `kid` header parameter
pub const KEY_ID: &str = "kid";
/// `typ` header parameter
pub const TYPE: &str = "typ";
/// `cty` header parameter
pub const CONTENT_TYPE: &str = "cty";
/// `crit` header parameter
pub const CRITICAL: &str = "crit";
/// `b64` header parameter (RFC 7797)
pub const PAYLOAD_ENCODING: &str = "b64";

/// Header parameters registered by RFC 7515 and RFC 7797
pub const REGISTERED_HEADERS: [&str; 11] = [
    ALGORITHM,
    "jku",
    "jwk",
    KEY_ID,
    "x5u",
    "x5c",
    "x5t",
    "x5t#S256",
    TYPE,
    CONTENT_TYPE,
    CRITICAL,
];

/// Set of JOSE header parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JwsHeaders {
    values: Map<String, Value>,
}

impl JwsHeaders {
    /// Empty header set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header set holding only `alg`
    #[must_use]
    pub fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        let mut headers = Self::new();
        headers.set_header(ALGORITHM, algorithm.name());
        headers
    }

    /// Parameter value by name
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a parameter, replacing any previous value
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Remove a parameter, returning its value
    pub fn remove_header(&mut self, name: &str) -> Option<Value> {
        self.values.shift_remove(name)
    }

    /// Whether a parameter is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of parameters
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Underlying JSON object
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Raw `alg` value, if it is a string
    #[must_use]
    pub fn algorithm(&self) -> Option<&str> {
        self.values.get(ALGORITHM).and_then(Value::as_str)
    }

    /// `alg` resolved against the registry
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` when `alg` is not a string or is unknown
    pub fn signature_algorithm(&self) -> JwsResult<Option<SignatureAlgorithm>> {
        match self.values.get(ALGORITHM) {
            None => Ok(None),
            Some(Value::String(name)) => SignatureAlgorithm::from_name(name).map(Some),
            Some(other) => Err(JwsError::invalid_algorithm(format!(
                "alg must be a string, found {other}"
            ))),
        }
    }

    /// Set `alg`
    ///
    /// # Errors
    /// Returns `InvalidAlgorithm` if a different algorithm is already set
    pub fn set_algorithm(&mut self, algorithm: SignatureAlgorithm) -> JwsResult<()> {
        if let Some(existing) = self.values.get(ALGORITHM)
            && existing.as_str() != Some(algorithm.name())
        {
            return Err(JwsError::invalid_algorithm(format!(
                "header already declares alg {existing}, cannot change it to {algorithm}"
            )));
        }
        self.set_header(ALGORITHM, algorithm.name());
        Ok(())
    }

    /// `kid` value
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.values.get(KEY_ID).and_then(Value::as_str)
    }

    /// Set `kid`
    pub fn set_key_id(&mut self, kid: impl Into<String>) {
        self.set_header(KEY_ID, kid.into());
    }

    /// `typ` value
    #[must_use]
    pub fn header_type(&self) -> Option<&str> {
        self.values.get(TYPE).and_then(Value::as_str)
    }

    /// Set `typ`
    pub fn set_header_type(&mut self, typ: impl Into<String>) {
        self.set_header(TYPE, typ.into());
    }

    /// `cty` value
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.values.get(CONTENT_TYPE).and_then(Value::as_str)
    }

    /// Set `cty`
    pub fn set_content_type(&mut self, cty: impl Into<String>) {
        self.set_header(CONTENT_TYPE, cty.into());
    }

    /// `b64` value, `None` when absent or not a boolean
    #[must_use]
    pub fn payload_encoding_status(&self) -> Option<bool> {
        self.values.get(PAYLOAD_ENCODING).and_then(Value::as_bool)
    }

    /// Set `b64`; `false` also lists `b64` in `crit`
    pub fn set_payload_encoding_status(&mut self, encoded: bool) {
        self.set_header(PAYLOAD_ENCODING, encoded);
        if !encoded {
            let mut critical = self.critical().unwrap_or_default();
            if !critical.iter().any(|name| name == PAYLOAD_ENCODING) {
                critical.push(PAYLOAD_ENCODING.to_string());
                self.set_critical(critical);
            }
        }
    }

    /// Whether the payload is base64url encoded (`b64` defaults to `true`)
    #[must_use]
    pub fn is_payload_encoded(&self) -> bool {
        self.payload_encoding_status().unwrap_or(true)
    }

    /// `crit` entries; non-string entries are skipped
    #[must_use]
    pub fn critical(&self) -> Option<Vec<String>> {
        self.values
            .get(CRITICAL)
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
    }

    /// Set `crit`
    pub fn set_critical(&mut self, names: Vec<String>) {
        self.set_header(
            CRITICAL,
            Value::Array(names.into_iter().map(Value::String).collect()),
        );
    }

    /// Union of protected and unprotected headers
    ///
    /// # Errors
    /// Returns `DuplicateHeaderKey` on the first parameter present in both
    pub fn union(
        protected: Option<&JwsHeaders>,
        unprotected: Option<&JwsHeaders>,
    ) -> JwsResult<JwsHeaders> {
        let mut merged = protected.cloned().unwrap_or_default();
        if let Some(unprotected) = unprotected {
            for (name, value) in &unprotected.values {
                if merged.values.contains_key(name) {
                    return Err(JwsError::DuplicateHeaderKey(name.clone()));
                }
                merged.values.insert(name.clone(), value.clone());
            }
        }
        Ok(merged)
    }

    /// Serialize to a JSON string
    ///
    /// # Errors
    /// Returns `Serialization` if encoding fails
    pub fn to_json(&self) -> JwsResult<String> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// Parse from a JSON object string
    ///
    /// # Errors
    /// Returns `Serialization` unless `json` is a JSON object
    pub fn from_json(json: &[u8]) -> JwsResult<Self> {
        let values: Map<String, Value> = serde_json::from_slice(json)?;
        Ok(Self { values })
    }

    /// Base64url of the JSON encoding
    ///
    /// # Errors
    /// Returns `Serialization` if encoding fails
    pub fn encode(&self) -> JwsResult<String> {
        Ok(base64_url_encode(self.to_json()?.as_bytes()))
    }

    /// Parse a base64url-encoded JSON object
    ///
    /// # Errors
    /// Returns `Serialization` on invalid base64url or JSON
    pub fn decode(encoded: &str) -> JwsResult<Self> {
        let json = base64_url_decode(encoded, "header")?;
        Self::from_json(&json)
    }
}

impl From<Map<String, Value>> for JwsHeaders {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl From<JwsHeaders> for Map<String, Value> {
    fn from(headers: JwsHeaders) -> Self {
        headers.values
    }
}

//! Header model, union rules and `crit` validation

use cryypt_jws::header::{CRITICAL, PAYLOAD_ENCODING};
use cryypt_jws::utils::{is_payload_unencoded, validate_critical_headers};
use cryypt_jws::{JwsError, JwsHeaders, SignatureAlgorithm};
use serde_json::json;

fn headers(value: serde_json::Value) -> JwsHeaders {
    serde_json::from_value(value).expect("header object")
}

#[test]
fn test_typed_accessors() {
    let mut h = JwsHeaders::with_algorithm(SignatureAlgorithm::ES384);
    h.set_key_id("key-1");
    h.set_header_type("JWT");
    h.set_content_type("json");

    assert_eq!(h.algorithm(), Some("ES384"));
    assert_eq!(
        h.signature_algorithm().expect("known alg"),
        Some(SignatureAlgorithm::ES384)
    );
    assert_eq!(h.key_id(), Some("key-1"));
    assert_eq!(h.header_type(), Some("JWT"));
    assert_eq!(h.content_type(), Some("json"));
    assert_eq!(h.len(), 4);
    assert!(h.is_payload_encoded());

    assert_eq!(h.remove_header("typ"), Some(json!("JWT")));
    assert!(!h.contains("typ"));
    assert_eq!(h.names().collect::<Vec<_>>(), ["alg", "kid", "cty"]);
}

#[test]
fn test_insertion_order_survives_encoding() {
    let mut h = JwsHeaders::new();
    h.set_header("zeta", 1);
    h.set_header("alpha", 2);
    h.set_algorithm(SignatureAlgorithm::HS256).expect("no alg yet");
    assert_eq!(h.to_json().expect("json"), r#"{"zeta":1,"alpha":2,"alg":"HS256"}"#);

    let decoded = JwsHeaders::decode(&h.encode().expect("encode")).expect("decode");
    assert_eq!(decoded, h);
}

#[test]
fn test_set_algorithm_refuses_to_change_alg() {
    let mut h = JwsHeaders::with_algorithm(SignatureAlgorithm::HS256);
    h.set_algorithm(SignatureAlgorithm::HS256)
        .expect("same algorithm is accepted");
    assert!(matches!(
        h.set_algorithm(SignatureAlgorithm::RS256),
        Err(JwsError::InvalidAlgorithm(_))
    ));
    assert_eq!(h.algorithm(), Some("HS256"));
}

#[test]
fn test_unknown_or_mistyped_alg() {
    assert!(matches!(
        headers(json!({ "alg": "HS1" })).signature_algorithm(),
        Err(JwsError::InvalidAlgorithm(_))
    ));
    assert!(matches!(
        headers(json!({ "alg": 256 })).signature_algorithm(),
        Err(JwsError::InvalidAlgorithm(_))
    ));
    assert_eq!(JwsHeaders::new().signature_algorithm(), Ok(None));
    assert_eq!(
        headers(json!({ "alg": "none" })).signature_algorithm(),
        Ok(Some(SignatureAlgorithm::None))
    );
}

#[test]
fn test_union_rejects_shared_names() {
    let protected = JwsHeaders::with_algorithm(SignatureAlgorithm::ES256);
    let unprotected = JwsHeaders::with_algorithm(SignatureAlgorithm::ES256);
    assert_eq!(
        JwsHeaders::union(Some(&protected), Some(&unprotected)),
        Err(JwsError::DuplicateHeaderKey("alg".to_string()))
    );

    let unprotected = headers(json!({ "kid": "k" }));
    let union = JwsHeaders::union(Some(&protected), Some(&unprotected)).expect("disjoint");
    assert_eq!(union.names().collect::<Vec<_>>(), ["alg", "kid"]);

    assert_eq!(
        JwsHeaders::union(None, Some(&unprotected)).expect("unprotected only"),
        unprotected
    );
    assert!(JwsHeaders::union(None, None).expect("empty").is_empty());
}

#[test]
fn test_unencoded_payload_marks_crit() {
    let mut h = JwsHeaders::with_algorithm(SignatureAlgorithm::HS256);
    h.set_payload_encoding_status(false);
    assert_eq!(h.payload_encoding_status(), Some(false));
    assert_eq!(h.critical(), Some(vec![PAYLOAD_ENCODING.to_string()]));
    assert!(is_payload_unencoded(&h));
    validate_critical_headers(&h).expect("b64=false listed in crit");

    h.set_payload_encoding_status(false);
    assert_eq!(h.get_header(CRITICAL), Some(&json!(["b64"])));

    let mut encoded = JwsHeaders::new();
    encoded.set_payload_encoding_status(true);
    assert!(encoded.critical().is_none());
    assert!(!is_payload_unencoded(&encoded));
}

#[test]
fn test_critical_header_validation() {
    let accepted = [
        json!({ "alg": "HS256" }),
        json!({ "alg": "HS256", "b64": true }),
        json!({ "alg": "HS256", "b64": false, "crit": ["b64"] }),
        json!({ "alg": "HS256", "b64": true, "crit": ["b64"] }),
    ];
    for value in accepted {
        validate_critical_headers(&headers(value.clone()))
            .unwrap_or_else(|e| panic!("{value} should be accepted: {e}"));
    }

    let rejected = [
        json!({ "alg": "HS256", "crit": [] }),
        json!({ "alg": "HS256", "crit": "b64", "b64": false }),
        json!({ "alg": "HS256", "crit": [1] }),
        json!({ "alg": "HS256", "crit": ["alg"] }),
        json!({ "alg": "HS256", "crit": ["b64"] }),
        json!({ "alg": "HS256", "crit": ["exp"], "exp": 1 }),
        json!({ "alg": "HS256", "b64": false }),
        json!({ "alg": "HS256", "b64": "false", "crit": ["b64"] }),
    ];
    for value in rejected {
        let err = validate_critical_headers(&headers(value.clone()))
            .expect_err("header set must be rejected");
        assert!(
            matches!(err, JwsError::InvalidCriticalHeader(_)),
            "unexpected error {err:?} for {value}"
        );
    }
}

#[test]
fn test_from_json_requires_an_object() {
    assert!(JwsHeaders::from_json(br#"{"alg":"HS256"}"#).is_ok());
    assert!(matches!(
        JwsHeaders::from_json(b"[1,2]"),
        Err(JwsError::Serialization(_))
    ));
    assert!(matches!(JwsHeaders::decode("!!!"), Err(JwsError::Serialization(_))));
}

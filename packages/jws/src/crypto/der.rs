//! ECDSA signature format conversion
//!
//! Signature primitives emit and accept ASN.1 DER
//! (`SEQUENCE { INTEGER r, INTEGER s }`), JWS carries the fixed-width
//! big-endian concatenation `r || s`.

use crate::error::{JwsError, JwsResult};

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;
const LONG_FORM_ONE_BYTE: u8 = 0x81;

/// Convert a DER signature into the raw `r || s` form of `output_len` bytes
///
/// Leading zero bytes of each integer are dropped and the remainder is
/// right-aligned in its half of the output.
///
/// # Errors
/// Returns `DerConversionError` on malformed DER or an integer wider than
/// `output_len / 2`
pub fn der_to_raw(der: &[u8], output_len: usize) -> JwsResult<Vec<u8>> {
    if output_len == 0 || output_len % 2 != 0 {
        return Err(JwsError::der(format!(
            "raw signature length must be even, got {output_len}"
        )));
    }
    if der.len() < 8 || der[0] != SEQUENCE_TAG {
        return Err(JwsError::der("expected DER SEQUENCE"));
    }

    let (content_len, mut offset) = match der[1] {
        len if len < 0x80 => (usize::from(len), 2),
        LONG_FORM_ONE_BYTE => (usize::from(der[2]), 3),
        other => {
            return Err(JwsError::der(format!(
                "unsupported SEQUENCE length prefix 0x{other:02x}"
            )));
        }
    };
    if offset + content_len != der.len() {
        return Err(JwsError::der(format!(
            "SEQUENCE length {content_len} does not match {} remaining bytes",
            der.len() - offset
        )));
    }

    let half = output_len / 2;
    let mut raw = vec![0u8; output_len];
    for slot in raw.chunks_exact_mut(half) {
        let integer = read_integer(der, &mut offset)?;
        if integer.len() > half {
            return Err(JwsError::der(format!(
                "integer of {} bytes does not fit in {half}",
                integer.len()
            )));
        }
        slot[half - integer.len()..].copy_from_slice(integer);
    }

    if offset != der.len() {
        return Err(JwsError::der("trailing bytes after signature integers"));
    }
    Ok(raw)
}

/// Significant bytes of the INTEGER at `offset`, advancing past it
fn read_integer<'a>(der: &'a [u8], offset: &mut usize) -> JwsResult<&'a [u8]> {
    let header = der
        .get(*offset..*offset + 2)
        .ok_or_else(|| JwsError::der("truncated INTEGER header"))?;
    if header[0] != INTEGER_TAG {
        return Err(JwsError::der(format!(
            "expected INTEGER tag, found 0x{:02x}",
            header[0]
        )));
    }
    let len = usize::from(header[1]);
    if len == 0 || len >= 0x80 {
        return Err(JwsError::der(format!("invalid INTEGER length 0x{len:02x}")));
    }
    let start = *offset + 2;
    let value = der
        .get(start..start + len)
        .ok_or_else(|| JwsError::der("truncated INTEGER value"))?;
    *offset = start + len;

    let significant = value.iter().position(|&b| b != 0).unwrap_or(value.len());
    Ok(&value[significant..])
}

/// Convert a raw `r || s` signature into minimal DER
///
/// # Errors
/// Returns `SignatureLengthMismatch` unless `raw` is exactly `expected_len`
/// bytes, before any conversion is attempted
pub fn raw_to_der(raw: &[u8], expected_len: usize) -> JwsResult<Vec<u8>> {
    if raw.len() != expected_len {
        return Err(JwsError::SignatureLengthMismatch {
            expected: expected_len,
            actual: raw.len(),
        });
    }
    if expected_len == 0 || expected_len % 2 != 0 {
        return Err(JwsError::der(format!(
            "raw signature length must be even, got {expected_len}"
        )));
    }

    let (r, s) = raw.split_at(expected_len / 2);
    let mut body = Vec::with_capacity(expected_len + 6);
    write_integer(&mut body, r)?;
    write_integer(&mut body, s)?;

    let mut der = Vec::with_capacity(body.len() + 3);
    der.push(SEQUENCE_TAG);
    match u8::try_from(body.len()) {
        Ok(len) if len < 0x80 => der.push(len),
        Ok(len) => der.extend_from_slice(&[LONG_FORM_ONE_BYTE, len]),
        Err(_) => return Err(JwsError::der("signature too long for DER encoding")),
    }
    der.extend_from_slice(&body);
    Ok(der)
}

fn write_integer(out: &mut Vec<u8>, half: &[u8]) -> JwsResult<()> {
    let first = half.iter().position(|&b| b != 0).unwrap_or(half.len());
    let magnitude = &half[first..];
    let pad = magnitude.first().is_none_or(|&b| b & 0x80 != 0);
    let len = magnitude.len() + usize::from(pad);
    let len = u8::try_from(len)
        .ok()
        .filter(|&len| len < 0x80)
        .ok_or_else(|| JwsError::der(format!("integer of {len} bytes too long")))?;

    out.push(INTEGER_TAG);
    out.push(len);
    if pad {
        out.push(0);
    }
    out.extend_from_slice(magnitude);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const ES256_RAW: [u8; 64] = hex!(
        "0ed1215379636c483c2f7f155807d402a3b228033af97c7e17819ac3169ea665"
        "c50a07d38c3c70e5d8f12daf084a5480a66590c5f293509a8f3f7f8a83a354d5"
    );
    const ES256_DER: [u8; 71] = hex!(
        "3045"
        "02200ed1215379636c483c2f7f155807d402a3b228033af97c7e17819ac3169ea665"
        "022100c50a07d38c3c70e5d8f12daf084a5480a66590c5f293509a8f3f7f8a83a354d5"
    );

    #[test]
    fn test_raw_to_der_pads_high_bit() {
        let der = raw_to_der(&ES256_RAW, 64).expect("conversion should succeed");
        assert_eq!(der, ES256_DER);
    }

    #[test]
    fn test_der_to_raw_strips_sign_byte() {
        let raw = der_to_raw(&ES256_DER, 64).expect("conversion should succeed");
        assert_eq!(raw, ES256_RAW);
    }

    #[test]
    fn test_short_integer_is_left_padded() {
        let mut raw = [0u8; 64];
        raw[30..32].copy_from_slice(&[0x01, 0x02]);
        raw[32] = 0x80;

        let der = raw_to_der(&raw, 64).expect("conversion should succeed");
        let mut expected = hex!("302702020102022100").to_vec();
        expected.push(0x80);
        expected.extend_from_slice(&[0u8; 31]);
        assert_eq!(der, expected);

        assert_eq!(der_to_raw(&der, 64).expect("back to raw"), raw);
    }

    #[test]
    fn test_p521_uses_long_form_length() {
        let mut raw = vec![0x01];
        raw.extend_from_slice(&[0xff; 65]);
        raw.extend_from_slice(&[0x00, 0x7f]);
        raw.extend_from_slice(&[0xaa; 64]);

        let der = raw_to_der(&raw, 132).expect("conversion should succeed");
        assert_eq!(&der[..5], &hex!("3081870242"));
        assert_eq!(der.len(), 3 + 0x87);
        assert_eq!(&der[5 + 66..5 + 68], &hex!("0241"));

        assert_eq!(der_to_raw(&der, 132).expect("back to raw"), raw);
    }

    #[test]
    fn test_zero_integer_round_trips() {
        let raw = [0u8; 96];
        let der = raw_to_der(&raw, 96).expect("conversion should succeed");
        assert_eq!(der, hex!("3006020100020100"));
        assert_eq!(der_to_raw(&der, 96).expect("back to raw"), raw.to_vec());
    }

    #[test]
    fn test_length_mismatch_rejected_before_conversion() {
        let err = raw_to_der(&[0u8; 63], 64).expect_err("short signature must fail");
        assert_eq!(
            err,
            JwsError::SignatureLengthMismatch {
                expected: 64,
                actual: 63
            }
        );
    }

    #[test]
    fn test_malformed_der_rejected() {
        assert!(matches!(
            der_to_raw(&[0x31; 10], 64),
            Err(JwsError::DerConversionError(_))
        ));

        let mut truncated = ES256_DER.to_vec();
        truncated.pop();
        assert!(matches!(
            der_to_raw(&truncated, 64),
            Err(JwsError::DerConversionError(_))
        ));

        // r wider than the 31-byte half
        assert!(matches!(
            der_to_raw(&ES256_DER, 62),
            Err(JwsError::DerConversionError(_))
        ));
    }
}

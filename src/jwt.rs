use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use serde_json::Value;

pub use ssi_jws::Header;

use crate::DecodeError;

pub const fn is_url_safe_base64_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_')
}

fn is_url_safe_base64(s: &str) -> bool {
    s.bytes().all(is_url_safe_base64_char)
}

/// Splits a compact JWT into its header, payload and signature segments.
///
/// Unlike a bare JWS, none of the segments may be empty.
pub fn split_jwt(jwt: &str) -> Result<(&str, &str, &str), DecodeError> {
    let (header, payload, signature) =
        ssi_jws::split_jws(jwt).map_err(|_| DecodeError::InvalidJwt)?;

    if [header, payload, signature]
        .iter()
        .all(|segment| !segment.is_empty() && is_url_safe_base64(segment))
    {
        Ok((header, payload, signature))
    } else {
        Err(DecodeError::InvalidJwt)
    }
}

/// Whether `s` is framed as a compact JWT.
pub fn is_jwt(s: &str) -> bool {
    split_jwt(s).is_ok()
}

/// Decodes a base64url encoded JSON segment.
pub fn decode_json(segment: &str) -> Result<Value, DecodeError> {
    let bytes = BASE64_URL_SAFE_NO_PAD.decode(segment)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decodes the header segment of a compact JWT.
///
/// The header must be an object with a string `alg`.
pub fn decode_header(segment: &str) -> Result<Header, DecodeError> {
    let header = match decode_json(segment)? {
        Value::Object(object) => object,
        _ => return Err(DecodeError::HeaderWrongType),
    };

    match header.get("alg") {
        Some(Value::String(_)) => Ok(serde_json::from_value(Value::Object(header))?),
        _ => Err(DecodeError::MissingAlg),
    }
}

#[cfg(test)]
pub(crate) fn encode_json_segment(value: &impl serde::Serialize) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(serde_json::to_vec(value).unwrap())
}

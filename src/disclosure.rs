use std::fmt;

use base64::{prelude::BASE64_URL_SAFE_NO_PAD, Engine};
use rand::{CryptoRng, RngCore};
use serde_json::Value;

use crate::digest::{generate_salt, hash_encoded_disclosure, SdAlg};
use crate::DecodeError;

/// Object property disclosure.
///
/// The encoded form is the url-safe base64 string (without padding) of the
/// JSON array `[salt, key, value]`. The digest of a disclosure only depends
/// on that encoded form, so the exact bytes received on the wire are kept.
#[derive(Clone, PartialEq, Eq)]
pub struct Disclosure {
    encoded: String,
    salt: String,
    key: String,
    value: Value,
}

impl Disclosure {
    /// Creates a disclosure from its parts, encoding it.
    pub fn from_parts(
        salt: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        let salt = salt.into();
        let key = key.into();
        let json_string = serde_json::to_string(&Value::Array(vec![
            Value::String(salt.clone()),
            Value::String(key.clone()),
            value.clone(),
        ]))?;

        Ok(Self {
            encoded: BASE64_URL_SAFE_NO_PAD.encode(json_string),
            salt,
            key,
            value,
        })
    }

    /// Creates a disclosure for the given claim with a fresh salt.
    pub fn new_with_rng(
        rng: &mut (impl CryptoRng + RngCore),
        key: impl Into<String>,
        value: Value,
    ) -> Result<Self, serde_json::Error> {
        Self::from_parts(generate_salt(rng), key, value)
    }

    /// Decodes a disclosure found on the wire.
    pub fn parse(encoded: &str) -> Result<Self, DecodeError> {
        let bytes = BASE64_URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| DecodeError::DisclosureMalformed)?;
        let json: Value = serde_json::from_slice(&bytes)?;

        match json {
            Value::Array(values) => match <[Value; 3]>::try_from(values) {
                Ok([Value::String(salt), Value::String(key), value]) => Ok(Self {
                    encoded: encoded.to_owned(),
                    salt,
                    key,
                    value,
                }),
                _ => Err(DecodeError::DisclosureMalformed),
            },
            _ => Err(DecodeError::DisclosureMalformed),
        }
    }

    /// Encoded (wire) form.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// Claim name.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Claim value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Digest standing for this disclosure in an `_sd` array.
    pub fn digest(&self, sd_alg: SdAlg) -> String {
        hash_encoded_disclosure(sd_alg, &self.encoded)
    }
}

impl fmt::Display for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.encoded.fmt(f)
    }
}

impl fmt::Debug for Disclosure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disclosure")
            .field("encoded", &self.encoded)
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

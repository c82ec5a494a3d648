use serde_json::Value;
use ssi_jwk::{Algorithm, JWK};
use ssi_jws::Header;

use crate::provider::{JwtCryptoProvider, JwtVerificationResult};
use crate::{JsonObject, SignatureError};

/// JWT provider holding a [`JWK`].
///
/// Signs with the algorithm of the key (its `alg` parameter, or the default
/// for its key type). A key without its private part can only verify.
/// Pass-through options are ignored.
#[derive(Debug, Clone)]
pub struct JwkJwtProvider {
    key: JWK,
}

impl JwkJwtProvider {
    pub fn new(key: JWK) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &JWK {
        &self.key
    }

    /// Signature algorithm of the key, if it has one.
    pub fn algorithm(&self) -> Option<Algorithm> {
        self.key.get_algorithm()
    }
}

impl From<JWK> for JwkJwtProvider {
    fn from(key: JWK) -> Self {
        Self::new(key)
    }
}

impl JwtCryptoProvider for JwkJwtProvider {
    fn sign(
        &self,
        payload: &JsonObject,
        key_id: Option<&str>,
        typ: &str,
        _options: Option<&Value>,
    ) -> Result<String, SignatureError> {
        let algorithm = self
            .algorithm()
            .ok_or(ssi_jws::Error::UnsupportedAlgorithm)?;

        let header = Header {
            algorithm,
            key_id: key_id
                .map(ToOwned::to_owned)
                .or_else(|| self.key.key_id.clone()),
            type_: Some(typ.to_owned()),
            ..Default::default()
        };

        let claims = serde_json::to_string(payload)?;
        Ok(ssi_jws::encode_sign_custom_header(
            &claims, &self.key, &header,
        )?)
    }

    fn verify(&self, jwt: &str, _options: Option<&Value>) -> JwtVerificationResult {
        match ssi_jws::decode_verify(jwt, &self.key) {
            Ok(_) => JwtVerificationResult::success(),
            Err(e) => JwtVerificationResult::failure(e.to_string()),
        }
    }
}

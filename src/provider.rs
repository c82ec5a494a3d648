use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{JsonObject, SignatureError};

/// Outcome of a JWT signature check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtVerificationResult {
    pub verified: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JwtVerificationResult {
    pub fn success() -> Self {
        Self {
            verified: true,
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            verified: false,
            message: Some(message.into()),
        }
    }
}

/// Signs and verifies plain JWTs.
///
/// The SD-JWT machinery never touches keys itself: it hands the undisclosed
/// payload to a provider for signing, and the issuer-signed JWT for
/// verification.
pub trait JwtCryptoProvider {
    /// Signs `payload` as a compact JWT.
    ///
    /// `key_id` and `typ` go in the JOSE header. `options` are passed through
    /// from the caller as is.
    fn sign(
        &self,
        payload: &JsonObject,
        key_id: Option<&str>,
        typ: &str,
        options: Option<&Value>,
    ) -> Result<String, SignatureError>;

    /// Checks the signature of a compact JWT. Failure is a result, not an
    /// error.
    fn verify(&self, jwt: &str, options: Option<&Value>) -> JwtVerificationResult;
}

/// Asynchronous version of [`JwtCryptoProvider`], for keys held by a remote
/// service or a hardware device.
///
/// Every synchronous provider is also an asynchronous one.
#[async_trait]
pub trait AsyncJwtCryptoProvider: Sync {
    async fn sign_async(
        &self,
        payload: &JsonObject,
        key_id: Option<&str>,
        typ: &str,
        options: Option<&Value>,
    ) -> Result<String, SignatureError>;

    async fn verify_async(&self, jwt: &str, options: Option<&Value>) -> JwtVerificationResult;
}

#[async_trait]
impl<P: JwtCryptoProvider + Sync> AsyncJwtCryptoProvider for P {
    async fn sign_async(
        &self,
        payload: &JsonObject,
        key_id: Option<&str>,
        typ: &str,
        options: Option<&Value>,
    ) -> Result<String, SignatureError> {
        self.sign(payload, key_id, typ, options)
    }

    async fn verify_async(&self, jwt: &str, options: Option<&Value>) -> JwtVerificationResult {
        self.verify(jwt, options)
    }
}

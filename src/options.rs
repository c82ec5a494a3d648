use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Issuance options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignOptions {
    /// Identifier of the signing key, for the `kid` header parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,

    /// Value of the `typ` header parameter.
    #[serde(default = "default_typ")]
    pub typ: String,

    /// Holder binding JWT to attach to the issued SD-JWT.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder_jwt: Option<String>,

    /// Passed through to the crypto provider as is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_options: Option<Value>,
}

fn default_typ() -> String {
    "JWT".to_owned()
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            key_id: None,
            typ: default_typ(),
            holder_jwt: None,
            provider_options: None,
        }
    }
}

impl SignOptions {
    pub fn with_key_id(self, key_id: impl Into<String>) -> Self {
        Self {
            key_id: Some(key_id.into()),
            ..self
        }
    }

    pub fn with_typ(self, typ: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            ..self
        }
    }

    pub fn with_holder_jwt(self, holder_jwt: impl Into<String>) -> Self {
        Self {
            holder_jwt: Some(holder_jwt.into()),
            ..self
        }
    }

    pub fn with_provider_options(self, provider_options: Value) -> Self {
        Self {
            provider_options: Some(provider_options),
            ..self
        }
    }
}

//! Selective Disclosure for JWTs (SD-JWT).
//!
//! Issuers redact claims of a JWT payload according to an [`SdMap`],
//! replacing them with digests of [`Disclosure`]s. Holders present an
//! [`SdJwt`] with only the disclosures they choose, and verifiers check both
//! the issuer signature (through a [`JwtCryptoProvider`]) and that every
//! disclosure matches a digest.
//!
//! ```
//! use sd_jwt_kit::{DecoyMode, JwkJwtProvider, SdJwt, SdMap, SdPayload, SignOptions};
//!
//! let key: ssi_jwk::JWK = serde_json::from_value(serde_json::json!({
//!     "kty": "EC",
//!     "crv": "P-256",
//!     "d": "oYVImrMZjUclmWuhqa6bjzqGx5HFkbx76_00oWUHiLw",
//!     "x": "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s",
//!     "y": "yNXRKOnwBMTx536uajfNHklxpG9bAbdLlmVn6-XuK0Q",
//!     "alg": "ES256"
//! }))
//! .unwrap();
//! let provider = JwkJwtProvider::new(key);
//!
//! let claims = serde_json::json!({ "sub": "123", "email": "alice@example.com" });
//! let sd_map = SdMap::from_json_paths(&["email"], DecoyMode::Random, 3).unwrap();
//!
//! let payload = SdPayload::create(&claims, &sd_map).unwrap();
//! let issued = SdJwt::sign(payload, &provider, &SignOptions::default()).unwrap();
//!
//! let presented = issued.present(None, None).to_string();
//! let (sd_jwt, result) = SdJwt::parse_and_verify(&presented, &provider, None).unwrap();
//! assert!(result.verified);
//! assert!(!sd_jwt.full_payload().contains_key("email"));
//! ```
mod decoy;
pub(crate) mod digest;
mod disclosure;
mod error;
pub mod jwk;
pub mod jwt;
mod options;
mod payload;
mod policy;
pub mod provider;
pub(crate) mod serialized;
mod sd_jwt;

pub use decoy::{DecoyMode, InvalidDecoyMode};
pub use digest::{generate_salt, hash_encoded_disclosure, SdAlg};
pub use disclosure::Disclosure;
pub use error::{DecodeError, EncodeError, PolicyError, SignatureError};
pub use jwk::JwkJwtProvider;
pub use options::SignOptions;
pub use payload::SdPayload;
pub use policy::{SdField, SdMap};
pub use provider::{AsyncJwtCryptoProvider, JwtCryptoProvider, JwtVerificationResult};
pub use sd_jwt::{SdJwt, VerificationResult};
pub use serialized::{deserialize_string_format, is_sd_jwt, serialize_string_format, Deserialized};

/// Claim listing the digests of the redacted claims of an object.
pub const SD_CLAIM_NAME: &str = "_sd";

/// Claim naming the digest algorithm.
pub const SD_ALG_CLAIM_NAME: &str = "_sd_alg";

/// Separator of the compact serialization.
pub const SEPARATOR: char = '~';

/// JSON object.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

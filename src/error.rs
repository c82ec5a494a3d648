/// Errors in the decode pathway
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// Unable to deserialize string format of concatenated tildes
    #[error("Unable to deserialize string format of concatenated tildes")]
    UnableToDeserializeStringFormat,

    /// Issuer-signed JWT is not made of three base64url segments
    #[error("Invalid JWT")]
    InvalidJwt,

    /// JWT header was not a JSON object
    #[error("JWT header was not a JSON object")]
    HeaderWrongType,

    /// JWT header is missing the alg property
    #[error("JWT header is missing alg property")]
    MissingAlg,

    /// JWT payload claims were not a JSON object
    #[error("JWT payload claims were not a JSON object")]
    ClaimsWrongType,

    /// Unknown value of _sd_alg
    #[error("Unknown value of _sd_alg {0}")]
    UnknownSdAlg(String),

    /// Type of _sd_alg was not string
    #[error("Type of _sd_alg was not string")]
    SdAlgWrongType,

    /// An _sd property was not an array type
    #[error("An _sd property was not an array type")]
    SdPropertyNotArray,

    /// An _sd claim wasn't a string
    #[error("An _sd claim wasn't a string")]
    SdClaimNotString,

    /// A disclosure is malformed
    #[error("A disclosure is malformed")]
    DisclosureMalformed,

    /// Bubbled up error from base64
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    /// Bubbled up error from serde_json
    #[error(transparent)]
    JsonDeserialization(#[from] serde_json::Error),
}

/// Errors in the Encode pathway
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    /// The base claims to encode did not become a JSON object
    #[error("The base claims to encode did not become a JSON object")]
    EncodedAsNonObject,

    /// The base claims to encode contained a property reserved by SD-JWT
    #[error("The base claims to encode contained the reserved property {0}")]
    EncodedClaimsContainsReservedProperty(String),

    /// Bubbled up error from serde_json
    #[error(transparent)]
    JsonSerialization(#[from] serde_json::Error),
}

/// Errors building a selective disclosure map
#[derive(thiserror::Error, Debug)]
pub enum PolicyError {
    /// A JSON path contains an empty segment
    #[error("Invalid JSON path `{0}`: empty path segment")]
    EmptyPathSegment(String),

    /// Bubbled up error from serde_json
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors while signing an SD-JWT through a crypto provider
#[derive(thiserror::Error, Debug)]
pub enum SignatureError {
    /// The crypto provider failed to produce a token
    #[error("signing failed: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The provider returned something that is not a decodable JWT
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Bubbled up error from ssi_jws
    #[error(transparent)]
    Jws(#[from] ssi_jws::Error),

    /// Bubbled up error from serde_json
    #[error(transparent)]
    JsonSerialization(#[from] serde_json::Error),
}

impl SignatureError {
    /// Wraps any provider-side error.
    pub fn other(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Provider(e.into())
    }
}

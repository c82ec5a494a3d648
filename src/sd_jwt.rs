use std::collections::BTreeMap;
use std::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ssi_jwk::{Algorithm, JWK};

use crate::jwt::{decode_header, split_jwt, Header};
use crate::provider::{AsyncJwtCryptoProvider, JwtCryptoProvider, JwtVerificationResult};
use crate::serialized::{deserialize_string_format, serialize_string_format};
use crate::{
    DecodeError, Disclosure, JsonObject, SdMap, SdPayload, SignOptions, SignatureError,
};

/// SD-JWT: issuer-signed JWT, disclosures and optional holder binding JWT.
///
/// Issued, parsed and presented SD-JWTs all share this type. Presenting
/// never signs again: the issuer-signed JWT is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct SdJwt {
    jwt: String,
    header: Header,
    sd_payload: SdPayload,
    holder_jwt: Option<String>,
    for_presentation: bool,
}

/// Outcome of an SD-JWT verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// The issuer signature is valid.
    pub signature_verified: bool,

    /// Every disclosure matches a digest of the payload.
    pub disclosures_verified: bool,

    /// Both of the above.
    pub verified: bool,

    /// Message of the crypto provider, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerificationResult {
    fn new(signature: JwtVerificationResult, disclosures_verified: bool) -> Self {
        if !signature.verified {
            warn!(
                "SD-JWT signature verification failed: {}",
                signature.message.as_deref().unwrap_or("no message")
            );
        }

        Self {
            signature_verified: signature.verified,
            disclosures_verified,
            verified: signature.verified && disclosures_verified,
            message: signature.message,
        }
    }
}

impl SdJwt {
    /// Parses an SD-JWT in compact serialization.
    ///
    /// The signature is not checked.
    pub fn parse(serialized: &str) -> Result<Self, DecodeError> {
        let deserialized = deserialize_string_format(serialized)
            .ok_or(DecodeError::UnableToDeserializeStringFormat)?;

        let (header_b64, body_b64, _) = split_jwt(deserialized.jwt)?;
        let header = decode_header(header_b64)?;
        let sd_payload = SdPayload::parse(body_b64, deserialized.disclosures.iter().copied())?;

        debug!(
            "parsed SD-JWT with {} disclosure(s){}",
            sd_payload.disclosures().len(),
            if deserialized.holder_jwt.is_some() {
                " and holder binding"
            } else {
                ""
            }
        );

        Ok(Self {
            jwt: deserialized.jwt.to_owned(),
            header,
            sd_payload,
            holder_jwt: deserialized.holder_jwt.map(ToOwned::to_owned),
            for_presentation: deserialized.for_presentation,
        })
    }

    /// Parses an SD-JWT and verifies it.
    pub fn parse_and_verify(
        serialized: &str,
        provider: &(impl JwtCryptoProvider + ?Sized),
        options: Option<&Value>,
    ) -> Result<(Self, VerificationResult), DecodeError> {
        let sd_jwt = Self::parse(serialized)?;
        let result = sd_jwt.verify(provider, options);
        Ok((sd_jwt, result))
    }

    /// Parses an SD-JWT and verifies it with an asynchronous provider.
    pub async fn parse_and_verify_async(
        serialized: &str,
        provider: &(impl AsyncJwtCryptoProvider + ?Sized),
        options: Option<&Value>,
    ) -> Result<(Self, VerificationResult), DecodeError> {
        let sd_jwt = Self::parse(serialized)?;
        let result = sd_jwt.verify_async(provider, options).await;
        Ok((sd_jwt, result))
    }

    /// Signs the undisclosed payload of `sd_payload`.
    pub fn sign(
        sd_payload: SdPayload,
        provider: &(impl JwtCryptoProvider + ?Sized),
        options: &SignOptions,
    ) -> Result<Self, SignatureError> {
        let jwt = provider.sign(
            sd_payload.undisclosed_payload(),
            options.key_id.as_deref(),
            &options.typ,
            options.provider_options.as_ref(),
        )?;

        Self::from_signed_jwt(jwt, sd_payload, options.holder_jwt.clone())
    }

    /// Signs the undisclosed payload of `sd_payload` with an asynchronous
    /// provider.
    pub async fn sign_async(
        sd_payload: SdPayload,
        provider: &(impl AsyncJwtCryptoProvider + ?Sized),
        options: &SignOptions,
    ) -> Result<Self, SignatureError> {
        let jwt = provider
            .sign_async(
                sd_payload.undisclosed_payload(),
                options.key_id.as_deref(),
                &options.typ,
                options.provider_options.as_ref(),
            )
            .await?;

        Self::from_signed_jwt(jwt, sd_payload, options.holder_jwt.clone())
    }

    fn from_signed_jwt(
        jwt: String,
        sd_payload: SdPayload,
        holder_jwt: Option<String>,
    ) -> Result<Self, SignatureError> {
        let (header_b64, _, _) = split_jwt(&jwt)?;
        let header = decode_header(header_b64)?;

        debug!(
            "signed SD-JWT with {} disclosure(s)",
            sd_payload.disclosures().len()
        );

        Ok(Self {
            jwt,
            header,
            sd_payload,
            holder_jwt,
            for_presentation: false,
        })
    }

    /// Presents the disclosures `selection` marks as selectively disclosable.
    ///
    /// Without a selection, nothing is disclosed.
    pub fn present(&self, selection: Option<&SdMap>, holder_jwt: Option<String>) -> Self {
        let sd_payload = match selection {
            Some(selection) => self.sd_payload.with_selection(selection),
            None => self.sd_payload.without_selection(),
        };

        self.presented(sd_payload, holder_jwt)
    }

    /// Presents either every disclosure or none.
    ///
    /// Keeps the current holder binding JWT unless another one is given.
    pub fn present_all(&self, disclose_all: bool, holder_jwt: Option<String>) -> Self {
        let sd_payload = if disclose_all {
            self.sd_payload.with_all_selected()
        } else {
            self.sd_payload.without_selection()
        };

        self.presented(sd_payload, holder_jwt.or_else(|| self.holder_jwt.clone()))
    }

    fn presented(&self, sd_payload: SdPayload, holder_jwt: Option<String>) -> Self {
        debug!(
            "presenting {} of {} disclosure(s)",
            sd_payload.disclosures().len(),
            self.sd_payload.disclosures().len()
        );

        Self {
            jwt: self.jwt.clone(),
            header: self.header.clone(),
            sd_payload,
            holder_jwt,
            for_presentation: true,
        }
    }

    /// Verifies the issuer signature and the disclosures.
    pub fn verify(
        &self,
        provider: &(impl JwtCryptoProvider + ?Sized),
        options: Option<&Value>,
    ) -> VerificationResult {
        let signature = provider.verify(&self.jwt, options);
        VerificationResult::new(signature, self.sd_payload.verify_disclosures())
    }

    /// Verifies the issuer signature, with an asynchronous provider, and the
    /// disclosures.
    pub async fn verify_async(
        &self,
        provider: &(impl AsyncJwtCryptoProvider + ?Sized),
        options: Option<&Value>,
    ) -> VerificationResult {
        let signature = provider.verify_async(&self.jwt, options).await;
        VerificationResult::new(signature, self.sd_payload.verify_disclosures())
    }

    /// Compact serialization.
    ///
    /// With `for_presentation`, a separator terminates the serialization
    /// when there is no holder binding JWT.
    pub fn to_formatted_string(&self, for_presentation: bool) -> String {
        serialize_string_format(
            &self.jwt,
            self.sd_payload.disclosures().iter().map(Disclosure::encoded),
            self.holder_jwt.as_deref(),
            for_presentation,
        )
    }

    /// Issuer-signed JWT.
    pub fn jwt(&self) -> &str {
        &self.jwt
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Signature algorithm, from the `alg` header parameter.
    pub fn algorithm(&self) -> Algorithm {
        self.header.algorithm
    }

    pub fn key_id(&self) -> Option<&str> {
        self.header.key_id.as_deref()
    }

    pub fn jwk(&self) -> Option<&JWK> {
        self.header.jwk.as_ref()
    }

    pub fn holder_jwt(&self) -> Option<&str> {
        self.holder_jwt.as_deref()
    }

    /// Whether this SD-JWT is formatted for presentation.
    pub fn is_presentation(&self) -> bool {
        self.for_presentation
    }

    pub fn sd_payload(&self) -> &SdPayload {
        &self.sd_payload
    }

    pub fn disclosures(&self) -> &[Disclosure] {
        self.sd_payload.disclosures()
    }

    pub fn undisclosed_payload(&self) -> &JsonObject {
        self.sd_payload.undisclosed_payload()
    }

    pub fn full_payload(&self) -> &JsonObject {
        self.sd_payload.full_payload()
    }

    pub fn digested_disclosures(&self) -> &BTreeMap<String, Disclosure> {
        self.sd_payload.digested_disclosures()
    }

    pub fn sd_map(&self) -> &SdMap {
        self.sd_payload.sd_map()
    }
}

impl fmt::Display for SdJwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_formatted_string(self.for_presentation).fmt(f)
    }
}

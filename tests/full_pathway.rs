use async_trait::async_trait;
use sd_jwt_kit::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use ssi_jwk::{Algorithm, JWK};

fn test_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "d": "oYVImrMZjUclmWuhqa6bjzqGx5HFkbx76_00oWUHiLw",
        "use": "sig",
        "crv": "P-256",
        "kid": "rpaXW8yADRnS2150CdsMtftwxtzSiVTV9bgHHG86v-E",
        "x": "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s",
        "y": "yNXRKOnwBMTx536uajfNHklxpG9bAbdLlmVn6-XuK0Q",
        "alg": "ES256"
    }))
    .unwrap()
}

fn test_provider() -> JwkJwtProvider {
    JwkJwtProvider::new(test_key())
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct BaseClaims {
    sub: String,
    given_name: String,
    family_name: String,
    address: Address,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Address {
    street_address: String,
    country: String,
}

fn base_claims() -> BaseClaims {
    BaseClaims {
        sub: "user".to_owned(),
        given_name: "Erika".to_owned(),
        family_name: "Mustermann".to_owned(),
        address: Address {
            street_address: "Heidestraße 17".to_owned(),
            country: "DE".to_owned(),
        },
    }
}

fn issue(provider: &JwkJwtProvider) -> SdJwt {
    let sd_map = SdMap::from_json_paths(
        &["given_name", "family_name", "address", "address.street_address"],
        DecoyMode::Random,
        4,
    )
    .unwrap();

    let payload = SdPayload::create(&base_claims(), &sd_map).unwrap();
    SdJwt::sign(payload, provider, &SignOptions::default().with_key_id("key-1")).unwrap()
}

#[test_log::test]
fn full_pathway_sync() {
    let provider = test_provider();
    let issued = issue(&provider);
    assert_eq!(issued.algorithm(), Algorithm::ES256);
    assert_eq!(issued.key_id(), Some("key-1"));
    assert_eq!(issued.disclosures().len(), 4);
    assert!(!issued.is_presentation());

    let (parsed, result) =
        SdJwt::parse_and_verify(&issued.to_string(), &provider, None).unwrap();
    assert!(result.verified);
    assert!(result.signature_verified);
    assert!(result.disclosures_verified);

    let full: BaseClaims =
        serde_json::from_value(Value::Object(parsed.full_payload().clone())).unwrap();
    assert_eq!(full, base_claims());

    let selection =
        SdMap::from_json_paths(&["given_name", "address"], DecoyMode::None, 0).unwrap();
    let presentation = parsed.present(Some(&selection), None).to_string();
    assert!(presentation.ends_with('~'));

    let (presented, result) = SdJwt::parse_and_verify(&presentation, &provider, None).unwrap();
    assert!(result.verified);
    assert!(presented.is_presentation());
    assert_eq!(
        Value::Object(presented.full_payload().clone()),
        json!({
            "sub": "user",
            "given_name": "Erika",
            "address": { "country": "DE" }
        })
    );
}

#[test_log::test(tokio::test)]
async fn full_pathway_async() {
    let provider = test_provider();
    let sd_map = SdMap::from_json_paths(&["given_name"], DecoyMode::Fixed, 2).unwrap();
    let payload = SdPayload::create(&base_claims(), &sd_map).unwrap();

    let issued = SdJwt::sign_async(payload, &provider, &SignOptions::default())
        .await
        .unwrap();
    assert_eq!(issued.key_id(), test_key().key_id.as_deref());

    let (parsed, result) = SdJwt::parse_and_verify_async(&issued.to_string(), &provider, None)
        .await
        .unwrap();
    assert!(result.verified);
    assert_eq!(parsed.full_payload()["given_name"], json!("Erika"));
}

#[test_log::test]
fn holder_binding() {
    let provider = test_provider();
    let issued = issue(&provider);

    let holder_jwt = provider
        .sign(
            json!({ "nonce": "1234", "aud": "verifier" })
                .as_object()
                .unwrap(),
            None,
            "kb+jwt",
            None,
        )
        .unwrap();

    let presentation = issued
        .present(None, Some(holder_jwt.clone()))
        .to_string();
    assert!(presentation.ends_with(&holder_jwt));

    let parsed = SdJwt::parse(&presentation).unwrap();
    assert_eq!(parsed.holder_jwt(), Some(holder_jwt.as_str()));
    assert!(parsed.disclosures().is_empty());
    assert!(parsed.is_presentation());
    assert_eq!(parsed.to_string(), presentation);
    assert!(parsed.verify(&provider, None).verified);
    assert!(provider.verify(parsed.holder_jwt().unwrap(), None).verified);
}

#[test_log::test]
fn tampered_signature() {
    let provider = test_provider();
    let issued = issue(&provider);

    let other = JwkJwtProvider::new(
        serde_json::from_value(json!({
            "kty": "EC",
            "crv": "P-256",
            "x": "b28d4MwZMjw8-00CG4xfnn9SLMVMM19SlqZpVb_uNtQ",
            "y": "Xv5zWwuoaTgdS6hV43yI6gBwTnjukmFQQnJ_kCxzqk8"
        }))
        .unwrap(),
    );
    let result = issued.verify(&other, None);
    assert!(!result.verified);
    assert!(!result.signature_verified);
    assert!(result.disclosures_verified);
    assert!(result.message.is_some());
}

#[test_log::test]
fn foreign_disclosure() {
    let provider = test_provider();
    let issued = issue(&provider);

    let foreign = Disclosure::from_parts("c2FsdA", "admin", json!(true)).unwrap();
    let tampered = format!("{}~{}", issued, foreign);

    let (parsed, result) = SdJwt::parse_and_verify(&tampered, &provider, None).unwrap();
    assert!(result.signature_verified);
    assert!(!result.disclosures_verified);
    assert!(!result.verified);
    assert!(!parsed.full_payload().contains_key("admin"));
}

/// Provider with keys behind an asynchronous interface only.
struct RemoteProvider(JwkJwtProvider);

#[async_trait]
impl AsyncJwtCryptoProvider for RemoteProvider {
    async fn sign_async(
        &self,
        payload: &JsonObject,
        key_id: Option<&str>,
        typ: &str,
        options: Option<&Value>,
    ) -> Result<String, SignatureError> {
        tokio::task::yield_now().await;
        self.0.sign(payload, key_id, typ, options)
    }

    async fn verify_async(&self, jwt: &str, options: Option<&Value>) -> JwtVerificationResult {
        tokio::task::yield_now().await;
        self.0.verify(jwt, options)
    }
}

#[tokio::test]
async fn async_only_provider() {
    let provider = RemoteProvider(test_provider());
    let payload = SdPayload::create(
        &json!({ "sub": "user", "email": "user@example.com" }),
        &SdMap::from_fields([("email", SdField::leaf(true))]),
    )
    .unwrap();

    let issued = SdJwt::sign_async(
        payload,
        &provider,
        &SignOptions::default().with_typ("vc+sd-jwt"),
    )
    .await
    .unwrap();
    assert_eq!(issued.header().type_.as_deref(), Some("vc+sd-jwt"));

    let result = issued.present_all(true, None).verify_async(&provider, None).await;
    assert!(result.verified);

    // Sync providers verify what async-only ones issued.
    assert!(issued.verify(&provider.0, None).verified);
}

#[derive(Debug, thiserror::Error)]
#[error("key is offline")]
struct Offline;

struct OfflineProvider;

impl JwtCryptoProvider for OfflineProvider {
    fn sign(
        &self,
        _payload: &JsonObject,
        _key_id: Option<&str>,
        _typ: &str,
        _options: Option<&Value>,
    ) -> Result<String, SignatureError> {
        Err(SignatureError::other(Offline))
    }

    fn verify(&self, _jwt: &str, _options: Option<&Value>) -> JwtVerificationResult {
        JwtVerificationResult::failure(Offline.to_string())
    }
}

#[test]
fn provider_failure() {
    let payload = SdPayload::create(&json!({ "sub": "user" }), &SdMap::default()).unwrap();
    assert!(matches!(
        SdJwt::sign(payload, &OfflineProvider, &SignOptions::default()),
        Err(SignatureError::Provider(_))
    ));
}

use sd_jwt_kit::*;
use serde_json::json;
use ssi_jwk::{Algorithm, JWK};

fn rfc_a_5_key() -> JWK {
    serde_json::from_value(json!({
        "kty": "EC",
        "crv": "P-256",
        "x": "b28d4MwZMjw8-00CG4xfnn9SLMVMM19SlqZpVb_uNtQ",
        "y": "Xv5zWwuoaTgdS6hV43yI6gBwTnjukmFQQnJ_kCxzqk8"
    }))
    .unwrap()
}

// Example 1 of the SD-JWT draft, with the `region` and `country` claims of
// the address disclosed.
const SD_JWT: &str = concat!(
    "eyJhbGciOiAiRVMyNTYifQ.eyJfc2QiOiBbIkM5aW5wNllvUmFFWFI0Mjd6WUpQN1Fya",
    "zFXSF84YmR3T0FfWVVyVW5HUVUiLCAiS3VldDF5QWEwSElRdlluT1ZkNTloY1ZpTzlVZ",
    "zZKMmtTZnFZUkJlb3d2RSIsICJNTWxkT0ZGekIyZDB1bWxtcFRJYUdlcmhXZFVfUHBZZ",
    "kx2S2hoX2ZfOWFZIiwgIlg2WkFZT0lJMnZQTjQwVjd4RXhad1Z3ejd5Um1MTmNWd3Q1R",
    "Ew4Ukx2NGciLCAiWTM0em1JbzBRTExPdGRNcFhHd2pCZ0x2cjE3eUVoaFlUMEZHb2ZSL",
    "WFJRSIsICJmeUdwMFdUd3dQdjJKRFFsbjFsU2lhZW9iWnNNV0ExMGJRNTk4OS05RFRzI",
    "iwgIm9tbUZBaWNWVDhMR0hDQjB1eXd4N2ZZdW8zTUhZS08xNWN6LVJaRVlNNVEiLCAic",
    "zBCS1lzTFd4UVFlVTh0VmxsdE03TUtzSVJUckVJYTFQa0ptcXhCQmY1VSJdLCAiaXNzI",
    "jogImh0dHBzOi8vZXhhbXBsZS5jb20vaXNzdWVyIiwgImlhdCI6IDE2ODMwMDAwMDAsI",
    "CJleHAiOiAxODgzMDAwMDAwLCAiYWRkcmVzcyI6IHsiX3NkIjogWyI2YVVoelloWjdTS",
    "jFrVm1hZ1FBTzN1MkVUTjJDQzFhSGhlWnBLbmFGMF9FIiwgIkF6TGxGb2JrSjJ4aWF1c",
    "FJFUHlvSnotOS1OU2xkQjZDZ2pyN2ZVeW9IemciLCAiUHp6Y1Z1MHFiTXVCR1NqdWxmZ",
    "Xd6a2VzRDl6dXRPRXhuNUVXTndrclEtayIsICJiMkRrdzBqY0lGOXJHZzhfUEY4WmN2b",
    "mNXN3p3Wmo1cnlCV3ZYZnJwemVrIiwgImNQWUpISVo4VnUtZjlDQ3lWdWIyVWZnRWs4a",
    "nZ2WGV6d0sxcF9KbmVlWFEiLCAiZ2xUM2hyU1U3ZlNXZ3dGNVVEWm1Xd0JUdzMyZ25Vb",
    "GRJaGk4aEdWQ2FWNCIsICJydkpkNmlxNlQ1ZWptc0JNb0d3dU5YaDlxQUFGQVRBY2k0M",
    "G9pZEVlVnNBIiwgInVOSG9XWWhYc1poVkpDTkUyRHF5LXpxdDd0NjlnSkt5NVFhRnY3R",
    "3JNWDQiXX0sICJfc2RfYWxnIjogInNoYS0yNTYifQ.rFsowW-KSZe7EITlWsGajR9nnG",
    "BLlQ78qgtdGIZg3FZuZnxtapP0H8CUMnffJAwPQJmGnpFpulTkLWHiI1kMmw~WyJHMDJ",
    "OU3JRZmpGWFE3SW8wOXN5YWpBIiwgInJlZ2lvbiIsICJcdTZlMmZcdTUzM2EiXQ~WyJs",
    "a2x4RjVqTVlsR1RQVW92TU5JdkNBIiwgImNvdW50cnkiLCAiSlAiXQ~"
);

#[test]
fn disclose() {
    let sd_jwt = SdJwt::parse(SD_JWT).unwrap();

    assert_eq!(sd_jwt.algorithm(), Algorithm::ES256);
    assert!(sd_jwt.is_presentation());
    assert_eq!(sd_jwt.holder_jwt(), None);
    assert_eq!(sd_jwt.disclosures().len(), 2);
    assert_eq!(sd_jwt.sd_payload().sd_alg(), SdAlg::Sha256);

    assert_eq!(
        serde_json::Value::Object(sd_jwt.full_payload().clone()),
        json!({
            "iss": "https://example.com/issuer",
            "iat": 1683000000,
            "exp": 1883000000,
            "address": {
                "region": "港区",
                "country": "JP"
            }
        })
    );

    assert!(sd_jwt.sd_payload().verify_disclosures());
    assert_eq!(sd_jwt.to_string(), SD_JWT);
}

#[test]
fn verify_issuer_signature() {
    let provider = JwkJwtProvider::new(rfc_a_5_key());
    let (sd_jwt, result) = SdJwt::parse_and_verify(SD_JWT, &provider, None).unwrap();
    assert!(result.signature_verified);
    assert!(result.disclosures_verified);
    assert!(result.verified);

    // Presenting keeps the issuer signature.
    let presented = sd_jwt.present(None, None);
    assert!(presented.verify(&provider, None).verified);
}

#[test]
fn disclosure_digests() {
    let sd_jwt = SdJwt::parse(SD_JWT).unwrap();
    let digested = sd_jwt.digested_disclosures();

    assert_eq!(
        digested["PzzcVu0qbMuBGSjulfewzkesD9zutOExn5EWNwkrQ-k"].key(),
        "region"
    );
    assert_eq!(
        digested["uNHoWYhXsZhVJCNE2Dqy-zqt7t69gJKy5QaFv7GrMX4"].value(),
        &json!("JP")
    );
}

#[test]
fn regenerated_sd_map() {
    let sd_jwt = SdJwt::parse(SD_JWT).unwrap();
    let sd_map = sd_jwt.sd_map();

    assert_eq!(sd_map.decoy_mode(), DecoyMode::Fixed);
    assert_eq!(sd_map.decoys(), 8);
    for key in ["iss", "iat", "exp", "address"] {
        assert!(!sd_map.is_disclosable(key), "{key}");
    }

    let address = sd_map.get("address").and_then(SdField::children).unwrap();
    assert_eq!(address.decoy_mode(), DecoyMode::Fixed);
    assert_eq!(address.decoys(), 6);
    assert_eq!(address.len(), 2);
    assert!(address.is_disclosable("region"));
    assert!(address.is_disclosable("country"));
}

#[test]
fn present_subset() {
    let sd_jwt = SdJwt::parse(SD_JWT).unwrap();

    let selection = SdMap::from_json_paths(&["address.country"], DecoyMode::None, 0).unwrap();
    let presented = sd_jwt.present(Some(&selection), None);

    assert_eq!(presented.disclosures().len(), 1);
    assert_eq!(
        presented.full_payload()["address"],
        json!({ "country": "JP" })
    );
    assert!(presented.sd_payload().verify_disclosures());
    assert!(presented.to_string().starts_with(sd_jwt.jwt()));
    assert!(presented.to_string().ends_with("~WyJsa2x4RjVqTVlsR1RQVW92TU5JdkNBIiwgImNvdW50cnkiLCAiSlAiXQ~"));
}

#[test]
fn detection() {
    assert!(is_sd_jwt(SD_JWT));
    assert!(!is_sd_jwt("WyJsa2x4RjVqTVlsR1RQVW92TU5JdkNBIiwgImNvdW50cnkiLCAiSlAiXQ"));
}

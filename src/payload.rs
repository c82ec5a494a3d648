use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use rand::{rngs::OsRng, seq::SliceRandom, thread_rng, CryptoRng, RngCore};
use serde::Serialize;
use serde_json::Value;

use crate::digest::decoy_digest;
use crate::policy::{SdField, SdMap};
use crate::{
    jwt, DecodeError, DecoyMode, Disclosure, EncodeError, JsonObject, SdAlg, SD_ALG_CLAIM_NAME,
    SD_CLAIM_NAME,
};

/// Selectively disclosable payload.
///
/// Couples the undisclosed payload (as signed by the issuer, with `_sd`
/// digest arrays in place of redacted claims) with the disclosures at hand.
/// The fully disclosed payload and the selective disclosure map are derived
/// once, on construction. Every transformation returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct SdPayload {
    undisclosed_payload: JsonObject,
    disclosures: Vec<Disclosure>,
    digested_disclosures: BTreeMap<String, Disclosure>,
    full_payload: JsonObject,
    sd_map: SdMap,
    sd_alg: SdAlg,
}

impl SdPayload {
    /// Builds a payload from an undisclosed payload and a set of disclosures.
    ///
    /// Fails if an `_sd` claim is not an array of strings, or if an
    /// `_sd_alg` claim is not a known algorithm, anywhere in the payload or
    /// in the disclosed values. Disclosures appearing more than once are
    /// kept once.
    pub fn new(
        undisclosed_payload: JsonObject,
        disclosures: impl IntoIterator<Item = Disclosure>,
    ) -> Result<Self, DecodeError> {
        let sd_alg = match undisclosed_payload.get(SD_ALG_CLAIM_NAME) {
            None => SdAlg::default(),
            Some(Value::String(name)) => name.parse()?,
            Some(_) => return Err(DecodeError::SdAlgWrongType),
        };

        check_object(&undisclosed_payload)?;

        let mut digests = BTreeSet::new();
        let mut unique = Vec::new();
        for disclosure in disclosures {
            check_value(disclosure.value())?;
            if digests.insert(disclosure.digest(sd_alg)) {
                unique.push(disclosure);
            } else {
                warn!("dropping duplicate disclosure {disclosure}");
            }
        }

        Ok(Self::assemble(undisclosed_payload, unique, sd_alg))
    }

    /// Decodes the body segment of an issuer-signed JWT and the encoded
    /// disclosures sent along with it.
    pub fn parse<S: AsRef<str>>(
        encoded_body: &str,
        disclosures: impl IntoIterator<Item = S>,
    ) -> Result<Self, DecodeError> {
        let undisclosed_payload = match jwt::decode_json(encoded_body)? {
            Value::Object(object) => object,
            _ => return Err(DecodeError::ClaimsWrongType),
        };

        let disclosures = disclosures
            .into_iter()
            .map(|encoded| Disclosure::parse(encoded.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(undisclosed_payload, disclosures)
    }

    /// Issues a payload: redacts `claims` according to `sd_map`.
    ///
    /// Salts are drawn from the operating system's random source.
    pub fn create<T: Serialize>(claims: &T, sd_map: &SdMap) -> Result<Self, EncodeError> {
        Self::create_with(claims, sd_map, &mut OsRng)
    }

    /// Issues a payload, drawing salts from `rng`.
    pub fn create_with<T: Serialize>(
        claims: &T,
        sd_map: &SdMap,
        rng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Self, EncodeError> {
        let claims = serde_json::to_value(claims)?;
        check_unreserved(&claims)?;
        let claims = match claims {
            Value::Object(object) => object,
            _ => return Err(EncodeError::EncodedAsNonObject),
        };

        let sd_alg = SdAlg::default();
        let mut redactor = Redactor {
            sd_alg,
            rng,
            disclosures: Vec::new(),
        };
        let undisclosed_payload = redactor.redact_object(&claims, sd_map)?;
        debug!(
            "issued payload with {} disclosure(s)",
            redactor.disclosures.len()
        );

        Ok(Self::assemble(
            undisclosed_payload,
            redactor.disclosures,
            sd_alg,
        ))
    }

    /// Issues a payload where every claim of `full` that is missing from
    /// `undisclosed` is selectively disclosable.
    pub fn create_from_full_and_undisclosed(
        full: &JsonObject,
        undisclosed: &JsonObject,
        decoy_mode: DecoyMode,
        decoys: u32,
    ) -> Result<Self, EncodeError> {
        let sd_map = SdMap::generate(full, undisclosed, decoy_mode, decoys);
        Self::create(full, &sd_map)
    }

    fn assemble(
        undisclosed_payload: JsonObject,
        disclosures: Vec<Disclosure>,
        sd_alg: SdAlg,
    ) -> Self {
        let digested_disclosures: BTreeMap<_, _> = disclosures
            .iter()
            .map(|d| (d.digest(sd_alg), d.clone()))
            .collect();

        let (full_payload, _) = reconstruct_object(
            &undisclosed_payload,
            &digested_disclosures,
            Ledger::new(&digested_disclosures),
        );
        let sd_map = SdMap::regenerate(&undisclosed_payload, &digested_disclosures);

        Self {
            undisclosed_payload,
            disclosures,
            digested_disclosures,
            full_payload,
            sd_map,
            sd_alg,
        }
    }

    /// Checks that every disclosure is referenced by exactly one digest and
    /// resolves to a claim that does not collide with another one.
    ///
    /// Digests without a disclosure (decoys, withheld claims) do not affect
    /// the outcome.
    pub fn verify_disclosures(&self) -> bool {
        let (_, ledger) = reconstruct_object(
            &self.undisclosed_payload,
            &self.digested_disclosures,
            Ledger::new(&self.digested_disclosures),
        );

        if !ledger.unconsumed.is_empty() {
            warn!(
                "{} disclosure(s) not referenced by any digest",
                ledger.unconsumed.len()
            );
        }

        ledger.unconsumed.is_empty() && ledger.conflicts == 0
    }

    /// Keeps only the disclosures `selection` marks as selectively
    /// disclosable, along with the disclosures enclosing them.
    pub fn with_selection(&self, selection: &SdMap) -> Self {
        let mut selected = BTreeSet::new();
        self.select_object(&self.undisclosed_payload, selection, &mut selected);

        let disclosures = self
            .disclosures
            .iter()
            .filter(|d| selected.contains(&d.digest(self.sd_alg)))
            .cloned()
            .collect();

        Self::assemble(self.undisclosed_payload.clone(), disclosures, self.sd_alg)
    }

    /// Drops every disclosure.
    pub fn without_selection(&self) -> Self {
        Self::assemble(self.undisclosed_payload.clone(), Vec::new(), self.sd_alg)
    }

    /// Keeps every disclosure.
    pub fn with_all_selected(&self) -> Self {
        self.clone()
    }

    fn select_object(&self, object: &JsonObject, selection: &SdMap, selected: &mut BTreeSet<String>) {
        let empty = SdMap::default();
        let child_selection = |key: &str| {
            selection
                .get(key)
                .and_then(SdField::children)
                .unwrap_or(&empty)
        };

        for (key, value) in object {
            if let Value::Object(nested) = value {
                if key != SD_CLAIM_NAME && key != SD_ALG_CLAIM_NAME {
                    self.select_object(nested, child_selection(key.as_str()), selected);
                }
            }
        }

        for digest in sd_digests(object) {
            let Some(disclosure) = self.digested_disclosures.get(digest) else {
                continue;
            };

            if selection.is_disclosable(disclosure.key()) && selected.insert(digest.to_owned()) {
                if let Value::Object(nested) = disclosure.value() {
                    self.select_object(nested, child_selection(disclosure.key()), selected);
                }
            }
        }
    }

    /// Payload as signed by the issuer.
    pub fn undisclosed_payload(&self) -> &JsonObject {
        &self.undisclosed_payload
    }

    /// Payload with every available disclosure resolved, without any `_sd`
    /// or `_sd_alg` claim.
    pub fn full_payload(&self) -> &JsonObject {
        &self.full_payload
    }

    /// What could be disclosed in this payload, as far as the available
    /// disclosures tell.
    pub fn sd_map(&self) -> &SdMap {
        &self.sd_map
    }

    pub fn sd_alg(&self) -> SdAlg {
        self.sd_alg
    }

    /// Disclosures, in the order they were received or issued.
    pub fn disclosures(&self) -> &[Disclosure] {
        &self.disclosures
    }

    /// Disclosures indexed by digest.
    pub fn digested_disclosures(&self) -> &BTreeMap<String, Disclosure> {
        &self.digested_disclosures
    }
}

/// Digests listed in the `_sd` claim of `object`.
pub(crate) fn sd_digests(object: &JsonObject) -> impl Iterator<Item = &str> {
    object
        .get(SD_CLAIM_NAME)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

struct Redactor<'a, R> {
    sd_alg: SdAlg,
    rng: &'a mut R,
    disclosures: Vec<Disclosure>,
}

impl<R: CryptoRng + RngCore> Redactor<'_, R> {
    fn redact_object(
        &mut self,
        object: &JsonObject,
        sd_map: &SdMap,
    ) -> Result<JsonObject, EncodeError> {
        let mut output = JsonObject::new();
        let mut digests = Vec::new();

        for (key, value) in object {
            let field = sd_map.get(key);

            let children = field
                .and_then(SdField::children)
                .filter(|children| !children.is_empty());

            let value = match (children, value) {
                (Some(children), Value::Object(nested)) => {
                    Value::Object(self.redact_object(nested, children)?)
                }
                _ => value.clone(),
            };

            if field.map_or(false, SdField::sd) {
                let disclosure = Disclosure::new_with_rng(&mut *self.rng, key.clone(), value)?;
                digests.push(disclosure.digest(self.sd_alg));
                self.disclosures.push(disclosure);
            } else {
                output.insert(key.clone(), value);
            }
        }

        let mut weak_rng = thread_rng();
        let decoys = sd_map
            .decoy_mode()
            .decoy_count(sd_map.decoys(), &mut weak_rng);
        debug!(
            "redacting {} claim(s) with {} decoy(s)",
            digests.len(),
            decoys
        );

        for _ in 0..decoys {
            digests.push(decoy_digest(self.sd_alg, &mut *self.rng));
        }
        digests.shuffle(&mut weak_rng);

        output.insert(
            SD_CLAIM_NAME.to_owned(),
            Value::Array(digests.into_iter().map(Value::String).collect()),
        );
        output.insert(
            SD_ALG_CLAIM_NAME.to_owned(),
            Value::String(self.sd_alg.to_str().to_owned()),
        );

        Ok(output)
    }
}

/// Disclosures not consumed yet by the reconstruction, and the number of
/// conflicting resolutions met so far.
struct Ledger {
    unconsumed: BTreeSet<String>,
    conflicts: usize,
}

impl Ledger {
    fn new(digested_disclosures: &BTreeMap<String, Disclosure>) -> Self {
        Self {
            unconsumed: digested_disclosures.keys().cloned().collect(),
            conflicts: 0,
        }
    }
}

fn reconstruct_object(
    object: &JsonObject,
    digested_disclosures: &BTreeMap<String, Disclosure>,
    mut ledger: Ledger,
) -> (JsonObject, Ledger) {
    let mut output = JsonObject::new();

    for (key, value) in object {
        if key == SD_CLAIM_NAME || key == SD_ALG_CLAIM_NAME {
            continue;
        }

        let (value, next) = reconstruct_value(value, digested_disclosures, ledger);
        ledger = next;
        output.insert(key.clone(), value);
    }

    for digest in sd_digests(object) {
        let Some(disclosure) = digested_disclosures.get(digest) else {
            continue;
        };

        if !ledger.unconsumed.remove(digest) {
            warn!("digest {digest} is referenced more than once");
            ledger.conflicts += 1;
            continue;
        }

        let key = disclosure.key();
        if key == SD_CLAIM_NAME || key == SD_ALG_CLAIM_NAME || output.contains_key(key) {
            warn!("disclosed claim `{key}` collides with another claim");
            ledger.conflicts += 1;
            continue;
        }

        let (value, next) = reconstruct_value(disclosure.value(), digested_disclosures, ledger);
        ledger = next;
        output.insert(key.to_owned(), value);
    }

    (output, ledger)
}

fn reconstruct_value(
    value: &Value,
    digested_disclosures: &BTreeMap<String, Disclosure>,
    ledger: Ledger,
) -> (Value, Ledger) {
    match value {
        Value::Object(object) => {
            let (object, ledger) = reconstruct_object(object, digested_disclosures, ledger);
            (Value::Object(object), ledger)
        }
        // Arrays are copied as is: digests inside them are never resolved.
        Value::Array(_) | Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            (value.clone(), ledger)
        }
    }
}

fn check_object(object: &JsonObject) -> Result<(), DecodeError> {
    for (key, value) in object {
        match key.as_str() {
            SD_CLAIM_NAME => match value {
                Value::Array(digests) => {
                    if !digests.iter().all(Value::is_string) {
                        return Err(DecodeError::SdClaimNotString);
                    }
                }
                _ => return Err(DecodeError::SdPropertyNotArray),
            },
            SD_ALG_CLAIM_NAME => match value {
                Value::String(name) => {
                    SdAlg::try_from(name.as_str())?;
                }
                _ => return Err(DecodeError::SdAlgWrongType),
            },
            _ => check_value(value)?,
        }
    }

    Ok(())
}

fn check_value(value: &Value) -> Result<(), DecodeError> {
    match value {
        Value::Object(object) => check_object(object),
        Value::Array(_) | Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            Ok(())
        }
    }
}

fn check_unreserved(value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Object(object) => object.iter().try_for_each(|(key, value)| {
            if key == SD_CLAIM_NAME || key == SD_ALG_CLAIM_NAME {
                return Err(EncodeError::EncodedClaimsContainsReservedProperty(
                    key.clone(),
                ));
            }
            check_unreserved(value)
        }),
        Value::Array(items) => items.iter().try_for_each(check_unreserved),
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => Ok(()),
    }
}

use std::collections::{btree_map, BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::payload::sd_digests;
use crate::{DecoyMode, Disclosure, JsonObject, PolicyError, SD_ALG_CLAIM_NAME, SD_CLAIM_NAME};

/// Selective disclosure settings of a single claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdField {
    sd: bool,

    #[serde(default)]
    children: Option<SdMap>,
}

impl SdField {
    /// Creates a new field.
    ///
    /// `children` only applies when the claim value is a JSON object.
    pub fn new(sd: bool, children: Option<SdMap>) -> Self {
        Self { sd, children }
    }

    /// Field without nested settings.
    pub fn leaf(sd: bool) -> Self {
        Self::new(sd, None)
    }

    /// Whether the claim is selectively disclosable.
    pub fn sd(&self) -> bool {
        self.sd
    }

    pub fn children(&self) -> Option<&SdMap> {
        self.children.as_ref()
    }
}

/// Selective disclosure map.
///
/// Maps claim names of one level of a payload to their [`SdField`], together
/// with the decoy settings of that level. Decoys are generated per level, so
/// each nested map carries its own settings.
///
/// An `SdMap` cannot be modified once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SdMapRepr", into = "SdMapRepr")]
pub struct SdMap {
    fields: BTreeMap<String, SdField>,
    decoy_mode: DecoyMode,
    decoys: u32,
}

impl SdMap {
    pub fn new<K: Into<String>>(
        fields: impl IntoIterator<Item = (K, SdField)>,
        decoy_mode: DecoyMode,
        decoys: u32,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(|(k, f)| (k.into(), f)).collect(),
            decoy_mode,
            decoys,
        }
    }

    /// Map without decoys.
    pub fn from_fields<K: Into<String>>(fields: impl IntoIterator<Item = (K, SdField)>) -> Self {
        Self::new(fields, DecoyMode::None, 0)
    }

    /// Same fields, other decoy settings.
    pub fn with_decoys(self, decoy_mode: DecoyMode, decoys: u32) -> Self {
        Self {
            decoy_mode,
            decoys,
            ..self
        }
    }

    pub fn get(&self, key: &str) -> Option<&SdField> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Whether `key` is marked as selectively disclosable at this level.
    pub fn is_disclosable(&self, key: &str) -> bool {
        self.get(key).map_or(false, SdField::sd)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, SdField> {
        self.fields.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, String, SdField> {
        self.fields.keys()
    }

    pub fn decoy_mode(&self) -> DecoyMode {
        self.decoy_mode
    }

    pub fn decoys(&self) -> u32 {
        self.decoys
    }

    /// Generates a map by comparing the fully disclosed payload with the
    /// undisclosed payload: every claim missing from `undisclosed` is
    /// selectively disclosable.
    ///
    /// The decoy settings are applied to every level.
    pub fn generate(
        full: &JsonObject,
        undisclosed: &JsonObject,
        decoy_mode: DecoyMode,
        decoys: u32,
    ) -> Self {
        let fields = full.iter().map(|(key, value)| {
            let children = match (value, undisclosed.get(key)) {
                (Value::Object(full), Some(Value::Object(undisclosed))) => {
                    Some(Self::generate(full, undisclosed, decoy_mode, decoys))
                }
                _ => None,
            };

            (
                key.clone(),
                SdField::new(!undisclosed.contains_key(key), children),
            )
        });

        Self::new(fields, decoy_mode, decoys)
    }

    /// Generates a map from simplified JSON paths such as
    /// `credentialSubject.firstName`.
    ///
    /// Every listed path is selectively disclosable. Intermediate claims that
    /// are not listed themselves are kept in the clear.
    pub fn from_json_paths(
        paths: &[impl AsRef<str>],
        decoy_mode: DecoyMode,
        decoys: u32,
    ) -> Result<Self, PolicyError> {
        let paths: Vec<&str> = paths.iter().map(AsRef::as_ref).collect();

        if let Some(path) = paths.iter().find(|p| p.split('.').any(str::is_empty)) {
            return Err(PolicyError::EmptyPathSegment((*path).to_owned()));
        }

        let sd_paths: BTreeSet<&str> = paths.iter().copied().collect();
        Ok(Self::from_path_segments(
            &paths, &sd_paths, "", decoy_mode, decoys,
        ))
    }

    fn from_path_segments(
        paths: &[&str],
        sd_paths: &BTreeSet<&str>,
        parent: &str,
        decoy_mode: DecoyMode,
        decoys: u32,
    ) -> Self {
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for &path in paths {
            match path.split_once('.') {
                Some((first, rest)) => grouped.entry(first).or_default().push(rest),
                None => {
                    grouped.entry(path).or_default();
                }
            }
        }

        let fields = grouped.into_iter().map(|(key, rest)| {
            let current = if parent.is_empty() {
                key.to_owned()
            } else {
                format!("{parent}.{key}")
            };

            let children = (!rest.is_empty()).then(|| {
                Self::from_path_segments(&rest, sd_paths, &current, decoy_mode, decoys)
            });

            (
                key,
                SdField::new(sd_paths.contains(current.as_str()), children),
            )
        });

        Self::new(fields, decoy_mode, decoys)
    }

    /// Regenerates the map of an issued payload from its undisclosed form and
    /// the disclosures at hand, indexed by digest.
    ///
    /// Digests without a disclosure are counted as fixed decoys of their
    /// level, since a verifier cannot tell them apart.
    pub fn regenerate(
        undisclosed: &JsonObject,
        digested_disclosures: &BTreeMap<String, Disclosure>,
    ) -> Self {
        let mut fields = BTreeMap::new();
        let mut decoys = 0;

        for (key, value) in undisclosed {
            if key == SD_CLAIM_NAME || key == SD_ALG_CLAIM_NAME {
                continue;
            }

            fields.insert(
                key.clone(),
                Self::regenerate_field(false, value, digested_disclosures),
            );
        }

        for digest in sd_digests(undisclosed) {
            match digested_disclosures.get(digest) {
                Some(disclosure) => {
                    fields.entry(disclosure.key().to_owned()).or_insert_with(|| {
                        Self::regenerate_field(true, disclosure.value(), digested_disclosures)
                    });
                }
                None => decoys += 1,
            }
        }

        Self {
            fields,
            decoy_mode: DecoyMode::Fixed,
            decoys,
        }
    }

    fn regenerate_field(
        sd: bool,
        value: &Value,
        digested_disclosures: &BTreeMap<String, Disclosure>,
    ) -> SdField {
        let children = match value {
            Value::Object(object) => Some(Self::regenerate(object, digested_disclosures)),
            _ => None,
        };

        SdField::new(sd, children)
    }

    /// Parses a map from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a map from its JSON form.
    pub fn from_json_value(json: Value) -> Result<Self, PolicyError> {
        Ok(serde_json::from_value(json)?)
    }

    /// Pretty printed JSON form.
    pub fn to_pretty_json(&self) -> Result<String, PolicyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<'a> IntoIterator for &'a SdMap {
    type Item = (&'a String, &'a SdField);
    type IntoIter = btree_map::Iter<'a, String, SdField>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SdMapRepr {
    #[serde(default)]
    fields: Option<BTreeMap<String, SdField>>,

    #[serde(default)]
    decoy_mode: DecoyMode,

    #[serde(default)]
    decoys: u32,
}

impl From<SdMapRepr> for SdMap {
    fn from(value: SdMapRepr) -> Self {
        Self {
            fields: value.fields.unwrap_or_default(),
            decoy_mode: value.decoy_mode,
            decoys: value.decoys,
        }
    }
}

impl From<SdMap> for SdMapRepr {
    fn from(value: SdMap) -> Self {
        Self {
            fields: (!value.fields.is_empty()).then_some(value.fields),
            decoy_mode: value.decoy_mode,
            decoys: value.decoys,
        }
    }
}

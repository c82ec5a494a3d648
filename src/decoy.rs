use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mode for adding decoy digests to one level of the payload on issuance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecoyMode {
    /// No decoys.
    #[default]
    None,

    /// Exactly `decoys` decoy digests.
    Fixed,

    /// Between 1 and `decoys` decoy digests, uniformly drawn.
    Random,
}

impl DecoyMode {
    const NONE_STR: &'static str = "NONE";
    const FIXED_STR: &'static str = "FIXED";
    const RANDOM_STR: &'static str = "RANDOM";

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::None => Self::NONE_STR,
            Self::Fixed => Self::FIXED_STR,
            Self::Random => Self::RANDOM_STR,
        }
    }

    /// Number of decoy digests to add to a level configured with this mode
    /// and `decoys`.
    ///
    /// Decoy counts are not security sensitive and may use any `rng`.
    pub fn decoy_count(&self, decoys: u32, rng: &mut impl Rng) -> u32 {
        match self {
            Self::None => 0,
            Self::Fixed => decoys,
            Self::Random if decoys == 0 => 0,
            Self::Random => rng.gen_range(1..=decoys),
        }
    }
}

/// Unknown decoy mode name.
#[derive(Debug, thiserror::Error)]
#[error("invalid decoy mode `{0}`")]
pub struct InvalidDecoyMode(pub String);

impl FromStr for DecoyMode {
    type Err = InvalidDecoyMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::NONE_STR => Ok(Self::None),
            Self::FIXED_STR => Ok(Self::Fixed),
            Self::RANDOM_STR => Ok(Self::Random),
            other => Err(InvalidDecoyMode(other.to_owned())),
        }
    }
}

impl fmt::Display for DecoyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_str().fmt(f)
    }
}

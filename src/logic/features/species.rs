//! Species selection and its one-hot encoding.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Patient species. The form always has one selected, so there is no "unset" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    #[default]
    Cat,
    Dog,
}

/// `(species_is_cat, species_is_dog)` flags, exactly one set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesFlags {
    pub is_cat: u8,
    pub is_dog: u8,
}

impl Species {
    pub const ALL: [Species; 2] = [Species::Cat, Species::Dog];

    pub fn one_hot(self) -> SpeciesFlags {
        match self {
            Species::Cat => SpeciesFlags { is_cat: 1, is_dog: 0 },
            Species::Dog => SpeciesFlags { is_cat: 0, is_dog: 1 },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Cat => "cat",
            Species::Dog => "dog",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown species '{0}' (expected cat or dog)")]
pub struct UnknownSpecies(pub String);

impl FromStr for Species {
    type Err = UnknownSpecies;

    /// Accepts English names and the labels the original Turkish form used.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cat" | "kedi" => Ok(Species::Cat),
            "dog" | "köpek" | "kopek" => Ok(Species::Dog),
            _ => Err(UnknownSpecies(s.to_string())),
        }
    }
}

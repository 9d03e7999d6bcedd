use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Service tier of a room type. The canonical spelling of the first tier is
/// the accented `ESTÁNDAR`; inbound data arrives in several encoding variants
/// of that word (plain `ESTANDAR`, English `STANDARD`, precomposed `Á`,
/// `A` + combining acute) and all of them collapse to this one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Estandar,
    Junior,
    Suite,
}

/// Occupancy category. Canonical values are the English spellings; the
/// Spanish synonyms submitted by the legacy UI (SENCILLA, DOBLE, CUÁDRUPLE)
/// are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accommodation {
    Single,
    Double,
    Triple,
    Quadruple,
}

/// Uppercases and strips diacritics so every encoding variant of one word
/// compares equal. Combining marks are dropped outright.
fn fold_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter_map(|c| match c {
            '\u{0300}'..='\u{036f}' => None,
            'á' | 'Á' | 'à' | 'À' => Some('A'),
            'é' | 'É' => Some('E'),
            'í' | 'Í' => Some('I'),
            'ó' | 'Ó' => Some('O'),
            'ú' | 'Ú' => Some('U'),
            c => Some(c.to_ascii_uppercase()),
        })
        .collect()
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match fold_key(raw).as_str() {
            "ESTANDAR" | "STANDARD" => Ok(Tier::Estandar),
            "JUNIOR" => Ok(Tier::Junior),
            "SUITE" => Ok(Tier::Suite),
            _ => Err(format!(
                "unknown room type '{}'; expected one of ESTÁNDAR, JUNIOR, SUITE",
                raw
            )),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::Estandar => "ESTÁNDAR",
            Tier::Junior => "JUNIOR",
            Tier::Suite => "SUITE",
        })
    }
}

impl FromStr for Accommodation {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match fold_key(raw).as_str() {
            "SINGLE" | "SENCILLA" => Ok(Accommodation::Single),
            "DOUBLE" | "DOBLE" => Ok(Accommodation::Double),
            "TRIPLE" => Ok(Accommodation::Triple),
            "QUADRUPLE" | "CUADRUPLE" => Ok(Accommodation::Quadruple),
            _ => Err(format!(
                "unknown accommodation '{}'; expected one of SINGLE, DOUBLE, TRIPLE, QUADRUPLE",
                raw
            )),
        }
    }
}

impl fmt::Display for Accommodation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Accommodation::Single => "SINGLE",
            Accommodation::Double => "DOUBLE",
            Accommodation::Triple => "TRIPLE",
            Accommodation::Quadruple => "QUADRUPLE",
        })
    }
}

impl Tier {
    /// The authoritative tier → accommodation compatibility table. Both the
    /// bulk hotel handler and the single room-type handler consume this one
    /// definition.
    pub fn allowed_accommodations(self) -> &'static [Accommodation] {
        match self {
            Tier::Estandar => &[Accommodation::Single, Accommodation::Double],
            Tier::Junior => &[Accommodation::Triple, Accommodation::Quadruple],
            Tier::Suite => &[
                Accommodation::Single,
                Accommodation::Double,
                Accommodation::Triple,
            ],
        }
    }

    pub fn allows(self, accommodation: Accommodation) -> bool {
        self.allowed_accommodations().contains(&accommodation)
    }
}

/// Canonicalizes a stored tier string. Rows written before normalization was
/// introduced may carry any encoding variant; unknown values pass through
/// untouched so reads never fail on legacy garbage.
pub fn normalize_tier(raw: &str) -> String {
    match Tier::from_str(raw) {
        Ok(tier) => tier.to_string(),
        Err(_) => raw.to_string(),
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(Tier);
string_serde!(Accommodation);

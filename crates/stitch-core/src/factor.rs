//! Acquisition factors: the discrete dimensions along which views vary.
//!
//! Every view carries one value per factor (its timepoint, angle, channel,
//! illumination direction and tile position). Grouping and pairing decisions
//! are expressed as sets of factors, so the enum is deliberately closed: an
//! unknown dimension name is a configuration error, not an extension point.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A discrete acquisition dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Timepoint,
    Angle,
    Channel,
    Illumination,
    Tile,
}

impl Factor {
    /// All factors, in canonical order.
    pub const ALL: [Factor; 5] = [
        Factor::Timepoint,
        Factor::Angle,
        Factor::Channel,
        Factor::Illumination,
        Factor::Tile,
    ];

    /// Canonical lowercase name, matching the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Factor::Timepoint => "timepoint",
            Factor::Angle => "angle",
            Factor::Channel => "channel",
            Factor::Illumination => "illumination",
            Factor::Tile => "tile",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error raised when a factor name does not match any known dimension.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown acquisition dimension `{0}`")]
pub struct FactorParseError(pub String);

impl FromStr for Factor {
    type Err = FactorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Factor::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| FactorParseError(s.to_owned()))
    }
}

/// An ordered set of [`Factor`]s.
///
/// Used for the application / grouping / comparison axes of a grouping
/// configuration. Iteration order is the canonical factor order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactorSet(BTreeSet<Factor>);

impl FactorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of(factors: &[Factor]) -> Self {
        Self(factors.iter().copied().collect())
    }

    pub fn insert(&mut self, factor: Factor) -> bool {
        self.0.insert(factor)
    }

    pub fn contains(&self, factor: Factor) -> bool {
        self.0.contains(&factor)
    }

    pub fn is_disjoint(&self, other: &FactorSet) -> bool {
        self.0.is_disjoint(&other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Factor> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First factor the two sets share, if any.
    pub fn common_factor(&self, other: &FactorSet) -> Option<Factor> {
        self.0.intersection(&other.0).next().copied()
    }
}

impl FromIterator<Factor> for FactorSet {
    fn from_iter<I: IntoIterator<Item = Factor>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FactorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, factor) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{factor}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_roundtrip_through_parsing() {
        for factor in Factor::ALL {
            assert_eq!(factor.name().parse::<Factor>(), Ok(factor));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "wavelength".parse::<Factor>().unwrap_err();
        assert_eq!(err, FactorParseError("wavelength".to_owned()));
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&Factor::Illumination).unwrap();
        assert_eq!(json, "\"illumination\"");
        let set = FactorSet::of(&[Factor::Tile, Factor::Channel]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "[\"channel\",\"tile\"]");
    }

    #[test]
    fn disjointness_and_common_factor() {
        let a = FactorSet::of(&[Factor::Channel, Factor::Illumination]);
        let b = FactorSet::of(&[Factor::Tile]);
        assert!(a.is_disjoint(&b));
        assert_eq!(a.common_factor(&b), None);

        let c = FactorSet::of(&[Factor::Illumination, Factor::Angle]);
        assert!(!a.is_disjoint(&c));
        assert_eq!(a.common_factor(&c), Some(Factor::Illumination));
    }

    #[test]
    fn display_lists_factors_in_canonical_order() {
        let set = FactorSet::of(&[Factor::Tile, Factor::Timepoint]);
        assert_eq!(set.to_string(), "{timepoint, tile}");
    }
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::{Result, SfdkError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Capabilities a context can be asked to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    /// Key generation, encryption and decryption.
    Pke,
    /// Rotation keys and slot rotations.
    #[serde(rename = "KEYSWITCH")]
    KeySwitch,
    /// Ciphertext multiplication and relinearization.
    #[serde(rename = "LEVELEDSHE")]
    LeveledShe,
    /// One-time decryption keys and zero sponges.
    Sfdk,
}

impl Feature {
    pub const ALL: [Feature; 4] = [
        Feature::Pke,
        Feature::KeySwitch,
        Feature::LeveledShe,
        Feature::Sfdk,
    ];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Pke => "PKE",
            Feature::KeySwitch => "KEYSWITCH",
            Feature::LeveledShe => "LEVELEDSHE",
            Feature::Sfdk => "SFDK",
        };
        f.write_str(name)
    }
}

/// The features enabled on a context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeSet<Feature>);

impl FeatureSet {
    pub fn all() -> Self {
        Feature::ALL.into_iter().collect()
    }

    pub fn enable(&mut self, feature: Feature) -> &mut Self {
        self.0.insert(feature);
        self
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.0.contains(&feature)
    }

    pub fn require(&self, feature: Feature) -> Result<()> {
        if self.contains(feature) {
            Ok(())
        } else {
            Err(SfdkError::FeatureNotEnabled(feature))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_reports_the_missing_feature() {
        let mut features: FeatureSet = [Feature::Pke].into_iter().collect();
        assert!(features.require(Feature::Pke).is_ok());
        assert!(matches!(
            features.require(Feature::Sfdk),
            Err(SfdkError::FeatureNotEnabled(Feature::Sfdk))
        ));
        features.enable(Feature::Sfdk);
        assert!(features.require(Feature::Sfdk).is_ok());
    }

    #[test]
    fn all_enables_everything() {
        let features = FeatureSet::all();
        assert!(Feature::ALL.iter().all(|f| features.contains(*f)));
        assert_eq!(Feature::LeveledShe.to_string(), "LEVELEDSHE");
    }
}

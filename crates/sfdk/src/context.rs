// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::{Result, SfdkError};
use crate::features::{Feature, FeatureSet};
use crate::parameters::SfdkParameters;
use fhe::bfv::{EvaluationKey, RelinearizationKey};
use rand_chacha::ChaCha20Rng;
use sfdk_fhe_params::SfdkPreset;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub type SharedRng = Arc<Mutex<ChaCha20Rng>>;

/// Evaluation keys registered on a context.
#[derive(Default)]
pub(crate) struct EvalKeys {
    pub(crate) relinearization: Option<RelinearizationKey>,
    /// Column rotation keys, by left shift.
    pub(crate) rotations: BTreeMap<usize, EvaluationKey>,
}

/// Entry point of the library: parameters, enabled features, evaluation keys and the
/// randomness source shared by every operation.
pub struct SfdkContext {
    params: Arc<SfdkParameters>,
    features: FeatureSet,
    keys: RwLock<EvalKeys>,
    rng: SharedRng,
}

impl SfdkContext {
    pub fn new(params: SfdkParameters, features: FeatureSet, rng: SharedRng) -> Self {
        Self {
            params: Arc::new(params),
            features,
            keys: RwLock::new(EvalKeys::default()),
            rng,
        }
    }

    /// A context over `preset` with every feature enabled.
    pub fn from_preset(preset: SfdkPreset, rng: SharedRng) -> Result<Self> {
        Ok(Self::new(
            SfdkParameters::from_preset(preset)?,
            FeatureSet::all(),
            rng,
        ))
    }

    pub fn params(&self) -> &Arc<SfdkParameters> {
        &self.params
    }

    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn enable(&mut self, feature: Feature) {
        self.features.enable(feature);
    }

    pub fn ring_dimension(&self) -> usize {
        self.params.degree()
    }

    pub(crate) fn require(&self, feature: Feature) -> Result<()> {
        self.features.require(feature)
    }

    pub(crate) fn with_rng<T>(&self, f: impl FnOnce(&mut ChaCha20Rng) -> Result<T>) -> Result<T> {
        let mut rng = self.rng.lock().map_err(|_| SfdkError::Poisoned("rng"))?;
        f(&mut *rng)
    }

    pub(crate) fn eval_keys(&self) -> Result<RwLockReadGuard<'_, EvalKeys>> {
        self.keys
            .read()
            .map_err(|_| SfdkError::Poisoned("evaluation keys"))
    }

    pub(crate) fn eval_keys_mut(&self) -> Result<RwLockWriteGuard<'_, EvalKeys>> {
        self.keys
            .write()
            .map_err(|_| SfdkError::Poisoned("evaluation keys"))
    }

    /// Maps a signed slot index (negative rotates right) onto a left shift within a row.
    pub(crate) fn left_shift(&self, index: i32) -> usize {
        let row = self.params.row_size() as i64;
        (index as i64).rem_euclid(row) as usize
    }
}

impl fmt::Debug for SfdkContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (relinearization, rotations) = match self.keys.read() {
            Ok(keys) => (
                keys.relinearization.is_some(),
                keys.rotations.keys().copied().collect::<Vec<_>>(),
            ),
            Err(_) => (false, Vec::new()),
        };
        f.debug_struct("SfdkContext")
            .field("params", &self.params)
            .field("features", &self.features)
            .field("relinearization", &relinearization)
            .field("rotations", &rotations)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn context(features: FeatureSet) -> SfdkContext {
        let params = SfdkParameters::from_preset(SfdkPreset::InsecureSfdk1024).unwrap();
        let rng = Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(0)));
        SfdkContext::new(params, features, rng)
    }

    #[test]
    fn signed_indices_map_to_left_shifts() {
        let cc = context(FeatureSet::all());
        assert_eq!(cc.left_shift(3), 3);
        assert_eq!(cc.left_shift(-1), 511);
        assert_eq!(cc.left_shift(-512), 0);
        assert_eq!(cc.left_shift(512), 0);
    }

    #[test]
    fn features_can_be_enabled_later() {
        let mut cc = context(FeatureSet::default());
        assert!(cc.require(Feature::Pke).is_err());
        cc.enable(Feature::Pke);
        assert!(cc.require(Feature::Pke).is_ok());
    }

    #[test]
    fn debug_lists_registered_keys() {
        let cc = context(FeatureSet::all());
        let rendered = format!("{cc:?}");
        assert!(rendered.contains("relinearization: false"));
        assert!(rendered.contains("rotations: []"));
    }
}

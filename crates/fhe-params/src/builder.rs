// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::presets::{PresetError, SfdkParamSet};
use fhe::bfv::{BfvParameters, BfvParametersBuilder};
use std::sync::Arc;

pub fn build_bfv_params_from_set(param_set: SfdkParamSet) -> Result<BfvParameters, PresetError> {
    build_bfv_params(
        param_set.degree,
        param_set.plaintext_modulus,
        param_set.moduli,
        param_set.variance,
    )
}

pub fn build_bfv_params_from_set_arc(
    param_set: SfdkParamSet,
) -> Result<Arc<BfvParameters>, PresetError> {
    build_bfv_params_arc(
        param_set.degree,
        param_set.plaintext_modulus,
        param_set.moduli,
        param_set.variance,
    )
}

pub fn build_bfv_params(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
    variance: usize,
) -> Result<BfvParameters, PresetError> {
    Ok(BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .set_variance(variance)
        .build()?)
}

pub fn build_bfv_params_arc(
    degree: usize,
    plaintext_modulus: u64,
    moduli: &[u64],
    variance: usize,
) -> Result<Arc<BfvParameters>, PresetError> {
    Ok(BfvParametersBuilder::new()
        .set_degree(degree)
        .set_plaintext_modulus(plaintext_modulus)
        .set_moduli(moduli)
        .set_variance(variance)
        .build_arc()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{defaults, insecure_1024, insecure_2048};
    use crate::presets::SfdkPreset;

    #[test]
    fn test_build_insecure_sfdk_params() {
        let params = build_bfv_params(
            insecure_1024::DEGREE,
            insecure_1024::PLAINTEXT_MODULUS,
            insecure_1024::MODULI,
            defaults::VARIANCE,
        )
        .unwrap();
        assert_eq!(params.degree(), insecure_1024::DEGREE);
        assert_eq!(params.plaintext(), insecure_1024::PLAINTEXT_MODULUS);
        assert_eq!(params.moduli(), insecure_1024::MODULI);
        assert_eq!(params.variance(), defaults::VARIANCE);
    }

    #[test]
    fn test_build_insecure_psm_params_arc() {
        let params = build_bfv_params_arc(
            insecure_2048::DEGREE,
            insecure_2048::PLAINTEXT_MODULUS,
            insecure_2048::MODULI,
            defaults::VARIANCE,
        )
        .unwrap();
        assert_eq!(params.degree(), insecure_2048::DEGREE);
        assert_eq!(params.moduli().len(), insecure_2048::MODULI.len());
    }

    #[test]
    fn test_build_from_set_arc() {
        let param_set: SfdkParamSet = SfdkPreset::InsecurePsm2048.into();
        let params = build_bfv_params_from_set_arc(param_set).unwrap();
        assert_eq!(params.degree(), param_set.degree);
        assert_eq!(params.plaintext(), param_set.plaintext_modulus);
        assert_eq!(params.moduli(), param_set.moduli);
    }

    #[test]
    fn test_rejects_non_power_of_two_degree() {
        let result = build_bfv_params(
            1000,
            insecure_1024::PLAINTEXT_MODULUS,
            insecure_1024::MODULI,
            defaults::VARIANCE,
        );
        assert!(matches!(result, Err(PresetError::Build(_))));
    }
}

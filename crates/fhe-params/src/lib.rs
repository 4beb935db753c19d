// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Preset definitions and builders for the BFV parameters underlying SFDK.

pub mod builder;
pub mod constants;
pub mod depth;
pub mod presets;

pub use builder::{
    build_bfv_params, build_bfv_params_arc, build_bfv_params_from_set,
    build_bfv_params_from_set_arc,
};
pub use depth::psm_depth;
pub use presets::{PresetError, PresetMetadata, SecurityTier, SfdkParamSet, SfdkPreset};

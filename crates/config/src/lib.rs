// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod load_config;
mod sfdk_config;
mod telemetry;
mod yaml;

pub use sfdk_config::*;
pub use telemetry::*;

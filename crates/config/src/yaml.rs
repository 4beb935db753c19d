// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Substitutes `${VAR}` references from the environment.
pub fn expand_env(yaml: &str) -> Result<String> {
    Ok(shellexpand::env(yaml)
        .context("Unresolved environment variable in configuration")?
        .into_owned())
}

/// Reads a YAML file and substitutes environment references.
pub fn load_yaml_with_env(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;
    expand_env(&content)
}

// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use path_clean::clean;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "sfdk.config.yaml";

pub type FindInParent = fn(&Path, &str) -> Option<PathBuf>;

/// Where a configuration file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Passed in explicitly; it must exist.
    Explicit(PathBuf),
    /// Found walking up from the working directory.
    Found(PathBuf),
    /// The per-user default, which may be absent.
    Default(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(p) | ConfigLocation::Found(p) | ConfigLocation::Default(p) => p,
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, ConfigLocation::Default(_))
    }
}

pub fn find_in_parent(path: &Path, filename: &str) -> Option<PathBuf> {
    path.ancestors()
        .map(|dir| dir.join(filename))
        .find(|candidate| candidate.exists())
}

pub fn resolve_config_path(
    find_in_parent: FindInParent,
    cwd: &Path,
    default_config_dir: &Path,
    cli_file: Option<&Path>,
) -> ConfigLocation {
    if let Some(cli_file) = cli_file {
        if cli_file.is_absolute() {
            return ConfigLocation::Explicit(cli_file.to_path_buf());
        }
        return ConfigLocation::Explicit(clean(cwd.join(cli_file)));
    }

    if let Some(found) = find_in_parent(cwd, DEFAULT_CONFIG_NAME) {
        return ConfigLocation::Found(found);
    }

    ConfigLocation::Default(clean(default_config_dir.join(DEFAULT_CONFIG_NAME)))
}

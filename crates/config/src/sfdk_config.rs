// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path};
use crate::yaml::{expand_env, load_yaml_with_env};
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use rand::SeedableRng;
use rand_chacha::{rand_core::OsRng, ChaCha20Rng};
use serde::{Deserialize, Serialize};
use sfdk::{
    EncryptionTechnique, FeatureSet, SecretKeyDist, SfdkContext, SfdkParameters, SfdkPreset,
    SharedRng,
};
use sfdk_fhe_params::constants::defaults;
use std::env;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Prefix of the environment variables that override file settings, eg. `SFDK_PRESET`.
pub const ENV_PREFIX: &str = "SFDK_";

/// Everything needed to build an [`SfdkContext`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
#[serde(deny_unknown_fields)]
pub struct SfdkConfig {
    /// Named BFV parameter set
    pub preset: SfdkPreset,
    /// Gadget base of the trapdoor. Falls back to the preset's base.
    pub base: Option<u64>,
    pub secret_key_dist: SecretKeyDist,
    /// Multiplier on the encryption error terms
    pub noise_scale: u64,
    pub encryption_technique: EncryptionTechnique,
    /// Capabilities enabled on the context
    pub features: FeatureSet,
    /// `tracing` filter directives, eg. "info" or "sfdk=debug,warn"
    pub log_level: String,
    /// Seeds the context rng. Only for reproducible tests.
    pub seed: Option<u64>,
}

impl Default for SfdkConfig {
    fn default() -> Self {
        Self {
            preset: SfdkPreset::default(),
            base: None,
            secret_key_dist: SecretKeyDist::default(),
            noise_scale: defaults::NOISE_SCALE,
            encryption_technique: EncryptionTechnique::default(),
            features: FeatureSet::all(),
            log_level: "info".to_string(),
            seed: None,
        }
    }
}

impl SfdkConfig {
    /// Parses a YAML document layered over the defaults and under `SFDK_*` variables.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let yaml = expand_env(yaml)?;
        Self::extract(Some(&yaml))
    }

    fn extract(yaml: Option<&str>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(SfdkConfig::default()));
        if let Some(yaml) = yaml {
            figment = figment.merge(Yaml::string(yaml));
        }
        let config: SfdkConfig = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("Could not parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.noise_scale == 0 {
            bail!("noise_scale must be at least 1");
        }
        if self.features.iter().next().is_none() {
            bail!("at least one feature must be enabled");
        }
        Ok(())
    }

    /// Gadget base in effect.
    pub fn base(&self) -> u64 {
        self.base.unwrap_or(self.preset.param_set().base)
    }

    /// Builds the immutable parameter snapshot.
    pub fn parameters(&self) -> Result<SfdkParameters> {
        let bfv = self
            .preset
            .build_arc()
            .with_context(|| format!("Could not build preset {}", self.preset.name()))?;
        let params = SfdkParameters::new(bfv, self.base())
            .with_context(|| format!("Invalid gadget base {}", self.base()))?;
        Ok(params
            .with_noise_scale(self.noise_scale)
            .with_secret_key_dist(self.secret_key_dist)
            .with_encryption_technique(self.encryption_technique))
    }

    /// The rng a context built from this config should share: seeded when `seed` is
    /// set, from the OS otherwise.
    pub fn shared_rng(&self) -> Result<SharedRng> {
        let rng = match self.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_rng(OsRng)?,
        };
        Ok(Arc::new(Mutex::new(rng)))
    }

    pub fn into_context(self, rng: SharedRng) -> Result<SfdkContext> {
        let params = self.parameters()?;
        info!(
            preset = self.preset.name(),
            base = params.base(),
            width = params.width(),
            "built context from configuration"
        );
        Ok(SfdkContext::new(params, self.features, rng))
    }

    /// [`SfdkConfig::into_context`] with [`SfdkConfig::shared_rng`].
    pub fn build_context(self) -> Result<SfdkContext> {
        let rng = self.shared_rng()?;
        self.into_context(rng)
    }
}

/// Loads the configuration from `config_file`, from `sfdk.config.yaml` in the working
/// directory or one of its parents, or from the per-user default. A missing per-user
/// file leaves the defaults in place.
pub fn load_config(config_file: Option<String>) -> Result<SfdkConfig> {
    let config_file = config_file.map(PathBuf::from);
    let location = resolve_config_path(
        find_in_parent,
        &env::current_dir()?,
        &OsDirs::config_dir()?,
        config_file.as_deref(),
    );

    let yaml = if location.is_required() || location.path().exists() {
        Some(load_yaml_with_env(location.path()).context("Configuration file not found")?)
    } else {
        None
    };

    let config = SfdkConfig::extract(yaml.as_deref())?;
    info!(path = %location.path().display(), preset = config.preset.name(), "loaded configuration");
    Ok(config)
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("SFDK needs an OS that can provide a config dir. See https://docs.rs/dirs for more information.")?
            .join("sfdk"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use sfdk::Feature;

    fn isolate(jail: &mut Jail) {
        let home = format!("{}", jail.directory().to_string_lossy());
        jail.set_env("HOME", &home);
        jail.set_env("XDG_CONFIG_HOME", format!("{}/.config", home));
    }

    #[test]
    fn test_defaults() {
        let config = SfdkConfig::default();
        assert_eq!(config.preset, SfdkPreset::InsecureSfdk1024);
        assert_eq!(config.base(), 4_194_304);
        assert_eq!(config.noise_scale, 1);
        assert_eq!(config.secret_key_dist, SecretKeyDist::Gaussian);
        assert_eq!(config.encryption_technique, EncryptionTechnique::Standard);
        assert_eq!(config.features, FeatureSet::all());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_deserialization() {
        Jail::expect_with(|_| {
            let config = SfdkConfig::from_yaml_str(
                r#"
preset: INSECURE_PSM_2048
base: 1024
secret_key_dist: UNIFORM_TERNARY
noise_scale: 4
features:
  - PKE
  - SFDK
log_level: "sfdk=debug,warn"
"#,
            )
            .map_err(|e| e.to_string())?;

            assert_eq!(config.preset, SfdkPreset::InsecurePsm2048);
            assert_eq!(config.base(), 1024);
            assert_eq!(config.secret_key_dist, SecretKeyDist::UniformTernary);
            assert_eq!(config.noise_scale, 4);
            assert!(config.features.contains(Feature::Sfdk));
            assert!(!config.features.contains(Feature::LeveledShe));
            assert_eq!(config.log_level, "sfdk=debug,warn");
            // untouched keys keep their defaults
            assert_eq!(config.encryption_technique, EncryptionTechnique::Standard);
            Ok(())
        });
    }

    #[test]
    fn test_serialization_round_trip() -> Result<()> {
        let config = SfdkConfig {
            preset: SfdkPreset::SecurePsm32768,
            encryption_technique: EncryptionTechnique::Extended,
            seed: Some(9),
            ..SfdkConfig::default()
        };
        let yaml = serde_yaml::to_string(&config)?;
        assert!(yaml.contains("SECURE_PSM_32768"));
        assert!(yaml.contains("LEVELEDSHE"));
        let parsed: SfdkConfig = serde_yaml::from_str(&yaml)?;
        assert_eq!(parsed, config);
        Ok(())
    }

    #[test]
    fn test_config_env_vars() {
        Jail::expect_with(|jail| {
            jail.set_env("SFDK_NOISE_SCALE", "8");
            jail.set_env("SFDK_ENCRYPTION_TECHNIQUE", "EXTENDED");
            jail.set_env("TEST_PRESET", "INSECURE_PSM_2048");

            let config = SfdkConfig::from_yaml_str(
                r#"
preset: "${TEST_PRESET}"
noise_scale: 2
"#,
            )
            .map_err(|e| e.to_string())?;

            // Test that environment variables are substituted and override the file
            assert_eq!(config.preset, SfdkPreset::InsecurePsm2048);
            assert_eq!(config.noise_scale, 8);
            assert_eq!(config.encryption_technique, EncryptionTechnique::Extended);
            Ok(())
        });
    }

    #[test]
    fn test_rejects_bad_values() {
        Jail::expect_with(|_| {
            assert!(SfdkConfig::from_yaml_str("noise_scale: 0").is_err());
            assert!(SfdkConfig::from_yaml_str("features: []").is_err());
            assert!(SfdkConfig::from_yaml_str("preset: LARGE").is_err());
            assert!(SfdkConfig::from_yaml_str("quic_port: 9091").is_err());
            assert!(SfdkConfig::from_yaml_str("preset: ${SFDK_TEST_UNSET_VARIABLE}").is_err());

            let config = SfdkConfig::from_yaml_str("base: 1000").map_err(|e| e.to_string())?;
            assert!(config.parameters().is_err());
            Ok(())
        });
    }

    #[test]
    fn test_config() {
        Jail::expect_with(|jail| {
            isolate(jail);
            jail.create_file(
                "sfdk.config.yaml",
                r#"
preset: INSECURE_SFDK_1024
secret_key_dist: UNIFORM_TERNARY
seed: 17
"#,
            )?;

            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config.secret_key_dist, SecretKeyDist::UniformTernary);
            assert_eq!(config.seed, Some(17));

            jail.create_file("other.yaml", "noise_scale: 3")?;
            let config =
                load_config(Some("other.yaml".to_string())).map_err(|e| e.to_string())?;
            assert_eq!(config.noise_scale, 3);
            assert_eq!(config.secret_key_dist, SecretKeyDist::Gaussian);
            Ok(())
        });
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        Jail::expect_with(|jail| {
            isolate(jail);
            let config = load_config(None).map_err(|e| e.to_string())?;
            assert_eq!(config, SfdkConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config(Some("/nope/sfdk.yaml".to_string())) else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };

        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_into_context() -> Result<()> {
        let config = SfdkConfig {
            features: [Feature::Pke, Feature::Sfdk].into_iter().collect(),
            noise_scale: 2,
            seed: Some(5),
            ..SfdkConfig::default()
        };
        let cc = config.build_context()?;
        assert_eq!(cc.ring_dimension(), 1024);
        assert_eq!(cc.params().noise_scale(), 2);
        assert!(cc.features().contains(Feature::Sfdk));
        assert!(!cc.features().contains(Feature::KeySwitch));

        let keys = cc.key_gen_sfdk()?;
        assert!(keys.good());
        Ok(())
    }
}

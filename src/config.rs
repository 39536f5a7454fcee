//! Rule-set artifact configuration.
//!
//! ```toml
//! artifact_dir = "/opt/validator/schematron"
//!
//! [rule_sets.xrechnung_cii]
//! file = "XRechnung/XRechnung_3.0.2_CII.sch"
//! version = "3.0.2"
//! ```
//!
//! Keys under `rule_sets` are [`RuleSetId::key`]s. Anything not listed uses
//! the artifact and version shipped by default.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validators::RuleSetId;

/// Environment variable overriding [`ValidatorConfig::artifact_dir`].
pub const ARTIFACT_DIR_ENV: &str = "FAKTURA_VALIDATOR_ARTIFACT_DIR";

const DEFAULT_ARTIFACT_DIR: &str = "schematron";

/// Abstracts environment variable access so overrides can be tested.
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Per-rule-set overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetConfig {
    /// Artifact path, relative to `artifact_dir` unless absolute.
    pub file: Option<PathBuf>,
    /// Version reported in results.
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    pub artifact_dir: PathBuf,
    pub rule_sets: BTreeMap<String, RuleSetConfig>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            artifact_dir: PathBuf::from(DEFAULT_ARTIFACT_DIR),
            rule_sets: BTreeMap::new(),
        }
    }
}

impl ValidatorConfig {
    /// Parse and validate a TOML document. Environment overrides are not applied.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, then apply environment overrides from the process environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, &SystemEnv)
    }

    pub fn load_with(path: &Path, env: &impl EnvProvider) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env(env);
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            artifact_dir = %config.artifact_dir.display(),
            overrides = config.rule_sets.len(),
            "loaded validator configuration"
        );
        Ok(config)
    }

    pub fn apply_env(&mut self, env: &impl EnvProvider) {
        if let Some(dir) = env.get(ARTIFACT_DIR_ENV) {
            tracing::debug!(artifact_dir = %dir, "artifact directory overridden from environment");
            self.artifact_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.artifact_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "artifact_dir".into(),
                reason: "must not be empty".into(),
            });
        }

        for (key, rule_set) in &self.rule_sets {
            if RuleSetId::from_key(key).is_none() {
                return Err(ConfigError::InvalidValue {
                    field: format!("rule_sets.{key}"),
                    reason: "unknown rule set".into(),
                });
            }
            if rule_set.version.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("rule_sets.{key}.version"),
                    reason: "must not be empty".into(),
                });
            }
            if rule_set
                .file
                .as_deref()
                .is_some_and(|f| f.as_os_str().is_empty())
            {
                return Err(ConfigError::InvalidValue {
                    field: format!("rule_sets.{key}.file"),
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    fn rule_set(&self, id: RuleSetId) -> Option<&RuleSetConfig> {
        self.rule_sets.get(id.key())
    }

    /// Where to load `id`'s artifact from.
    pub fn artifact_path(&self, id: RuleSetId) -> PathBuf {
        let file = self
            .rule_set(id)
            .and_then(|rs| rs.file.as_deref())
            .unwrap_or_else(|| Path::new(id.default_artifact()));
        // Path::join keeps absolute paths as they are
        self.artifact_dir.join(file)
    }

    /// The version reported for `id`.
    pub fn version(&self, id: RuleSetId) -> &str {
        self.rule_set(id)
            .and_then(|rs| rs.version.as_deref())
            .unwrap_or_else(|| id.default_version())
    }
}

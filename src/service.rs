use std::fmt;
use std::sync::Arc;

use crate::core::{ValidationResult, ValidatorError};
use crate::intake;
use crate::validators::{RuleSets, StartupError, ValidatorRegistry};

#[cfg(feature = "config")]
use crate::config::ValidatorConfig;
#[cfg(feature = "config")]
use crate::validators::{RuleEngineLoader, RuleSet, RuleSetId};

/// Receives server-side failures that an operator has to look at.
///
/// Client errors (bad documents) are never passed to a notifier.
pub trait Notifier: Send + Sync {
    fn notify(&self, error: &ValidatorError);
}

/// Reports through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, error: &ValidatorError) {
        tracing::error!(kind = ?error.kind(), error = %error, "validation request failed");
    }
}

/// Entry point: classify raw bytes, dispatch, return the aggregated result.
///
/// Immutable after construction and safe to share across threads.
pub struct ValidationService {
    registry: ValidatorRegistry,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for ValidationService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl ValidationService {
    pub fn new(registry: ValidatorRegistry) -> Self {
        Self {
            registry,
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Health-check every rule set, then wire up the standard validators.
    pub fn from_rule_sets(rule_sets: RuleSets) -> Result<Self, StartupError> {
        rule_sets.check_health()?;
        let registry = ValidatorRegistry::standard(&rule_sets)?;
        tracing::info!(
            rule_sets = rule_sets.len(),
            validators = registry.len(),
            "validation service ready"
        );
        Ok(Self::new(registry))
    }

    /// Load every rule set named by `config` through `loader`, then
    /// continue as [`ValidationService::from_rule_sets`].
    #[cfg(feature = "config")]
    pub fn from_config(
        config: &ValidatorConfig,
        loader: &impl RuleEngineLoader,
    ) -> Result<Self, StartupError> {
        config.validate()?;

        let mut rule_sets = RuleSets::new();
        for id in RuleSetId::ALL {
            let path = config.artifact_path(id);
            tracing::info!(rule_set = %id, path = %path.display(), "loading rule set");
            let engine = loader
                .load(id, &path)
                .map_err(|source| StartupError::Load {
                    rule_set: id,
                    path: path.clone(),
                    source,
                })?;
            rule_sets.insert(RuleSet::new(id, engine).with_version(config.version(id)));
        }
        Self::from_rule_sets(rule_sets)
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn is_healthy(&self) -> bool {
        self.registry.is_healthy()
    }

    /// Validate one document.
    ///
    /// Server-side failures are handed to the notifier before they are returned.
    pub fn validate_xml(&self, bytes: &[u8]) -> Result<ValidationResult, ValidatorError> {
        let outcome = intake::classify(bytes).and_then(|request| self.registry.dispatch(&request));

        match &outcome {
            Ok(result) => tracing::debug!(
                syntax = %result.meta().syntax(),
                profile = %result.meta().profile(),
                is_valid = result.is_valid(),
                "validation finished"
            ),
            Err(e) if e.is_client_error() => {
                tracing::debug!(kind = ?e.kind(), error = %e, "document rejected")
            }
            Err(e) => self.notifier.notify(e),
        }
        outcome
    }
}

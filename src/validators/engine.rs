use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::core::{Encoding, StageReport, ValidatorError};

use super::RuleSetId;

/// A compiled rule set (e.g. a Schematron artifact) that can be applied to documents.
///
/// Implementations are loaded once at startup and shared across requests,
/// hence `Send + Sync`. `apply` must not keep per-call state.
pub trait RuleEngine: Send + Sync {
    /// Startup self-check that the compiled rule set is usable.
    fn is_healthy(&self) -> bool;

    /// Apply the rule set to a document.
    ///
    /// `Ok(None)` means the engine declined to produce a report.
    fn apply(
        &self,
        document: &[u8],
        charset: &'static Encoding,
    ) -> Result<Option<StageReport>, EngineError>;
}

/// Builds [`RuleEngine`]s from rule-set artifacts on disk.
pub trait RuleEngineLoader {
    fn load(&self, rule_set: RuleSetId, artifact: &Path) -> Result<Arc<dyn RuleEngine>, EngineError>;
}

impl<F> RuleEngineLoader for F
where
    F: Fn(RuleSetId, &Path) -> Result<Arc<dyn RuleEngine>, EngineError>,
{
    fn load(&self, rule_set: RuleSetId, artifact: &Path) -> Result<Arc<dyn RuleEngine>, EngineError> {
        self(rule_set, artifact)
    }
}

/// Failures raised by a rule engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The document bytes could not be parsed.
    #[error("document could not be parsed: {0}")]
    Parse(String),

    /// The artifact could not be loaded or compiled.
    #[error("rule set artifact error: {0}")]
    Artifact(String),

    /// Any other engine fault.
    #[error("rule engine failure: {0}")]
    Internal(String),
}

impl From<EngineError> for ValidatorError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Parse(detail) => ValidatorError::ProcessingFailure(detail),
            other => ValidatorError::Unexpected(other.to_string()),
        }
    }
}

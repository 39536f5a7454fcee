//! Validator registry, rule sets, and the staged validation chain.
//!
//! A validator declares which (syntax, profile) pairs it handles; the
//! registry dispatches each classified request to the first match. The
//! standard validators run one or two rule sets per document:
//!
//! - **EN 16931**: the EN 16931 rule set for the document's syntax
//! - **XRechnung**: EN 16931 first, then XRechnung (CII or UBL)
//! - **Peppol BIS**: EN 16931 UBL first, then Peppol BIS (UBL only)
//! - **Factur-X Extended**: EN 16931 CII first, then Factur-X (CII only)
//!
//! Rule evaluation itself happens in a [`RuleEngine`], supplied by the caller.

mod chain;
mod engine;
pub mod profiles;
mod registry;
mod ruleset;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::SyntaxKind;

pub use chain::{ChainOutcome, StagePlan, plan_syntax, run as run_chain};
pub use engine::{EngineError, RuleEngine, RuleEngineLoader};
pub use registry::{InvoiceValidator, ProfileValidator, ValidatorRegistry};
pub use ruleset::{RuleSet, RuleSetId, RuleSets};

/// Errors while assembling the validators at startup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StartupError {
    #[error("rule set {0} is not loaded")]
    MissingRuleSet(RuleSetId),

    #[error("rule set {0} failed its health check")]
    UnhealthyRuleSet(RuleSetId),

    #[error("validator {validator} has a plan whose rule sets are not all {syntax}")]
    PlanSyntaxMismatch {
        validator: String,
        syntax: SyntaxKind,
    },

    #[error("failed to load rule set {rule_set} from {}: {source}", .path.display())]
    Load {
        rule_set: RuleSetId,
        path: PathBuf,
        source: EngineError,
    },

    #[cfg(feature = "config")]
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ValidatorRegistry {
    /// The registry with every standard validator, built from `rule_sets`.
    pub fn standard(rule_sets: &RuleSets) -> Result<Self, StartupError> {
        let mut registry = Self::new();
        for validator in profiles::standard_validators(rule_sets)? {
            registry.register(validator);
        }
        Ok(registry)
    }
}

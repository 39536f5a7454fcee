use crate::core::{ProfileKind, SyntaxKind, ValidationRequest, ValidationResult, ValidatorError};

use super::StartupError;
use super::chain::{self, ChainOutcome, StagePlan, plan_syntax};

/// A handler for one profile.
///
/// `supports` is the capability predicate used for dispatch; it must be
/// pure. New profiles are added by registering another handler, never by
/// touching dispatch.
pub trait InvoiceValidator: Send + Sync {
    fn name(&self) -> &str;

    fn supports(&self, syntax: SyntaxKind, profile: ProfileKind) -> bool;

    fn is_healthy(&self) -> bool;

    fn validate(&self, request: &ValidationRequest) -> Result<ChainOutcome, ValidatorError>;
}

/// The standard handler: one profile, one [`StagePlan`] per supported syntax.
///
/// Its capability is derived from its plans, so it cannot claim a syntax it
/// has no rule sets for.
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    name: String,
    profile: ProfileKind,
    plans: Vec<(SyntaxKind, StagePlan)>,
}

impl ProfileValidator {
    pub fn new(name: impl Into<String>, profile: ProfileKind) -> Self {
        Self {
            name: name.into(),
            profile,
            plans: Vec::new(),
        }
    }

    /// Add (or replace) the plan for a syntax.
    ///
    /// Every rule set in the plan must be written for `syntax`.
    pub fn with_plan(mut self, syntax: SyntaxKind, plan: StagePlan) -> Result<Self, StartupError> {
        if plan_syntax(&plan) != Some(syntax) {
            return Err(StartupError::PlanSyntaxMismatch {
                validator: self.name,
                syntax,
            });
        }
        self.plans.retain(|(s, _)| *s != syntax);
        self.plans.push((syntax, plan));
        Ok(self)
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    pub fn plan(&self, syntax: SyntaxKind) -> Option<&StagePlan> {
        self.plans
            .iter()
            .find(|(s, _)| *s == syntax)
            .map(|(_, plan)| plan)
    }

    pub fn syntaxes(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        self.plans.iter().map(|(s, _)| *s)
    }
}

impl InvoiceValidator for ProfileValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, syntax: SyntaxKind, profile: ProfileKind) -> bool {
        self.profile == profile && self.plan(syntax).is_some()
    }

    fn is_healthy(&self) -> bool {
        self.plans.iter().all(|(_, plan)| plan.is_healthy())
    }

    fn validate(&self, request: &ValidationRequest) -> Result<ChainOutcome, ValidatorError> {
        let plan = self
            .plan(request.syntax())
            .ok_or(ValidatorError::NoApplicableValidator {
                syntax: request.syntax(),
                profile: request.profile(),
            })?;
        chain::run(plan, self.profile, request)
    }
}

/// Validators by capability. Built once at startup, read-only afterwards.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: Vec<Box<dyn InvoiceValidator>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.name()))
            .finish()
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, validator: impl InvoiceValidator + 'static) {
        tracing::debug!(validator = validator.name(), "registering validator");
        self.validators.push(Box::new(validator));
    }

    pub fn with(mut self, validator: impl InvoiceValidator + 'static) -> Self {
        self.register(validator);
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// The first validator whose capability matches.
    pub fn select(&self, syntax: SyntaxKind, profile: ProfileKind) -> Option<&dyn InvoiceValidator> {
        self.validators
            .iter()
            .find(|v| v.supports(syntax, profile))
            .map(|v| &**v)
    }

    /// Names of every validator whose capability matches, in registration order.
    pub fn candidates(&self, syntax: SyntaxKind, profile: ProfileKind) -> Vec<&str> {
        self.validators
            .iter()
            .filter(|v| v.supports(syntax, profile))
            .map(|v| v.name())
            .collect()
    }

    pub fn is_healthy(&self) -> bool {
        self.validators.iter().all(|v| v.is_healthy())
    }

    /// Select a validator for the request and run its chain.
    ///
    /// No match, or a chain that ends declined, is
    /// [`ValidatorError::NoApplicableValidator`].
    pub fn dispatch(&self, request: &ValidationRequest) -> Result<ValidationResult, ValidatorError> {
        let no_validator = || ValidatorError::NoApplicableValidator {
            syntax: request.syntax(),
            profile: request.profile(),
        };

        let validator = self
            .select(request.syntax(), request.profile())
            .ok_or_else(no_validator)?;
        tracing::debug!(
            validator = validator.name(),
            syntax = %request.syntax(),
            profile = %request.profile(),
            "dispatching"
        );

        match validator.validate(request)? {
            ChainOutcome::Aggregated(result) => Ok(result),
            ChainOutcome::Declined { stage } => {
                tracing::warn!(validator = validator.name(), %stage, "validation chain declined");
                Err(no_validator())
            }
        }
    }
}

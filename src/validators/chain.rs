//! Staged validation: an explicit state machine over one or two rule sets.
//!
//! ```text
//! Pending ── single ──▶ SingleStageRan ─────────────────────────────▶ Aggregated
//!    └──── staged ──▶ BaseStageRan ──▶ SpecializationStageRan ──────▶ Aggregated
//! ```
//!
//! An engine failure in any stage ends the chain with an error (`Rejected`)
//! and no later stage runs. A stage that returns no report ends the chain as
//! [`ChainOutcome::Declined`]. Findings never gate the next stage: a base
//! stage full of errors still lets the specialization stage run.

use crate::core::{
    ProfileKind, StageOutput, StageReport, SyntaxKind, ValidationMeta, ValidationRequest,
    ValidationResult, ValidatorError, aggregate,
};

use super::RuleSet;

/// Which rule sets a profile needs, for one syntax.
#[derive(Debug, Clone)]
pub enum StagePlan {
    /// One rule set.
    Single(RuleSet),
    /// A base profile check followed by the profile's own rules.
    Staged { base: RuleSet, specialization: RuleSet },
}

impl StagePlan {
    pub fn rule_sets(&self) -> Vec<&RuleSet> {
        match self {
            Self::Single(rule_set) => vec![rule_set],
            Self::Staged {
                base,
                specialization,
            } => vec![base, specialization],
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.rule_sets().iter().all(|rs| rs.is_healthy())
    }
}

/// How a chain that did not fail ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// All stages produced a report.
    Aggregated(ValidationResult),
    /// A stage returned no report; nothing is aggregated.
    Declined { stage: String },
}

#[derive(Debug)]
enum ChainState<'a> {
    Pending,
    SingleStageRan {
        stage: StageOutput,
    },
    BaseStageRan {
        base: StageOutput,
        specialization: &'a RuleSet,
    },
    SpecializationStageRan {
        base: StageOutput,
        specialization: StageOutput,
    },
    Aggregated(ValidationResult),
}

impl ChainState<'_> {
    fn name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::SingleStageRan { .. } => "SingleStageRan",
            Self::BaseStageRan { .. } => "BaseStageRan",
            Self::SpecializationStageRan { .. } => "SpecializationStageRan",
            Self::Aggregated(_) => "Aggregated",
        }
    }
}

/// Result of running one rule set: a finished stage or a declined one.
enum StageRun {
    Ran(StageOutput),
    Declined,
}

fn run_stage(rule_set: &RuleSet, request: &ValidationRequest) -> Result<StageRun, ValidatorError> {
    Ok(match rule_set.apply(request)? {
        Some(report) => StageRun::Ran(output(rule_set, report)),
        None => StageRun::Declined,
    })
}

fn output(rule_set: &RuleSet, report: StageReport) -> StageOutput {
    StageOutput {
        name: rule_set.name().to_string(),
        version: rule_set.version().to_string(),
        report,
    }
}

fn declined(rule_set: &RuleSet) -> ChainOutcome {
    tracing::warn!(rule_set = %rule_set.id(), "rule engine declined to produce a report");
    ChainOutcome::Declined {
        stage: rule_set.id().to_string(),
    }
}

/// Execute a plan against a classified request.
///
/// `profile` is the profile reported in the result metadata.
pub fn run(
    plan: &StagePlan,
    profile: ProfileKind,
    request: &ValidationRequest,
) -> Result<ChainOutcome, ValidatorError> {
    let meta = ValidationMeta::new(request.syntax(), profile);
    let mut state = ChainState::Pending;

    loop {
        tracing::trace!(state = state.name(), "validation chain step");
        state = match state {
            ChainState::Pending => match plan {
                StagePlan::Single(rule_set) => match run_stage(rule_set, request)? {
                    StageRun::Ran(stage) => ChainState::SingleStageRan { stage },
                    StageRun::Declined => return Ok(declined(rule_set)),
                },
                StagePlan::Staged {
                    base,
                    specialization,
                } => match run_stage(base, request)? {
                    StageRun::Ran(base) => ChainState::BaseStageRan {
                        base,
                        specialization,
                    },
                    StageRun::Declined => return Ok(declined(base)),
                },
            },
            ChainState::BaseStageRan {
                base,
                specialization,
            } => match run_stage(specialization, request)? {
                StageRun::Ran(stage) => ChainState::SpecializationStageRan {
                    base,
                    specialization: stage,
                },
                StageRun::Declined => return Ok(declined(specialization)),
            },
            ChainState::SingleStageRan { stage } => {
                ChainState::Aggregated(aggregate(meta, &[stage]))
            }
            ChainState::SpecializationStageRan {
                base,
                specialization,
            } => ChainState::Aggregated(aggregate(meta, &[base, specialization])),
            ChainState::Aggregated(result) => return Ok(ChainOutcome::Aggregated(result)),
        };
    }
}

/// The syntax a plan's rule sets are written for, if they agree.
pub fn plan_syntax(plan: &StagePlan) -> Option<SyntaxKind> {
    let mut syntaxes = plan.rule_sets().into_iter().map(|rs| rs.id().syntax());
    let first = syntaxes.next()?;
    syntaxes.all(|s| s == first).then_some(first)
}

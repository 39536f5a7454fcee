//! The standard validators, one per supported profile.
//!
//! | Profile | CII | UBL |
//! |---------|-----|-----|
//! | EN 16931 | EN16931 | EN16931 |
//! | XRechnung 3.0 | EN16931 → XRechnung | EN16931 → XRechnung |
//! | Peppol BIS 3.0 | — | EN16931 → Peppol BIS |
//! | Factur-X Extended | EN16931 → factur-x | — |

use crate::core::{ProfileKind, SyntaxKind};

use super::chain::StagePlan;
use super::registry::ProfileValidator;
use super::{RuleSetId, RuleSets, StartupError};

fn single(rule_sets: &RuleSets, id: RuleSetId) -> Result<StagePlan, StartupError> {
    Ok(StagePlan::Single(rule_sets.get(id)?.clone()))
}

fn staged(
    rule_sets: &RuleSets,
    base: RuleSetId,
    specialization: RuleSetId,
) -> Result<StagePlan, StartupError> {
    Ok(StagePlan::Staged {
        base: rule_sets.get(base)?.clone(),
        specialization: rule_sets.get(specialization)?.clone(),
    })
}

pub fn en16931(rule_sets: &RuleSets) -> Result<ProfileValidator, StartupError> {
    ProfileValidator::new("EN16931", ProfileKind::En16931)
        .with_plan(SyntaxKind::Cii, single(rule_sets, RuleSetId::En16931Cii)?)?
        .with_plan(SyntaxKind::Ubl, single(rule_sets, RuleSetId::En16931Ubl)?)
}

pub fn xrechnung(rule_sets: &RuleSets) -> Result<ProfileValidator, StartupError> {
    ProfileValidator::new("XRechnung", ProfileKind::XRechnung30)
        .with_plan(
            SyntaxKind::Cii,
            staged(rule_sets, RuleSetId::En16931Cii, RuleSetId::XRechnungCii)?,
        )?
        .with_plan(
            SyntaxKind::Ubl,
            staged(rule_sets, RuleSetId::En16931Ubl, RuleSetId::XRechnungUbl)?,
        )
}

pub fn peppol(rule_sets: &RuleSets) -> Result<ProfileValidator, StartupError> {
    ProfileValidator::new("Peppol BIS", ProfileKind::Peppol30).with_plan(
        SyntaxKind::Ubl,
        staged(rule_sets, RuleSetId::En16931Ubl, RuleSetId::PeppolUbl)?,
    )
}

pub fn facturx(rule_sets: &RuleSets) -> Result<ProfileValidator, StartupError> {
    ProfileValidator::new("factur-x", ProfileKind::FacturXExtended).with_plan(
        SyntaxKind::Cii,
        staged(
            rule_sets,
            RuleSetId::En16931Cii,
            RuleSetId::FacturXExtendedCii,
        )?,
    )
}

/// All standard validators, built from one set of loaded rule sets.
pub fn standard_validators(rule_sets: &RuleSets) -> Result<Vec<ProfileValidator>, StartupError> {
    Ok(vec![
        en16931(rule_sets)?,
        facturx(rule_sets)?,
        peppol(rule_sets)?,
        xrechnung(rule_sets)?,
    ])
}

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{StageReport, SyntaxKind, ValidationRequest, ValidatorError};

use super::{RuleEngine, StartupError};

/// The rule-set artifacts the standard validators are built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleSetId {
    En16931Cii,
    En16931Ubl,
    XRechnungCii,
    XRechnungUbl,
    PeppolUbl,
    FacturXExtendedCii,
}

impl RuleSetId {
    pub const ALL: [RuleSetId; 6] = [
        RuleSetId::En16931Cii,
        RuleSetId::En16931Ubl,
        RuleSetId::XRechnungCii,
        RuleSetId::XRechnungUbl,
        RuleSetId::PeppolUbl,
        RuleSetId::FacturXExtendedCii,
    ];

    /// The syntax this artifact's rules are written against.
    pub fn syntax(&self) -> SyntaxKind {
        match self {
            Self::En16931Cii | Self::XRechnungCii | Self::FacturXExtendedCii => SyntaxKind::Cii,
            Self::En16931Ubl | Self::XRechnungUbl | Self::PeppolUbl => SyntaxKind::Ubl,
        }
    }

    /// Display name reported in [`crate::ValidatorResult::name`].
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En16931Cii | Self::En16931Ubl => "EN16931",
            Self::XRechnungCii | Self::XRechnungUbl => "XRechnung",
            Self::PeppolUbl => "Peppol BIS",
            Self::FacturXExtendedCii => "factur-x",
        }
    }

    /// Version of the artifact shipped by default.
    pub fn default_version(&self) -> &'static str {
        match self {
            Self::En16931Cii | Self::En16931Ubl => "1.3.13",
            Self::XRechnungCii | Self::XRechnungUbl => "3.2",
            Self::PeppolUbl => "3.0",
            Self::FacturXExtendedCii => "1.07.2",
        }
    }

    /// Artifact path relative to the artifact directory.
    pub fn default_artifact(&self) -> &'static str {
        match self {
            Self::En16931Cii => "EN16931/EN16931_1.3.13_CII.sch",
            Self::En16931Ubl => "EN16931/EN16931_1.3.13_UBL.sch",
            Self::XRechnungCii => "XRechnung/XRechnung_3.2_CII.sch",
            Self::XRechnungUbl => "XRechnung/XRechnung_3.2_UBL.sch",
            Self::PeppolUbl => "Peppol/PEPPOL_BIS_BILLING_3.0.sch",
            Self::FacturXExtendedCii => "FacturX/Factur-X_1.07.2_EXTENDED.sch",
        }
    }

    /// Stable key used in configuration files.
    pub fn key(&self) -> &'static str {
        match self {
            Self::En16931Cii => "en16931_cii",
            Self::En16931Ubl => "en16931_ubl",
            Self::XRechnungCii => "xrechnung_cii",
            Self::XRechnungUbl => "xrechnung_ubl",
            Self::PeppolUbl => "peppol_ubl",
            Self::FacturXExtendedCii => "facturx_extended_cii",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }
}

impl fmt::Display for RuleSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A loaded rule set: identity, reported name/version and the engine behind it.
#[derive(Clone)]
pub struct RuleSet {
    id: RuleSetId,
    name: String,
    version: String,
    engine: Arc<dyn RuleEngine>,
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleSet")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl RuleSet {
    /// A rule set with its default display name and version.
    pub fn new(id: RuleSetId, engine: Arc<dyn RuleEngine>) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            version: id.default_version().to_string(),
            engine,
        }
    }

    /// Override the reported artifact version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn id(&self) -> RuleSetId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_healthy(&self) -> bool {
        self.engine.is_healthy()
    }

    /// Run the engine on the request's document.
    ///
    /// Engine failures end the request: parse errors become
    /// [`ValidatorError::ProcessingFailure`], everything else
    /// [`ValidatorError::Unexpected`].
    pub fn apply(&self, request: &ValidationRequest) -> Result<Option<StageReport>, ValidatorError> {
        let (bytes, charset) = request.encoded();
        tracing::debug!(rule_set = %self.id, charset = charset.name(), "applying rule set");
        self.engine.apply(&bytes, charset).map_err(|e| {
            tracing::debug!(rule_set = %self.id, error = %e, "rule engine failed");
            ValidatorError::from(e)
        })
    }
}

/// The full set of loaded rule sets, keyed by [`RuleSetId`].
#[derive(Debug, Clone, Default)]
pub struct RuleSets {
    sets: BTreeMap<RuleSetId, RuleSet>,
}

impl RuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every known rule set from an engine factory, using default names and versions.
    pub fn from_fn(mut engine: impl FnMut(RuleSetId) -> Arc<dyn RuleEngine>) -> Self {
        let mut sets = Self::new();
        for id in RuleSetId::ALL {
            sets.insert(RuleSet::new(id, engine(id)));
        }
        sets
    }

    pub fn insert(&mut self, rule_set: RuleSet) -> Option<RuleSet> {
        self.sets.insert(rule_set.id(), rule_set)
    }

    pub fn get(&self, id: RuleSetId) -> Result<&RuleSet, StartupError> {
        self.sets.get(&id).ok_or(StartupError::MissingRuleSet(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSet> {
        self.sets.values()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Run the startup self-check on every rule set. The first unhealthy one is fatal.
    pub fn check_health(&self) -> Result<(), StartupError> {
        for rule_set in self.iter() {
            if !rule_set.is_healthy() {
                tracing::error!(rule_set = %rule_set.id(), "rule set failed its health check");
                return Err(StartupError::UnhealthyRuleSet(rule_set.id()));
            }
        }
        Ok(())
    }
}

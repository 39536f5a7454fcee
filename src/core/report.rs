use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use super::types::{ProfileKind, SyntaxKind};

/// One failed assertion as reported by the rule engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportItem {
    /// Engine-assigned severity flag (`"fatal"`, `"warning"`, or anything else).
    pub flag: Option<String>,
    pub message: String,
    /// XPath-like location of the offending node.
    pub location: String,
}

impl ReportItem {
    pub fn new(
        flag: impl Into<String>,
        message: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            flag: Some(flag.into()),
            message: message.into(),
            location: location.into(),
        }
    }

    /// An item without a severity flag.
    pub fn unflagged(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            flag: None,
            message: message.into(),
            location: location.into(),
        }
    }
}

/// Raw engine output for one rule-set execution, in engine order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    items: Vec<ReportItem>,
}

impl StageReport {
    pub fn new(items: Vec<ReportItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ReportItem] {
        &self.items
    }
}

impl FromIterator<ReportItem> for StageReport {
    fn from_iter<I: IntoIterator<Item = ReportItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Severity flags this crate acts on.
///
/// The set is closed: items carrying any other flag are neither errors nor
/// warnings and do not appear in the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Fatal,
    Warning,
}

impl Severity {
    pub fn from_flag(flag: &str) -> Option<Self> {
        match flag {
            "fatal" => Some(Self::Fatal),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }
}

/// A single rule violation in the final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub message: String,
    pub location: String,
}

/// The outcome of one stage (one rule set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorResult {
    name: String,
    #[serde(rename = "artifact_version")]
    version: String,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
}

impl ValidatorResult {
    /// Partition a stage report by severity, keeping engine order in each list.
    pub fn from_report(
        name: impl Into<String>,
        version: impl Into<String>,
        report: &StageReport,
    ) -> Self {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for item in report.items() {
            let severity = item.flag.as_deref().and_then(Severity::from_flag);
            let target = match severity {
                Some(Severity::Fatal) => &mut errors,
                Some(Severity::Warning) => &mut warnings,
                None => continue,
            };
            target.push(Finding {
                message: item.message.clone(),
                location: item.location.clone(),
            });
        }

        Self {
            name: name.into(),
            version: version.into(),
            errors,
            warnings,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Classification metadata attached to every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationMeta {
    #[serde(rename = "xml_syntax_type")]
    syntax: SyntaxKind,
    #[serde(rename = "xml_profile_type")]
    profile: ProfileKind,
}

impl ValidationMeta {
    pub fn new(syntax: SyntaxKind, profile: ProfileKind) -> Self {
        Self { syntax, profile }
    }

    pub fn syntax(&self) -> SyntaxKind {
        self.syntax
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }
}

/// The aggregated outcome of all stages for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    meta: ValidationMeta,
    stages: Vec<ValidatorResult>,
}

impl ValidationResult {
    pub fn new(meta: ValidationMeta, stages: Vec<ValidatorResult>) -> Self {
        Self { meta, stages }
    }

    pub fn meta(&self) -> &ValidationMeta {
        &self.meta
    }

    pub fn stages(&self) -> &[ValidatorResult] {
        &self.stages
    }

    /// `true` iff no stage reported a fatal finding. Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.stages.iter().all(ValidatorResult::is_valid)
    }

    /// Errors of all stages, in stage order.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.stages.iter().flat_map(|s| s.errors.iter())
    }

    /// Warnings of all stages, in stage order.
    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.stages.iter().flat_map(|s| s.warnings.iter())
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ValidationResult", 5)?;
        s.serialize_field("meta", &self.meta)?;
        s.serialize_field("validation_results", &self.stages)?;
        s.serialize_field("errors", &self.errors().collect::<Vec<_>>())?;
        s.serialize_field("warnings", &self.warnings().collect::<Vec<_>>())?;
        s.serialize_field("is_valid", &self.is_valid())?;
        s.end()
    }
}

/// A finished stage as handed over by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutput {
    pub name: String,
    pub version: String,
    pub report: StageReport,
}

/// Fold stage outputs into the final result. Pure; stage order is kept.
pub fn aggregate(meta: ValidationMeta, stages: &[StageOutput]) -> ValidationResult {
    let stages = stages
        .iter()
        .map(|s| ValidatorResult::from_report(&s.name, &s.version, &s.report))
        .collect();
    ValidationResult::new(meta, stages)
}

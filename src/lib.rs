//! # faktura-validator
//!
//! Intake and validation orchestration for German and European e-invoices:
//! CII and UBL classification, profile detection, and staged rule-set checks
//! for EN 16931, XRechnung, Peppol BIS Billing 3.0 and Factur-X Extended.
//!
//! The rule engine that evaluates a compiled rule set (e.g. Schematron) is an
//! external collaborator, plugged in through [`validators::RuleEngine`]. This
//! crate decides *which* rule sets a document has to pass, in which order, and
//! folds the engine reports into one [`ValidationResult`].
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use faktura_validator::validators::*;
//! use faktura_validator::*;
//!
//! struct AcceptAll;
//!
//! impl RuleEngine for AcceptAll {
//!     fn is_healthy(&self) -> bool {
//!         true
//!     }
//!
//!     fn apply(
//!         &self,
//!         _document: &[u8],
//!         _charset: &'static Encoding,
//!     ) -> Result<Option<StageReport>, EngineError> {
//!         Ok(Some(StageReport::default()))
//!     }
//! }
//!
//! let rule_sets = RuleSets::from_fn(|_| Arc::new(AcceptAll) as Arc<dyn RuleEngine>);
//! let service = ValidationService::from_rule_sets(rule_sets).unwrap();
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <rsm:CrossIndustryInvoice xmlns:rsm="urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100"
//!     xmlns:ram="urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100">
//!   <rsm:ExchangedDocumentContext>
//!     <ram:GuidelineSpecifiedDocumentContextParameter>
//!       <ram:ID>urn:cen.eu:en16931:2017</ram:ID>
//!     </ram:GuidelineSpecifiedDocumentContextParameter>
//!   </rsm:ExchangedDocumentContext>
//! </rsm:CrossIndustryInvoice>"#;
//!
//! let result = service.validate_xml(xml.as_bytes()).unwrap();
//! assert!(result.is_valid());
//! assert_eq!(result.meta().profile(), ProfileKind::En16931);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Intake, registry, staged validation, aggregation |
//! | `config` (default) | TOML configuration for rule-set artifacts |
//! | `pdf` | Unwrap Factur-X / ZUGFeRD XML embedded in PDF/A-3 |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "core")]
pub mod intake;

#[cfg(feature = "core")]
pub mod validators;

#[cfg(feature = "core")]
mod service;

#[cfg(feature = "config")]
pub mod config;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "core")]
pub use crate::service::{Notifier, TracingNotifier, ValidationService};

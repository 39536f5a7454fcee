//! Dispatch and staged-validation tests against scripted rule engines.
//!
//! Run with: `cargo test --test orchestration_tests`

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use faktura_validator::validators::*;
use faktura_validator::*;

// ── Helpers ──────────────────────────────────────────────────────────────────

type Answer = Result<Option<StageReport>, EngineError>;

/// Shared call log, in execution order.
#[derive(Default, Clone)]
struct CallLog(Arc<Mutex<Vec<RuleSetId>>>);

impl CallLog {
    fn calls(&self) -> Vec<RuleSetId> {
        self.0.lock().unwrap().clone()
    }
}

struct Scripted {
    id: RuleSetId,
    answer: Answer,
    log: CallLog,
}

impl RuleEngine for Scripted {
    fn is_healthy(&self) -> bool {
        true
    }

    fn apply(&self, _document: &[u8], _charset: &'static Encoding) -> Answer {
        self.log.0.lock().unwrap().push(self.id);
        self.answer.clone()
    }
}

fn clean() -> Answer {
    Ok(Some(StageReport::default()))
}

fn report(items: &[(&str, &str)]) -> Answer {
    Ok(Some(
        items
            .iter()
            .map(|(flag, msg)| ReportItem::new(*flag, *msg, "/Invoice"))
            .collect(),
    ))
}

/// A service whose rule sets answer `clean()` unless scripted otherwise.
fn service(mut script: HashMap<RuleSetId, Answer>) -> (ValidationService, CallLog) {
    let log = CallLog::default();
    let rule_sets = RuleSets::from_fn(|id| {
        Arc::new(Scripted {
            id,
            answer: script.remove(&id).unwrap_or_else(clean),
            log: log.clone(),
        }) as Arc<dyn RuleEngine>
    });
    (ValidationService::from_rule_sets(rule_sets).unwrap(), log)
}

fn cii(profile: ProfileKind) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rsm:CrossIndustryInvoice xmlns:rsm="urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100"
    xmlns:ram="urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100">
  <rsm:ExchangedDocumentContext>
    <ram:GuidelineSpecifiedDocumentContextParameter>
      <ram:ID>{}</ram:ID>
    </ram:GuidelineSpecifiedDocumentContextParameter>
  </rsm:ExchangedDocumentContext>
  <rsm:ExchangedDocument><ram:ID>RE-2024-001</ram:ID></rsm:ExchangedDocument>
</rsm:CrossIndustryInvoice>"#,
        profile.urn()
    )
}

fn ubl(profile: ProfileKind) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
    xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:CustomizationID>{}</cbc:CustomizationID>
  <cbc:ID>RE-2024-001</cbc:ID>
</Invoice>"#,
        profile.urn()
    )
}

fn document(syntax: SyntaxKind, profile: ProfileKind) -> String {
    match syntax {
        SyntaxKind::Cii => cii(profile),
        SyntaxKind::Ubl => ubl(profile),
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

#[test]
fn exactly_one_validator_per_supported_pair() {
    let (svc, _) = service(HashMap::new());
    let registry = svc.registry();

    for syntax in SyntaxKind::ALL {
        for profile in ProfileKind::ALL {
            let candidates = registry.candidates(syntax, profile);
            let unsupported = matches!(
                (syntax, profile),
                (SyntaxKind::Cii, ProfileKind::Peppol30)
                    | (SyntaxKind::Ubl, ProfileKind::FacturXExtended)
            );
            if unsupported {
                assert!(candidates.is_empty(), "{syntax} / {profile}: {candidates:?}");
            } else {
                assert_eq!(candidates.len(), 1, "{syntax} / {profile}: {candidates:?}");
            }
        }
    }
}

#[test]
fn stage_order_per_pair() {
    use RuleSetId::*;

    let expected = [
        (SyntaxKind::Cii, ProfileKind::En16931, vec![En16931Cii]),
        (SyntaxKind::Ubl, ProfileKind::En16931, vec![En16931Ubl]),
        (SyntaxKind::Cii, ProfileKind::XRechnung30, vec![En16931Cii, XRechnungCii]),
        (SyntaxKind::Ubl, ProfileKind::XRechnung30, vec![En16931Ubl, XRechnungUbl]),
        (SyntaxKind::Ubl, ProfileKind::Peppol30, vec![En16931Ubl, PeppolUbl]),
        (
            SyntaxKind::Cii,
            ProfileKind::FacturXExtended,
            vec![En16931Cii, FacturXExtendedCii],
        ),
    ];

    for (syntax, profile, stages) in expected {
        let (svc, log) = service(HashMap::new());
        let result = svc
            .validate_xml(document(syntax, profile).as_bytes())
            .unwrap();

        assert_eq!(log.calls(), stages, "{syntax} / {profile}");
        assert_eq!(result.meta().syntax(), syntax);
        assert_eq!(result.meta().profile(), profile);
        assert_eq!(result.stages().len(), stages.len());
        assert!(result.is_valid());
    }
}

#[test]
fn unsupported_pair_has_no_validator() {
    let (svc, log) = service(HashMap::new());

    let err = svc
        .validate_xml(cii(ProfileKind::Peppol30).as_bytes())
        .unwrap_err();
    assert!(matches!(
        err,
        ValidatorError::NoApplicableValidator {
            syntax: SyntaxKind::Cii,
            profile: ProfileKind::Peppol30
        }
    ));
    assert_eq!(err.status_code(), 500);

    let err = svc
        .validate_xml(ubl(ProfileKind::FacturXExtended).as_bytes())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoApplicableValidator);
    assert!(log.calls().is_empty());
}

#[test]
fn first_registered_validator_wins() {
    struct Shadow;

    impl InvoiceValidator for Shadow {
        fn name(&self) -> &str {
            "shadow"
        }

        fn supports(&self, _syntax: SyntaxKind, profile: ProfileKind) -> bool {
            profile == ProfileKind::En16931
        }

        fn is_healthy(&self) -> bool {
            true
        }

        fn validate(&self, _request: &ValidationRequest) -> Result<ChainOutcome, ValidatorError> {
            Err(ValidatorError::Unexpected("shadow".into()))
        }
    }

    let rule_sets = RuleSets::from_fn(|id| {
        Arc::new(Scripted {
            id,
            answer: clean(),
            log: CallLog::default(),
        }) as Arc<dyn RuleEngine>
    });
    let registry = ValidatorRegistry::standard(&rule_sets).unwrap().with(Shadow);
    assert_eq!(registry.candidates(SyntaxKind::Cii, ProfileKind::En16931).len(), 2);

    let svc = ValidationService::new(registry);
    assert!(svc.validate_xml(cii(ProfileKind::En16931).as_bytes()).is_ok());
}

// ── Staged validation ────────────────────────────────────────────────────────

#[test]
fn base_failure_never_reaches_specialization() {
    let (svc, log) = service(HashMap::from([(
        RuleSetId::En16931Cii,
        Err(EngineError::Parse("premature end of file".into())),
    )]));

    let err = svc
        .validate_xml(cii(ProfileKind::XRechnung30).as_bytes())
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ProcessingFailure);
    assert_eq!(err.status_code(), 422);
    assert_eq!(err.client_message(), "The parsing of the provided XML failed.");
    assert_eq!(log.calls(), [RuleSetId::En16931Cii]);
}

#[test]
fn base_errors_still_run_specialization() {
    let (svc, log) = service(HashMap::from([(
        RuleSetId::En16931Ubl,
        report(&[("fatal", "[BR-01] Specification identifier missing")]),
    )]));

    let result = svc
        .validate_xml(ubl(ProfileKind::XRechnung30).as_bytes())
        .unwrap();

    assert_eq!(log.calls(), [RuleSetId::En16931Ubl, RuleSetId::XRechnungUbl]);
    assert!(!result.is_valid());
    assert_eq!(result.stages()[0].errors().len(), 1);
    assert!(result.stages()[1].is_valid());
    assert_eq!(result.errors().count(), 1);
}

#[test]
fn specialization_failure_is_unexpected() {
    let (svc, _) = service(HashMap::from([(
        RuleSetId::PeppolUbl,
        Err(EngineError::Internal("stylesheet crashed".into())),
    )]));

    let err = svc
        .validate_xml(ubl(ProfileKind::Peppol30).as_bytes())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert_eq!(err.client_message(), "Internal Server Error");
}

#[test]
fn declined_stage_has_no_validator() {
    let (svc, log) = service(HashMap::from([(RuleSetId::FacturXExtendedCii, Ok(None))]));

    let err = svc
        .validate_xml(cii(ProfileKind::FacturXExtended).as_bytes())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoApplicableValidator);
    assert_eq!(
        log.calls(),
        [RuleSetId::En16931Cii, RuleSetId::FacturXExtendedCii]
    );
}

#[test]
fn warnings_and_unknown_flags() {
    let (svc, _) = service(HashMap::from([(
        RuleSetId::En16931Cii,
        report(&[
            ("warning", "[BR-CO-15] rounding"),
            ("information", "not reported"),
            ("fatal", "[BR-05] VAT missing"),
            ("warning", "[BR-CO-26] seller id"),
        ]),
    )]));

    let result = svc
        .validate_xml(cii(ProfileKind::En16931).as_bytes())
        .unwrap();

    let stage = &result.stages()[0];
    assert_eq!(stage.name(), "EN16931");
    assert_eq!(stage.version(), "1.3.13");
    assert_eq!(stage.errors().len(), 1);
    let warnings: Vec<_> = stage.warnings().iter().map(|w| w.message.as_str()).collect();
    assert_eq!(warnings, ["[BR-CO-15] rounding", "[BR-CO-26] seller id"]);
    assert!(!result.is_valid());
}

#[test]
fn engine_sees_normalized_document() {
    struct Capture(Mutex<Option<(Vec<u8>, &'static Encoding)>>);

    impl RuleEngine for Capture {
        fn is_healthy(&self) -> bool {
            true
        }

        fn apply(&self, document: &[u8], charset: &'static Encoding) -> Answer {
            *self.0.lock().unwrap() = Some((document.to_vec(), charset));
            clean()
        }
    }

    let capture = Arc::new(Capture(Mutex::new(None)));
    let shared = capture.clone();
    let svc =
        ValidationService::from_rule_sets(RuleSets::from_fn(|_| shared.clone() as Arc<dyn RuleEngine>))
            .unwrap();

    let mut input = b"\xEF\xBB\xBFgarbage before ".to_vec();
    input.extend_from_slice(cii(ProfileKind::En16931).as_bytes());
    svc.validate_xml(&input).unwrap();

    let (document, charset) = capture.0.lock().unwrap().clone().unwrap();
    assert!(document.starts_with(b"<?xml version"));
    assert_eq!(charset, encoding_rs::UTF_8);
}

#[test]
fn utf16_document_reaches_engine_in_utf16() {
    struct Capture(Mutex<Option<(Vec<u8>, &'static Encoding)>>);

    impl RuleEngine for Capture {
        fn is_healthy(&self) -> bool {
            true
        }

        fn apply(&self, document: &[u8], charset: &'static Encoding) -> Answer {
            *self.0.lock().unwrap() = Some((document.to_vec(), charset));
            clean()
        }
    }

    let capture = Arc::new(Capture(Mutex::new(None)));
    let shared = capture.clone();
    let svc =
        ValidationService::from_rule_sets(RuleSets::from_fn(|_| shared.clone() as Arc<dyn RuleEngine>))
            .unwrap();

    let xml = ubl(ProfileKind::En16931).replace("UTF-8", "UTF-16");
    let mut input = vec![0xFF, 0xFE];
    input.extend(xml.encode_utf16().flat_map(u16::to_le_bytes));
    svc.validate_xml(&input).unwrap();

    let (document, charset) = capture.0.lock().unwrap().clone().unwrap();
    assert_eq!(charset, encoding_rs::UTF_16LE);
    assert_eq!(document, input);

    // what the engine's parser would read back
    let (decoded, _, had_errors) = charset.decode(&document);
    assert!(!had_errors);
    assert!(decoded.starts_with(r#"<?xml version="1.0" encoding="UTF-16"?>"#));
}

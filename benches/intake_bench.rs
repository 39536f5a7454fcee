use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use faktura_validator::intake;
use faktura_validator::validators::*;
use faktura_validator::*;

fn ubl_invoice(lines: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ubl:Invoice xmlns:ubl="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2"
    xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2"
    xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:CustomizationID>urn:cen.eu:en16931:2017#compliant#urn:xeinkauf.de:kosit:xrechnung_3.0</cbc:CustomizationID>
  <cbc:ID>BENCH-001</cbc:ID>
"#,
    );
    for i in 1..=lines {
        xml.push_str(&format!(
            "  <cac:InvoiceLine><cbc:ID>{i}</cbc:ID><cbc:InvoicedQuantity unitCode=\"HUR\">5</cbc:InvoicedQuantity>\
             <cac:Item><cbc:Name>Service item {i}</cbc:Name></cac:Item></cac:InvoiceLine>\n"
        ));
    }
    xml.push_str("</ubl:Invoice>\n");
    xml
}

fn cii_invoice() -> String {
    r#"<?xml version="1.0" encoding="UTF-8"?>
<rsm:CrossIndustryInvoice xmlns:rsm="urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100"
    xmlns:ram="urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100">
  <rsm:ExchangedDocumentContext>
    <ram:GuidelineSpecifiedDocumentContextParameter>
      <ram:ID>urn:cen.eu:en16931:2017#conformant#urn:factur-x.eu:1p0:extended</ram:ID>
    </ram:GuidelineSpecifiedDocumentContextParameter>
  </rsm:ExchangedDocumentContext>
</rsm:CrossIndustryInvoice>"#
        .to_string()
}

struct Clean;

impl RuleEngine for Clean {
    fn is_healthy(&self) -> bool {
        true
    }

    fn apply(
        &self,
        _document: &[u8],
        _charset: &'static Encoding,
    ) -> Result<Option<StageReport>, EngineError> {
        Ok(Some(StageReport::default()))
    }
}

fn bench_classify_cii(c: &mut Criterion) {
    let xml = cii_invoice();
    c.bench_function("classify_cii", |b| {
        b.iter(|| black_box(intake::classify(black_box(xml.as_bytes()))));
    });
}

fn bench_classify_ubl_1000_lines(c: &mut Criterion) {
    let xml = ubl_invoice(1000);
    c.bench_function("classify_ubl_1000_lines", |b| {
        b.iter(|| black_box(intake::classify(black_box(xml.as_bytes()))));
    });
}

fn bench_classify_utf16(c: &mut Criterion) {
    let xml = ubl_invoice(100).replace("UTF-8", "UTF-16");
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(xml.encode_utf16().flat_map(u16::to_le_bytes));
    c.bench_function("classify_utf16_100_lines", |b| {
        b.iter(|| black_box(intake::classify(black_box(&bytes))));
    });
}

fn bench_validate_staged(c: &mut Criterion) {
    let service =
        ValidationService::from_rule_sets(RuleSets::from_fn(|_| Arc::new(Clean) as Arc<dyn RuleEngine>))
            .unwrap();
    let xml = ubl_invoice(10);
    c.bench_function("validate_xrechnung_staged", |b| {
        b.iter(|| black_box(service.validate_xml(black_box(xml.as_bytes()))));
    });
}

criterion_group!(
    benches,
    bench_classify_cii,
    bench_classify_ubl_1000_lines,
    bench_classify_utf16,
    bench_validate_staged,
);
criterion_main!(benches);

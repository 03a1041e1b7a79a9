#![cfg(feature = "sign")]

use chrono::{NaiveDate, NaiveTime};
use comprobante::core::*;
use comprobante::sign::*;
use comprobante::ubl::*;
use rust_decimal_macros::dec;

fn keystore_dir() -> String {
    format!("{}/tests/fixtures/keystore", env!("CARGO_MANIFEST_DIR"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn signer() -> Signer {
    init_tracing();
    Signer::from_loader(&KeyStore::open(keystore_dir(), "changeit", "testkey")).unwrap()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn supplier() -> Party {
    PartyBuilder::new("6", "20123456789", "ACME S.A.C.")
        .address_line("Av. Arequipa 123")
        .country("PE")
        .build()
}

fn trade(number: &str) -> TradeBuilder {
    TradeBuilder::new(number, date())
        .currency("PEN")
        .supplier(supplier())
        .customer(PartyBuilder::new("6", "20987654321", "Cliente S.A.").build())
        .line(
            LineBuilder::new("Servicio", dec!(1), "ZZ")
                .unit_prices(dec!(100), dec!(118))
                .prices(dec!(100), dec!(118))
                .tax(TaxEntry::igv(dec!(100), dec!(18)))
                .build(),
        )
        .tax(TaxEntry::igv(dec!(100), dec!(18)))
        .totals(dec!(100), dec!(118))
}

fn invoice() -> Invoice {
    trade("F001-156").signature_id("SIGN-ACME").build_invoice().unwrap()
}

/// Sign, check the signature sits under the right root with the expected
/// `Id`, verify it, then alter `from` into `to` and expect a digest mismatch.
fn round_trip(xml: &str, kind: DocumentKind, id: &str, from: &str, to: &str) {
    let signed = signer().sign_xml(xml).unwrap();
    assert_eq!(signed.kind(), kind);

    let out = signed.xml();
    let signature = out.find("<ds:Signature ").unwrap();
    let root_end = out.find(&format!("</{}>", kind.root_element())).unwrap();
    assert!(out.find("<ext:ExtensionContent>").unwrap() < signature && signature < root_end);
    assert!(out.contains(&format!("Id=\"{id}\"")));
    assert_eq!(verify_signature(out).unwrap(), Verification::Valid);

    let tampered = out.replacen(from, to, 1);
    assert_ne!(tampered, out);
    match verify_signature(&tampered).unwrap() {
        Verification::Invalid { reason } => assert!(reason.contains("digest"), "{reason}"),
        Verification::Valid => panic!("altered {kind:?} verified"),
    }
}

fn element_text<'a>(xml: &'a str, name: &str) -> &'a str {
    let open = format!("<{name}>");
    let start = xml.find(&open).unwrap() + open.len();
    let end = start + xml[start..].find(&format!("</{name}>")).unwrap();
    &xml[start..end]
}

#[test]
fn signed_invoice_verifies() {
    let signed = signer().sign_document(&invoice()).unwrap();
    assert_eq!(signed.kind(), DocumentKind::Invoice);
    assert_eq!(verify_signature(signed.xml()).unwrap(), Verification::Valid);
}

#[test]
fn signature_lands_in_last_extension_content() {
    let signed = signer().sign_document(&invoice()).unwrap();
    let xml = signed.xml();

    let content = xml.find("<ext:ExtensionContent>").unwrap();
    let signature = xml.find("<ds:Signature").unwrap();
    let root_end = xml.find("</Invoice>").unwrap();
    assert!(content < signature && signature < root_end);
    assert!(xml.contains("<ds:Signature xmlns:ds=\"http://www.w3.org/2000/09/xmldsig#\" Id=\"SIGN-ACME\">"));
    assert_eq!(xml.matches("<ds:Signature ").count(), 1);
}

#[test]
fn digest_and_key_info_are_published() {
    let signed = signer().sign_document(&invoice()).unwrap();
    let xml = signed.xml();

    assert_eq!(element_text(xml, "ds:DigestValue"), signed.digest());
    assert!(!element_text(xml, "ds:SignatureValue").is_empty());
    assert!(element_text(xml, "ds:X509SubjectName").contains("CN=20123456789"));
    assert!(!element_text(xml, "ds:X509Certificate").is_empty());
    assert!(xml.contains(C14N_ALGORITHM));
    assert!(xml.contains(RSA_SHA1_ALGORITHM));
    assert!(xml.contains(ENVELOPED_TRANSFORM));
}

#[test]
fn pretty_and_compact_input_share_a_digest() {
    let signer = signer();
    let invoice = invoice();
    let pretty = invoice.to_ubl_xml().unwrap();
    let compact = to_invoice_xml(&invoice, &AssemblyOptions::for_kind(DocumentKind::Invoice).compact()).unwrap();
    assert_ne!(pretty, compact);

    let a = signer.sign_xml(&pretty).unwrap();
    let b = signer.sign_xml(&compact).unwrap();
    assert_eq!(a.digest(), b.digest());
    assert!(verify_signature(a.xml()).unwrap().is_valid());
}

#[test]
fn whitespace_added_after_signing_is_invalid() {
    let signed = signer().sign_document(&invoice()).unwrap();
    let reindented = signed
        .xml()
        .replacen("</cbc:ID><cbc:IssueDate>", "</cbc:ID>\n    <cbc:IssueDate>", 1);
    assert_ne!(reindented, signed.xml());

    match verify_signature(&reindented).unwrap() {
        Verification::Invalid { reason } => assert!(reason.contains("digest")),
        Verification::Valid => panic!("re-indented document verified"),
    }
}

#[test]
fn credit_note_signs_and_verifies() {
    let note = CreditNoteBuilder::new(
        trade("FC01-7").signature_id("SIGN-NC").build().unwrap(),
        CreditNoteTypeCode::C01,
        Reference { number: "F001-156".into(), date: date(), doc_type: DocumentTypeCode::Invoice },
    )
    .reason("Anulación de la operación")
    .build()
    .unwrap();
    round_trip(
        &note.to_ubl_xml().unwrap(),
        DocumentKind::CreditNote,
        "SIGN-NC",
        ">118.00</cbc:PayableAmount>",
        ">119.00</cbc:PayableAmount>",
    );
}

#[test]
fn despatch_advice_signs_and_verifies() {
    let advice = DespatchAdviceBuilder::new("T001-1", date(), NaiveTime::from_hms_opt(8, 30, 0).unwrap())
        .supplier(supplier())
        .customer(PartyBuilder::new("6", "20987654321", "Cliente & Hijos \"Ñandú\" <SAC>").build())
        .note("Entrega en almacén")
        .line("Cajas de cartón", "C-1", dec!(3), "NIU")
        .build()
        .unwrap();
    round_trip(
        &advice.to_ubl_xml().unwrap(),
        DocumentKind::DespatchAdvice,
        "20123456789",
        ">T001-1</cbc:ID>",
        ">T001-2</cbc:ID>",
    );
}

#[test]
fn summary_signs_and_verifies() {
    let line = SummaryLine {
        doc_type: DocumentTypeCode::Receipt,
        number: "B001-12".into(),
        customer: PartyBuilder::new("1", "43289672", "Juan Pérez").build(),
        status: SummaryStatus::Add,
        currency: "PEN".into(),
        cross_total: dec!(118),
        net_total: dec!(100),
        taxes: vec![TaxEntry::igv(dec!(100), dec!(18))],
    };
    let summary = SummaryBuilder::new("RC-20240615-1", date(), date())
        .signature_id("SIGN-RC")
        .supplier(supplier())
        .line(line)
        .build()
        .unwrap();
    round_trip(
        &summary.to_ubl_xml().unwrap(),
        DocumentKind::Summary,
        "SIGN-RC",
        ">118.00</sac:TotalAmount>",
        ">119.00</sac:TotalAmount>",
    );
}

#[test]
fn tampered_amount_is_invalid() {
    let signed = signer().sign_document(&invoice()).unwrap();
    let tampered = signed
        .xml()
        .replace(">118.00</cbc:PayableAmount>", ">119.00</cbc:PayableAmount>");
    assert_ne!(tampered, signed.xml());

    match verify_signature(&tampered).unwrap() {
        Verification::Invalid { reason } => assert!(reason.contains("digest")),
        Verification::Valid => panic!("tampered document verified"),
    }
}

#[test]
fn signing_twice_is_rejected() {
    let signer = signer();
    let signed = signer.sign_document(&invoice()).unwrap();
    let err = signer.sign_xml(signed.xml()).unwrap_err();
    assert!(matches!(err, DocumentError::XmlProcessing(_)));
}

#[test]
fn missing_extension_content_is_an_xml_error() {
    let xml = format!(
        r#"<Invoice xmlns="{INVOICE_NS}" xmlns:cbc="{CBC_NS}"><cbc:ID>F001-1</cbc:ID></Invoice>"#
    );
    let err = signer().sign_xml(&xml).unwrap_err();
    assert!(matches!(err, DocumentError::XmlProcessing(_)));
}

#[test]
fn wrong_password_is_a_credential_error() {
    let err = Signer::from_loader(&KeyStore::open(keystore_dir(), "wrong", "testkey")).unwrap_err();
    assert!(matches!(err, DocumentError::Credential(_)));
}

#[test]
fn unknown_alias_is_a_credential_error() {
    let err = Signer::from_loader(&KeyStore::open(keystore_dir(), "changeit", "nope")).unwrap_err();
    assert!(matches!(err, DocumentError::Credential(_)));
}

#[test]
fn explicit_key_password_overrides_store_password() {
    let store = KeyStore::open(keystore_dir(), "wrong", "testkey").with_key_password("changeit");
    assert!(Signer::from_loader(&store).is_ok());
}

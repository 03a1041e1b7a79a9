use tracing::debug;

use super::common::*;
use super::xml_utils::{XmlResult, XmlWriter};
use super::{AssemblyOptions, DocumentKind};
use crate::core::catalogs::AGENCY_SUNAT;
use crate::core::*;

/// Operation type 0101: internal sale.
const OPERATION_INTERNAL_SALE: &str = "0101";

/// Assemble an unsigned UBL 2.1 `Invoice` (factura or boleta).
///
/// Totals are computed and validated first; an invalid document never
/// produces XML.
pub fn to_invoice_xml(invoice: &Invoice, options: &AssemblyOptions) -> XmlResult {
    let doc = &invoice.trade;
    let totals = calculate_totals(doc, None)?;
    debug!(number = %doc.number, lines = doc.lines.len(), "assembling invoice");

    let root = DocumentKind::Invoice.root_element();
    let mut w = XmlWriter::document(options.pretty)?;
    start_root(&mut w, root, &options.namespaces)?;

    write_extensions(&mut w)?;
    write_versions(&mut w, UBL_VERSION, CUSTOMIZATION)?;
    w.text_element("cbc:ID", &doc.number)?;
    w.text_element("cbc:IssueDate", &date(doc.issue_date))?;

    let doc_type_uri = Catalog::DocumentType.uri();
    let operation_uri = Catalog::OperationType.uri();
    w.text_element_with_attrs(
        "cbc:InvoiceTypeCode",
        invoice.type_code.code(),
        &[
            ("listAgencyName", AGENCY_SUNAT),
            ("listName", Catalog::DocumentType.name()),
            ("listURI", &doc_type_uri),
            ("listID", OPERATION_INTERNAL_SALE),
            ("name", Catalog::OperationType.name()),
            ("listSchemeURI", &operation_uri),
        ],
    )?;
    write_amount_note(&mut w, totals.monetary.payable)?;
    write_currency_code(&mut w, &doc.currency)?;

    let signature_id = signature_reference(doc.signature_id.as_deref(), &doc.supplier);
    write_signature_placeholder(&mut w, signature_id, &doc.supplier)?;
    write_party(&mut w, "cac:AccountingSupplierParty", &doc.supplier, PartyRole::Supplier)?;
    write_party(&mut w, "cac:AccountingCustomerParty", &doc.customer, PartyRole::Customer)?;

    write_payment_terms(&mut w, doc.payment_terms.as_ref())?;
    for ac in &doc.allowances_charges {
        write_allowance_charge(&mut w, ac, &doc.currency)?;
    }
    write_tax_total(&mut w, &totals.tax_total, &doc.currency)?;
    write_monetary_total(&mut w, "cac:LegalMonetaryTotal", &totals.monetary, &doc.currency)?;

    for (i, (line, line_totals)) in doc.lines.iter().zip(&totals.lines).enumerate() {
        write_line(&mut w, &INVOICE_LINE, i + 1, line, line_totals, &doc.currency)?;
    }

    w.end_element(root)?;
    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Invoice {
        let supplier = PartyBuilder::new("6", "20123456789", "ACME S.A.C.")
            .address_line("Av. Arequipa 123")
            .country("PE")
            .build();
        let customer = PartyBuilder::new("6", "20987654321", "Cliente S.A.").build();
        let line = LineBuilder::new("Widget", dec!(1), "NIU")
            .unit_prices(dec!(100), dec!(118))
            .prices(dec!(100), dec!(118))
            .sku("W-1")
            .tax(TaxEntry::igv(dec!(100), dec!(18)))
            .build();
        TradeBuilder::new("F001-1", NaiveDate::from_ymd_opt(2020, 8, 16).unwrap())
            .currency("PEN")
            .supplier(supplier)
            .customer(customer)
            .line(line)
            .tax(TaxEntry::igv(dec!(100), dec!(18)))
            .totals(dec!(100), dec!(118))
            .build_invoice()
            .unwrap()
    }

    #[test]
    fn header_and_totals() {
        let xml = to_invoice_xml(&sample(), &AssemblyOptions::for_kind(DocumentKind::Invoice).compact()).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?><Invoice xmlns="));
        assert!(xml.contains("<cbc:ID>F001-1</cbc:ID><cbc:IssueDate>2020-08-16</cbc:IssueDate>"));
        assert!(xml.contains("listID=\"0101\""));
        assert!(xml.contains("<cbc:Note languageLocaleID=\"1000\">CIENTO DIECIOCHO Y 00/100</cbc:Note>"));
        assert!(xml.contains("<cbc:TaxInclusiveAmount currencyID=\"PEN\">118.00</cbc:TaxInclusiveAmount>"));
        assert!(xml.contains("<cbc:PayableAmount currencyID=\"PEN\">118.00</cbc:PayableAmount>"));
        assert!(xml.contains("<cbc:PriceAmount currencyID=\"PEN\">118.00</cbc:PriceAmount>"));
        assert!(xml.contains("<ext:ExtensionContent/>"));
    }

    #[test]
    fn schema_order_of_top_level_blocks() {
        let xml = to_invoice_xml(&sample(), &AssemblyOptions::for_kind(DocumentKind::Invoice)).unwrap();
        let order = [
            "<ext:UBLExtensions>",
            "<cbc:UBLVersionID>",
            "<cbc:InvoiceTypeCode",
            "<cbc:DocumentCurrencyCode",
            "<cac:Signature>",
            "<cac:AccountingSupplierParty>",
            "<cac:AccountingCustomerParty>",
            "<cac:PaymentTerms>",
            "<cac:LegalMonetaryTotal>",
            "<cac:InvoiceLine>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| xml.find(tag).unwrap()).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn invalid_invoice_produces_no_xml() {
        let mut invoice = sample();
        invoice.trade.currency = "XXX".into();
        let err = to_invoice_xml(&invoice, &AssemblyOptions::for_kind(DocumentKind::Invoice)).unwrap_err();
        assert!(matches!(err, DocumentError::Validation(_)));
    }
}

use tracing::debug;

use super::common::*;
use super::xml_utils::{XmlResult, XmlWriter};
use super::{AssemblyOptions, DocumentKind};
use crate::core::*;

/// Assemble an unsigned UBL 2.1 `CreditNote`.
///
/// The discrepancy description falls back to the catalog 09 wording of the
/// type code when no reason is given. An explicit payable amount replaces
/// the cross total as `PayableAmount`.
pub fn to_credit_note_xml(note: &CreditNote, options: &AssemblyOptions) -> XmlResult {
    findings_to_result(validate_credit_note(note))?;
    let doc = &note.trade;
    let totals = calculate_totals(doc, note.payable_amount)?;
    debug!(number = %doc.number, reference = %note.reference.number, "assembling credit note");

    let root = DocumentKind::CreditNote.root_element();
    let mut w = XmlWriter::document(options.pretty)?;
    start_root(&mut w, root, &options.namespaces)?;

    write_extensions(&mut w)?;
    write_versions(&mut w, UBL_VERSION, CUSTOMIZATION)?;
    w.text_element("cbc:ID", &doc.number)?;
    w.text_element("cbc:IssueDate", &date(doc.issue_date))?;
    write_amount_note(&mut w, totals.monetary.payable)?;
    write_currency_code(&mut w, &doc.currency)?;

    w.start_element("cac:DiscrepancyResponse")?;
    w.text_element("cbc:ReferenceID", &note.reference.number)?;
    catalog_code(&mut w, "cbc:ResponseCode", note.type_code.code(), Catalog::CreditNoteType)?;
    let description = note
        .reason
        .as_deref()
        .unwrap_or_else(|| note.type_code.description());
    w.text_element("cbc:Description", description)?;
    w.end_element("cac:DiscrepancyResponse")?;

    w.start_element("cac:BillingReference")?;
    w.start_element("cac:InvoiceDocumentReference")?;
    w.text_element("cbc:ID", &note.reference.number)?;
    w.text_element("cbc:IssueDate", &date(note.reference.date))?;
    catalog_code(
        &mut w,
        "cbc:DocumentTypeCode",
        note.reference.doc_type.code(),
        Catalog::DocumentType,
    )?;
    w.end_element("cac:InvoiceDocumentReference")?;
    w.end_element("cac:BillingReference")?;

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
        write_line(&mut w, &CREDIT_NOTE_LINE, i + 1, line, line_totals, &doc.currency)?;
    }

    w.end_element(root)?;
    w.into_string()
}

use tracing::debug;

use super::common::*;
use super::xml_utils::{XmlResult, XmlWriter};
use super::{AssemblyOptions, DocumentKind};
use crate::core::*;

const SUMMARY_UBL_VERSION: &str = "2.0";
const SUMMARY_CUSTOMIZATION: &str = "1.1";
/// Instruction id of the paid amount: "01" is the net taxed amount.
const PAID_INSTRUCTION: &str = "01";

/// Assemble an unsigned `SummaryDocuments` (resumen diario de boletas).
pub fn to_summary_xml(summary: &Summary, options: &AssemblyOptions) -> XmlResult {
    findings_to_result(validate_summary(summary))?;
    debug!(number = %summary.number, lines = summary.lines.len(), "assembling summary");

    let root = DocumentKind::Summary.root_element();
    let mut w = XmlWriter::document(options.pretty)?;
    start_root(&mut w, root, &options.namespaces)?;

    write_extensions(&mut w)?;
    write_versions(&mut w, SUMMARY_UBL_VERSION, SUMMARY_CUSTOMIZATION)?;
    w.text_element("cbc:ID", &summary.number)?;
    w.text_element("cbc:ReferenceDate", &date(summary.reference_date))?;
    w.text_element("cbc:IssueDate", &date(summary.issue_date))?;

    let signature_id = signature_reference(summary.signature_id.as_deref(), &summary.supplier);
    write_signature_placeholder(&mut w, signature_id, &summary.supplier)?;

    w.start_element("cac:AccountingSupplierParty")?;
    w.text_element("cbc:CustomerAssignedAccountID", &summary.supplier.doi)?;
    w.text_element("cbc:AdditionalAccountID", &summary.supplier.doi_type)?;
    w.start_element("cac:Party")?;
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &summary.supplier.name)?;
    w.end_element("cac:PartyLegalEntity")?;
    w.end_element("cac:Party")?;
    w.end_element("cac:AccountingSupplierParty")?;

    for (i, line) in summary.lines.iter().enumerate() {
        write_summary_line(&mut w, i + 1, line)?;
    }

    w.end_element(root)?;
    w.into_string()
}

fn write_summary_line(w: &mut XmlWriter, index: usize, line: &SummaryLine) -> Result<(), DocumentError> {
    w.start_element("sac:SummaryDocumentsLine")?;
    w.text_element("cbc:LineID", &index.to_string())?;
    w.text_element("cbc:DocumentTypeCode", line.doc_type.code())?;
    w.text_element("cbc:ID", &line.number)?;

    w.start_element("sac:AccountingCustomerParty")?;
    w.text_element("cbc:CustomerAssignedAccountID", &line.customer.doi)?;
    w.text_element("cbc:AdditionalAccountID", &line.customer.doi_type)?;
    w.end_element("sac:AccountingCustomerParty")?;

    w.start_element("cac:Status")?;
    w.text_element("cbc:ConditionCode", line.status.code())?;
    w.end_element("cac:Status")?;

    w.amount_element("sac:TotalAmount", line.cross_total, &line.currency)?;
    w.start_element("sac:BillingPayment")?;
    w.amount_element("cbc:PaidAmount", line.net_total, &line.currency)?;
    w.text_element("cbc:InstructionID", PAID_INSTRUCTION)?;
    w.end_element("sac:BillingPayment")?;

    // One TaxTotal per tax, each with a single subtotal.
    for entry in &line.taxes {
        let total = tax_total(std::slice::from_ref(entry), TaxLevel::Document);
        write_tax_total(w, &total, &line.currency)?;
    }

    w.end_element("sac:SummaryDocumentsLine")?;
    Ok(())
}

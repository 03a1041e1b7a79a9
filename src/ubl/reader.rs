//! Reading assembled invoices back into daily-summary lines.

use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal::Decimal;

use crate::core::*;

#[derive(Default)]
struct ParsedTotals {
    number: Option<String>,
    root: Option<String>,
    type_code: Option<String>,
    currency: Option<String>,
    customer_doi_type: Option<String>,
    customer_doi: Option<String>,
    customer_name: Option<String>,
    payable: Option<Decimal>,
    tax_exclusive: Option<Decimal>,
    line_extension: Option<Decimal>,
    taxes: Vec<TaxEntry>,
    current_subtotal: Option<ParsedSubtotal>,
}

#[derive(Default)]
struct ParsedSubtotal {
    taxable: Option<Decimal>,
    amount: Option<Decimal>,
    percent: Option<Decimal>,
    scheme: Option<String>,
}

fn amount(text: &str, field: &str) -> Result<Decimal, DocumentError> {
    text.trim()
        .parse()
        .map_err(|e| DocumentError::XmlProcessing(format!("invalid {field} '{text}': {e}")))
}

impl ParsedTotals {
    fn handle_text(&mut self, path: &[String], text: &str) -> Result<(), DocumentError> {
        let Some(current) = path.last().map(String::as_str) else {
            return Ok(());
        };
        let in_customer = path.iter().any(|p| p == "cac:AccountingCustomerParty");
        let in_doc_tax = path.len() >= 3 && path[1] == "cac:TaxTotal" && path[2] == "cac:TaxSubtotal";

        match current {
            "cbc:ID" if path.len() == 2 => self.number = Some(text.to_string()),
            "cbc:InvoiceTypeCode" => self.type_code = Some(text.to_string()),
            "cbc:DocumentCurrencyCode" => self.currency = Some(text.to_string()),
            "cbc:ID" if in_customer && path.iter().any(|p| p == "cac:PartyIdentification") => {
                self.customer_doi = Some(text.to_string());
            }
            "cbc:RegistrationName" if in_customer => self.customer_name = Some(text.to_string()),
            "cbc:PayableAmount" => self.payable = Some(amount(text, "PayableAmount")?),
            "cbc:TaxExclusiveAmount" => self.tax_exclusive = Some(amount(text, "TaxExclusiveAmount")?),
            "cbc:LineExtensionAmount" if path.len() == 3 && path[1] == "cac:LegalMonetaryTotal" => {
                self.line_extension = Some(amount(text, "LineExtensionAmount")?);
            }
            _ if in_doc_tax => {
                if let Some(sub) = self.current_subtotal.as_mut() {
                    match current {
                        "cbc:TaxableAmount" => sub.taxable = Some(amount(text, "TaxableAmount")?),
                        "cbc:TaxAmount" if path.len() == 4 => {
                            sub.amount = Some(amount(text, "TaxAmount")?);
                        }
                        "cbc:Percent" => sub.percent = Some(amount(text, "Percent")?),
                        "cbc:ID" if path.iter().any(|p| p == "cac:TaxScheme") => {
                            sub.scheme = Some(text.to_string());
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_subtotal(&mut self) -> Result<(), DocumentError> {
        let Some(sub) = self.current_subtotal.take() else {
            return Ok(());
        };
        let scheme_id = sub.scheme.unwrap_or_default();
        let scheme = TaxScheme::from_id(&scheme_id).ok_or_else(|| {
            DocumentError::XmlProcessing(format!("unknown tax scheme '{scheme_id}'"))
        })?;
        let tax = sub.amount.unwrap_or_default();
        let entry = match scheme {
            TaxScheme::Icbper => TaxEntry::icbper(sub.taxable.unwrap_or(tax), tax),
            _ => TaxEntry::ad_valorem(
                scheme,
                sub.percent.unwrap_or_default(),
                sub.taxable.unwrap_or_default(),
                tax,
            ),
        };
        self.taxes.push(entry);
        Ok(())
    }

    fn into_line(self, status: SummaryStatus) -> Result<SummaryLine, DocumentError> {
        let missing = |what: &str| DocumentError::XmlProcessing(format!("document has no {what}"));

        let doc_type = match self.root.as_deref() {
            Some("CreditNote") => DocumentTypeCode::CreditNote,
            _ => {
                let code = self.type_code.ok_or_else(|| missing("InvoiceTypeCode"))?;
                DocumentTypeCode::from_code(&code).ok_or_else(|| {
                    DocumentError::XmlProcessing(format!("unknown document type '{code}'"))
                })?
            }
        };

        Ok(SummaryLine {
            doc_type,
            number: self.number.ok_or_else(|| missing("ID"))?,
            customer: Party {
                doi_type: self.customer_doi_type.unwrap_or_default(),
                doi: self.customer_doi.ok_or_else(|| missing("customer identification"))?,
                name: self.customer_name.unwrap_or_default(),
                address: Address::default(),
            },
            status,
            currency: self.currency.ok_or_else(|| missing("DocumentCurrencyCode"))?,
            cross_total: self.payable.ok_or_else(|| missing("PayableAmount"))?,
            net_total: self
                .tax_exclusive
                .or(self.line_extension)
                .ok_or_else(|| missing("TaxExclusiveAmount"))?,
            taxes: self.taxes,
        })
    }
}

/// Derive a daily-summary line from an assembled invoice or credit note.
///
/// Reads the number, type, currency, customer identity, payable and net
/// amounts and the document-level tax subtotals.
pub fn summary_line_from_xml(xml: &str, status: SummaryStatus) -> Result<SummaryLine, DocumentError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parsed = ParsedTotals::default();
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .map_err(|err| DocumentError::XmlProcessing(format!("element name: {err}")))?
                    .to_string();

                if path.is_empty() {
                    parsed.root = Some(
                        String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    );
                }
                if name == "cbc:ID" && path.iter().any(|p| p == "cac:AccountingCustomerParty") {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"schemeID" {
                            parsed.customer_doi_type =
                                Some(String::from_utf8_lossy(&attr.value).into_owned());
                        }
                    }
                }
                if name == "cac:TaxSubtotal" && path.len() == 2 && path[1] == "cac:TaxTotal" {
                    parsed.current_subtotal = Some(ParsedSubtotal::default());
                }

                path.push(name);
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| DocumentError::XmlProcessing(format!("text: {err}")))?;
                if !text.is_empty() {
                    parsed.handle_text(&path, &text)?;
                }
            }
            Ok(Event::End(_)) => {
                let ended = path.pop().unwrap_or_default();
                if ended == "cac:TaxSubtotal" && path.len() == 2 {
                    parsed.finish_subtotal()?;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DocumentError::XmlProcessing(format!("XML parse error: {e}"))),
            _ => {}
        }
    }

    parsed.into_line(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const INVOICE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Invoice xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2" xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2" xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <cbc:ID>B001-12</cbc:ID>
  <cbc:InvoiceTypeCode>03</cbc:InvoiceTypeCode>
  <cbc:DocumentCurrencyCode>PEN</cbc:DocumentCurrencyCode>
  <cac:AccountingCustomerParty><cac:Party>
    <cac:PartyIdentification><cbc:ID schemeID="1">43289672</cbc:ID></cac:PartyIdentification>
    <cac:PartyLegalEntity><cbc:RegistrationName>Juan Perez</cbc:RegistrationName></cac:PartyLegalEntity>
  </cac:Party></cac:AccountingCustomerParty>
  <cac:TaxTotal>
    <cbc:TaxAmount currencyID="PEN">18.20</cbc:TaxAmount>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="PEN">100.00</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="PEN">18.00</cbc:TaxAmount>
      <cac:TaxCategory><cbc:Percent>18</cbc:Percent><cac:TaxScheme><cbc:ID>1000</cbc:ID></cac:TaxScheme></cac:TaxCategory>
    </cac:TaxSubtotal>
    <cac:TaxSubtotal>
      <cbc:TaxableAmount currencyID="PEN">0.20</cbc:TaxableAmount>
      <cbc:TaxAmount currencyID="PEN">0.20</cbc:TaxAmount>
      <cac:TaxCategory><cac:TaxScheme><cbc:ID>7152</cbc:ID></cac:TaxScheme></cac:TaxCategory>
    </cac:TaxSubtotal>
  </cac:TaxTotal>
  <cac:LegalMonetaryTotal>
    <cbc:LineExtensionAmount currencyID="PEN">100.00</cbc:LineExtensionAmount>
    <cbc:PayableAmount currencyID="PEN">118.20</cbc:PayableAmount>
  </cac:LegalMonetaryTotal>
  <cac:InvoiceLine><cbc:ID>1</cbc:ID><cac:TaxTotal><cac:TaxSubtotal><cbc:TaxAmount currencyID="PEN">18.00</cbc:TaxAmount></cac:TaxSubtotal></cac:TaxTotal></cac:InvoiceLine>
</Invoice>"#;

    #[test]
    fn reads_header_customer_and_taxes() {
        let line = summary_line_from_xml(INVOICE, SummaryStatus::Add).unwrap();
        assert_eq!(line.doc_type, DocumentTypeCode::Receipt);
        assert_eq!(line.number, "B001-12");
        assert_eq!(line.currency, "PEN");
        assert_eq!(line.customer.doi_type, "1");
        assert_eq!(line.customer.doi, "43289672");
        assert_eq!(line.customer.name, "Juan Perez");
        assert_eq!(line.cross_total, dec!(118.20));
        assert_eq!(line.net_total, dec!(100.00));
        assert_eq!(line.taxes.len(), 2);
        assert_eq!(line.taxes[0].scheme, TaxScheme::Igv);
        assert_eq!(line.taxes[0].rate, dec!(18));
        assert_eq!(line.taxes[1].kind, TaxKind::PerUnit);
        assert_eq!(line.taxes[1].amount, dec!(0.20));
    }

    #[test]
    fn credit_note_root_sets_type() {
        let xml = INVOICE
            .replace("<Invoice xmlns=\"urn:oasis:names:specification:ubl:schema:xsd:Invoice-2\"", "<CreditNote xmlns=\"urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2\"")
            .replace("</Invoice>", "</CreditNote>")
            .replace("<cbc:InvoiceTypeCode>03</cbc:InvoiceTypeCode>", "");
        let line = summary_line_from_xml(&xml, SummaryStatus::Void).unwrap();
        assert_eq!(line.doc_type, DocumentTypeCode::CreditNote);
        assert_eq!(line.status, SummaryStatus::Void);
    }

    #[test]
    fn missing_total_is_reported() {
        let xml = INVOICE.replace("<cbc:PayableAmount currencyID=\"PEN\">118.20</cbc:PayableAmount>", "");
        let err = summary_line_from_xml(&xml, SummaryStatus::Add).unwrap_err();
        assert!(err.to_string().contains("PayableAmount"));
    }
}

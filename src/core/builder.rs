use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;

use super::catalogs::{CreditNoteTypeCode, DocumentTypeCode};
use super::error::DocumentError;
use super::types::*;

const MAX_LINES: usize = 10_000;

fn required<T>(value: Option<T>, field: &str) -> Result<T, DocumentError> {
    value.ok_or_else(|| DocumentError::Validation(format!("{field} is required")))
}

fn check_line_count(count: usize) -> Result<(), DocumentError> {
    if count == 0 {
        return Err(DocumentError::Validation("at least one line is required".into()));
    }
    if count > MAX_LINES {
        return Err(DocumentError::Validation(format!(
            "a document cannot have more than {MAX_LINES} lines"
        )));
    }
    Ok(())
}

/// Builder for the trade content of invoices, receipts and credit notes.
///
/// ```
/// use comprobante::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = TradeBuilder::new("F001-156", NaiveDate::from_ymd_opt(2020, 8, 16).unwrap())
///     .currency("PEN")
///     .supplier(PartyBuilder::new("6", "20601327318", "Tiendas Mass").build())
///     .customer(PartyBuilder::new("1", "43289672", "Juan Perez").build())
///     .line(LineBuilder::new("Producto", dec!(1), "NIU")
///         .unit_prices(dec!(100), dec!(118))
///         .prices(dec!(100), dec!(118))
///         .tax(TaxEntry::igv(dec!(100), dec!(18)))
///         .build())
///     .tax(TaxEntry::igv(dec!(100), dec!(18)))
///     .totals(dec!(100), dec!(118))
///     .build_invoice()
///     .unwrap();
/// assert_eq!(invoice.type_code, DocumentTypeCode::Invoice);
/// ```
#[derive(Debug, Clone)]
pub struct TradeBuilder {
    number: String,
    issue_date: NaiveDate,
    currency: Option<String>,
    signature_id: Option<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    lines: Vec<Line>,
    taxes: Vec<TaxEntry>,
    allowances_charges: Vec<AllowanceChargeEntry>,
    net_total: Decimal,
    cross_total: Decimal,
    charge_total: Option<Decimal>,
    payment_terms: Option<PaymentTerms>,
}

impl TradeBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            currency: None,
            signature_id: None,
            supplier: None,
            customer: None,
            lines: Vec::new(),
            taxes: Vec::new(),
            allowances_charges: Vec::new(),
            net_total: Decimal::ZERO,
            cross_total: Decimal::ZERO,
            charge_total: None,
            payment_terms: None,
        }
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency = Some(code.into());
        self
    }

    pub fn signature_id(mut self, id: impl Into<String>) -> Self {
        self.signature_id = Some(id.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn line(mut self, line: Line) -> Self {
        self.lines.push(line);
        self
    }

    /// Add a document-level tax.
    pub fn tax(mut self, tax: TaxEntry) -> Self {
        self.taxes.push(tax);
        self
    }

    /// Add a document-level allowance or charge.
    pub fn allowance_charge(mut self, entry: AllowanceChargeEntry) -> Self {
        self.allowances_charges.push(entry);
        self
    }

    /// Net (before taxes) and cross (after taxes) document totals.
    pub fn totals(mut self, net_total: Decimal, cross_total: Decimal) -> Self {
        self.net_total = net_total;
        self.cross_total = cross_total;
        self
    }

    pub fn charge_total(mut self, amount: Decimal) -> Self {
        self.charge_total = Some(amount);
        self
    }

    pub fn payment_terms(mut self, terms: PaymentTerms) -> Self {
        self.payment_terms = Some(terms);
        self
    }

    pub fn build(self) -> Result<TradeDocument, DocumentError> {
        let currency = required(self.currency, "currency")?;
        let supplier = required(self.supplier, "supplier")?;
        let customer = required(self.customer, "customer")?;
        check_line_count(self.lines.len())?;

        Ok(TradeDocument {
            number: self.number,
            issue_date: self.issue_date,
            currency,
            signature_id: self.signature_id,
            supplier,
            customer,
            lines: self.lines,
            taxes: self.taxes,
            allowances_charges: self.allowances_charges,
            net_total: self.net_total,
            cross_total: self.cross_total,
            charge_total: self.charge_total,
            payment_terms: self.payment_terms,
        })
    }

    /// Build a factura (01).
    pub fn build_invoice(self) -> Result<Invoice, DocumentError> {
        Ok(Invoice {
            type_code: DocumentTypeCode::Invoice,
            trade: self.build()?,
        })
    }

    /// Build a boleta de venta (03).
    pub fn build_receipt(self) -> Result<Invoice, DocumentError> {
        Ok(Invoice {
            type_code: DocumentTypeCode::Receipt,
            trade: self.build()?,
        })
    }
}

/// Builder for credit notes on top of already built trade content.
#[derive(Debug, Clone)]
pub struct CreditNoteBuilder {
    trade: TradeDocument,
    type_code: CreditNoteTypeCode,
    reference: Reference,
    reason: Option<String>,
    payable_amount: Option<Decimal>,
}

impl CreditNoteBuilder {
    pub fn new(trade: TradeDocument, type_code: CreditNoteTypeCode, reference: Reference) -> Self {
        Self {
            trade,
            type_code,
            reference,
            reason: None,
            payable_amount: None,
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn payable_amount(mut self, amount: Decimal) -> Self {
        self.payable_amount = Some(amount);
        self
    }

    pub fn build(self) -> Result<CreditNote, DocumentError> {
        if self.reference.number.trim().is_empty() {
            return Err(DocumentError::Validation("reference.number is required".into()));
        }
        Ok(CreditNote {
            trade: self.trade,
            type_code: self.type_code,
            reference: self.reference,
            reason: self.reason,
            payable_amount: self.payable_amount,
        })
    }
}

/// Builder for a document line.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    line: Line,
}

impl LineBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_code: impl Into<String>) -> Self {
        Self {
            line: Line {
                quantity,
                unit_code: unit_code.into(),
                net_unit_price: Decimal::ZERO,
                cross_unit_price: Decimal::ZERO,
                net_price: Decimal::ZERO,
                cross_price: Decimal::ZERO,
                taxes: Vec::new(),
                allowances_charges: Vec::new(),
                sku: String::new(),
                description: description.into(),
                price_type: None,
                properties: Vec::new(),
            },
        }
    }

    /// Per-unit prices before and after taxes.
    pub fn unit_prices(mut self, net: Decimal, cross: Decimal) -> Self {
        self.line.net_unit_price = net;
        self.line.cross_unit_price = cross;
        self
    }

    /// Extended prices before and after taxes. Not derived from the unit prices.
    pub fn prices(mut self, net: Decimal, cross: Decimal) -> Self {
        self.line.net_price = net;
        self.line.cross_price = cross;
        self
    }

    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.line.sku = sku.into();
        self
    }

    pub fn tax(mut self, tax: TaxEntry) -> Self {
        self.line.taxes.push(tax);
        self
    }

    pub fn allowance_charge(mut self, entry: AllowanceChargeEntry) -> Self {
        self.line.allowances_charges.push(entry);
        self
    }

    pub fn price_type(mut self, code: impl Into<String>) -> Self {
        self.line.price_type = Some(code.into());
        self
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        code: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.line.properties.push(ItemProperty {
            name: name.into(),
            code: code.into(),
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Line {
        self.line
    }
}

/// Builder for a supplier, customer or carrier party.
#[derive(Debug, Clone)]
pub struct PartyBuilder {
    party: Party,
}

impl PartyBuilder {
    pub fn new(doi_type: impl Into<String>, doi: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            party: Party {
                doi_type: doi_type.into(),
                doi: doi.into(),
                name: name.into(),
                address: Address::default(),
            },
        }
    }

    pub fn address_line(mut self, line: impl Into<String>) -> Self {
        self.party.address.line = Some(line.into());
        self
    }

    pub fn country(mut self, code: impl Into<String>) -> Self {
        self.party.address.country = Some(code.into());
        self
    }

    /// Registered establishment of a supplier.
    pub fn location(mut self, location: EstablishmentLocation) -> Self {
        self.party.address.location = Some(location);
        self
    }

    pub fn build(self) -> Party {
        self.party
    }
}

/// Builder for despatch advices.
#[derive(Debug, Clone)]
pub struct DespatchAdviceBuilder {
    number: String,
    issue_date: NaiveDate,
    issue_time: NaiveTime,
    signature_id: Option<String>,
    supplier: Option<Party>,
    customer: Option<Party>,
    notes: Vec<String>,
    lines: Vec<DespatchLine>,
    shipment: Shipment,
}

impl DespatchAdviceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate, issue_time: NaiveTime) -> Self {
        Self {
            number: number.into(),
            issue_date,
            issue_time,
            signature_id: None,
            supplier: None,
            customer: None,
            notes: Vec::new(),
            lines: Vec::new(),
            shipment: Shipment::default(),
        }
    }

    pub fn signature_id(mut self, id: impl Into<String>) -> Self {
        self.signature_id = Some(id.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn customer(mut self, party: Party) -> Self {
        self.customer = Some(party);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn line(
        mut self,
        description: impl Into<String>,
        sku: impl Into<String>,
        quantity: Decimal,
        unit_code: impl Into<String>,
    ) -> Self {
        self.lines.push(DespatchLine {
            quantity,
            unit_code: unit_code.into(),
            sku: sku.into(),
            description: description.into(),
        });
        self
    }

    pub fn shipment(mut self, shipment: Shipment) -> Self {
        self.shipment = shipment;
        self
    }

    pub fn build(self) -> Result<DespatchAdvice, DocumentError> {
        let supplier = required(self.supplier, "supplier")?;
        let customer = required(self.customer, "customer")?;
        check_line_count(self.lines.len())?;

        Ok(DespatchAdvice {
            number: self.number,
            issue_date: self.issue_date,
            issue_time: self.issue_time,
            signature_id: self.signature_id,
            supplier,
            customer,
            notes: self.notes,
            lines: self.lines,
            shipment: self.shipment,
        })
    }
}

/// Builder for daily summaries.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    number: String,
    reference_date: NaiveDate,
    issue_date: NaiveDate,
    signature_id: Option<String>,
    supplier: Option<Party>,
    lines: Vec<SummaryLine>,
}

impl SummaryBuilder {
    pub fn new(number: impl Into<String>, reference_date: NaiveDate, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            reference_date,
            issue_date,
            signature_id: None,
            supplier: None,
            lines: Vec::new(),
        }
    }

    pub fn signature_id(mut self, id: impl Into<String>) -> Self {
        self.signature_id = Some(id.into());
        self
    }

    pub fn supplier(mut self, party: Party) -> Self {
        self.supplier = Some(party);
        self
    }

    pub fn line(mut self, line: SummaryLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> Result<Summary, DocumentError> {
        let supplier = required(self.supplier, "supplier")?;
        check_line_count(self.lines.len())?;

        Ok(Summary {
            number: self.number,
            reference_date: self.reference_date,
            issue_date: self.issue_date,
            signature_id: self.signature_id,
            supplier,
            lines: self.lines,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 8, 16).unwrap()
    }

    fn trade() -> TradeBuilder {
        TradeBuilder::new("F001-156", date())
            .currency("PEN")
            .supplier(PartyBuilder::new("6", "20601327318", "Tiendas Mass").build())
            .customer(PartyBuilder::new("1", "43289672", "Juan Perez").build())
            .line(LineBuilder::new("Producto", dec!(1), "NIU").build())
    }

    #[test]
    fn missing_currency() {
        let err = TradeBuilder::new("F001-1", date())
            .supplier(PartyBuilder::new("6", "20601327318", "Tiendas Mass").build())
            .customer(PartyBuilder::new("1", "43289672", "Juan").build())
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "validation failed: currency is required");
    }

    #[test]
    fn missing_customer() {
        let err = TradeBuilder::new("F001-1", date())
            .currency("PEN")
            .supplier(PartyBuilder::new("6", "20601327318", "Tiendas Mass").build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("customer is required"));
    }

    #[test]
    fn no_lines() {
        let err = TradeBuilder::new("F001-1", date())
            .currency("PEN")
            .supplier(PartyBuilder::new("6", "20601327318", "Tiendas Mass").build())
            .customer(PartyBuilder::new("1", "43289672", "Juan").build())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("at least one line"));
    }

    #[test]
    fn receipt_type_code() {
        let receipt = trade().build_receipt().unwrap();
        assert_eq!(receipt.type_code, DocumentTypeCode::Receipt);
        assert_eq!(receipt.trade.number, "F001-156");
    }

    #[test]
    fn credit_note_requires_reference_number() {
        let reference = Reference {
            number: String::new(),
            date: date(),
            doc_type: DocumentTypeCode::Invoice,
        };
        let result = CreditNoteBuilder::new(trade().build().unwrap(), CreditNoteTypeCode::C01, reference).build();
        assert!(result.is_err());
    }

    #[test]
    fn supplier_location() {
        let party = PartyBuilder::new("6", "20601327318", "Tiendas Mass")
            .address_line("JR. CRESPO Y CASTILLO NRO. 2087")
            .country("PE")
            .location(EstablishmentLocation {
                geo_location_id: Some("150101".into()),
                establishment_code: Some("0000".into()),
                district: Some("Lima".into()),
                street: Some("JR. CRESPO Y CASTILLO NRO. 2087".into()),
            })
            .build();
        assert_eq!(party.address.country.as_deref(), Some("PE"));
        assert!(party.address.location.is_some());
    }
}

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::catalogs::{
    CreditNoteTypeCode, DeliveryNoteInstruction, DocumentTypeCode, SummaryStatus, TaxScheme,
};

/// Trade content shared by invoices, receipts and credit notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDocument {
    /// `cbc:ID`, series and correlative (e.g. "F001-156").
    pub number: String,
    /// `cbc:IssueDate`.
    pub issue_date: NaiveDate,
    /// `cbc:DocumentCurrencyCode` (ISO 4217).
    pub currency: String,
    /// Reference placed in `cac:Signature`; the signer copies it onto `ds:Signature/@Id`.
    pub signature_id: Option<String>,
    /// `cac:AccountingSupplierParty`.
    pub supplier: Party,
    /// `cac:AccountingCustomerParty`.
    pub customer: Party,
    pub lines: Vec<Line>,
    /// Document-level taxes.
    pub taxes: Vec<TaxEntry>,
    /// Document-level allowances and charges.
    pub allowances_charges: Vec<AllowanceChargeEntry>,
    /// Total before taxes (`TaxExclusiveAmount`).
    pub net_total: Decimal,
    /// Total including taxes.
    pub cross_total: Decimal,
    /// Overrides the summed `ChargeTotalAmount`.
    pub charge_total: Option<Decimal>,
    pub payment_terms: Option<PaymentTerms>,
}

/// Factura (01) or boleta de venta (03).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub type_code: DocumentTypeCode,
    #[serde(flatten)]
    pub trade: TradeDocument,
}

/// Nota de credito (07).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditNote {
    #[serde(flatten)]
    pub trade: TradeDocument,
    /// `cbc:ResponseCode` of the discrepancy.
    pub type_code: CreditNoteTypeCode,
    /// The document being corrected.
    pub reference: Reference,
    /// `cbc:Description` of the discrepancy; defaults to the type code description.
    pub reason: Option<String>,
    /// Amount actually payable when it differs from the cross total.
    pub payable_amount: Option<Decimal>,
}

/// The document a credit note refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub number: String,
    pub date: NaiveDate,
    pub doc_type: DocumentTypeCode,
}

/// Guia de remision remitente (09).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DespatchAdvice {
    pub number: String,
    pub issue_date: NaiveDate,
    pub issue_time: NaiveTime,
    pub signature_id: Option<String>,
    /// `cac:DespatchSupplierParty`.
    pub supplier: Party,
    /// `cac:DeliveryCustomerParty`.
    pub customer: Party,
    pub notes: Vec<String>,
    pub lines: Vec<DespatchLine>,
    pub shipment: Shipment,
}

/// Resumen diario de boletas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// e.g. "RC-20200816-1".
    pub number: String,
    /// Issue date of the summarized documents.
    pub reference_date: NaiveDate,
    pub issue_date: NaiveDate,
    pub signature_id: Option<String>,
    pub supplier: Party,
    pub lines: Vec<SummaryLine>,
}

/// One summarized document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryLine {
    pub doc_type: DocumentTypeCode,
    pub number: String,
    pub customer: Party,
    pub status: SummaryStatus,
    pub currency: String,
    pub cross_total: Decimal,
    pub net_total: Decimal,
    pub taxes: Vec<TaxEntry>,
}

/// Identity and address of a supplier, customer or carrier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Party {
    /// Identity document type (catalog 06), e.g. "6" for RUC.
    pub doi_type: String,
    /// Identity document number.
    pub doi: String,
    pub name: String,
    pub address: Address,
}

/// Postal address. Supplier establishments additionally carry a location.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Free-text `cac:AddressLine/cbc:Line`.
    pub line: Option<String>,
    /// ISO 3166-1 alpha-2 country code.
    pub country: Option<String>,
    pub location: Option<EstablishmentLocation>,
}

/// Registered establishment details of the supplier.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EstablishmentLocation {
    /// Ubigeo (INEI geolocation code).
    pub geo_location_id: Option<String>,
    /// SUNAT establishment code ("0000" for the fiscal address).
    pub establishment_code: Option<String>,
    pub district: Option<String>,
    pub street: Option<String>,
}

/// Transport company of a shipment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carrier {
    pub party: Party,
    /// MTC registration number.
    pub company_id: Option<String>,
}

/// Driver of a shipment stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    pub doi_type: String,
    pub doi: String,
    pub first_name: String,
    pub family_name: String,
    /// Driving licence number.
    pub license: String,
    pub job_title: String,
}

/// A sold item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub quantity: Decimal,
    /// UN/ECE Rec 20 unit code.
    pub unit_code: String,
    pub net_unit_price: Decimal,
    pub cross_unit_price: Decimal,
    /// Extended price before taxes (`LineExtensionAmount`).
    pub net_price: Decimal,
    pub cross_price: Decimal,
    pub taxes: Vec<TaxEntry>,
    pub allowances_charges: Vec<AllowanceChargeEntry>,
    pub sku: String,
    pub description: String,
    /// Catalog 16 price type; "01" when unset.
    pub price_type: Option<String>,
    pub properties: Vec<ItemProperty>,
}

/// `cac:AdditionalItemProperty` (catalog 55).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemProperty {
    pub name: String,
    pub code: String,
    pub value: String,
}

/// Tax computation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxKind {
    /// Percentage of a taxable base.
    AdValorem,
    /// Fixed amount per unit, independent of price.
    PerUnit,
}

/// A tax applied to a line or the whole document.
///
/// Amounts are supplied by the caller; nothing here derives the tax from the rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxEntry {
    pub kind: TaxKind,
    pub scheme: TaxScheme,
    pub amount: Decimal,
    pub taxable_amount: Decimal,
    /// Percentage for ad-valorem taxes, amount per unit for per-unit taxes.
    pub rate: Decimal,
    /// Catalog 07 affectation code, emitted at item level.
    pub exemption_reason: Option<String>,
    /// Free transfers are listed but excluded from the tax sum.
    pub free_of_charge: bool,
}

impl TaxEntry {
    pub fn ad_valorem(scheme: TaxScheme, rate: Decimal, taxable_amount: Decimal, amount: Decimal) -> Self {
        Self {
            kind: TaxKind::AdValorem,
            scheme,
            amount,
            taxable_amount,
            rate,
            exemption_reason: None,
            free_of_charge: false,
        }
    }

    pub fn per_unit(scheme: TaxScheme, rate: Decimal, taxable_amount: Decimal, amount: Decimal) -> Self {
        Self {
            kind: TaxKind::PerUnit,
            scheme,
            amount,
            taxable_amount,
            rate,
            exemption_reason: None,
            free_of_charge: false,
        }
    }

    /// IGV at 18%, "Gravado - Operacion Onerosa".
    pub fn igv(taxable_amount: Decimal, amount: Decimal) -> Self {
        Self::ad_valorem(TaxScheme::Igv, dec!(18), taxable_amount, amount).exemption_reason("10")
    }

    /// Plastic bag tax charged per unit.
    pub fn icbper(taxable_amount: Decimal, amount: Decimal) -> Self {
        Self::per_unit(TaxScheme::Icbper, amount, taxable_amount, amount)
    }

    pub fn exemption_reason(mut self, code: impl Into<String>) -> Self {
        self.exemption_reason = Some(code.into());
        self
    }

    pub fn free_of_charge(mut self) -> Self {
        self.free_of_charge = true;
        self
    }
}

/// A discount (allowance) or surcharge (charge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllowanceChargeEntry {
    pub charge: bool,
    /// Catalog 53 reason code.
    pub reason: String,
    pub factor: Decimal,
    pub amount: Decimal,
    pub base_amount: Decimal,
}

impl AllowanceChargeEntry {
    pub fn allowance(reason: impl Into<String>, factor: Decimal, amount: Decimal, base_amount: Decimal) -> Self {
        Self {
            charge: false,
            reason: reason.into(),
            factor,
            amount,
            base_amount,
        }
    }

    pub fn charge(reason: impl Into<String>, factor: Decimal, amount: Decimal, base_amount: Decimal) -> Self {
        Self {
            charge: true,
            reason: reason.into(),
            factor,
            amount,
            base_amount,
        }
    }
}

/// Payment conditions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentTerms {
    /// Credit sale when true, cash ("Contado") otherwise.
    pub credit: bool,
    /// Pending amount for credit sales.
    pub total: Decimal,
    pub currency: String,
    pub installments: Vec<Installment>,
}

impl PaymentTerms {
    pub fn cash(currency: impl Into<String>) -> Self {
        Self {
            credit: false,
            total: Decimal::ZERO,
            currency: currency.into(),
            installments: Vec::new(),
        }
    }

    pub fn credit(total: Decimal, currency: impl Into<String>, installments: Vec<Installment>) -> Self {
        Self {
            credit: true,
            total,
            currency: currency.into(),
            installments,
        }
    }
}

/// One scheduled credit payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub amount: Decimal,
    pub currency: String,
    pub due_date: NaiveDate,
}

/// A goods line of a despatch advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DespatchLine {
    pub quantity: Decimal,
    pub unit_code: String,
    pub sku: String,
    pub description: String,
}

/// Transport details of a despatch advice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Shipment {
    /// Catalog 20 transfer reason.
    pub handling_code: Option<String>,
    pub handling_instructions: Option<String>,
    pub gross_weight: Option<Measure>,
    pub instructions: Vec<DeliveryNoteInstruction>,
    pub stages: Vec<Stage>,
    pub delivery: Delivery,
    pub transport_units: Vec<TransportUnit>,
}

/// A value with a UN/ECE unit code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: Decimal,
    pub unit_code: String,
}

/// One leg of a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    /// Catalog 18 transport mode ("01" public, "02" private).
    pub mode: String,
    pub start_date: NaiveDate,
    pub carrier: Option<Carrier>,
    pub driver: Option<Driver>,
}

/// Arrival and departure points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Delivery {
    pub delivery_address: Address,
    pub despatch_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportUnit {
    pub equipments: Vec<Equipment>,
}

/// A vehicle used in the shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    pub license_plate: String,
    /// Vehicle authorization certificate.
    pub certificate: Option<String>,
}

impl Equipment {
    /// Plate upper-cased with every non-word character removed ("abc-123" -> "ABC123").
    pub fn normalized_plate(&self) -> String {
        normalize_identifier(&self.license_plate)
    }

    pub fn normalized_certificate(&self) -> Option<String> {
        self.certificate.as_deref().map(normalize_identifier)
    }
}

fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn igv_preset() {
        let tax = TaxEntry::igv(dec!(100), dec!(18));
        assert_eq!(tax.kind, TaxKind::AdValorem);
        assert_eq!(tax.scheme, TaxScheme::Igv);
        assert_eq!(tax.rate, dec!(18));
        assert_eq!(tax.exemption_reason.as_deref(), Some("10"));
        assert!(!tax.free_of_charge);
    }

    #[test]
    fn icbper_rate_is_amount() {
        let tax = TaxEntry::icbper(Decimal::ZERO, dec!(0.20));
        assert_eq!(tax.kind, TaxKind::PerUnit);
        assert_eq!(tax.rate, dec!(0.20));
        assert_eq!(tax.exemption_reason, None);
    }

    #[test]
    fn plate_normalization() {
        let eq = Equipment {
            license_plate: "abc-123 ".into(),
            certificate: Some("c.e/45".into()),
        };
        assert_eq!(eq.normalized_plate(), "ABC123");
        assert_eq!(eq.normalized_certificate().as_deref(), Some("CE45"));
    }
}

use rust_decimal::Decimal;

use super::currencies::is_known_currency_code;
use super::error::ValidationError;
use super::numbering::DocumentNumber;
use super::types::*;
use super::units::is_known_unit_code;

/// Identity document type for RUC (catalog 06).
const DOI_RUC: &str = "6";

/// Validate the trade content of an invoice, receipt or credit note.
/// Returns all findings, not just the first.
pub fn validate_trade(doc: &TradeDocument) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_number(&doc.number, "number", &mut errors);
    validate_currency(&doc.currency, "currency", &mut errors);
    validate_supplier(&doc.supplier, "supplier", &mut errors);
    validate_customer(&doc.customer, "customer", &mut errors);

    if doc.lines.is_empty() {
        errors.push(ValidationError::new("lines", "at least one line is required"));
    }
    for (i, line) in doc.lines.iter().enumerate() {
        validate_line(line, &format!("lines[{i}]"), &mut errors);
    }

    if let Some(terms) = &doc.payment_terms {
        validate_currency(&terms.currency, "payment_terms.currency", &mut errors);
        if terms.credit && terms.installments.is_empty() {
            errors.push(ValidationError::new(
                "payment_terms.installments",
                "credit sales need at least one installment",
            ));
        }
        for (i, inst) in terms.installments.iter().enumerate() {
            if inst.amount <= Decimal::ZERO {
                errors.push(ValidationError::new(
                    format!("payment_terms.installments[{i}].amount"),
                    "installment amount must be positive",
                ));
            }
        }
    }

    errors
}

/// Validate a credit note, including the referenced document.
pub fn validate_credit_note(note: &CreditNote) -> Vec<ValidationError> {
    let mut errors = validate_trade(&note.trade);
    validate_number(&note.reference.number, "reference.number", &mut errors);
    errors
}

/// Validate a despatch advice.
pub fn validate_despatch(advice: &DespatchAdvice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    validate_number(&advice.number, "number", &mut errors);
    validate_supplier(&advice.supplier, "supplier", &mut errors);
    validate_customer(&advice.customer, "customer", &mut errors);

    if advice.lines.is_empty() {
        errors.push(ValidationError::new("lines", "at least one line is required"));
    }
    for (i, line) in advice.lines.iter().enumerate() {
        let path = format!("lines[{i}]");
        validate_quantity(line.quantity, &line.unit_code, &path, &mut errors);
        if line.description.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{path}.description"),
                "description must not be empty",
            ));
        }
    }

    if let Some(weight) = &advice.shipment.gross_weight {
        if weight.value <= Decimal::ZERO {
            errors.push(ValidationError::new(
                "shipment.gross_weight",
                "gross weight must be positive",
            ));
        }
    }
    for (i, stage) in advice.shipment.stages.iter().enumerate() {
        if stage.mode.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                format!("shipment.stages[{i}].mode"),
                "transport mode must not be empty",
                "catalogo18",
            ));
        }
    }

    errors
}

/// Validate a daily summary.
pub fn validate_summary(summary: &Summary) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if summary.number.trim().is_empty() {
        errors.push(ValidationError::new("number", "summary number must not be empty"));
    }
    validate_supplier(&summary.supplier, "supplier", &mut errors);
    if summary.lines.is_empty() {
        errors.push(ValidationError::new("lines", "at least one summarized document is required"));
    }
    for (i, line) in summary.lines.iter().enumerate() {
        let path = format!("lines[{i}]");
        validate_number(&line.number, &format!("{path}.number"), &mut errors);
        validate_currency(&line.currency, &format!("{path}.currency"), &mut errors);
    }

    errors
}

fn validate_number(number: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if number.trim().is_empty() {
        errors.push(ValidationError::new(field, "document number must not be empty"));
    } else if let Err(e) = number.parse::<DocumentNumber>() {
        errors.push(ValidationError::new(field, e.to_string()));
    }
}

fn validate_currency(code: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if code.trim().is_empty() {
        errors.push(ValidationError::new(field, "currency code must not be empty"));
    } else if !is_known_currency_code(code) {
        errors.push(ValidationError::with_rule(
            field,
            format!("currency code '{code}' is not a known ISO 4217 code"),
            "catalogo02",
        ));
    }
}

fn validate_supplier(party: &Party, path: &str, errors: &mut Vec<ValidationError>) {
    validate_identity(party, path, errors);
    if party.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{path}.name"),
            "registration name must not be empty",
        ));
    }
    if party.doi_type == DOI_RUC
        && !(party.doi.len() == 11 && party.doi.bytes().all(|b| b.is_ascii_digit()))
    {
        errors.push(ValidationError::with_rule(
            format!("{path}.doi"),
            format!("RUC '{}' must be 11 digits", party.doi),
            "catalogo06",
        ));
    }
}

fn validate_customer(party: &Party, path: &str, errors: &mut Vec<ValidationError>) {
    validate_identity(party, path, errors);
}

fn validate_identity(party: &Party, path: &str, errors: &mut Vec<ValidationError>) {
    if party.doi_type.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{path}.doi_type"),
            "identity document type must not be empty",
            "catalogo06",
        ));
    }
    if party.doi.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{path}.doi"),
            "identity document number must not be empty",
        ));
    }
    if let Some(country) = &party.address.country {
        if country.len() != 2 || !country.bytes().all(|b| b.is_ascii_uppercase()) {
            errors.push(ValidationError::new(
                format!("{path}.address.country"),
                format!("country '{country}' must be an ISO 3166-1 alpha-2 code"),
            ));
        }
    }
}

fn validate_line(line: &Line, path: &str, errors: &mut Vec<ValidationError>) {
    validate_quantity(line.quantity, &line.unit_code, path, errors);
    if line.description.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{path}.description"),
            "description must not be empty",
        ));
    }
}

fn validate_quantity(quantity: Decimal, unit_code: &str, path: &str, errors: &mut Vec<ValidationError>) {
    if quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{path}.quantity"),
            "quantity must be positive",
        ));
    }
    if !is_known_unit_code(unit_code) {
        errors.push(ValidationError::with_rule(
            format!("{path}.unit_code"),
            format!("unit code '{unit_code}' is not a known UN/ECE Rec 20 code"),
            "catalogo03",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn supplier() -> Party {
        Party {
            doi_type: "6".into(),
            doi: "20601327318".into(),
            name: "Tiendas Mass".into(),
            address: Address::default(),
        }
    }

    fn customer() -> Party {
        Party {
            doi_type: "1".into(),
            doi: "43289672".into(),
            name: "Juan Perez".into(),
            address: Address::default(),
        }
    }

    fn line() -> Line {
        Line {
            quantity: dec!(1),
            unit_code: "NIU".into(),
            net_unit_price: dec!(100),
            cross_unit_price: dec!(118),
            net_price: dec!(100),
            cross_price: dec!(118),
            taxes: vec![TaxEntry::igv(dec!(100), dec!(18))],
            allowances_charges: Vec::new(),
            sku: "P-1".into(),
            description: "Producto".into(),
            price_type: None,
            properties: Vec::new(),
        }
    }

    fn trade() -> TradeDocument {
        TradeDocument {
            number: "F001-156".into(),
            issue_date: NaiveDate::from_ymd_opt(2020, 8, 16).unwrap(),
            currency: "PEN".into(),
            signature_id: None,
            supplier: supplier(),
            customer: customer(),
            lines: vec![line()],
            taxes: vec![TaxEntry::igv(dec!(100), dec!(18))],
            allowances_charges: Vec::new(),
            net_total: dec!(100),
            cross_total: dec!(118),
            charge_total: None,
            payment_terms: None,
        }
    }

    #[test]
    fn valid_document_passes() {
        assert!(validate_trade(&trade()).is_empty());
    }

    #[test]
    fn collects_every_finding() {
        let mut doc = trade();
        doc.number = String::new();
        doc.currency = "XXX".into();
        doc.customer.doi = String::new();
        let errors = validate_trade(&doc);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["number", "currency", "customer.doi"]);
    }

    #[test]
    fn ruc_must_have_eleven_digits() {
        let mut doc = trade();
        doc.supplier.doi = "2060132731".into();
        let errors = validate_trade(&doc);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].rule.as_deref(), Some("catalogo06"));
    }

    #[test]
    fn credit_sale_needs_installments() {
        let mut doc = trade();
        doc.payment_terms = Some(PaymentTerms::credit(dec!(118), "PEN", Vec::new()));
        let errors = validate_trade(&doc);
        assert_eq!(errors[0].field, "payment_terms.installments");
    }

    #[test]
    fn line_checks() {
        let mut doc = trade();
        doc.lines[0].quantity = Decimal::ZERO;
        doc.lines[0].unit_code = "XYZ".into();
        let errors = validate_trade(&doc);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "lines[0].quantity");
        assert_eq!(errors[1].field, "lines[0].unit_code");
    }

    #[test]
    fn lowercase_country_rejected() {
        let mut doc = trade();
        doc.customer.address.country = Some("pe".into());
        assert_eq!(validate_trade(&doc)[0].field, "customer.address.country");
    }
}

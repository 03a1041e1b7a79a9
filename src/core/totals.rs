use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::catalogs::reason;
use super::error::{DocumentError, findings_to_result};
use super::taxes::{TaxLevel, TaxTotal, tax_total};
use super::types::{Line, TradeDocument};
use super::validation::validate_trade;

/// `cac:LegalMonetaryTotal`.
///
/// Values are kept at full precision; rounding to two decimals happens when
/// the amounts are written out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonetaryTotal {
    pub line_extension: Decimal,
    pub tax_exclusive: Decimal,
    pub tax_inclusive: Decimal,
    /// Omitted when zero.
    pub charge_total: Option<Decimal>,
    /// Difference between the payable override and the cross total, when they differ.
    pub payable_rounding: Option<Decimal>,
    pub payable: Decimal,
}

/// Per-line derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTotals {
    pub tax_total: TaxTotal,
    /// Unit reference price (`cac:AlternativeConditionPrice`).
    pub pricing_reference: Decimal,
}

/// Everything the assembler needs on top of the document model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedTotals {
    pub tax_total: TaxTotal,
    pub monetary: MonetaryTotal,
    pub lines: Vec<LineTotals>,
}

/// Validate the document and compute its tax totals, monetary summary and
/// per-line pricing references.
///
/// `payable_override` is only meaningful for credit notes.
pub fn calculate_totals(
    doc: &TradeDocument,
    payable_override: Option<Decimal>,
) -> Result<CalculatedTotals, DocumentError> {
    findings_to_result(validate_trade(doc))?;

    let lines = doc
        .lines
        .iter()
        .map(|line| {
            Ok(LineTotals {
                tax_total: tax_total(&line.taxes, TaxLevel::Item),
                pricing_reference: pricing_reference(line)?,
            })
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;

    Ok(CalculatedTotals {
        tax_total: tax_total(&doc.taxes, TaxLevel::Document),
        monetary: monetary_total(doc, payable_override),
        lines,
    })
}

/// Aggregate lines, taxes and allowance/charges into the monetary summary.
///
/// The line extension total may drift from the plain line sum by up to one
/// currency unit after base-affecting allowances and charges; that drift is
/// accepted and not checked.
pub fn monetary_total(doc: &TradeDocument, payable_override: Option<Decimal>) -> MonetaryTotal {
    let mut line_extension: Decimal = doc.lines.iter().map(|l| l.net_price).sum();
    for ac in &doc.allowances_charges {
        if !ac.charge && reason::is_base_discount(&ac.reason) {
            line_extension -= ac.amount;
        } else if ac.charge && reason::is_base_charge(&ac.reason) {
            line_extension += ac.amount;
        }
    }

    let tax_exclusive = doc.net_total;
    let taxes: Decimal = doc.taxes.iter().map(|t| t.amount).sum();
    let tax_inclusive = tax_exclusive + taxes;

    let charge_total = doc.charge_total.unwrap_or_else(|| {
        doc.allowances_charges
            .iter()
            .filter(|ac| ac.charge)
            .map(|ac| ac.amount)
            .sum()
    });

    let (payable, payable_rounding) = match payable_override {
        Some(payable) if payable != doc.cross_total => (payable, Some(payable - doc.cross_total)),
        Some(payable) => (payable, None),
        None => (doc.cross_total, None),
    };

    MonetaryTotal {
        line_extension,
        tax_exclusive,
        tax_inclusive,
        charge_total: non_zero(charge_total),
        payable_rounding,
        payable,
    }
}

/// Unit reference price: net price plus taxes (free transfers excluded) plus
/// allowance/charge amounts, divided by the quantity.
pub fn pricing_reference(line: &Line) -> Result<Decimal, DocumentError> {
    let taxes: Decimal = line
        .taxes
        .iter()
        .filter(|t| !t.free_of_charge)
        .map(|t| t.amount)
        .sum();
    let allowances: Decimal = line.allowances_charges.iter().map(|ac| ac.amount).sum();
    let gross = line.net_price + taxes + allowances;

    gross
        .checked_div(line.quantity)
        .map(|unit| round_half_up(unit, 2))
        .ok_or_else(|| {
            DocumentError::Validation(format!(
                "line '{}': quantity must not be zero",
                line.description
            ))
        })
}

fn non_zero(value: Decimal) -> Option<Decimal> {
    if value.is_zero() { None } else { Some(value) }
}

/// Round half-up (away from zero at the midpoint): 2.005 becomes 2.01.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

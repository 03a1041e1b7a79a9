use rust_decimal::Decimal;
use serde::Serialize;

use super::catalogs::{PER_UNIT_MEASURE_CODE, TaxScheme};
use super::totals::round_half_up;
use super::types::{Measure, TaxEntry, TaxKind};

/// Where a tax total is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxLevel {
    /// Inside a document line.
    Item,
    /// On the document itself.
    Document,
}

/// `cac:TaxTotal`: the tax sum plus one subtotal per entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxTotal {
    pub tax_amount: Decimal,
    pub subtotals: Vec<TaxSubtotal>,
}

/// `cac:TaxSubtotal`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSubtotal {
    pub taxable_amount: Option<Decimal>,
    pub base_unit_measure: Option<Measure>,
    pub tax_amount: Decimal,
    pub category: TaxCategory,
}

/// `cac:TaxCategory`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxCategory {
    pub percent: Option<Decimal>,
    pub per_unit_amount: Option<Decimal>,
    pub exemption_reason: Option<String>,
    pub scheme: TaxScheme,
}

/// Build the tax total for a set of entries.
///
/// Free-of-charge entries appear as subtotals but are left out of `tax_amount`.
/// Ad-valorem taxable amounts are rounded at document level only. Per-unit entries
/// carry a base unit measure at item level, and at document level their taxable
/// amount is the tax amount itself.
pub fn tax_total(entries: &[TaxEntry], level: TaxLevel) -> TaxTotal {
    let tax_amount: Decimal = entries
        .iter()
        .filter(|e| !e.free_of_charge)
        .map(|e| e.amount)
        .sum();

    let subtotals = entries.iter().map(|e| tax_subtotal(e, level)).collect();

    TaxTotal {
        tax_amount,
        subtotals,
    }
}

fn tax_subtotal(entry: &TaxEntry, level: TaxLevel) -> TaxSubtotal {
    let (taxable_amount, base_unit_measure) = match (entry.kind, level) {
        (TaxKind::AdValorem, TaxLevel::Item) => (Some(entry.taxable_amount), None),
        (TaxKind::AdValorem, TaxLevel::Document) => {
            (Some(round_half_up(entry.taxable_amount, 2)), None)
        }
        (TaxKind::PerUnit, TaxLevel::Item) => (
            None,
            Some(Measure {
                value: entry.taxable_amount.normalize(),
                unit_code: PER_UNIT_MEASURE_CODE.to_string(),
            }),
        ),
        (TaxKind::PerUnit, TaxLevel::Document) => (Some(entry.amount), None),
    };

    let category = TaxCategory {
        percent: match entry.kind {
            TaxKind::AdValorem => Some(entry.rate),
            TaxKind::PerUnit => None,
        },
        per_unit_amount: match (entry.kind, level) {
            (TaxKind::PerUnit, TaxLevel::Item) => Some(entry.rate),
            _ => None,
        },
        exemption_reason: match (entry.kind, level) {
            (TaxKind::AdValorem, TaxLevel::Item) => entry.exemption_reason.clone(),
            _ => None,
        },
        scheme: entry.scheme,
    };

    TaxSubtotal {
        taxable_amount,
        base_unit_measure,
        tax_amount: entry.amount,
        category,
    }
}

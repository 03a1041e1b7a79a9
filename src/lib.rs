//! # comprobante
//!
//! Peruvian SUNAT electronic documents: invoices (facturas), receipts
//! (boletas), credit notes, despatch advices (guias de remision) and daily
//! summaries, from the document model through tax totals and UBL 2.1
//! assembly to an enveloped XML-DSig signature.
//!
//! All monetary values use [`rust_decimal::Decimal`] with half-up rounding
//! to two decimals on output.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use comprobante::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = TradeBuilder::new("F001-156", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
//!     .currency("PEN")
//!     .supplier(PartyBuilder::new("6", "20123456789", "ACME S.A.C.").country("PE").build())
//!     .customer(PartyBuilder::new("6", "20987654321", "Cliente S.A.").build())
//!     .line(LineBuilder::new("Servicio", dec!(1), "ZZ")
//!         .unit_prices(dec!(100), dec!(118))
//!         .prices(dec!(100), dec!(118))
//!         .tax(TaxEntry::igv(dec!(100), dec!(18)))
//!         .build())
//!     .tax(TaxEntry::igv(dec!(100), dec!(18)))
//!     .totals(dec!(100), dec!(118))
//!     .build_invoice()
//!     .unwrap();
//!
//! let totals = calculate_totals(&invoice.trade, None).unwrap();
//! assert_eq!(totals.monetary.tax_inclusive, dec!(118));
//! assert_eq!(totals.lines[0].pricing_reference, dec!(118.00));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Document model, SUNAT catalogs, tax and monetary totals, validation |
//! | `ubl` | UBL 2.1 / SummaryDocuments assembly and the summary-line reader |
//! | `sign` | XML-DSig signing, verification and keystore loading |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "ubl")]
pub mod ubl;

#[cfg(feature = "sign")]
pub mod sign;

#[cfg(feature = "core")]
pub use crate::core::*;

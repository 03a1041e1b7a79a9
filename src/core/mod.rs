//! Document model, SUNAT catalogs and the tax/total calculators.
//!
//! Everything here is pure computation over value types; XML output lives in
//! [`crate::ubl`] and signing in [`crate::sign`].

mod builder;
pub mod catalogs;
pub mod currencies;
mod error;
mod numbering;
mod taxes;
mod totals;
mod types;
pub mod units;
mod validation;
mod words;

pub use builder::*;
pub use catalogs::{
    Catalog, CreditNoteTypeCode, DeliveryNoteInstruction, DocumentTypeCode, SummaryStatus,
    TaxScheme,
};
pub use currencies::is_known_currency_code;
pub use error::*;
pub use numbering::*;
pub use taxes::*;
pub use totals::*;
pub use types::*;
pub use units::is_known_unit_code;
pub use validation::*;
pub use words::*;

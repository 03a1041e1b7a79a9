//! ISO 4217 currency codes accepted on SUNAT documents.
//!
//! SUNAT catalog 02 mirrors ISO 4217; this covers the currencies Peruvian
//! issuers actually bill in.

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "ARS", // Argentine Peso
    "AUD", // Australian Dollar
    "BOB", // Boliviano
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CLP", // Chilean Peso
    "CNY", // Yuan Renminbi
    "COP", // Colombian Peso
    "EUR", // Euro
    "GBP", // Pound Sterling
    "JPY", // Yen
    "KRW", // Won
    "MXN", // Mexican Peso
    "PEN", // Sol
    "PYG", // Guarani
    "USD", // US Dollar
    "UYU", // Peso Uruguayo
    "VES", // Bolivar Soberano
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_is_sorted() {
        let mut sorted = CURRENCY_CODES.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, CURRENCY_CODES);
    }

    #[test]
    fn known_codes() {
        assert!(is_known_currency_code("PEN"));
        assert!(is_known_currency_code("USD"));
        assert!(!is_known_currency_code("pen"));
        assert!(!is_known_currency_code("XXX"));
    }
}

//! Spanish amount-in-words legend.
//!
//! SUNAT legend 1000 spells the document total out, e.g.
//! `CIENTO DIECIOCHO Y 00/100` for 118.00.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;

use super::error::DocumentError;
use super::totals::round_half_up;

/// Legend code for the amount in words.
pub const AMOUNT_IN_WORDS_LEGEND: &str = "1000";

const UNITS: [&str; 30] = [
    "CERO", "UNO", "DOS", "TRES", "CUATRO", "CINCO", "SEIS", "SIETE", "OCHO", "NUEVE", "DIEZ",
    "ONCE", "DOCE", "TRECE", "CATORCE", "QUINCE", "DIECISÉIS", "DIECISIETE", "DIECIOCHO",
    "DIECINUEVE", "VEINTE", "VEINTIUNO", "VEINTIDÓS", "VEINTITRÉS", "VEINTICUATRO",
    "VEINTICINCO", "VEINTISÉIS", "VEINTISIETE", "VEINTIOCHO", "VEINTINUEVE",
];

const TENS: [&str; 10] = [
    "", "", "", "TREINTA", "CUARENTA", "CINCUENTA", "SESENTA", "SETENTA", "OCHENTA", "NOVENTA",
];

const HUNDREDS: [&str; 10] = [
    "",
    "CIENTO",
    "DOSCIENTOS",
    "TRESCIENTOS",
    "CUATROCIENTOS",
    "QUINIENTOS",
    "SEISCIENTOS",
    "SETECIENTOS",
    "OCHOCIENTOS",
    "NOVECIENTOS",
];

const THOUSAND: u64 = 1_000;
const MILLION: u64 = 1_000_000;
const BILLION: u64 = 1_000_000_000_000;

/// Spell out an amount as `<WORDS> Y NN/100`, upper case.
///
/// The amount is rounded half-up to cents first, so the integer part and the
/// cents always agree with the printed total. The sign is ignored.
pub fn amount_in_words(amount: Decimal) -> Result<String, DocumentError> {
    let rounded = round_half_up(amount.abs(), 2);
    let integer = rounded.trunc();
    let cents = ((rounded - integer) * dec!(100)).to_u64();
    match (integer.to_u64(), cents) {
        (Some(integer), Some(cents)) => Ok(format!("{} Y {:02}/100", number_in_words(integer), cents)),
        _ => Err(DocumentError::Validation(format!(
            "amount {amount} is too large to spell out"
        ))),
    }
}

/// Spell out a whole number in Spanish, upper case.
pub fn number_in_words(n: u64) -> String {
    match n {
        0 => UNITS[0].to_string(),
        1..THOUSAND => below_thousand(n),
        THOUSAND..MILLION => {
            let (thousands, rest) = (n / THOUSAND, n % THOUSAND);
            let head = if thousands == 1 {
                "MIL".to_string()
            } else {
                format!("{} MIL", apocopate(below_thousand(thousands)))
            };
            join_rest(head, rest)
        }
        MILLION..BILLION => {
            let (millions, rest) = (n / MILLION, n % MILLION);
            let head = if millions == 1 {
                "UN MILLÓN".to_string()
            } else {
                format!("{} MILLONES", apocopate(number_in_words(millions)))
            };
            join_rest(head, rest)
        }
        _ => {
            let (billions, rest) = (n / BILLION, n % BILLION);
            let head = if billions == 1 {
                "UN BILLÓN".to_string()
            } else {
                format!("{} BILLONES", apocopate(number_in_words(billions)))
            };
            join_rest(head, rest)
        }
    }
}

fn join_rest(head: String, rest: u64) -> String {
    if rest == 0 {
        head
    } else {
        format!("{head} {}", number_in_words(rest))
    }
}

fn below_thousand(n: u64) -> String {
    if n == 100 {
        return "CIEN".to_string();
    }
    let (hundreds, rest) = ((n / 100) as usize, n % 100);
    match (hundreds, rest) {
        (0, r) => below_hundred(r),
        (h, 0) => HUNDREDS[h].to_string(),
        (h, r) => format!("{} {}", HUNDREDS[h], below_hundred(r)),
    }
}

fn below_hundred(n: u64) -> String {
    let n = n as usize;
    if n < UNITS.len() {
        UNITS[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} Y {}", TENS[n / 10], UNITS[n % 10])
    }
}

/// "UNO" shortens to "UN" in front of a noun (MIL, MILLONES).
fn apocopate(words: String) -> String {
    if let Some(stem) = words.strip_suffix("VEINTIUNO") {
        format!("{stem}VEINTIÚN")
    } else if let Some(stem) = words.strip_suffix("UNO") {
        format!("{stem}UN")
    } else {
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_numbers() {
        assert_eq!(number_in_words(0), "CERO");
        assert_eq!(number_in_words(1), "UNO");
        assert_eq!(number_in_words(16), "DIECISÉIS");
        assert_eq!(number_in_words(21), "VEINTIUNO");
        assert_eq!(number_in_words(30), "TREINTA");
        assert_eq!(number_in_words(45), "CUARENTA Y CINCO");
    }

    #[test]
    fn hundreds() {
        assert_eq!(number_in_words(100), "CIEN");
        assert_eq!(number_in_words(101), "CIENTO UNO");
        assert_eq!(number_in_words(118), "CIENTO DIECIOCHO");
        assert_eq!(number_in_words(500), "QUINIENTOS");
        assert_eq!(number_in_words(999), "NOVECIENTOS NOVENTA Y NUEVE");
    }

    #[test]
    fn thousands_and_millions() {
        assert_eq!(number_in_words(1_000), "MIL");
        assert_eq!(number_in_words(1_234), "MIL DOSCIENTOS TREINTA Y CUATRO");
        assert_eq!(number_in_words(21_000), "VEINTIÚN MIL");
        assert_eq!(number_in_words(31_000), "TREINTA Y UN MIL");
        assert_eq!(number_in_words(100_000), "CIEN MIL");
        assert_eq!(number_in_words(1_000_000), "UN MILLÓN");
        assert_eq!(number_in_words(2_500_000), "DOS MILLONES QUINIENTOS MIL");
        assert_eq!(number_in_words(1_001_000_000), "MIL UN MILLONES");
        assert_eq!(number_in_words(1_000_000_000_000), "UN BILLÓN");
    }

    #[test]
    fn legend_text() {
        assert_eq!(amount_in_words(dec!(118.00)).unwrap(), "CIENTO DIECIOCHO Y 00/100");
        assert_eq!(amount_in_words(dec!(1234.56)).unwrap(), "MIL DOSCIENTOS TREINTA Y CUATRO Y 56/100");
        assert_eq!(amount_in_words(dec!(2.005)).unwrap(), "DOS Y 01/100");
        assert_eq!(amount_in_words(dec!(0.999)).unwrap(), "UNO Y 00/100");
        assert_eq!(amount_in_words(dec!(-5.5)).unwrap(), "CINCO Y 50/100");
    }
}

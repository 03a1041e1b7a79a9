use std::fmt;
use std::str::FromStr;

use super::error::DocumentError;

/// A SUNAT document number: a four-character series and a correlative,
/// written `SERIES-CORRELATIVE` (e.g. "F001-156").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    series: String,
    correlative: u32,
}

impl DocumentNumber {
    const MAX_CORRELATIVE_DIGITS: usize = 8;

    pub fn new(series: impl Into<String>, correlative: u32) -> Result<Self, DocumentError> {
        let series = series.into();
        validate_series(&series)?;
        if correlative == 0 || correlative > 99_999_999 {
            return Err(DocumentError::Validation(format!(
                "correlative {correlative} must be between 1 and 99999999"
            )));
        }
        Ok(Self {
            series,
            correlative,
        })
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn correlative(&self) -> u32 {
        self.correlative
    }
}

impl FromStr for DocumentNumber {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (series, correlative) = s.split_once('-').ok_or_else(|| {
            DocumentError::Validation(format!("document number '{s}' must look like F001-123"))
        })?;
        if correlative.is_empty()
            || correlative.len() > Self::MAX_CORRELATIVE_DIGITS
            || !correlative.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(DocumentError::Validation(format!(
                "correlative '{correlative}' must be 1 to 8 digits"
            )));
        }
        let value = correlative
            .parse::<u32>()
            .map_err(|e| DocumentError::Validation(format!("correlative '{correlative}': {e}")))?;
        Self::new(series, value)
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.series, self.correlative)
    }
}

fn validate_series(series: &str) -> Result<(), DocumentError> {
    if series.len() == 4 && series.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(DocumentError::Validation(format!(
            "series '{series}' must be four upper-case letters or digits"
        )))
    }
}

/// Correlative generator for one series.
///
/// SUNAT requires correlatives within a series to be consecutive; this
/// tracks the last issued number so none is skipped.
#[derive(Debug, Clone)]
pub struct SeriesSequence {
    series: String,
    next: u32,
    zero_pad: usize,
}

impl SeriesSequence {
    /// Create a sequence starting at 1.
    pub fn new(series: impl Into<String>) -> Result<Self, DocumentError> {
        Self::starting_at(series, 1)
    }

    /// Create a sequence continuing from a given correlative.
    pub fn starting_at(series: impl Into<String>, next: u32) -> Result<Self, DocumentError> {
        let series = series.into();
        validate_series(&series)?;
        Ok(Self {
            series,
            next,
            zero_pad: 0,
        })
    }

    /// Zero-pad correlatives to `width` digits ("F001-000156" with 6).
    pub fn with_padding(mut self, width: usize) -> Self {
        self.zero_pad = width.min(DocumentNumber::MAX_CORRELATIVE_DIGITS);
        self
    }

    /// Issue the next number.
    pub fn next_number(&mut self) -> Result<String, DocumentError> {
        let number = self.peek()?;
        self.next += 1;
        Ok(number)
    }

    /// Preview the next number without consuming it.
    pub fn peek(&self) -> Result<String, DocumentError> {
        if self.next == 0 || self.next > 99_999_999 {
            return Err(DocumentError::Validation(format!(
                "series {} is exhausted",
                self.series
            )));
        }
        Ok(format!(
            "{}-{:0>width$}",
            self.series,
            self.next,
            width = self.zero_pad
        ))
    }

    pub fn series(&self) -> &str {
        &self.series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number() {
        let n: DocumentNumber = "F001-000156".parse().unwrap();
        assert_eq!(n.series(), "F001");
        assert_eq!(n.correlative(), 156);
        assert_eq!(n.to_string(), "F001-156");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("F001".parse::<DocumentNumber>().is_err());
        assert!("F01-1".parse::<DocumentNumber>().is_err());
        assert!("f001-1".parse::<DocumentNumber>().is_err());
        assert!("F001-".parse::<DocumentNumber>().is_err());
        assert!("F001-123456789".parse::<DocumentNumber>().is_err());
        assert!("F001-0".parse::<DocumentNumber>().is_err());
        assert!("F001-12a".parse::<DocumentNumber>().is_err());
    }

    #[test]
    fn sequential_numbering() {
        let mut seq = SeriesSequence::new("B001").unwrap();
        assert_eq!(seq.next_number().unwrap(), "B001-1");
        assert_eq!(seq.next_number().unwrap(), "B001-2");
    }

    #[test]
    fn padded_continuation() {
        let mut seq = SeriesSequence::starting_at("F001", 156).unwrap().with_padding(6);
        assert_eq!(seq.peek().unwrap(), "F001-000156");
        assert_eq!(seq.next_number().unwrap(), "F001-000156");
        assert_eq!(seq.peek().unwrap(), "F001-000157");
    }

    #[test]
    fn exhausted_series() {
        let mut seq = SeriesSequence::starting_at("F001", 99_999_999).unwrap();
        assert!(seq.next_number().is_ok());
        assert!(seq.next_number().is_err());
    }
}

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::{DocumentError, round_half_up};

pub type XmlResult = Result<String, DocumentError>;

fn xml_io(e: std::io::Error) -> DocumentError {
    DocumentError::XmlProcessing(format!("XML write error: {e}"))
}

/// Event writer producing UBL text, indented or compact.
pub(crate) struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    /// A full document starting with the XML declaration.
    pub fn document(pretty: bool) -> Result<Self, DocumentError> {
        let mut w = Self::fragment(pretty);
        w.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(w)
    }

    /// A bare element tree without declaration.
    pub fn fragment(pretty: bool) -> Self {
        let writer = if pretty {
            Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2)
        } else {
            Writer::new(Cursor::new(Vec::new()))
        };
        Self { writer }
    }

    pub fn into_string(self) -> Result<String, DocumentError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf)
            .map_err(|e| DocumentError::XmlProcessing(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, DocumentError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DocumentError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn empty_element(&mut self, name: &str) -> Result<&mut Self, DocumentError> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn empty_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DocumentError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Empty(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, DocumentError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, DocumentError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DocumentError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a monetary amount with `currencyID`, rounded half-up to two decimals.
    pub fn amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, DocumentError> {
        self.text_element_with_attrs(name, &format_amount(amount), &[("currencyID", currency)])
    }

    /// Write a quantity with `unitCode` plus any extra list attributes.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
        extra: &[(&str, &str)],
    ) -> Result<&mut Self, DocumentError> {
        let mut attrs = vec![("unitCode", unit)];
        attrs.extend_from_slice(extra);
        self.text_element_with_attrs(name, &format_quantity(qty), &attrs)
    }
}

/// Fixed two-decimal text of a monetary amount: 2.005 -> "2.01", 100 -> "100.00".
pub fn format_amount(d: Decimal) -> String {
    let mut rounded = round_half_up(d, 2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Quantities keep every supplied digit.
pub fn format_quantity(d: Decimal) -> String {
    d.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_amount_cases() {
        assert_eq!(format_amount(dec!(100)), "100.00");
        assert_eq!(format_amount(dec!(1500.0)), "1500.00");
        assert_eq!(format_amount(dec!(49.90)), "49.90");
        assert_eq!(format_amount(dec!(2.005)), "2.01");
        assert_eq!(format_amount(dec!(2.0049)), "2.00");
        assert_eq!(format_amount(dec!(0.2)), "0.20");
        assert_eq!(format_amount(dec!(-3.335)), "-3.34");
    }

    #[test]
    fn format_quantity_is_untruncated() {
        assert_eq!(format_quantity(dec!(1)), "1");
        assert_eq!(format_quantity(dec!(2.12345)), "2.12345");
        assert_eq!(format_quantity(dec!(3.50)), "3.50");
    }

    #[test]
    fn compact_fragment() {
        let mut w = XmlWriter::fragment(false);
        w.start_element("a").unwrap();
        w.amount_element("b", dec!(1.5), "PEN").unwrap();
        w.empty_element("c").unwrap();
        w.end_element("a").unwrap();
        assert_eq!(
            w.into_string().unwrap(),
            r#"<a><b currencyID="PEN">1.50</b><c/></a>"#
        );
    }

    #[test]
    fn text_is_escaped() {
        let mut w = XmlWriter::fragment(false);
        w.text_element("n", "A & B <C>").unwrap();
        assert_eq!(w.into_string().unwrap(), "<n>A &amp; B &lt;C&gt;</n>");
    }
}

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{CREDIT_NOTE_NS, DESPATCH_ADVICE_NS, INVOICE_NS, SUMMARY_NS};
use crate::core::DocumentError;

/// The four root elements SUNAT accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Invoice,
    CreditNote,
    DespatchAdvice,
    Summary,
}

impl DocumentKind {
    pub fn root_element(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::CreditNote => "CreditNote",
            DocumentKind::DespatchAdvice => "DespatchAdvice",
            DocumentKind::Summary => "SummaryDocuments",
        }
    }

    pub fn namespace(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => INVOICE_NS,
            DocumentKind::CreditNote => CREDIT_NOTE_NS,
            DocumentKind::DespatchAdvice => DESPATCH_ADVICE_NS,
            DocumentKind::Summary => SUMMARY_NS,
        }
    }

    pub fn from_root(local_name: &str) -> Option<Self> {
        match local_name {
            "Invoice" => Some(DocumentKind::Invoice),
            "CreditNote" => Some(DocumentKind::CreditNote),
            "DespatchAdvice" => Some(DocumentKind::DespatchAdvice),
            "SummaryDocuments" => Some(DocumentKind::Summary),
            _ => None,
        }
    }

    /// XPath of the `ext:ExtensionContent` receiving the signature, with the
    /// root bound to the `doc` prefix.
    pub fn signature_xpath(&self) -> String {
        format!(
            "/doc:{}/ext:UBLExtensions/ext:UBLExtension[last()]/ext:ExtensionContent",
            self.root_element()
        )
    }

    /// Identify a document from the local name of its root element.
    pub fn detect(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let local = e.local_name();
                    let name = std::str::from_utf8(local.as_ref()).map_err(|err| {
                        DocumentError::XmlProcessing(format!("root element name: {err}"))
                    })?;
                    return Self::from_root(name).ok_or_else(|| {
                        DocumentError::XmlProcessing(format!("unsupported root element '{name}'"))
                    });
                }
                Ok(Event::Eof) => {
                    return Err(DocumentError::XmlProcessing("document has no root element".into()));
                }
                Err(e) => {
                    return Err(DocumentError::XmlProcessing(format!("XML parse error: {e}")));
                }
                _ => {}
            }
        }
    }
}

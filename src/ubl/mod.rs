//! UBL 2.1 assembly for SUNAT documents.
//!
//! Each document kind has its own writer; all of them emit elements in the
//! UBL schema sequence, open with an empty `ext:ExtensionContent` for the
//! signature and take an immutable [`AssemblyOptions`] per call.

mod common;
mod credit_note;
mod despatch;
mod invoice;
mod kind;
mod reader;
mod summary;
pub(crate) mod xml_utils;

pub use credit_note::to_credit_note_xml;
pub use despatch::to_despatch_xml;
pub use invoice::to_invoice_xml;
pub use kind::DocumentKind;
pub use reader::summary_line_from_xml;
pub use summary::to_summary_xml;
pub use xml_utils::{XmlResult, format_amount, format_quantity};

use crate::core::{CreditNote, DespatchAdvice, DocumentError, Invoice, Summary};

pub const INVOICE_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";
pub const CREDIT_NOTE_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";
pub const DESPATCH_ADVICE_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:DespatchAdvice-2";
pub const SUMMARY_NS: &str = "urn:sunat:names:specification:ubl:peru:schema:xsd:SummaryDocuments-1";
pub const CAC_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
pub const CBC_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
pub const EXT_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
pub const SAC_NS: &str = "urn:sunat:names:specification:ubl:peru:schema:xsd:SunatAggregateComponents-1";
pub const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

/// Prefixes the writers and the signature XPaths hard-code.
const RESERVED_PREFIXES: [(&str, &str); 5] = [
    ("cac", CAC_NS),
    ("cbc", CBC_NS),
    ("ext", EXT_NS),
    ("sac", SAC_NS),
    ("ds", DS_NS),
];

/// Namespace declarations for one document kind.
///
/// A plain value: every assembly call gets its own copy, nothing is shared or
/// mutated between calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceConfig {
    default_ns: String,
    prefixes: Vec<(String, String)>,
}

impl NamespaceConfig {
    /// The declarations SUNAT expects on the root of `kind`.
    pub fn for_kind(kind: DocumentKind) -> Self {
        let mut prefixes = vec![
            ("cac".to_string(), CAC_NS.to_string()),
            ("cbc".to_string(), CBC_NS.to_string()),
            ("ext".to_string(), EXT_NS.to_string()),
        ];
        if kind == DocumentKind::Summary {
            prefixes.push(("sac".to_string(), SAC_NS.to_string()));
        }
        Self {
            default_ns: kind.namespace().to_string(),
            prefixes,
        }
    }

    /// A copy with `prefix` bound to `uri`, replacing any earlier binding.
    ///
    /// `cac`, `cbc`, `ext`, `sac` and `ds` may only be bound to their UBL or
    /// XML-DSig namespace; any other URI is a `Validation` error.
    pub fn with_prefix(
        &self,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        let prefix = prefix.into();
        let uri = uri.into();
        if let Some((_, fixed)) = RESERVED_PREFIXES.iter().find(|(p, _)| *p == prefix) {
            if uri != *fixed {
                return Err(DocumentError::Validation(format!(
                    "prefix '{prefix}' is reserved for {fixed}"
                )));
            }
        }
        let mut prefixes = self.prefixes.clone();
        match prefixes.iter_mut().find(|(p, _)| *p == prefix) {
            Some(binding) => binding.1 = uri,
            None => prefixes.push((prefix, uri)),
        }
        Ok(Self {
            default_ns: self.default_ns.clone(),
            prefixes,
        })
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_ns
    }

    pub fn uri(&self, prefix: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    /// `xmlns` attributes for the root element.
    pub(crate) fn root_attributes(&self) -> Vec<(String, String)> {
        let mut attrs = vec![("xmlns".to_string(), self.default_ns.clone())];
        attrs.extend(
            self.prefixes
                .iter()
                .map(|(p, u)| (format!("xmlns:{p}"), u.clone())),
        );
        attrs
    }
}

/// Per-call assembly settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyOptions {
    pub namespaces: NamespaceConfig,
    /// Indent the unsigned output. Signing always re-serializes compactly.
    pub pretty: bool,
}

impl AssemblyOptions {
    pub fn for_kind(kind: DocumentKind) -> Self {
        Self {
            namespaces: NamespaceConfig::for_kind(kind),
            pretty: true,
        }
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }
}

/// A document that can be assembled into UBL.
pub trait UblDocument {
    fn kind(&self) -> DocumentKind;

    /// Assemble with explicit options.
    fn to_ubl_xml_with(&self, options: &AssemblyOptions) -> XmlResult;

    /// Assemble with the default options of [`UblDocument::kind`].
    fn to_ubl_xml(&self) -> XmlResult {
        self.to_ubl_xml_with(&AssemblyOptions::for_kind(self.kind()))
    }
}

impl UblDocument for Invoice {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Invoice
    }

    fn to_ubl_xml_with(&self, options: &AssemblyOptions) -> XmlResult {
        to_invoice_xml(self, options)
    }
}

impl UblDocument for CreditNote {
    fn kind(&self) -> DocumentKind {
        DocumentKind::CreditNote
    }

    fn to_ubl_xml_with(&self, options: &AssemblyOptions) -> XmlResult {
        to_credit_note_xml(self, options)
    }
}

impl UblDocument for DespatchAdvice {
    fn kind(&self) -> DocumentKind {
        DocumentKind::DespatchAdvice
    }

    fn to_ubl_xml_with(&self, options: &AssemblyOptions) -> XmlResult {
        to_despatch_xml(self, options)
    }
}

impl UblDocument for Summary {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Summary
    }

    fn to_ubl_xml_with(&self, options: &AssemblyOptions) -> XmlResult {
        to_summary_xml(self, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_declares_sac() {
        let ns = NamespaceConfig::for_kind(DocumentKind::Summary);
        assert_eq!(ns.default_namespace(), SUMMARY_NS);
        assert_eq!(ns.uri("sac"), Some(SAC_NS));
        assert_eq!(NamespaceConfig::for_kind(DocumentKind::Invoice).uri("sac"), None);
    }

    #[test]
    fn with_prefix_leaves_original_untouched() {
        let base = NamespaceConfig::for_kind(DocumentKind::Invoice);
        let extended = base.with_prefix("ds", DS_NS).unwrap();
        assert_eq!(base.uri("ds"), None);
        assert_eq!(extended.uri("ds"), Some(DS_NS));

        let rebound = extended.with_prefix("qdt", "urn:one").unwrap().with_prefix("qdt", "urn:two").unwrap();
        assert_eq!(rebound.uri("qdt"), Some("urn:two"));
        assert_eq!(rebound.root_attributes().len(), base.root_attributes().len() + 2);
    }

    #[test]
    fn reserved_prefixes_keep_their_namespace() {
        let base = NamespaceConfig::for_kind(DocumentKind::Invoice);
        for prefix in ["cac", "cbc", "ext", "sac", "ds"] {
            let err = base.with_prefix(prefix, "urn:other").unwrap_err();
            assert!(matches!(err, DocumentError::Validation(_)), "{prefix}");
        }
        assert_eq!(base.with_prefix("cbc", CBC_NS).unwrap(), base);
    }

    #[test]
    fn root_attributes_start_with_default() {
        let attrs = NamespaceConfig::for_kind(DocumentKind::CreditNote).root_attributes();
        assert_eq!(attrs[0], ("xmlns".to_string(), CREDIT_NOTE_NS.to_string()));
        assert_eq!(attrs[1].0, "xmlns:cac");
    }
}

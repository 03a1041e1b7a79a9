//! Enveloped XML-DSig over assembled UBL documents.
//!
//! Each call walks `Unsigned -> Canonicalized -> Digested -> Signed ->
//! Serialized`; every state owns the parsed tree, so an error at any step
//! drops it and nothing partial escapes.

use base64ct::{Base64, Encoding};
use libxml::tree::{Document, SaveOptions};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer as _};
use sha1::{Digest, Sha1};
use tracing::{debug, info};

use super::dom;
use super::keystore::{CredentialLoader, Credentials};
use crate::core::DocumentError;
use crate::ubl::xml_utils::XmlWriter;
use crate::ubl::{DS_NS, DocumentKind, UblDocument};

pub const C14N_ALGORITHM: &str = "http://www.w3.org/TR/2001/REC-xml-c14n-20010315";
pub const RSA_SHA1_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
pub const ENVELOPED_TRANSFORM: &str = "http://www.w3.org/2000/09/xmldsig#enveloped-signature";
pub const SHA1_ALGORITHM: &str = "http://www.w3.org/2000/09/xmldsig#sha1";

const SIGNATURE_VALUE_XPATH: &str = "//ds:Signature/ds:SignatureValue";

/// Final signed XML plus the Base64 SHA-1 digest of the signed content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument {
    kind: DocumentKind,
    xml: String,
    digest: String,
}

impl SignedDocument {
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// The `DigestValue` of the whole-document reference.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn into_xml(self) -> String {
        self.xml
    }
}

struct Unsigned {
    doc: Document,
    kind: DocumentKind,
}

struct Canonicalized {
    doc: Document,
    kind: DocumentKind,
    canonical: String,
    signature_id: Option<String>,
}

struct Digested {
    doc: Document,
    kind: DocumentKind,
    digest: String,
    signature_id: Option<String>,
}

struct Signed {
    doc: Document,
    kind: DocumentKind,
    digest: String,
}

impl Unsigned {
    fn parse(xml: &str) -> Result<Self, DocumentError> {
        let kind = DocumentKind::detect(xml)?;
        let doc = dom::parse(xml)?;
        debug!(?kind, "parsed unsigned document");
        Ok(Self { doc, kind })
    }

    fn canonicalize(self) -> Result<Canonicalized, DocumentError> {
        let ctx = dom::context(&self.doc, self.kind)?;
        if !dom::nodes(&ctx, dom::SIGNATURE_XPATH)?.is_empty() {
            return Err(DocumentError::XmlProcessing("document is already signed".into()));
        }
        let stripped = dom::strip_blank_text(&ctx)?;
        let signature_id = dom::signature_uri(&ctx)?;
        let canonical = dom::canonicalize_document(&self.doc)?;
        debug!(kind = ?self.kind, stripped, bytes = canonical.len(), "canonicalized");
        Ok(Canonicalized {
            doc: self.doc,
            kind: self.kind,
            canonical,
            signature_id,
        })
    }
}

impl Canonicalized {
    fn digest(self) -> Digested {
        let digest = Base64::encode_string(&Sha1::digest(self.canonical.as_bytes()));
        debug!(kind = ?self.kind, "digested");
        Digested {
            doc: self.doc,
            kind: self.kind,
            digest,
            signature_id: self.signature_id,
        }
    }
}

impl Digested {
    fn sign(mut self, credentials: &Credentials) -> Result<Signed, DocumentError> {
        let ctx = dom::context(&self.doc, self.kind)?;
        let mut target = dom::first_node(&ctx, &self.kind.signature_xpath())?;

        let fragment = signature_fragment(self.signature_id.as_deref(), &self.digest, credentials)?;
        let mut signature = dom::import_fragment(&mut self.doc, &fragment)?;
        target
            .add_child(&mut signature)
            .map_err(|e| DocumentError::XmlProcessing(format!("signature insertion failed: {e}")))?;

        let ctx = dom::context(&self.doc, self.kind)?;
        let mut signed_info = dom::first_node(&ctx, dom::SIGNED_INFO_XPATH)?;
        let canonical_info = dom::canonicalize_node(&mut signed_info)?;

        let key = SigningKey::<Sha1>::new(credentials.private_key().clone());
        let value = key
            .try_sign(canonical_info.as_bytes())
            .map_err(|e| DocumentError::Signing(format!("RSA-SHA1 signing failed: {e}")))?;

        let mut value_node = dom::first_node(&ctx, SIGNATURE_VALUE_XPATH)?;
        value_node
            .set_content(&Base64::encode_string(&value.to_bytes()))
            .map_err(|e| DocumentError::XmlProcessing(format!("signature value: {e:?}")))?;
        debug!(kind = ?self.kind, "signed");

        Ok(Signed {
            doc: self.doc,
            kind: self.kind,
            digest: self.digest,
        })
    }
}

impl Signed {
    fn serialize(self) -> SignedDocument {
        let xml = self.doc.to_string_with_options(SaveOptions {
            format: false,
            ..SaveOptions::default()
        });
        SignedDocument {
            kind: self.kind,
            xml,
            digest: self.digest,
        }
    }
}

/// `ds:Signature` with an empty `SignatureValue`, compact so `SignedInfo`
/// has no whitespace to canonicalize.
fn signature_fragment(
    id: Option<&str>,
    digest: &str,
    credentials: &Credentials,
) -> Result<String, DocumentError> {
    let mut w = XmlWriter::fragment(false);
    let mut attrs = vec![("xmlns:ds", DS_NS)];
    if let Some(id) = id {
        attrs.push(("Id", id));
    }
    w.start_element_with_attrs("ds:Signature", &attrs)?;

    w.start_element("ds:SignedInfo")?;
    w.empty_element_with_attrs("ds:CanonicalizationMethod", &[("Algorithm", C14N_ALGORITHM)])?;
    w.empty_element_with_attrs("ds:SignatureMethod", &[("Algorithm", RSA_SHA1_ALGORITHM)])?;
    w.start_element_with_attrs("ds:Reference", &[("URI", "")])?;
    w.start_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:Transform", &[("Algorithm", ENVELOPED_TRANSFORM)])?;
    w.end_element("ds:Transforms")?;
    w.empty_element_with_attrs("ds:DigestMethod", &[("Algorithm", SHA1_ALGORITHM)])?;
    w.text_element("ds:DigestValue", digest)?;
    w.end_element("ds:Reference")?;
    w.end_element("ds:SignedInfo")?;

    w.empty_element("ds:SignatureValue")?;

    w.start_element("ds:KeyInfo")?;
    w.start_element("ds:X509Data")?;
    w.text_element("ds:X509SubjectName", &credentials.subject_name())?;
    w.text_element("ds:X509Certificate", &credentials.certificate_base64()?)?;
    w.end_element("ds:X509Data")?;
    w.end_element("ds:KeyInfo")?;

    w.end_element("ds:Signature")?;
    w.into_string()
}

/// Signs assembled documents with one set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn from_loader(loader: &impl CredentialLoader) -> Result<Self, DocumentError> {
        Ok(Self::new(loader.load()?))
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sign UBL text of any supported kind; the insertion point is found
    /// from the root element.
    pub fn sign_xml(&self, xml: &str) -> Result<SignedDocument, DocumentError> {
        let signed = Unsigned::parse(xml)?
            .canonicalize()?
            .digest()
            .sign(&self.credentials)?
            .serialize();
        info!(kind = ?signed.kind, digest = %signed.digest, "document signed");
        Ok(signed)
    }

    /// Assemble and sign in one step.
    pub fn sign_document<D: UblDocument + ?Sized>(&self, document: &D) -> Result<SignedDocument, DocumentError> {
        self.sign_xml(&document.to_ubl_xml()?)
    }
}

use libxml::parser::Parser;
use libxml::tree::c14n::{CanonicalizationMode, CanonicalizationOptions};
use libxml::tree::{Document, Node};
use libxml::xpath::Context;

use crate::core::DocumentError;
use crate::ubl::{CAC_NS, CBC_NS, DS_NS, DocumentKind, EXT_NS};

pub(crate) const SIGNATURE_XPATH: &str = "//ds:Signature";
pub(crate) const SIGNED_INFO_XPATH: &str = "//ds:Signature/ds:SignedInfo";
const SIGNATURE_URI_XPATH: &str =
    "//cac:Signature/cac:DigitalSignatureAttachment/cac:ExternalReference/cbc:URI";
const BLANK_TEXT_XPATH: &str = "//text()[normalize-space(.)='']";

pub(crate) fn xml_err<E: std::fmt::Debug>(what: &str) -> impl Fn(E) -> DocumentError + '_ {
    move |e| DocumentError::XmlProcessing(format!("{what} failed: {e:?}"))
}

pub(crate) fn parse(xml: &str) -> Result<Document, DocumentError> {
    Parser::default()
        .parse_string(xml)
        .map_err(|e| DocumentError::XmlProcessing(format!("XML parse error: {e:?}")))
}

/// XPath context with the document root bound to `doc` and the UBL prefixes.
pub(crate) fn context(doc: &Document, kind: DocumentKind) -> Result<Context, DocumentError> {
    let ctx = Context::new(doc).map_err(xml_err("XPath context"))?;
    for (prefix, uri) in [
        ("doc", kind.namespace()),
        ("ext", EXT_NS),
        ("cac", CAC_NS),
        ("cbc", CBC_NS),
        ("ds", DS_NS),
    ] {
        ctx.register_namespace(prefix, uri)
            .map_err(xml_err("namespace registration"))?;
    }
    Ok(ctx)
}

pub(crate) fn nodes(ctx: &Context, xpath: &str) -> Result<Vec<Node>, DocumentError> {
    Ok(ctx
        .evaluate(xpath)
        .map_err(|_| DocumentError::XmlProcessing(format!("XPath evaluation failed: {xpath}")))?
        .get_nodes_as_vec())
}

pub(crate) fn first_node(ctx: &Context, xpath: &str) -> Result<Node, DocumentError> {
    nodes(ctx, xpath)?
        .into_iter()
        .next()
        .ok_or_else(|| DocumentError::XmlProcessing(format!("no node matches {xpath}")))
}

/// Drop whitespace-only text nodes so indented and compact input digest alike.
pub(crate) fn strip_blank_text(ctx: &Context) -> Result<usize, DocumentError> {
    let blanks = nodes(ctx, BLANK_TEXT_XPATH)?;
    let count = blanks.len();
    for mut node in blanks {
        node.unlink();
    }
    Ok(count)
}

/// Reference id carried by `cac:Signature`, if the document has one.
pub(crate) fn signature_uri(ctx: &Context) -> Result<Option<String>, DocumentError> {
    Ok(nodes(ctx, SIGNATURE_URI_XPATH)?
        .first()
        .map(|n| n.get_content().trim().to_string())
        .filter(|uri| !uri.is_empty()))
}

fn c14n_options() -> CanonicalizationOptions {
    CanonicalizationOptions {
        mode: CanonicalizationMode::Canonical1_0,
        inclusive_ns_prefixes: vec![],
        with_comments: false,
    }
}

/// Inclusive C14N 1.0 of the whole document, comments dropped.
pub(crate) fn canonicalize_document(doc: &Document) -> Result<String, DocumentError> {
    doc.canonicalize(c14n_options(), None)
        .map_err(xml_err("document canonicalization"))
}

/// Inclusive C14N 1.0 of one subtree, keeping the namespaces in scope.
pub(crate) fn canonicalize_node(node: &mut Node) -> Result<String, DocumentError> {
    node.canonicalize(c14n_options())
        .map_err(xml_err("node canonicalization"))
}

/// Parse a standalone fragment and adopt its root into `doc`.
pub(crate) fn import_fragment(doc: &mut Document, xml: &str) -> Result<Node, DocumentError> {
    let fragment = parse(xml)?;
    let mut node = fragment
        .get_root_element()
        .ok_or_else(|| DocumentError::XmlProcessing("fragment has no root".into()))?;
    node.unlink();
    doc.import_node(&mut node)
        .map_err(xml_err("fragment import"))
}

/// The document with every `ds:Signature` removed, as the enveloped transform sees it.
pub(crate) fn without_signature(doc: &Document, kind: DocumentKind) -> Result<Document, DocumentError> {
    let copy = doc.dup().map_err(xml_err("document copy"))?;
    {
        let ctx = context(&copy, kind)?;
        for mut node in nodes(&ctx, SIGNATURE_XPATH)? {
            node.unlink();
        }
    }
    Ok(copy)
}

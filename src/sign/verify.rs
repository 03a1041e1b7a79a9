use base64ct::{Base64, Encoding};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::signature::Verifier;
use sha1::{Digest, Sha1};
use tracing::warn;
use x509_cert::Certificate;
use x509_cert::der::Decode;

use super::dom;
use super::keystore::certificate_public_key;
use crate::core::DocumentError;
use crate::ubl::DocumentKind;

const DIGEST_VALUE_XPATH: &str = "//ds:Signature/ds:SignedInfo/ds:Reference/ds:DigestValue";
const SIGNATURE_VALUE_XPATH: &str = "//ds:Signature/ds:SignatureValue";
const CERTIFICATE_XPATH: &str = "//ds:Signature/ds:KeyInfo/ds:X509Data/ds:X509Certificate";

/// Outcome of checking an enveloped signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid,
    Invalid { reason: String },
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid)
    }

    fn invalid(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        warn!(%reason, "signature verification failed");
        Verification::Invalid { reason }
    }
}

/// Check the reference digest and the RSA-SHA1 signature value against the
/// certificate embedded in `KeyInfo`.
///
/// The document is canonicalized exactly as received, so any whitespace
/// added after signing breaks the digest. Structural problems (unparsable
/// XML, no signature) are errors; a signature that does not match is
/// `Verification::Invalid`.
pub fn verify_signature(xml: &str) -> Result<Verification, DocumentError> {
    let kind = DocumentKind::detect(xml)?;
    let doc = dom::parse(xml)?;
    let ctx = dom::context(&doc, kind)?;

    let text = |xpath: &str| -> Result<String, DocumentError> {
        let content = dom::first_node(&ctx, xpath)?.get_content();
        Ok(content.split_whitespace().collect())
    };
    let expected_digest = text(DIGEST_VALUE_XPATH)?;
    let signature_b64 = text(SIGNATURE_VALUE_XPATH)?;
    let certificate_b64 = text(CERTIFICATE_XPATH)?;

    let unsigned = dom::without_signature(&doc, kind)?;
    let canonical = dom::canonicalize_document(&unsigned)?;
    let digest = Base64::encode_string(&Sha1::digest(canonical.as_bytes()));
    if digest != expected_digest {
        return Ok(Verification::invalid(format!(
            "digest mismatch: computed {digest}, signed {expected_digest}"
        )));
    }

    let certificate_der = match Base64::decode_vec(&certificate_b64) {
        Ok(der) => der,
        Err(e) => return Ok(Verification::invalid(format!("certificate is not Base64: {e}"))),
    };
    let certificate = match Certificate::from_der(&certificate_der) {
        Ok(certificate) => certificate,
        Err(e) => return Ok(Verification::invalid(format!("malformed certificate: {e}"))),
    };
    let public_key = match certificate_public_key(&certificate) {
        Ok(key) => key,
        Err(e) => return Ok(Verification::invalid(e.to_string())),
    };

    let signature_bytes = match Base64::decode_vec(&signature_b64) {
        Ok(bytes) => bytes,
        Err(e) => return Ok(Verification::invalid(format!("signature value is not Base64: {e}"))),
    };
    let signature = match Signature::try_from(signature_bytes.as_slice()) {
        Ok(signature) => signature,
        Err(e) => return Ok(Verification::invalid(format!("malformed signature value: {e}"))),
    };

    let mut signed_info = dom::first_node(&ctx, dom::SIGNED_INFO_XPATH)?;
    let canonical_info = dom::canonicalize_node(&mut signed_info)?;
    let verifying_key = VerifyingKey::<Sha1>::new(public_key);
    Ok(match verifying_key.verify(canonical_info.as_bytes(), &signature) {
        Ok(()) => Verification::Valid,
        Err(_) => Verification::invalid("signature value does not match SignedInfo"),
    })
}

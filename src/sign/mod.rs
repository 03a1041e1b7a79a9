//! XML-DSig signing and verification (RSA-SHA1, C14N 1.0, enveloped).
//!
//! ```no_run
//! use comprobante::sign::{KeyStore, Signer, verify_signature};
//!
//! # fn run(unsigned_xml: &str) -> Result<(), comprobante::DocumentError> {
//! let signer = Signer::from_loader(&KeyStore::open("keystore", "changeit", "sunat"))?;
//! let signed = signer.sign_xml(unsigned_xml)?;
//! assert!(verify_signature(signed.xml())?.is_valid());
//! # Ok(())
//! # }
//! ```

mod dom;
mod engine;
mod keystore;
mod verify;

pub use engine::{
    C14N_ALGORITHM, ENVELOPED_TRANSFORM, RSA_SHA1_ALGORITHM, SHA1_ALGORITHM, SignedDocument, Signer,
};
pub use keystore::{
    CredentialLoader, Credentials, ENV_KEY_ALIAS, ENV_KEY_PASSWORD, ENV_KEYSTORE_PASSWORD,
    ENV_KEYSTORE_PATH, KeyStore, KeyStoreSettings,
};
pub use verify::{Verification, verify_signature};

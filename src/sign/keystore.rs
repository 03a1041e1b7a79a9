use std::fs;
use std::path::{Path, PathBuf};

use base64ct::{Base64, Encoding};
use pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::Deserialize;
use tracing::{debug, warn};
use x509_cert::Certificate;
use x509_cert::der::{DecodePem, Encode};

use crate::core::DocumentError;

pub const ENV_KEYSTORE_PATH: &str = "CPE_KEYSTORE_PATH";
pub const ENV_KEYSTORE_PASSWORD: &str = "CPE_KEYSTORE_PASSWORD";
pub const ENV_KEY_ALIAS: &str = "CPE_KEY_ALIAS";
pub const ENV_KEY_PASSWORD: &str = "CPE_KEY_PASSWORD";

/// The signing key and the certificate that is embedded in `KeyInfo`.
#[derive(Clone)]
pub struct Credentials {
    key: RsaPrivateKey,
    certificate: Certificate,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("subject", &self.subject_name())
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Pair a key with its certificate; fails when the certificate's public
    /// key does not belong to `key`.
    pub fn new(key: RsaPrivateKey, certificate: Certificate) -> Result<Self, DocumentError> {
        let public = certificate_public_key(&certificate)?;
        if public != key.to_public_key() {
            return Err(DocumentError::Credential(
                "certificate does not match the private key".into(),
            ));
        }
        Ok(Self { key, certificate })
    }

    /// From a PEM certificate and an unencrypted PKCS#8 PEM key.
    pub fn from_pem(certificate_pem: &str, key_pem: &str) -> Result<Self, DocumentError> {
        let key = RsaPrivateKey::from_pkcs8_pem(key_pem)
            .map_err(|e| DocumentError::Credential(format!("private key: {e}")))?;
        Self::new(key, parse_certificate(certificate_pem)?)
    }

    /// From a PEM certificate and an encrypted PKCS#8 PEM key.
    pub fn from_encrypted_pem(
        certificate_pem: &str,
        key_pem: &str,
        password: &str,
    ) -> Result<Self, DocumentError> {
        let key = RsaPrivateKey::from_pkcs8_encrypted_pem(key_pem, password.as_bytes())
            .map_err(|e| DocumentError::Credential(format!("private key: {e}")))?;
        Self::new(key, parse_certificate(certificate_pem)?)
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.key
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// RFC 4514 subject, e.g. `CN=ACME S.A.C.,O=ACME,C=PE`.
    pub fn subject_name(&self) -> String {
        self.certificate.tbs_certificate.subject.to_string()
    }

    pub fn certificate_der(&self) -> Result<Vec<u8>, DocumentError> {
        self.certificate
            .to_der()
            .map_err(|e| DocumentError::Credential(format!("certificate encoding: {e}")))
    }

    pub fn certificate_base64(&self) -> Result<String, DocumentError> {
        Ok(Base64::encode_string(&self.certificate_der()?))
    }
}

pub(crate) fn parse_certificate(pem: &str) -> Result<Certificate, DocumentError> {
    Certificate::from_pem(pem.as_bytes())
        .map_err(|e| DocumentError::Credential(format!("certificate: {e}")))
}

pub(crate) fn certificate_public_key(certificate: &Certificate) -> Result<RsaPublicKey, DocumentError> {
    let spki = certificate
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| DocumentError::Credential(format!("certificate public key: {e}")))?;
    RsaPublicKey::from_public_key_der(&spki)
        .map_err(|e| DocumentError::Credential(format!("certificate public key: {e}")))
}

/// Source of signing credentials.
pub trait CredentialLoader {
    fn load(&self) -> Result<Credentials, DocumentError>;
}

impl CredentialLoader for Credentials {
    fn load(&self) -> Result<Credentials, DocumentError> {
        Ok(self.clone())
    }
}

/// Where the keystore lives and how to unlock the signing entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyStoreSettings {
    pub path: PathBuf,
    pub store_password: String,
    pub alias: String,
    /// Falls back to `store_password`.
    #[serde(default)]
    pub key_password: Option<String>,
}

impl KeyStoreSettings {
    /// Read `CPE_KEYSTORE_PATH`, `CPE_KEYSTORE_PASSWORD`, `CPE_KEY_ALIAS` and
    /// the optional `CPE_KEY_PASSWORD`.
    pub fn from_env() -> Result<Self, DocumentError> {
        let var = |name: &str| {
            std::env::var(name)
                .map_err(|_| DocumentError::Credential(format!("environment variable {name} is not set")))
        };
        Ok(Self {
            path: PathBuf::from(var(ENV_KEYSTORE_PATH)?),
            store_password: var(ENV_KEYSTORE_PASSWORD)?,
            alias: var(ENV_KEY_ALIAS)?,
            key_password: std::env::var(ENV_KEY_PASSWORD).ok(),
        })
    }

    pub fn effective_key_password(&self) -> &str {
        self.key_password.as_deref().unwrap_or(&self.store_password)
    }
}

/// A directory keystore: `<alias>.crt` holds the PEM certificate and
/// `<alias>.key` the encrypted PKCS#8 key.
#[derive(Debug, Clone)]
pub struct KeyStore {
    settings: KeyStoreSettings,
}

impl KeyStore {
    pub fn new(settings: KeyStoreSettings) -> Self {
        Self { settings }
    }

    pub fn open(path: impl AsRef<Path>, store_password: &str, alias: &str) -> Self {
        Self::new(KeyStoreSettings {
            path: path.as_ref().to_path_buf(),
            store_password: store_password.to_string(),
            alias: alias.to_string(),
            key_password: None,
        })
    }

    pub fn with_key_password(mut self, password: &str) -> Self {
        self.settings.key_password = Some(password.to_string());
        self
    }

    pub fn settings(&self) -> &KeyStoreSettings {
        &self.settings
    }

    fn read_entry(&self, extension: &str) -> Result<String, DocumentError> {
        let path = self
            .settings
            .path
            .join(format!("{}.{extension}", self.settings.alias));
        fs::read_to_string(&path).map_err(|e| {
            DocumentError::Credential(format!(
                "alias '{}' not found ({}): {e}",
                self.settings.alias,
                path.display()
            ))
        })
    }
}

impl CredentialLoader for KeyStore {
    fn load(&self) -> Result<Credentials, DocumentError> {
        let settings = &self.settings;
        if !settings.path.is_dir() {
            let err = DocumentError::Credential(format!(
                "keystore {} cannot be opened",
                settings.path.display()
            ));
            warn!(error = %err, "credential load failed");
            return Err(err);
        }

        let result = self.read_entry("crt").and_then(|cert| {
            let key = self.read_entry("key")?;
            Credentials::from_encrypted_pem(&cert, &key, settings.effective_key_password())
        });
        match &result {
            Ok(credentials) => debug!(alias = %settings.alias, subject = %credentials.subject_name(), "credentials loaded"),
            Err(err) => warn!(alias = %settings.alias, error = %err, "credential load failed"),
        }
        result
    }
}

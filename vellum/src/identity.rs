// Entity identities and credential files.
//
// An identity is the artifact id plus the encryption (X25519) and signing
// (Ed25519) key material of one protocol participant. A private identity
// carries both halves of each keypair; a public identity only the public
// halves. Credential files are JSON with hex-encoded key fields.

use std::fs;
use std::path::Path;

use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use x25519_dalek::StaticSecret;

use crate::crypto::EncryptionKeyPair;
use crate::error::{Result, VellumError};

/// The identity record of one protocol participant.
pub struct Identity {
    artifact_id: Uuid,
    enc_public: [u8; 32],
    enc_secret: Option<StaticSecret>,
    sign_public: VerifyingKey,
    sign_secret: Option<SigningKey>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("artifact_id", &self.artifact_id)
            .field("enc_public", &self.enc_public)
            .field("sign_public", &self.sign_public)
            .field("has_private_keys", &self.enc_secret.is_some())
            .finish_non_exhaustive()
    }
}

impl Identity {
    /// Generate a fresh private identity with a random artifact id.
    pub fn generate() -> Self {
        let enc = EncryptionKeyPair::generate();
        let sign_secret = SigningKey::generate(&mut OsRng);
        Self {
            artifact_id: Uuid::new_v4(),
            enc_public: enc.public_key_bytes(),
            enc_secret: Some(enc.secret().clone()),
            sign_public: sign_secret.verifying_key(),
            sign_secret: Some(sign_secret),
        }
    }

    pub fn artifact_id(&self) -> &Uuid {
        &self.artifact_id
    }

    pub fn public_encryption_key(&self) -> &[u8; 32] {
        &self.enc_public
    }

    /// The private encryption key; errors for a public-only identity.
    pub fn private_encryption_key(&self) -> Result<&StaticSecret> {
        self.enc_secret.as_ref().ok_or_else(|| {
            VellumError::InvalidKey("identity has no private encryption key".into())
        })
    }

    pub fn public_signing_key(&self) -> &VerifyingKey {
        &self.sign_public
    }

    /// The private signing key; errors for a public-only identity.
    pub fn private_signing_key(&self) -> Result<&SigningKey> {
        self.sign_secret
            .as_ref()
            .ok_or_else(|| VellumError::InvalidKey("identity has no private signing key".into()))
    }

    pub fn is_private(&self) -> bool {
        self.enc_secret.is_some() && self.sign_secret.is_some()
    }

    /// A copy with the secret halves stripped.
    pub fn to_public(&self) -> Identity {
        Identity {
            artifact_id: self.artifact_id,
            enc_public: self.enc_public,
            enc_secret: None,
            sign_public: self.sign_public,
            sign_secret: None,
        }
    }

    /// Load a private identity; the file must contain both secret keys.
    pub fn from_private_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let identity = Self::from_file(path.as_ref())?;
        if !identity.is_private() {
            return Err(VellumError::CredentialParse {
                path: path.as_ref().display().to_string(),
                detail: "private credential file is missing secret keys".into(),
            });
        }
        Ok(identity)
    }

    /// Load a public identity; secret keys are ignored if present.
    pub fn from_public_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_file(path.as_ref())?.to_public())
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| VellumError::CredentialRead {
            path: path.display().to_string(),
            source,
        })?;
        let doc: CredentialFile =
            serde_json::from_str(&text).map_err(|e| VellumError::CredentialParse {
                path: path.display().to_string(),
                detail: e.to_string(),
            })?;
        doc.into_identity()
            .map_err(|detail| VellumError::CredentialParse {
                path: path.display().to_string(),
                detail,
            })
    }

    /// Write the full credential file, secrets included.
    pub fn write_private_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.private_encryption_key()?;
        self.private_signing_key()?;
        self.write_file(path.as_ref(), true)
    }

    /// Write the public credential file.
    pub fn write_public_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.write_file(path.as_ref(), false)
    }

    fn write_file(&self, path: &Path, with_secrets: bool) -> Result<()> {
        let doc = CredentialFile::from_identity(self, with_secrets);
        let text = serde_json::to_string_pretty(&doc).map_err(|e| VellumError::CredentialParse {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
        fs::write(path, text).map_err(|source| VellumError::CredentialRead {
            path: path.display().to_string(),
            source,
        })
    }
}

/// On-disk credential document.
#[derive(Serialize, Deserialize)]
struct CredentialFile {
    artifact_id: Uuid,
    public_encryption_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_encryption_key: Option<String>,
    public_signing_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    private_signing_key: Option<String>,
}

impl CredentialFile {
    fn from_identity(identity: &Identity, with_secrets: bool) -> Self {
        Self {
            artifact_id: identity.artifact_id,
            public_encryption_key: hex::encode(identity.enc_public),
            private_encryption_key: identity
                .enc_secret
                .as_ref()
                .filter(|_| with_secrets)
                .map(|s| hex::encode(s.to_bytes())),
            public_signing_key: hex::encode(identity.sign_public.to_bytes()),
            private_signing_key: identity
                .sign_secret
                .as_ref()
                .filter(|_| with_secrets)
                .map(|s| hex::encode(s.to_bytes())),
        }
    }

    fn into_identity(self) -> std::result::Result<Identity, String> {
        let enc_public = decode_key32(&self.public_encryption_key, "public_encryption_key")?;
        let enc_secret = self
            .private_encryption_key
            .as_deref()
            .map(|s| decode_key32(s, "private_encryption_key").map(StaticSecret::from))
            .transpose()?;
        let sign_public_bytes = decode_key32(&self.public_signing_key, "public_signing_key")?;
        let sign_public = VerifyingKey::from_bytes(&sign_public_bytes)
            .map_err(|e| format!("public_signing_key: {e}"))?;
        let sign_secret = self
            .private_signing_key
            .as_deref()
            .map(|s| decode_key32(s, "private_signing_key").map(|b| SigningKey::from_bytes(&b)))
            .transpose()?;

        Ok(Identity {
            artifact_id: self.artifact_id,
            enc_public,
            enc_secret,
            sign_public,
            sign_secret,
        })
    }
}

fn decode_key32(hex_str: &str, field: &str) -> std::result::Result<[u8; 32], String> {
    let bytes = hex::decode(hex_str).map_err(|e| format!("{field}: {e}"))?;
    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| format!("{field}: expected 32 bytes, got {}", bytes.len()))
}

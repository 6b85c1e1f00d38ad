// Transaction certificates.
//
// A certificate is the signed unit of work submitted to the agent for
// canonization. Fixed binary layout, big-endian throughout:
//
//   version (4) || cert type (16) || artifact type (16) || txn id (16) ||
//   artifact id (16) || prev txn id (16) || signer id (16) ||
//   payload len (4) || payload || signature (64)
//
// The Ed25519 signature covers every byte before it.

use bytes::{BufMut, BytesMut};
use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};
use uuid::Uuid;

use crate::data::ZERO_ID;
use crate::error::{Result, VellumError};
use crate::identity::Identity;

/// Current certificate format version.
pub const TXN_CERT_VERSION: u32 = 0x0001_0000;

const FIXED_LEN: usize = 4 + 16 * 6 + 4;
const SIGNATURE_LEN: usize = 64;

/// Maps a signer entity id to its verification key.
pub trait SignerResolver {
    fn resolve(&self, entity_id: &Uuid) -> Option<VerifyingKey>;
}

/// Resolver that knows no signers; every verification fails with
/// [`VellumError::UnknownSigner`].
pub struct NullResolver;

impl SignerResolver for NullResolver {
    fn resolve(&self, _entity_id: &Uuid) -> Option<VerifyingKey> {
        None
    }
}

/// An identity resolves its own artifact id to its signing key.
impl SignerResolver for Identity {
    fn resolve(&self, entity_id: &Uuid) -> Option<VerifyingKey> {
        (entity_id == self.artifact_id()).then(|| *self.public_signing_key())
    }
}

/// A signed transaction certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionCert {
    pub cert_type: Uuid,
    pub artifact_type: Uuid,
    pub txn_id: Uuid,
    pub artifact_id: Uuid,
    /// Previous transaction for the artifact; zero for the first one.
    pub prev_txn_id: Uuid,
    pub signer_id: Uuid,
    pub payload: Vec<u8>,
    pub signature: [u8; SIGNATURE_LEN],
}

impl TransactionCert {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = self.signable_bytes();
        buf.extend_from_slice(&self.signature);
        buf
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FIXED_LEN + SIGNATURE_LEN {
            return Err(VellumError::CertParse("certificate truncated"));
        }
        let version = u32::from_be_bytes(bytes[..4].try_into().unwrap());
        if version != TXN_CERT_VERSION {
            return Err(VellumError::CertParse("unsupported certificate version"));
        }
        let id_at = |off: usize| Uuid::from_bytes(bytes[off..off + 16].try_into().unwrap());
        let payload_len =
            u32::from_be_bytes(bytes[FIXED_LEN - 4..FIXED_LEN].try_into().unwrap()) as usize;
        if bytes.len() != FIXED_LEN + payload_len + SIGNATURE_LEN {
            return Err(VellumError::CertParse("certificate payload length"));
        }
        let payload = bytes[FIXED_LEN..FIXED_LEN + payload_len].to_vec();
        let signature = bytes[FIXED_LEN + payload_len..].try_into().unwrap();

        Ok(Self {
            cert_type: id_at(4),
            artifact_type: id_at(20),
            txn_id: id_at(36),
            artifact_id: id_at(52),
            prev_txn_id: id_at(68),
            signer_id: id_at(84),
            payload,
            signature,
        })
    }

    /// Verify the signature against the key the resolver knows for the
    /// certificate's signer.
    pub fn verify<R: SignerResolver>(&self, resolver: &R) -> Result<()> {
        let key = resolver
            .resolve(&self.signer_id)
            .ok_or(VellumError::UnknownSigner(self.signer_id))?;
        let signature = Signature::from_bytes(&self.signature);
        key.verify(&self.signable_bytes(), &signature)
            .map_err(|_| VellumError::CertSignature)
    }

    fn signable_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(FIXED_LEN + self.payload.len());
        buf.put_u32(TXN_CERT_VERSION);
        buf.put_slice(self.cert_type.as_bytes());
        buf.put_slice(self.artifact_type.as_bytes());
        buf.put_slice(self.txn_id.as_bytes());
        buf.put_slice(self.artifact_id.as_bytes());
        buf.put_slice(self.prev_txn_id.as_bytes());
        buf.put_slice(self.signer_id.as_bytes());
        buf.put_u32(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        buf.to_vec()
    }
}

/// Builder for a signed [`TransactionCert`].
///
/// ```ignore
/// let cert = TransactionCertBuilder::new(&identity)
///     .cert_type(cert_type)
///     .artifact(artifact_type, artifact_id)
///     .txn_id(txn_id)
///     .payload(b"state change".to_vec())
///     .build()?;
/// ```
pub struct TransactionCertBuilder<'a> {
    signer: &'a Identity,
    cert_type: Option<Uuid>,
    artifact_type: Option<Uuid>,
    artifact_id: Option<Uuid>,
    txn_id: Option<Uuid>,
    prev_txn_id: Uuid,
    payload: Vec<u8>,
}

impl<'a> TransactionCertBuilder<'a> {
    /// Start building a certificate signed by `signer`, which must be a
    /// private identity.
    pub fn new(signer: &'a Identity) -> Self {
        Self {
            signer,
            cert_type: None,
            artifact_type: None,
            artifact_id: None,
            txn_id: None,
            prev_txn_id: ZERO_ID,
            payload: Vec::new(),
        }
    }

    pub fn cert_type(mut self, cert_type: Uuid) -> Self {
        self.cert_type = Some(cert_type);
        self
    }

    pub fn artifact(mut self, artifact_type: Uuid, artifact_id: Uuid) -> Self {
        self.artifact_type = Some(artifact_type);
        self.artifact_id = Some(artifact_id);
        self
    }

    pub fn txn_id(mut self, txn_id: Uuid) -> Self {
        self.txn_id = Some(txn_id);
        self
    }

    /// Link to the previous transaction for this artifact. Defaults to the
    /// zero id, marking the first transaction.
    pub fn prev_txn_id(mut self, prev_txn_id: Uuid) -> Self {
        self.prev_txn_id = prev_txn_id;
        self
    }

    pub fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    /// Consume the builder and produce a signed certificate.
    pub fn build(self) -> Result<TransactionCert> {
        let cert_type = self
            .cert_type
            .ok_or(VellumError::CertBuild("cert_type is required"))?;
        let artifact_type = self
            .artifact_type
            .ok_or(VellumError::CertBuild("artifact type is required"))?;
        let artifact_id = self
            .artifact_id
            .ok_or(VellumError::CertBuild("artifact id is required"))?;
        let txn_id = self
            .txn_id
            .ok_or(VellumError::CertBuild("txn_id is required"))?;
        let signing_key = self.signer.private_signing_key()?;

        let mut cert = TransactionCert {
            cert_type,
            artifact_type,
            txn_id,
            artifact_id,
            prev_txn_id: self.prev_txn_id,
            signer_id: *self.signer.artifact_id(),
            payload: self.payload,
            signature: [0u8; SIGNATURE_LEN],
        };
        cert.signature = signing_key.sign(&cert.signable_bytes()).to_bytes();
        Ok(cert)
    }
}

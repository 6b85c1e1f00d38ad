// X25519 key agreement and session-secret derivation.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{Result, VellumError};

/// Length of a handshake nonce in bytes.
pub const NONCE_LEN: usize = 32;

/// A single-use random buffer exchanged during the handshake.
pub type HandshakeNonce = [u8; NONCE_LEN];

/// HKDF info label binding derived secrets to this protocol version.
const SESSION_INFO: &[u8] = b"vellum agent session v1";

/// Generate a fresh random handshake nonce.
pub fn generate_nonce() -> HandshakeNonce {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// An X25519 encryption keypair identifying one protocol participant.
pub struct EncryptionKeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl EncryptionKeyPair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Reconstruct from existing secret bytes (credential files, tests).
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// The 32-byte public key.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// The 32-byte secret key, wrapped so it is wiped on drop.
    pub fn secret_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.to_bytes())
    }

    /// The raw secret, for key agreement.
    pub fn secret(&self) -> &StaticSecret {
        &self.secret
    }
}

/// Derive the 32-byte session secret shared between client and agent.
///
/// ```text
/// ikm    = X25519(own_secret, peer_public)
/// salt   = client_key_nonce || agent_key_nonce
/// secret = HKDF-SHA256-Expand(Extract(salt, ikm), "vellum agent session v1", 32)
/// ```
///
/// Both sides order the salt as (client, agent), so the client calls this
/// with its own key nonce first and the agent does the same with the
/// client's nonce first.
pub fn derive_session_secret(
    own_secret: &StaticSecret,
    peer_public: &[u8; 32],
    client_key_nonce: &HandshakeNonce,
    agent_key_nonce: &HandshakeNonce,
) -> Result<Zeroizing<[u8; 32]>> {
    let shared = own_secret.diffie_hellman(&PublicKey::from(*peer_public));

    let mut salt = [0u8; NONCE_LEN * 2];
    salt[..NONCE_LEN].copy_from_slice(client_key_nonce);
    salt[NONCE_LEN..].copy_from_slice(agent_key_nonce);

    let hk = Hkdf::<Sha256>::new(Some(&salt), shared.as_bytes());
    let mut secret = Zeroizing::new([0u8; 32]);
    hk.expand(SESSION_INFO, secret.as_mut())
        .map_err(|e| VellumError::Encryption(format!("HKDF expand: {e}")))?;

    Ok(secret)
}

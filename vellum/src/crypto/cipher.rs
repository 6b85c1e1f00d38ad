// Per-message sealing for established sessions.
//
// Every message is sealed under a one-off AES-256-GCM key and iv derived
// from the session secret and the direction counter. The counter is also
// bound into the AAD, so a sealed frame cannot be replayed at a different
// position in the stream.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Result, VellumError};

/// First counter value of the client-to-agent direction.
pub const CLIENT_IV_INITIAL: u64 = 0x0000_0000_0000_0001;

/// First counter value of the agent-to-client direction. The two directions
/// occupy disjoint counter ranges, so a per-message key can never repeat
/// across directions within one session.
pub const SERVER_IV_INITIAL: u64 = 0x8000_0000_0000_0001;

const KEY_INFO: &[u8] = b"vellum message key";
const IV_INFO: &[u8] = b"vellum message iv";

/// Seals and opens messages for one session.
pub struct MessageCipher {
    secret: Zeroizing<[u8; 32]>,
}

impl MessageCipher {
    /// Create a cipher from the session secret. Ownership of the secret
    /// moves here; it is wiped when the cipher is dropped.
    pub fn new(secret: Zeroizing<[u8; 32]>) -> Self {
        Self { secret }
    }

    /// Derive the one-off key and iv for the given counter value.
    fn derive(&self, counter: u64) -> Result<(Zeroizing<[u8; 32]>, [u8; 12])> {
        let salt = counter.to_be_bytes();
        let hk = Hkdf::<Sha256>::new(Some(&salt), self.secret.as_ref());

        let mut key = Zeroizing::new([0u8; 32]);
        hk.expand(KEY_INFO, key.as_mut())
            .map_err(|e| VellumError::Encryption(format!("HKDF expand: {e}")))?;

        let mut iv = [0u8; 12];
        hk.expand(IV_INFO, &mut iv)
            .map_err(|e| VellumError::Encryption(format!("HKDF expand: {e}")))?;

        Ok((key, iv))
    }

    /// Seal `plaintext` under the key for `counter`.
    ///
    /// Returns ciphertext || 16-byte GCM tag.
    pub fn seal(&self, counter: u64, plaintext: &[u8]) -> Result<Vec<u8>> {
        let (key, iv) = self.derive(counter)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_ref())
            .map_err(|e| VellumError::Encryption(format!("aes-gcm init: {e}")))?;
        let aad = counter.to_be_bytes();
        cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext,
                    aad: &aad,
                },
            )
            .map_err(|e| VellumError::Encryption(format!("{e}")))
    }

    /// Open a sealed message with the key for `counter`.
    pub fn open(&self, counter: u64, ciphertext: &[u8]) -> Result<Vec<u8>> {
        let (key, iv) = self.derive(counter)?;
        let cipher = Aes256Gcm::new_from_slice(key.as_ref())
            .map_err(|e| VellumError::Decryption(format!("aes-gcm init: {e}")))?;
        let aad = counter.to_be_bytes();
        cipher
            .decrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: ciphertext,
                    aad: &aad,
                },
            )
            .map_err(|e| VellumError::Decryption(format!("{e}")))
    }
}

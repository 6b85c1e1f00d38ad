// Cryptographic primitives backing the session layer: X25519 key agreement
// with HKDF secret derivation, and counter-keyed AES-256-GCM message sealing.

pub mod agreement;
pub mod cipher;

pub use agreement::{
    derive_session_secret, generate_nonce, EncryptionKeyPair, HandshakeNonce, NONCE_LEN,
};
pub use cipher::{MessageCipher, CLIENT_IV_INITIAL, SERVER_IV_INITIAL};

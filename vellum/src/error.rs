// Vellum error types

use std::io;

use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for the vellum crate.
#[derive(Debug, Error)]
pub enum VellumError {
    // ── Setup errors ────────────────────────────────────────────────────
    #[error("failed to read credential file {path}: {source}")]
    CredentialRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse credential file {path}: {detail}")]
    CredentialParse { path: String, detail: String },

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("failed to connect to agent at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    // ── Handshake errors ────────────────────────────────────────────────
    #[error("failed to send handshake request: {0}")]
    HandshakeSendFailed(#[source] io::Error),

    #[error("failed to receive handshake response: {0}")]
    HandshakeRecvFailed(#[source] io::Error),

    #[error("agent refused the handshake: status {status:#x}")]
    HandshakeRefused { status: u32 },

    #[error("agent artifact id does not match the expected identity")]
    RemoteIdentityMismatch,

    #[error("agent public encryption key does not match the expected identity")]
    RemoteKeyMismatch,

    #[error("failed to send handshake acknowledgement: {0}")]
    HandshakeAckSendFailed(#[source] io::Error),

    #[error("handshake not acknowledged: verb {verb:#x}, status {status:#x}")]
    HandshakeNotAcknowledged { verb: u32, status: u32 },

    // ── Exchange errors ─────────────────────────────────────────────────
    #[error("failed to send request: {0}")]
    SendFailed(#[source] io::Error),

    #[error("failed to receive response: {0}")]
    RecvFailed(#[source] io::Error),

    #[error("unexpected response verb: expected {expected:#x}, got {actual:#x}")]
    UnexpectedVerb { expected: u32, actual: u32 },

    #[error("agent reported failure status {status:#x}")]
    RemoteReportedFailure { status: u32 },

    #[error("correlation mismatch: sent offset {sent:#x}, received {received:#x}")]
    CorrelationMismatch { sent: u32, received: u32 },

    #[error("session is desynchronized; no further exchanges are possible")]
    SessionDesynchronized,

    // ── Wire and crypto errors ──────────────────────────────────────────
    #[error("frame of {size} bytes exceeds the {max} byte limit")]
    FrameOversized { size: u32, max: u32 },

    #[error("malformed message: {0}")]
    Malformed(&'static str),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("decryption failed: {0}")]
    Decryption(String),

    // ── Certificate errors ──────────────────────────────────────────────
    #[error("certificate build error: {0}")]
    CertBuild(&'static str),

    #[error("certificate parse error: {0}")]
    CertParse(&'static str),

    #[error("certificate signature verification failed")]
    CertSignature,

    #[error("no signing key known for entity {0}")]
    UnknownSigner(Uuid),
}

/// Crate-level result alias.
pub type Result<T> = std::result::Result<T, VellumError>;

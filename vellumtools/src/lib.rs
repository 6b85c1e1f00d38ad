// Shared plumbing for the scenario binaries: logging, environment
// configuration, credential loading, and session setup.

use std::env;
use std::net::TcpStream;
use std::path::PathBuf;

use tracing::{info, warn};
use uuid::Uuid;

use vellum::identity::Identity;
use vellum::{establish, Session, VellumError};

/// Correlation token the scenarios use for ordinary exchanges.
pub const EXPECTED_OFFSET: u32 = 0x1337;

/// Correlation token the scenarios use for status probes.
pub const STATUS_OFFSET: u32 = 0x3133;

const DEFAULT_AGENT_ADDR: &str = "127.0.0.1:4931";
const DEFAULT_CLIENT_CRED: &str = "client.priv";
const DEFAULT_AGENT_CRED: &str = "agent.pub";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("protocol error: {0}")]
    Protocol(#[from] VellumError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad environment value for {name}: {detail}")]
    Env { name: &'static str, detail: String },

    #[error("scenario check failed: {0}")]
    CheckFailed(String),
}

pub type Result<T> = std::result::Result<T, ToolError>;

/// Install the fmt subscriber, filtered by `RUST_LOG`.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Agent address from `VELLUM_AGENT_ADDR`, default `127.0.0.1:4931`.
pub fn agent_addr() -> String {
    env::var("VELLUM_AGENT_ADDR").unwrap_or_else(|_| DEFAULT_AGENT_ADDR.to_string())
}

/// Credential paths: argv first, then `VELLUM_CLIENT_CRED` /
/// `VELLUM_AGENT_CRED`, then the conventional file names.
pub fn credential_paths() -> (PathBuf, PathBuf) {
    let mut args = env::args().skip(1);
    let client = args
        .next()
        .or_else(|| env::var("VELLUM_CLIENT_CRED").ok())
        .unwrap_or_else(|| DEFAULT_CLIENT_CRED.to_string());
    let agent = args
        .next()
        .or_else(|| env::var("VELLUM_AGENT_CRED").ok())
        .unwrap_or_else(|| DEFAULT_AGENT_CRED.to_string());
    (PathBuf::from(client), PathBuf::from(agent))
}

/// Sentinel artifact id: third argv entry, or `VELLUM_SENTINEL_ID`.
pub fn sentinel_id_from_env() -> Result<Uuid> {
    let value = env::args()
        .nth(3)
        .or_else(|| env::var("VELLUM_SENTINEL_ID").ok())
        .ok_or(ToolError::Env {
            name: "VELLUM_SENTINEL_ID",
            detail: "no sentinel id given".to_string(),
        })?;
    value.parse().map_err(|_| ToolError::Env {
        name: "VELLUM_SENTINEL_ID",
        detail: format!("expected a UUID, got {value:?}"),
    })
}

/// Ping payload size from `PING_CLIENT_PAYLOAD_SIZE`. Unset, unparseable,
/// and zero values all fall back to 1.
pub fn ping_payload_size() -> usize {
    match env::var("PING_CLIENT_PAYLOAD_SIZE") {
        Ok(value) => match value.parse() {
            Ok(size) if size > 0 => size,
            _ => {
                warn!(value = %value, "unusable PING_CLIENT_PAYLOAD_SIZE, using 1");
                1
            }
        },
        Err(_) => 1,
    }
}

/// Load credentials, connect, and run the handshake. Returns the session
/// along with the client identity for scenarios that need to sign.
pub fn connect() -> Result<(Session<TcpStream>, Identity)> {
    let (client_path, agent_path) = credential_paths();
    let client = Identity::from_private_file(&client_path)?;
    let agent = Identity::from_public_file(&agent_path)?;

    let addr = agent_addr();
    info!(%addr, client_id = %client.artifact_id(), "connecting to agent");
    let stream = TcpStream::connect(&addr).map_err(|source| {
        ToolError::Protocol(VellumError::Connect {
            addr: addr.clone(),
            source,
        })
    })?;
    let session = establish(stream, &client, &agent)?;
    info!("session established");
    Ok((session, client))
}

/// Routed verb and fixed certificate ids shared with the agent-side test
/// fixtures.
pub mod fixtures {
    use super::Uuid;

    /// Routed verb a ping sentinel answers.
    pub const PING_VERB: Uuid = Uuid::from_bytes([
        0x49, 0x9e, 0x88, 0xc8, 0x04, 0x2c, 0x46, 0xf6, 0x8a, 0x9b, 0xe4, 0x77, 0x92, 0x09,
        0xf4, 0x0b,
    ]);

    /// Certificate type of a test transaction.
    pub const TEST_CERT_TYPE: Uuid = Uuid::from_bytes([
        0x76, 0x13, 0x1b, 0x90, 0xc1, 0x0f, 0x47, 0xfb, 0xab, 0x83, 0x86, 0x0d, 0x87, 0xf1,
        0x3c, 0x08,
    ]);

    /// Artifact type of a test transaction.
    pub const TEST_ARTIFACT_TYPE: Uuid = Uuid::from_bytes([
        0x67, 0x7f, 0x58, 0xf7, 0xb0, 0xa8, 0x45, 0x07, 0x9e, 0xff, 0x6b, 0x18, 0x1d, 0xb7,
        0x06, 0xb7,
    ]);
}

// Session establishment.
//
// Four steps over a fresh transport: the client sends its id and two
// nonces, the agent answers with its own id, public key, and nonces, both
// sides derive the session secret, and the client proves the derivation by
// returning the agent's challenge nonce sealed under that secret. The
// client verifies the agent against a local credential before deriving
// anything, so a transport answered by the wrong party fails closed.

pub mod messages;

mod client;

pub use client::establish;
pub use messages::{HandshakeAck, HandshakeRequest, HandshakeResponse};

// Vellum — client-side secure session driver for a blockchain agent.
//
// Crate root: module declarations and public re-exports.

pub mod api;
pub mod crypto;
pub mod data;
pub mod error;
pub mod extend;
pub mod handshake;
pub mod identity;
pub mod session;
pub mod txncert;
pub mod verb;
pub mod wire;

mod exchange;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export key types at crate root for convenience.
pub use error::{Result, VellumError};
pub use handshake::establish;
pub use identity::Identity;
pub use session::Session;
pub use verb::Verb;

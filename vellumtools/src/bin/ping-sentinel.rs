// Run a ping sentinel: enable the extended API and echo routed pings
// until the connection drops.

use tracing::{error, info};
use uuid::Uuid;
use vellum::extend::{serve, SentinelService, EXTENDED_STATUS_UNKNOWN_VERB};
use vellum::VellumError;
use vellumtools::fixtures::PING_VERB;
use vellumtools::EXPECTED_OFFSET;

struct PingEcho;

impl SentinelService for PingEcho {
    fn handle(&mut self, verb: &Uuid, payload: &[u8]) -> Result<Vec<u8>, u32> {
        if *verb != PING_VERB {
            return Err(EXTENDED_STATUS_UNKNOWN_VERB);
        }
        Ok(payload.to_vec())
    }
}

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("sentinel failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let (mut session, client) = vellumtools::connect()?;
    info!(sentinel_id = %client.artifact_id(), "serving pings");

    match serve(&mut session, EXPECTED_OFFSET, &mut PingEcho) {
        // A dropped connection is the normal way a sentinel retires.
        VellumError::RecvFailed(_) => {
            info!("connection closed, sentinel done");
            Ok(())
        }
        other => Err(other.into()),
    }
}

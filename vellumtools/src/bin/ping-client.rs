// Send one routed ping to a sentinel and verify the echo.
//
// The sentinel's artifact id comes from the third argv entry or
// `VELLUM_SENTINEL_ID`.

use tracing::{error, info};
use vellumtools::fixtures::PING_VERB;
use vellumtools::{sentinel_id_from_env, ToolError, EXPECTED_OFFSET};

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("ping failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let sentinel_id = sentinel_id_from_env()?;
    let payload = vec![0x50u8; vellumtools::ping_payload_size()];
    let (mut session, _client) = vellumtools::connect()?;

    let reply = session.send_extended(&sentinel_id, &PING_VERB, EXPECTED_OFFSET, &payload)?;
    if reply != payload {
        return Err(ToolError::CheckFailed(format!(
            "echo mismatch: sent {} bytes, got {} back",
            payload.len(),
            reply.len()
        )));
    }

    session.close(EXPECTED_OFFSET)?;
    info!(%sentinel_id, bytes = payload.len(), "ping echoed");
    Ok(())
}

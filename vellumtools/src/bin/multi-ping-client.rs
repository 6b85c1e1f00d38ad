// Routed-ping load scenario: ten thousand echo round trips over one
// session, payload size taken from `PING_CLIENT_PAYLOAD_SIZE`.

use std::time::Instant;

use tracing::{error, info};
use vellumtools::fixtures::PING_VERB;
use vellumtools::{sentinel_id_from_env, ToolError, EXPECTED_OFFSET};

const ITERATIONS: u32 = 10_000;

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("multi-ping failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let sentinel_id = sentinel_id_from_env()?;
    let payload = vec![0x50u8; vellumtools::ping_payload_size()];
    let (mut session, _client) = vellumtools::connect()?;

    // Fresh correlation token per ping so every echo check is meaningful.
    let start = Instant::now();
    for i in 0..ITERATIONS {
        let token = EXPECTED_OFFSET.wrapping_add(i);
        let reply = session.send_extended(&sentinel_id, &PING_VERB, token, &payload)?;
        if reply != payload {
            return Err(ToolError::CheckFailed(format!(
                "echo mismatch on iteration {i}"
            )));
        }
    }
    let elapsed = start.elapsed();

    session.close(EXPECTED_OFFSET)?;
    info!(
        iterations = ITERATIONS,
        bytes = payload.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "all pings echoed"
    );
    Ok(())
}

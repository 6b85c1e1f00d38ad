// Probe agent liveness, then close.

use tracing::{error, info};
use vellumtools::{EXPECTED_OFFSET, STATUS_OFFSET};

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("status check failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let (mut session, _client) = vellumtools::connect()?;
    session.status(STATUS_OFFSET)?;
    info!("agent is healthy");
    session.close(EXPECTED_OFFSET)?;
    Ok(())
}

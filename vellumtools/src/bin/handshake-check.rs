// Establish a session and close it cleanly. Exits zero only if the full
// handshake and the close exchange both succeed.

use tracing::{error, info};
use vellumtools::EXPECTED_OFFSET;

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("handshake check failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let (mut session, _client) = vellumtools::connect()?;
    session.close(EXPECTED_OFFSET)?;
    info!("handshake check passed");
    Ok(())
}

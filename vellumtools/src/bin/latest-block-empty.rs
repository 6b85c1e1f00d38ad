// Against an empty chain, the latest block id must be the root block.

use tracing::{error, info};
use vellum::data::ROOT_BLOCK_ID;
use vellumtools::{ToolError, EXPECTED_OFFSET};

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("latest-block check failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let (mut session, _client) = vellumtools::connect()?;

    let latest = session.latest_block_id(EXPECTED_OFFSET)?;
    if latest != ROOT_BLOCK_ID {
        return Err(ToolError::CheckFailed(format!(
            "expected root block {ROOT_BLOCK_ID}, agent reported {latest}"
        )));
    }

    session.close(EXPECTED_OFFSET)?;
    info!(%latest, "empty chain reports the root block");
    Ok(())
}

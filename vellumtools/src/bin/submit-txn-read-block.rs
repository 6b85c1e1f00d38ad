// Submit one signed transaction, wait for canonization, and verify the
// resulting block and transaction linkage.

use std::thread;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;
use vellum::data::{FULL_ID, ROOT_BLOCK_ID, ZERO_ID};
use vellum::txncert::TransactionCertBuilder;
use vellumtools::fixtures::{TEST_ARTIFACT_TYPE, TEST_CERT_TYPE};
use vellumtools::{ToolError, EXPECTED_OFFSET};

/// How long the agent gets to canonize the submitted transaction.
const CANONIZATION_WAIT: Duration = Duration::from_secs(5);

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("submit-and-read check failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> vellumtools::Result<()> {
    let (mut session, client) = vellumtools::connect()?;

    let txn_id = Uuid::new_v4();
    let artifact_id = Uuid::new_v4();
    let cert = TransactionCertBuilder::new(&client)
        .cert_type(TEST_CERT_TYPE)
        .artifact(TEST_ARTIFACT_TYPE, artifact_id)
        .txn_id(txn_id)
        .payload(b"an asset moves".to_vec())
        .build()?;

    session.submit_transaction(EXPECTED_OFFSET, &txn_id, &artifact_id, &cert.to_bytes())?;
    info!(%txn_id, %artifact_id, "transaction submitted, waiting for canonization");
    thread::sleep(CANONIZATION_WAIT);

    let block_id = session.latest_block_id(EXPECTED_OFFSET)?;
    if block_id == ROOT_BLOCK_ID {
        return Err(ToolError::CheckFailed(
            "transaction was not canonized: chain still at the root block".into(),
        ));
    }

    let block = session.block_by_id(EXPECTED_OFFSET, &block_id)?;
    if block.first_txn_id != txn_id {
        return Err(ToolError::CheckFailed(format!(
            "latest block starts with {}, expected {txn_id}",
            block.first_txn_id
        )));
    }

    let txn = session.transaction_by_id(EXPECTED_OFFSET, &txn_id)?;
    if txn.prev_txn_id != ZERO_ID || txn.next_txn_id != FULL_ID {
        return Err(ToolError::CheckFailed(format!(
            "unexpected linkage: prev {} next {}",
            txn.prev_txn_id, txn.next_txn_id
        )));
    }
    if txn.block_id != block_id {
        return Err(ToolError::CheckFailed(format!(
            "transaction reports block {}, latest is {block_id}",
            txn.block_id
        )));
    }

    session.close(EXPECTED_OFFSET)?;
    info!(%block_id, height = block.height, "transaction canonized and verified");
    Ok(())
}

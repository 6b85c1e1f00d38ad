// Submit two transactions against one artifact and verify the whole
// history: transaction linkage, artifact first/last ids, and block
// addressing by height.

use std::thread;
use std::time::Duration;

use tracing::{error, info};
use uuid::Uuid;
use vellum::data::{FULL_ID, ZERO_ID};
use vellum::txncert::TransactionCertBuilder;
use vellumtools::fixtures::{TEST_ARTIFACT_TYPE, TEST_CERT_TYPE};
use vellumtools::{ToolError, EXPECTED_OFFSET};

const CANONIZATION_WAIT: Duration = Duration::from_secs(5);

fn main() {
    vellumtools::init_logging();
    if let Err(e) = run() {
        error!("multi-transaction check failed: {e}");
        std::process::exit(1);
    }
}

fn check(label: &str, actual: Uuid, expected: Uuid) -> vellumtools::Result<()> {
    if actual != expected {
        return Err(ToolError::CheckFailed(format!(
            "{label}: got {actual}, expected {expected}"
        )));
    }
    Ok(())
}

fn run() -> vellumtools::Result<()> {
    let (mut session, client) = vellumtools::connect()?;

    let artifact_id = Uuid::new_v4();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    let first_cert = TransactionCertBuilder::new(&client)
        .cert_type(TEST_CERT_TYPE)
        .artifact(TEST_ARTIFACT_TYPE, artifact_id)
        .txn_id(first)
        .payload(b"asset created".to_vec())
        .build()?;
    session.submit_transaction(EXPECTED_OFFSET, &first, &artifact_id, &first_cert.to_bytes())?;

    let second_cert = TransactionCertBuilder::new(&client)
        .cert_type(TEST_CERT_TYPE)
        .artifact(TEST_ARTIFACT_TYPE, artifact_id)
        .txn_id(second)
        .prev_txn_id(first)
        .payload(b"asset updated".to_vec())
        .build()?;
    session.submit_transaction(EXPECTED_OFFSET, &second, &artifact_id, &second_cert.to_bytes())?;

    info!(%artifact_id, "two transactions submitted, waiting for canonization");
    thread::sleep(CANONIZATION_WAIT);

    check(
        "first txn previous",
        session.prev_transaction_id(EXPECTED_OFFSET, &first)?,
        ZERO_ID,
    )?;
    check(
        "first txn next",
        session.next_transaction_id(EXPECTED_OFFSET, &first)?,
        second,
    )?;
    check(
        "second txn previous",
        session.prev_transaction_id(EXPECTED_OFFSET, &second)?,
        first,
    )?;
    check(
        "second txn next",
        session.next_transaction_id(EXPECTED_OFFSET, &second)?,
        FULL_ID,
    )?;
    check(
        "artifact first txn",
        session.artifact_first_txn_id(EXPECTED_OFFSET, &artifact_id)?,
        first,
    )?;
    check(
        "artifact last txn",
        session.artifact_last_txn_id(EXPECTED_OFFSET, &artifact_id)?,
        second,
    )?;

    // The two transactions canonized into the two most recent blocks.
    let latest = session.latest_block_id(EXPECTED_OFFSET)?;
    let second_block = session.transaction_block_id(EXPECTED_OFFSET, &second)?;
    check("latest block", latest, second_block)?;

    let first_block = session.transaction_block_id(EXPECTED_OFFSET, &first)?;
    check(
        "block preceding latest",
        session.prev_block_id(EXPECTED_OFFSET, &latest)?,
        first_block,
    )?;

    let block = session.block_by_id(EXPECTED_OFFSET, &latest)?;
    check(
        "block at latest height",
        session.block_id_by_height(EXPECTED_OFFSET, block.height)?,
        latest,
    )?;

    session.close(EXPECTED_OFFSET)?;
    info!("transaction history verified");
    Ok(())
}

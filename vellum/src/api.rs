// Verb callers: one method per protocol operation.
//
// Every method is a single [`Session::exchange`] plus the payload codec
// for that verb. The caller picks the correlation token per call; the
// exchange checks that the response echoes it.

use std::io::{Read, Write};

use uuid::Uuid;

use crate::data::{
    decode_id_payload, encode_height_payload, encode_id_payload, encode_submit_payload,
    BlockRecord, TransactionRecord,
};
use crate::error::Result;
use crate::session::Session;
use crate::verb::Verb;

impl<S: Read + Write> Session<S> {
    /// Id of the latest canonized block. An empty chain reports the root
    /// block.
    pub fn latest_block_id(&mut self, offset: u32) -> Result<Uuid> {
        let body = self.exchange(Verb::LatestBlockIdGet, offset, &[])?;
        decode_id_payload(&body)
    }

    /// Fetch a block record by id.
    pub fn block_by_id(&mut self, offset: u32, block_id: &Uuid) -> Result<BlockRecord> {
        let body = self.exchange(Verb::BlockByIdGet, offset, &encode_id_payload(block_id))?;
        BlockRecord::decode(&body)
    }

    /// Id of the block following `block_id` in the chain.
    pub fn next_block_id(&mut self, offset: u32, block_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(Verb::BlockIdGetNext, offset, &encode_id_payload(block_id))?;
        decode_id_payload(&body)
    }

    /// Id of the block preceding `block_id` in the chain.
    pub fn prev_block_id(&mut self, offset: u32, block_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(Verb::BlockIdGetPrev, offset, &encode_id_payload(block_id))?;
        decode_id_payload(&body)
    }

    /// Id of the block at the given height.
    pub fn block_id_by_height(&mut self, offset: u32, height: u64) -> Result<Uuid> {
        let body = self.exchange(
            Verb::BlockIdByHeightGet,
            offset,
            &encode_height_payload(height),
        )?;
        decode_id_payload(&body)
    }

    /// Submit a transaction certificate for canonization.
    pub fn submit_transaction(
        &mut self,
        offset: u32,
        txn_id: &Uuid,
        artifact_id: &Uuid,
        cert: &[u8],
    ) -> Result<()> {
        self.exchange(
            Verb::TransactionSubmit,
            offset,
            &encode_submit_payload(txn_id, artifact_id, cert),
        )?;
        Ok(())
    }

    /// Fetch a transaction record by id.
    pub fn transaction_by_id(&mut self, offset: u32, txn_id: &Uuid) -> Result<TransactionRecord> {
        let body = self.exchange(Verb::TransactionByIdGet, offset, &encode_id_payload(txn_id))?;
        TransactionRecord::decode(&body)
    }

    /// Id of the transaction following `txn_id` for the same artifact.
    pub fn next_transaction_id(&mut self, offset: u32, txn_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(
            Verb::TransactionIdGetNext,
            offset,
            &encode_id_payload(txn_id),
        )?;
        decode_id_payload(&body)
    }

    /// Id of the transaction preceding `txn_id` for the same artifact.
    pub fn prev_transaction_id(&mut self, offset: u32, txn_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(
            Verb::TransactionIdGetPrev,
            offset,
            &encode_id_payload(txn_id),
        )?;
        decode_id_payload(&body)
    }

    /// Id of the block containing `txn_id`.
    pub fn transaction_block_id(&mut self, offset: u32, txn_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(
            Verb::TransactionIdGetBlockId,
            offset,
            &encode_id_payload(txn_id),
        )?;
        decode_id_payload(&body)
    }

    /// First transaction recorded for an artifact.
    pub fn artifact_first_txn_id(&mut self, offset: u32, artifact_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(
            Verb::ArtifactFirstTxnIdGet,
            offset,
            &encode_id_payload(artifact_id),
        )?;
        decode_id_payload(&body)
    }

    /// Latest transaction recorded for an artifact.
    pub fn artifact_last_txn_id(&mut self, offset: u32, artifact_id: &Uuid) -> Result<Uuid> {
        let body = self.exchange(
            Verb::ArtifactLastTxnIdGet,
            offset,
            &encode_id_payload(artifact_id),
        )?;
        decode_id_payload(&body)
    }

    /// Liveness probe. Succeeds with an empty payload when the agent is
    /// healthy.
    pub fn status(&mut self, offset: u32) -> Result<()> {
        self.exchange(Verb::StatusGet, offset, &[])?;
        Ok(())
    }

    /// Ask the agent to close the connection cleanly.
    pub fn close(&mut self, offset: u32) -> Result<()> {
        self.exchange(Verb::ConnectionClose, offset, &[])?;
        Ok(())
    }
}

// Well-known identifiers and payload codecs for the chain-query verbs.
//
// Payload layouts (all multi-byte integers big-endian):
//   id query/answer:       [id:16B]
//   height query:          [height:8B]
//   transaction submit:    [txn_id:16B][artifact_id:16B][cert...]
//   block record:          [block_id:16B][prev:16B][next:16B]
//                          [first_txn_id:16B][height:8B][cert...]
//   transaction record:    [txn_id:16B][prev:16B][next:16B]
//                          [artifact_id:16B][block_id:16B][cert...]

use bytes::{Buf, BufMut, BytesMut};
use uuid::Uuid;

use crate::error::{Result, VellumError};

/// The all-zero id: "no previous" sentinel value.
pub const ZERO_ID: Uuid = Uuid::nil();

/// The all-ones id: "no next yet" sentinel value.
pub const FULL_ID: Uuid = Uuid::max();

/// Id of the chain's genesis block.
pub const ROOT_BLOCK_ID: Uuid = Uuid::from_bytes([
    0xa7, 0x31, 0xae, 0x4e, 0x2f, 0x9f, 0x45, 0xb6, 0x8c, 0x0e, 0x7f, 0x26, 0x99, 0x17, 0x6f,
    0x3b,
]);

fn get_uuid(buf: &mut &[u8]) -> Uuid {
    let mut bytes = [0u8; 16];
    buf.copy_to_slice(&mut bytes);
    Uuid::from_bytes(bytes)
}

/// Encode a 16-byte id payload.
pub fn encode_id_payload(id: &Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Decode a payload that holds exactly one id.
pub fn decode_id_payload(payload: &[u8]) -> Result<Uuid> {
    if payload.len() != 16 {
        return Err(VellumError::Malformed("expected a 16 byte id payload"));
    }
    let mut buf = payload;
    Ok(get_uuid(&mut buf))
}

/// Encode a block-height query payload.
pub fn encode_height_payload(height: u64) -> Vec<u8> {
    height.to_be_bytes().to_vec()
}

/// Encode a transaction-submit payload.
pub fn encode_submit_payload(txn_id: &Uuid, artifact_id: &Uuid, cert: &[u8]) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(32 + cert.len());
    buf.put_slice(txn_id.as_bytes());
    buf.put_slice(artifact_id.as_bytes());
    buf.put_slice(cert);
    buf.to_vec()
}

/// Decode a transaction-submit payload (agent side of the codec; kept with
/// its encoder so the layouts cannot drift apart).
pub fn decode_submit_payload(payload: &[u8]) -> Result<(Uuid, Uuid, Vec<u8>)> {
    if payload.len() < 32 {
        return Err(VellumError::Malformed("submit payload truncated"));
    }
    let mut buf = payload;
    let txn_id = get_uuid(&mut buf);
    let artifact_id = get_uuid(&mut buf);
    Ok((txn_id, artifact_id, buf.to_vec()))
}

/// A decoded block query answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub block_id: Uuid,
    pub prev_block_id: Uuid,
    /// [`FULL_ID`] while no successor block exists.
    pub next_block_id: Uuid,
    pub first_txn_id: Uuid,
    pub height: u64,
    pub cert: Vec<u8>,
}

impl BlockRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(72 + self.cert.len());
        buf.put_slice(self.block_id.as_bytes());
        buf.put_slice(self.prev_block_id.as_bytes());
        buf.put_slice(self.next_block_id.as_bytes());
        buf.put_slice(self.first_txn_id.as_bytes());
        buf.put_u64(self.height);
        buf.put_slice(&self.cert);
        buf.to_vec()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < 72 {
            return Err(VellumError::Malformed("block record truncated"));
        }
        let mut buf = payload;
        Ok(Self {
            block_id: get_uuid(&mut buf),
            prev_block_id: get_uuid(&mut buf),
            next_block_id: get_uuid(&mut buf),
            first_txn_id: get_uuid(&mut buf),
            height: buf.get_u64(),
            cert: buf.to_vec(),
        })
    }
}

/// A decoded transaction query answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub txn_id: Uuid,
    /// [`ZERO_ID`] for an artifact's first transaction.
    pub prev_txn_id: Uuid,
    /// [`FULL_ID`] while no later transaction exists.
    pub next_txn_id: Uuid,
    pub artifact_id: Uuid,
    pub block_id: Uuid,
    pub cert: Vec<u8>,
}

impl TransactionRecord {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(80 + self.cert.len());
        buf.put_slice(self.txn_id.as_bytes());
        buf.put_slice(self.prev_txn_id.as_bytes());
        buf.put_slice(self.next_txn_id.as_bytes());
        buf.put_slice(self.artifact_id.as_bytes());
        buf.put_slice(self.block_id.as_bytes());
        buf.put_slice(&self.cert);
        buf.to_vec()
    }

    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < 80 {
            return Err(VellumError::Malformed("transaction record truncated"));
        }
        let mut buf = payload;
        Ok(Self {
            txn_id: get_uuid(&mut buf),
            prev_txn_id: get_uuid(&mut buf),
            next_txn_id: get_uuid(&mut buf),
            artifact_id: get_uuid(&mut buf),
            block_id: get_uuid(&mut buf),
            cert: buf.to_vec(),
        })
    }
}

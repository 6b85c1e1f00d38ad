// Protocol verbs: the fixed operation code table shared with the agent.
//
// Verb ids are not negotiated; client and agent must agree on this table
// out of band. 0x00-0x0F are the session and chain-query operations,
// 0x30-0x33 the extended-API sub-protocol.

use crate::error::VellumError;

/// A logical operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Verb {
    HandshakeRequest = 0x0000_0000,
    HandshakeAcknowledge = 0x0000_0001,
    LatestBlockIdGet = 0x0000_0002,
    BlockByIdGet = 0x0000_0003,
    BlockIdGetNext = 0x0000_0004,
    BlockIdGetPrev = 0x0000_0005,
    TransactionSubmit = 0x0000_0006,
    TransactionByIdGet = 0x0000_0007,
    TransactionIdGetNext = 0x0000_0008,
    TransactionIdGetPrev = 0x0000_0009,
    TransactionIdGetBlockId = 0x0000_000A,
    ArtifactFirstTxnIdGet = 0x0000_000B,
    ArtifactLastTxnIdGet = 0x0000_000C,
    BlockIdByHeightGet = 0x0000_000D,
    StatusGet = 0x0000_000E,
    ConnectionClose = 0x0000_000F,
    ExtendedApiEnable = 0x0000_0030,
    ExtendedApiSend = 0x0000_0031,
    ExtendedApiClientRequest = 0x0000_0032,
    ExtendedApiResponse = 0x0000_0033,
}

impl Verb {
    /// Wire value of this verb.
    pub fn wire_id(self) -> u32 {
        self as u32
    }

    /// The verb expected on the response to a request with this verb.
    ///
    /// The mapping is fixed per verb. An extended-API send is answered
    /// with the extended-API response verb; every other operation is
    /// answered with its own verb echoed back.
    pub fn response_verb(self) -> Verb {
        match self {
            Verb::ExtendedApiSend => Verb::ExtendedApiResponse,
            other => other,
        }
    }
}

impl TryFrom<u32> for Verb {
    type Error = VellumError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0x0000_0000 => Ok(Verb::HandshakeRequest),
            0x0000_0001 => Ok(Verb::HandshakeAcknowledge),
            0x0000_0002 => Ok(Verb::LatestBlockIdGet),
            0x0000_0003 => Ok(Verb::BlockByIdGet),
            0x0000_0004 => Ok(Verb::BlockIdGetNext),
            0x0000_0005 => Ok(Verb::BlockIdGetPrev),
            0x0000_0006 => Ok(Verb::TransactionSubmit),
            0x0000_0007 => Ok(Verb::TransactionByIdGet),
            0x0000_0008 => Ok(Verb::TransactionIdGetNext),
            0x0000_0009 => Ok(Verb::TransactionIdGetPrev),
            0x0000_000A => Ok(Verb::TransactionIdGetBlockId),
            0x0000_000B => Ok(Verb::ArtifactFirstTxnIdGet),
            0x0000_000C => Ok(Verb::ArtifactLastTxnIdGet),
            0x0000_000D => Ok(Verb::BlockIdByHeightGet),
            0x0000_000E => Ok(Verb::StatusGet),
            0x0000_000F => Ok(Verb::ConnectionClose),
            0x0000_0030 => Ok(Verb::ExtendedApiEnable),
            0x0000_0031 => Ok(Verb::ExtendedApiSend),
            0x0000_0032 => Ok(Verb::ExtendedApiClientRequest),
            0x0000_0033 => Ok(Verb::ExtendedApiResponse),
            _ => Err(VellumError::Malformed("unknown verb id")),
        }
    }
}

// Request and response header codecs.
//
// Requests carry [verb:4B][offset:4B]; responses carry
// [verb:4B][offset:4B][status:4B]. All fields big-endian. The offset is the
// caller-chosen correlation token echoed by the matching response.

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, VellumError};

/// Status code reported by the agent for a successful operation.
pub const STATUS_SUCCESS: u32 = 0;

pub const REQUEST_HEADER_LEN: usize = 8;
pub const RESPONSE_HEADER_LEN: usize = 12;

/// Header of a client-to-agent request message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    pub verb: u32,
    pub offset: u32,
}

impl RequestHeader {
    /// Encode the header followed by `payload` into one message body.
    pub fn encode_with_payload(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(REQUEST_HEADER_LEN + payload.len());
        buf.put_u32(self.verb);
        buf.put_u32(self.offset);
        buf.put_slice(payload);
        buf.to_vec()
    }

    /// Decode a header from a message body, returning it and the payload.
    pub fn decode(body: &[u8]) -> Result<(Self, &[u8])> {
        if body.len() < REQUEST_HEADER_LEN {
            return Err(VellumError::Malformed("request header truncated"));
        }
        let mut hdr = &body[..REQUEST_HEADER_LEN];
        let verb = hdr.get_u32();
        let offset = hdr.get_u32();
        Ok((Self { verb, offset }, &body[REQUEST_HEADER_LEN..]))
    }
}

/// Header of an agent-to-client response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub verb: u32,
    pub offset: u32,
    pub status: u32,
}

impl ResponseHeader {
    pub fn encode_with_payload(&self, payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(RESPONSE_HEADER_LEN + payload.len());
        buf.put_u32(self.verb);
        buf.put_u32(self.offset);
        buf.put_u32(self.status);
        buf.put_slice(payload);
        buf.to_vec()
    }

    pub fn decode(body: &[u8]) -> Result<(Self, &[u8])> {
        if body.len() < RESPONSE_HEADER_LEN {
            return Err(VellumError::Malformed("response header truncated"));
        }
        let mut hdr = &body[..RESPONSE_HEADER_LEN];
        let verb = hdr.get_u32();
        let offset = hdr.get_u32();
        let status = hdr.get_u32();
        Ok((
            Self {
                verb,
                offset,
                status,
            },
            &body[RESPONSE_HEADER_LEN..],
        ))
    }
}

// Handshake message codecs.
//
// The request and response travel as plaintext frames; only the final
// acknowledgement is sealed under the freshly derived session secret.

use bytes::{BufMut, BytesMut};
use uuid::Uuid;

use crate::crypto::{HandshakeNonce, NONCE_LEN};
use crate::error::{Result, VellumError};
use crate::verb::Verb;
use crate::wire::{RequestHeader, ResponseHeader, STATUS_SUCCESS};

/// First handshake message, client to agent.
///
/// Payload layout: client id (16) || key nonce (32) || challenge nonce (32).
#[derive(Debug, Clone)]
pub struct HandshakeRequest {
    pub client_id: Uuid,
    pub key_nonce: HandshakeNonce,
    pub challenge_nonce: HandshakeNonce,
}

impl HandshakeRequest {
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = BytesMut::with_capacity(16 + NONCE_LEN * 2);
        payload.put_slice(self.client_id.as_bytes());
        payload.put_slice(&self.key_nonce);
        payload.put_slice(&self.challenge_nonce);
        RequestHeader {
            verb: Verb::HandshakeRequest.wire_id(),
            offset: 0,
        }
        .encode_with_payload(&payload)
    }

    pub fn decode(body: &[u8]) -> Result<Self> {
        let (header, payload) = RequestHeader::decode(body)?;
        if header.verb != Verb::HandshakeRequest.wire_id() {
            return Err(VellumError::Malformed("unexpected handshake request verb"));
        }
        if payload.len() != 16 + NONCE_LEN * 2 {
            return Err(VellumError::Malformed("handshake request payload length"));
        }
        let client_id = Uuid::from_slice(&payload[..16])
            .map_err(|_| VellumError::Malformed("handshake request client id"))?;
        let mut key_nonce = [0u8; NONCE_LEN];
        key_nonce.copy_from_slice(&payload[16..16 + NONCE_LEN]);
        let mut challenge_nonce = [0u8; NONCE_LEN];
        challenge_nonce.copy_from_slice(&payload[16 + NONCE_LEN..]);
        Ok(Self {
            client_id,
            key_nonce,
            challenge_nonce,
        })
    }
}

/// Second handshake message, agent to client.
///
/// Payload layout: agent id (16) || key length (2) || public key ||
/// key nonce (32) || challenge nonce (32). A refusal carries a nonzero
/// status and no payload.
#[derive(Debug, Clone)]
pub struct HandshakeResponse {
    pub status: u32,
    pub agent_id: Uuid,
    pub agent_public_key: Vec<u8>,
    pub key_nonce: HandshakeNonce,
    pub challenge_nonce: HandshakeNonce,
}

impl HandshakeResponse {
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = BytesMut::new();
        if self.status == STATUS_SUCCESS {
            payload.put_slice(self.agent_id.as_bytes());
            payload.put_u16(self.agent_public_key.len() as u16);
            payload.put_slice(&self.agent_public_key);
            payload.put_slice(&self.key_nonce);
            payload.put_slice(&self.challenge_nonce);
        }
        ResponseHeader {
            verb: Verb::HandshakeRequest.wire_id(),
            offset: 0,
            status: self.status,
        }
        .encode_with_payload(&payload)
    }

    pub fn decode(body: &[u8]) -> Result<Self> {
        let (header, payload) = ResponseHeader::decode(body)?;
        if header.verb != Verb::HandshakeRequest.wire_id() {
            return Err(VellumError::Malformed("unexpected handshake response verb"));
        }
        if header.status != STATUS_SUCCESS {
            return Ok(Self {
                status: header.status,
                agent_id: Uuid::nil(),
                agent_public_key: Vec::new(),
                key_nonce: [0u8; NONCE_LEN],
                challenge_nonce: [0u8; NONCE_LEN],
            });
        }

        if payload.len() < 16 + 2 {
            return Err(VellumError::Malformed("handshake response truncated"));
        }
        let agent_id = Uuid::from_slice(&payload[..16])
            .map_err(|_| VellumError::Malformed("handshake response agent id"))?;
        let key_len = u16::from_be_bytes([payload[16], payload[17]]) as usize;
        let rest = &payload[18..];
        if rest.len() != key_len + NONCE_LEN * 2 {
            return Err(VellumError::Malformed("handshake response payload length"));
        }
        let agent_public_key = rest[..key_len].to_vec();
        let mut key_nonce = [0u8; NONCE_LEN];
        key_nonce.copy_from_slice(&rest[key_len..key_len + NONCE_LEN]);
        let mut challenge_nonce = [0u8; NONCE_LEN];
        challenge_nonce.copy_from_slice(&rest[key_len + NONCE_LEN..]);

        Ok(Self {
            status: header.status,
            agent_id,
            agent_public_key,
            key_nonce,
            challenge_nonce,
        })
    }
}

/// Final handshake message, client to agent, sealed under the session
/// secret. The payload echoes the agent's challenge nonce, proving the
/// client derived the same secret.
#[derive(Debug, Clone)]
pub struct HandshakeAck {
    pub challenge_nonce: HandshakeNonce,
}

impl HandshakeAck {
    pub fn payload(&self) -> Vec<u8> {
        self.challenge_nonce.to_vec()
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        let challenge_nonce = <[u8; NONCE_LEN]>::try_from(payload)
            .map_err(|_| VellumError::Malformed("handshake ack payload length"))?;
        Ok(Self { challenge_nonce })
    }
}

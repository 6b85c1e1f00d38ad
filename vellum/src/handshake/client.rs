use std::io::{Read, Write};

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::crypto::{derive_session_secret, generate_nonce, MessageCipher};
use crate::error::{Result, VellumError};
use crate::handshake::messages::{HandshakeAck, HandshakeRequest, HandshakeResponse};
use crate::identity::Identity;
use crate::session::Session;
use crate::verb::Verb;
use crate::wire::{self, STATUS_SUCCESS};

/// Establish a secure session with the agent on the other end of
/// `transport`.
///
/// `own` must be a private identity; `agent` is the local credential the
/// remote party must match. The agent id and public key received on the
/// wire are compared against `agent` in constant time, and any mismatch
/// aborts before a session secret is derived.
pub fn establish<S: Read + Write>(
    mut transport: S,
    own: &Identity,
    agent: &Identity,
) -> Result<Session<S>> {
    let own_secret = own.private_encryption_key()?;
    let key_nonce = generate_nonce();
    let challenge_nonce = generate_nonce();

    let request = HandshakeRequest {
        client_id: *own.artifact_id(),
        key_nonce,
        challenge_nonce,
    };
    debug!(client_id = %request.client_id, "handshake request");
    wire::write_frame(&mut transport, &request.encode()).map_err(|e| match e {
        VellumError::SendFailed(io) => VellumError::HandshakeSendFailed(io),
        other => other,
    })?;

    let frame = wire::read_frame(&mut transport).map_err(|e| match e {
        VellumError::RecvFailed(io) => VellumError::HandshakeRecvFailed(io),
        other => other,
    })?;
    let response = HandshakeResponse::decode(&frame)?;

    if response.status != STATUS_SUCCESS {
        return Err(VellumError::HandshakeRefused {
            status: response.status,
        });
    }

    // Identity checks come before any key agreement.
    let id_ok: bool = response
        .agent_id
        .as_bytes()
        .ct_eq(agent.artifact_id().as_bytes())
        .into();
    if !id_ok {
        return Err(VellumError::RemoteIdentityMismatch);
    }

    let expected_key = agent.public_encryption_key();
    let key_ok = response.agent_public_key.len() == expected_key.len()
        && bool::from(response.agent_public_key.as_slice().ct_eq(expected_key));
    if !key_ok {
        return Err(VellumError::RemoteKeyMismatch);
    }

    let secret = derive_session_secret(
        own_secret,
        expected_key,
        &key_nonce,
        &response.key_nonce,
    )?;
    let mut session = Session::new(transport, MessageCipher::new(secret));

    let ack = HandshakeAck {
        challenge_nonce: response.challenge_nonce,
    };
    session
        .send_request(Verb::HandshakeAcknowledge, 0, &ack.payload())
        .map_err(|e| match e {
            VellumError::SendFailed(io) => VellumError::HandshakeAckSendFailed(io),
            other => other,
        })?;

    let (header, _) = session.recv_response().map_err(|e| match e {
        VellumError::RecvFailed(io) => VellumError::HandshakeRecvFailed(io),
        other => other,
    })?;
    if header.verb != Verb::HandshakeAcknowledge.wire_id() || header.status != STATUS_SUCCESS {
        return Err(VellumError::HandshakeNotAcknowledged {
            verb: header.verb,
            status: header.status,
        });
    }

    debug!(agent_id = %response.agent_id, "session established");
    Ok(session)
}

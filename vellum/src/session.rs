// Established secure session.
//
// A session owns the transport, the message cipher, and the two direction
// counters. Counters advance monotonically and are never reused: the send
// counter is consumed the moment a send is attempted, whether or not the
// write succeeds, and the receive counter is consumed once a frame has
// been pulled off the wire, whether or not it opens.

use std::fmt;
use std::io::{Read, Write};

use tracing::trace;

use crate::crypto::{MessageCipher, CLIENT_IV_INITIAL, SERVER_IV_INITIAL};
use crate::error::{Result, VellumError};
use crate::verb::Verb;
use crate::wire::{self, RequestHeader, ResponseHeader};

/// A secure session with an agent, produced by [`establish`].
///
/// [`establish`]: crate::handshake::establish
pub struct Session<S> {
    transport: S,
    cipher: MessageCipher,
    send_counter: u64,
    recv_counter: u64,
    desynchronized: bool,
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("send_counter", &self.send_counter)
            .field("recv_counter", &self.recv_counter)
            .field("desynchronized", &self.desynchronized)
            .finish_non_exhaustive()
    }
}

impl<S: Read + Write> Session<S> {
    pub(crate) fn new(transport: S, cipher: MessageCipher) -> Self {
        Self {
            transport,
            cipher,
            send_counter: CLIENT_IV_INITIAL,
            recv_counter: SERVER_IV_INITIAL,
            desynchronized: false,
        }
    }

    /// Seal and send one request message.
    pub fn send_request(&mut self, verb: Verb, offset: u32, payload: &[u8]) -> Result<()> {
        if self.desynchronized {
            return Err(VellumError::SessionDesynchronized);
        }
        let counter = self.send_counter;
        // Consumed up front so a failed write can never repeat a counter.
        self.send_counter += 1;

        trace!(verb = ?verb, offset, counter, len = payload.len(), "send request");
        let body = RequestHeader {
            verb: verb.wire_id(),
            offset,
        }
        .encode_with_payload(payload);
        let sealed = self.cipher.seal(counter, &body)?;
        wire::write_frame(&mut self.transport, &sealed)
    }

    /// Receive and open one response message.
    pub fn recv_response(&mut self) -> Result<(ResponseHeader, Vec<u8>)> {
        let frame = wire::read_frame(&mut self.transport)?;
        let counter = self.recv_counter;
        // The frame is off the wire now, so its counter slot is spent even
        // if it fails to open.
        self.recv_counter += 1;

        let body = self.cipher.open(counter, &frame)?;
        let (header, payload) = ResponseHeader::decode(&body)?;
        trace!(
            verb = header.verb,
            offset = header.offset,
            status = header.status,
            counter,
            len = payload.len(),
            "recv response"
        );
        Ok((header, payload.to_vec()))
    }

    /// Next counter value in the client-to-agent direction.
    pub fn send_counter(&self) -> u64 {
        self.send_counter
    }

    /// Next counter value in the agent-to-client direction.
    pub fn recv_counter(&self) -> u64 {
        self.recv_counter
    }

    /// True once a protocol violation has poisoned the session.
    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }

    pub(crate) fn mark_desynchronized(&mut self) {
        self.desynchronized = true;
    }

    #[cfg(test)]
    pub(crate) fn transport_mut(&mut self) -> &mut S {
        &mut self.transport
    }
}

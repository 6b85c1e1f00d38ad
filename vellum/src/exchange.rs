// One request/response round trip with response validation.

use std::io::{Read, Write};

use crate::error::{Result, VellumError};
use crate::session::Session;
use crate::verb::Verb;
use crate::wire::STATUS_SUCCESS;

impl<S: Read + Write> Session<S> {
    /// Send one request and receive its response, validating the response
    /// header before handing back the payload.
    ///
    /// Checks run in a fixed order: verb, then status, then correlation
    /// token. A verb mismatch means the reply stream no longer lines up
    /// with our requests, so it poisons the session; status and token
    /// mismatches are reported to the caller and the session stays usable.
    pub fn exchange(&mut self, verb: Verb, offset: u32, payload: &[u8]) -> Result<Vec<u8>> {
        self.send_request(verb, offset, payload)?;
        let (header, body) = self.recv_response()?;

        if header.verb != verb.response_verb().wire_id() {
            self.mark_desynchronized();
            return Err(VellumError::UnexpectedVerb {
                expected: verb.response_verb().wire_id(),
                actual: header.verb,
            });
        }
        if header.status != STATUS_SUCCESS {
            return Err(VellumError::RemoteReportedFailure {
                status: header.status,
            });
        }
        if header.offset != offset {
            return Err(VellumError::CorrelationMismatch {
                sent: offset,
                received: header.offset,
            });
        }
        Ok(body)
    }
}

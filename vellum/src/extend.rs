// Extended API sub-protocol.
//
// Verbs in this family tunnel application-defined messages through the
// agent. A sentinel enables the extended API and then receives routed
// client requests; a caller addresses a sentinel by artifact id and a
// 16-byte routed verb. The agent correlates a routed request and its
// response with a route token it places in the header offset field.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, VellumError};
use crate::session::Session;
use crate::verb::Verb;
use crate::wire::STATUS_SUCCESS;

/// Status a sentinel reports for a routed verb it does not implement.
pub const EXTENDED_STATUS_UNKNOWN_VERB: u32 = 1;

/// A client request routed to a sentinel by the agent.
#[derive(Debug, Clone)]
pub struct RoutedRequest {
    /// Agent-assigned token the response must carry.
    pub route_token: u32,
    /// Artifact id of the calling entity.
    pub caller_id: Uuid,
    /// Application-defined verb.
    pub verb: Uuid,
    pub payload: Vec<u8>,
}

/// Application logic hosted behind [`serve`].
pub trait SentinelService {
    /// Handle one routed request. `Ok` becomes a success response carrying
    /// the returned payload; `Err` becomes a failure response with the
    /// returned status and no payload.
    fn handle(&mut self, verb: &Uuid, payload: &[u8]) -> std::result::Result<Vec<u8>, u32>;
}

impl<S: Read + Write> Session<S> {
    /// Register this session as a sentinel for its own artifact id.
    pub fn enable_extended_api(&mut self, offset: u32) -> Result<()> {
        self.exchange(Verb::ExtendedApiEnable, offset, &[])?;
        Ok(())
    }

    /// Send a routed request to the sentinel registered for `sentinel_id`
    /// and wait for its response payload.
    pub fn send_extended(
        &mut self,
        sentinel_id: &Uuid,
        verb: &Uuid,
        offset: u32,
        payload: &[u8],
    ) -> Result<Vec<u8>> {
        let mut body = BytesMut::with_capacity(32 + payload.len());
        body.put_slice(sentinel_id.as_bytes());
        body.put_slice(verb.as_bytes());
        body.put_slice(payload);
        self.exchange(Verb::ExtendedApiSend, offset, &body)
    }

    /// Receive the next routed request. Blocks until the agent forwards
    /// one or the transport fails.
    pub fn recv_routed_request(&mut self) -> Result<RoutedRequest> {
        let (header, body) = self.recv_response()?;
        if header.verb != Verb::ExtendedApiClientRequest.wire_id() {
            self.mark_desynchronized();
            return Err(VellumError::UnexpectedVerb {
                expected: Verb::ExtendedApiClientRequest.wire_id(),
                actual: header.verb,
            });
        }
        if header.status != STATUS_SUCCESS {
            return Err(VellumError::RemoteReportedFailure {
                status: header.status,
            });
        }
        if body.len() < 32 {
            return Err(VellumError::Malformed("routed request truncated"));
        }
        let caller_id = Uuid::from_slice(&body[..16])
            .map_err(|_| VellumError::Malformed("routed request caller id"))?;
        let verb = Uuid::from_slice(&body[16..32])
            .map_err(|_| VellumError::Malformed("routed request verb"))?;
        Ok(RoutedRequest {
            route_token: header.offset,
            caller_id,
            verb,
            payload: body[32..].to_vec(),
        })
    }

    /// Answer a routed request. Fire and forget; the agent relays the
    /// payload to the caller and sends no acknowledgement back.
    pub fn send_routed_response(
        &mut self,
        route_token: u32,
        status: u32,
        payload: &[u8],
    ) -> Result<()> {
        let mut body = BytesMut::with_capacity(4 + payload.len());
        body.put_u32(status);
        body.put_slice(payload);
        self.send_request(Verb::ExtendedApiResponse, route_token, &body)
    }
}

/// Run a sentinel service until the session fails.
///
/// Enables the extended API, then answers routed requests forever. Only
/// an error ends the loop, so the terminating error is always returned.
pub fn serve<S: Read + Write, H: SentinelService>(
    session: &mut Session<S>,
    offset: u32,
    service: &mut H,
) -> VellumError {
    if let Err(e) = session.enable_extended_api(offset) {
        return e;
    }
    loop {
        let request = match session.recv_routed_request() {
            Ok(request) => request,
            Err(e) => return e,
        };
        debug!(
            caller = %request.caller_id,
            verb = %request.verb,
            token = request.route_token,
            "routed request"
        );
        let result = service.handle(&request.verb, &request.payload);
        let sent = match result {
            Ok(payload) => {
                session.send_routed_response(request.route_token, STATUS_SUCCESS, &payload)
            }
            Err(status) => session.send_routed_response(request.route_token, status, &[]),
        };
        if let Err(e) = sent {
            return e;
        }
    }
}

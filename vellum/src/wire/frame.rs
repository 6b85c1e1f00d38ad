// Length-prefixed framing over a blocking byte stream.
//
// Binary layout: [len:4B big-endian][body:lenB]. The body is either a
// plaintext handshake message or a sealed session message; this layer does
// not distinguish.

use std::io::{Read, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, VellumError};

/// Largest frame body accepted. Covers block certificates with room to
/// spare; anything bigger indicates a corrupt or hostile stream.
pub const MAX_FRAME_SIZE: u32 = 8 * 1024 * 1024;

/// Write one frame. I/O failures surface as [`VellumError::SendFailed`];
/// callers in handshake context remap them.
pub fn write_frame<S: Write>(stream: &mut S, body: &[u8]) -> Result<()> {
    if body.len() as u64 > MAX_FRAME_SIZE as u64 {
        return Err(VellumError::FrameOversized {
            size: body.len() as u32,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut buf = BytesMut::with_capacity(4 + body.len());
    buf.put_u32(body.len() as u32);
    buf.put_slice(body);

    stream.write_all(&buf).map_err(VellumError::SendFailed)?;
    stream.flush().map_err(VellumError::SendFailed)
}

/// Read one frame. I/O failures surface as [`VellumError::RecvFailed`].
pub fn read_frame<S: Read>(stream: &mut S) -> Result<Vec<u8>> {
    let mut len_bytes = [0u8; 4];
    stream
        .read_exact(&mut len_bytes)
        .map_err(VellumError::RecvFailed)?;
    let len = u32::from_be_bytes(len_bytes);

    if len > MAX_FRAME_SIZE {
        return Err(VellumError::FrameOversized {
            size: len,
            max: MAX_FRAME_SIZE,
        });
    }

    let mut body = vec![0u8; len as usize];
    stream
        .read_exact(&mut body)
        .map_err(VellumError::RecvFailed)?;
    Ok(body)
}

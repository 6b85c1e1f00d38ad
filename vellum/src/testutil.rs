// Shared fixtures for unit tests: an in-memory transport and a session
// factory with a fixed secret and pre-scripted agent responses.

use std::io::{self, Cursor, Read, Write};

use zeroize::Zeroizing;

use crate::crypto::{MessageCipher, SERVER_IV_INITIAL};
use crate::session::Session;
use crate::wire::ResponseHeader;

pub(crate) const TEST_SECRET: [u8; 32] = [7u8; 32];

/// In-memory transport. Reads are served from staged frames; writes are
/// captured (or refused when `fail_writes` is set).
pub(crate) struct FakeWire {
    input: Cursor<Vec<u8>>,
    pub output: Vec<u8>,
    pub fail_writes: bool,
}

impl FakeWire {
    /// Stage frame bodies; each gets the 4-byte length prefix added.
    pub fn with_frames(bodies: Vec<Vec<u8>>) -> Self {
        let mut input = Vec::new();
        for body in bodies {
            input.extend_from_slice(&(body.len() as u32).to_be_bytes());
            input.extend_from_slice(&body);
        }
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
            fail_writes: false,
        }
    }

    pub fn empty() -> Self {
        Self::with_frames(Vec::new())
    }
}

impl Read for FakeWire {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for FakeWire {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.fail_writes {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "wire down"));
        }
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn test_cipher() -> MessageCipher {
    MessageCipher::new(Zeroizing::new(TEST_SECRET))
}

/// A session over [`FakeWire`] whose staged agent responses are sealed in
/// order under the agent-direction counters.
pub(crate) fn scripted_session(responses: Vec<(ResponseHeader, Vec<u8>)>) -> Session<FakeWire> {
    let cipher = test_cipher();
    let mut frames = Vec::new();
    for (i, (header, payload)) in responses.into_iter().enumerate() {
        let body = header.encode_with_payload(&payload);
        let sealed = cipher.seal(SERVER_IV_INITIAL + i as u64, &body).unwrap();
        frames.push(sealed);
    }
    Session::new(FakeWire::with_frames(frames), cipher)
}

// Wire envelope layer: length-prefixed framing and the request/response
// header codecs shared by every verb.

pub mod frame;
pub mod header;

pub use frame::{read_frame, write_frame, MAX_FRAME_SIZE};
pub use header::{
    RequestHeader, ResponseHeader, REQUEST_HEADER_LEN, RESPONSE_HEADER_LEN, STATUS_SUCCESS,
};

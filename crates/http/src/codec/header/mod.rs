//! HTTP header processing module for encoding and decoding headers
//!
//! - [`HeaderDecoder`]: request line + header block to [`RequestEntity`](crate::protocol::RequestEntity),
//!   with size and count limits
//! - [`HeaderEncoder`]: status line + header block of a response, including the framing headers

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_encoder::HeaderEncoder;

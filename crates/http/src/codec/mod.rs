//! Codecs for HTTP/1.1 messages over a [`BytesMut`](bytes::BytesMut) buffer.
//!
//! - Request side: [`RequestDecoder`] drives the `header` decoder and then a `body`
//!   decoder chosen from the request's framing headers
//! - Response side: [`ResponseEncoder`] does the same in reverse
//!
//! Everything implements `tokio_util::codec::{Decoder, Encoder}`, so the codecs never
//! touch I/O themselves: the stream module feeds them bytes and writes their output.

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::{PayloadDecoder, PayloadEncoder};
pub use header::{HeaderDecoder, HeaderEncoder};
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;

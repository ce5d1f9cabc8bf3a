//! HTTP body codecs.
//!
//! ## Decoders
//! - `ChunkedDecoder`: chunked transfer encoded request bodies
//! - `LengthDecoder`: `Content-Length` framed request bodies
//! - [`PayloadDecoder`]: picks one of the above, or none, per request
//!
//! ## Encoders
//! - `ChunkedEncoder`: chunk framing for responses of unknown length
//! - `LengthEncoder`: verbatim pass through for fixed length responses
//! - [`PayloadEncoder`]: picks one of the above, or none, per response

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod length_encoder;
mod payload_decoder;
mod payload_encoder;

pub use payload_decoder::PayloadDecoder;
pub use payload_encoder::PayloadEncoder;

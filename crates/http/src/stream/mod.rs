//! Byte stream to HTTP message framing.
//!
//! - [`MessageStream`]: captures pipelined requests and writes the responses to them
//! - [`Body`]: the bounded body of the current request
//! - [`MessageWriter`]: buffered response output shared by all response writers

mod body;
mod message_stream;
mod message_writer;

pub use body::Body;
pub use message_stream::MessageStream;
pub use message_writer::MessageWriter;

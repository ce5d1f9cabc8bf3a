//! Decoder for HTTP chunked transfer encoding
//! ([RFC 9112 section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1)).
//!
//! ```text
//! chunked-body = *chunk last-chunk trailer-section CRLF
//! chunk        = chunk-size [ chunk-ext ] CRLF chunk-data CRLF
//! last-chunk   = 1*("0") [ chunk-ext ] CRLF
//! ```
//!
//! Extensions and trailer fields are consumed and ignored. The decoder never reads a
//! byte past the final CRLF, so the next pipelined request stays intact in the buffer.

use crate::protocol::{ParseError, PayloadItem};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: State,
    /// bytes left in the current chunk, or the size being parsed while in `Size`
    remaining: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// first byte of a chunk size line, a hex digit is required
    SizeStart,
    Size,
    SizeLws,
    Extension,
    SizeLf,
    Data,
    DataCr,
    DataLf,
    /// start of a trailer line, or the final CRLF
    TrailerStart,
    Trailer,
    TrailerLf,
    EndLf,
    Done,
}

impl ChunkedDecoder {
    pub fn new() -> Self {
        Self { state: State::SizeStart, remaining: 0 }
    }

    pub fn is_finish(&self) -> bool {
        self.state == State::Done
    }

    fn push_size_digit(&mut self, digit: u8) -> Result<(), ParseError> {
        self.remaining = self
            .remaining
            .checked_mul(16)
            .and_then(|size| size.checked_add(u64::from(digit)))
            .ok_or_else(|| ParseError::invalid_body("chunk size overflow"))?;
        Ok(())
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` for every slice of chunk data available
    /// - `Ok(Some(PayloadItem::Eof))` once the last chunk and trailers are consumed
    /// - `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == State::Done {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            if self.state == State::Data {
                if src.is_empty() {
                    return Ok(None);
                }
                let read_size = usize::try_from(self.remaining).unwrap_or(usize::MAX).min(src.len());
                self.remaining -= read_size as u64;
                if self.remaining == 0 {
                    self.state = State::DataCr;
                }
                trace!(len = read_size, "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(src.split_to(read_size).freeze())));
            }

            if !src.has_remaining() {
                return Ok(None);
            }
            let byte = src.get_u8();

            self.state = match (self.state, byte) {
                (State::SizeStart | State::Size, b @ b'0'..=b'9') => {
                    self.push_size_digit(b - b'0')?;
                    State::Size
                }
                (State::SizeStart | State::Size, b @ b'a'..=b'f') => {
                    self.push_size_digit(b - b'a' + 10)?;
                    State::Size
                }
                (State::SizeStart | State::Size, b @ b'A'..=b'F') => {
                    self.push_size_digit(b - b'A' + 10)?;
                    State::Size
                }
                (State::SizeStart, _) => return Err(ParseError::invalid_body("missing chunk size")),
                (State::Size | State::SizeLws, b'\t' | b' ') => State::SizeLws,
                (State::Size | State::SizeLws, b';') => State::Extension,
                (State::Size | State::SizeLws | State::Extension, b'\r') => State::SizeLf,
                (State::Size | State::SizeLws, _) => return Err(ParseError::invalid_body("invalid chunk size line")),

                (State::Extension, b'\n') => {
                    return Err(ParseError::invalid_body("invalid chunk extension contains newline"));
                }
                (State::Extension, _) => State::Extension,

                (State::SizeLf, b'\n') if self.remaining == 0 => State::TrailerStart,
                (State::SizeLf, b'\n') => State::Data,
                (State::SizeLf, _) => return Err(ParseError::invalid_body("invalid chunk size LF")),

                (State::DataCr, b'\r') => State::DataLf,
                (State::DataCr, _) => return Err(ParseError::invalid_body("invalid chunk data CR")),
                (State::DataLf, b'\n') => State::SizeStart,
                (State::DataLf, _) => return Err(ParseError::invalid_body("invalid chunk data LF")),

                (State::TrailerStart, b'\r') => State::EndLf,
                (State::Trailer, b'\r') => State::TrailerLf,
                (State::TrailerStart | State::Trailer, _) => State::Trailer,
                (State::TrailerLf, b'\n') => State::TrailerStart,
                (State::TrailerLf, _) => return Err(ParseError::invalid_body("invalid trailer LF")),

                (State::EndLf, b'\n') => State::Done,
                (State::EndLf, _) => return Err(ParseError::invalid_body("invalid chunked end LF")),

                (State::Data | State::Done, _) => unreachable!("handled before reading a single byte"),
            };
        }
    }
}

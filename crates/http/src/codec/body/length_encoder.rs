use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::{debug, warn};

/// Passes body bytes through verbatim for a response with a declared `Content-Length`.
///
/// The declared length is tracked but not enforced: writing more or less than promised is
/// a defect of the caller, and is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    /// bytes still owed to the declared length
    length: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, eof: false }
    }

    /// Whether the end of the body was signalled.
    pub fn is_finish(&self) -> bool {
        self.eof
    }

    /// Whether every declared byte was written, regardless of an explicit end.
    pub fn is_complete(&self) -> bool {
        self.eof || self.length == 0
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining() as u64;
                if size > self.length {
                    warn!(declared = self.length, writing = size, "response body exceeds its content-length");
                }
                self.length = self.length.saturating_sub(size);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.put_slice(chunk);
                    bytes.advance(len);
                }
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length > 0 {
                    // also the normal end of a response to HEAD
                    debug!(missing = self.length, "response body ended before its content-length");
                }
                self.length = 0;
                self.eof = true;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn passes_bytes_through() {
        let mut encoder = LengthEncoder::new(4);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"ab")), &mut dst).unwrap();
        assert!(!encoder.is_complete());
        encoder.encode(PayloadItem::Chunk(&b"cd"[..]), &mut dst).unwrap();
        assert!(encoder.is_complete());
        assert!(!encoder.is_finish());

        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        assert!(encoder.is_finish());
        assert_eq!(&dst[..], b"abcd");
    }

    #[test]
    fn length_mismatch_is_not_enforced() {
        let mut encoder = LengthEncoder::new(1);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(&b"too long"[..]), &mut dst).unwrap();
        assert_eq!(&dst[..], b"too long");
    }
}

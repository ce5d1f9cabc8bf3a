//! Streaming decoder for pipelined HTTP requests.
//!
//! A request is yielded as one [`Message::Header`] followed by zero or more
//! [`Message::Payload`] chunks and always a final `PayloadItem::Eof`. Only then does the
//! decoder look for the next request in the buffer.
//!
//! ```no_run
//! use embed_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"[..]);
//! let header = decoder.decode(&mut buffer);
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, RequestEntity};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// Header/payload state machine.
///
/// - `payload_decoder == None`: looking for the next request header
/// - `payload_decoder == Some(_)`: inside the body of the current request
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Whether the decoder is still inside the body of a request.
    pub fn in_payload(&self) -> bool {
        self.payload_decoder.is_some()
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<RequestEntity>;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let message = match payload_decoder.decode(src)? {
                Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
                Some(item @ PayloadItem::Eof) => {
                    debug_assert!(payload_decoder.is_finish());
                    self.payload_decoder.take();
                    Some(Message::Payload(item))
                }
                None => None,
            };

            return Ok(message);
        }

        let message = match self.header_decoder.decode(src)? {
            Some(request) => {
                self.payload_decoder = Some(request.payload_size().into());
                Some(Message::Header(request))
            }
            None => None,
        };

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn expect_header(decoder: &mut RequestDecoder, buffer: &mut BytesMut) -> RequestEntity {
        match decoder.decode(buffer).unwrap() {
            Some(Message::Header(request)) => request,
            other => panic!("expected a request header, got {other:?}"),
        }
    }

    #[test]
    fn pipelined_requests_with_bodies() {
        let raw = indoc! {"
            POST /upload HTTP/1.1\r
            Content-Length: 5\r
            \r
            helloGET /next HTTP/1.1\r
            Transfer-Encoding: chunked\r
            \r
            3\r
            abc\r
            0\r
            \r
            GET /last HTTP/1.1\r
            \r
        "};
        let mut buffer = BytesMut::from(raw);
        let mut decoder = RequestDecoder::new();

        let first = expect_header(&mut decoder, &mut buffer);
        assert_eq!(first.path(), "/upload");
        assert!(decoder.in_payload());
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(matches!(chunk, Message::Payload(PayloadItem::Chunk(ref bytes)) if bytes == "hello"));
        assert!(matches!(decoder.decode(&mut buffer).unwrap(), Some(Message::Payload(PayloadItem::Eof))));
        assert!(!decoder.in_payload());

        let second = expect_header(&mut decoder, &mut buffer);
        assert_eq!(second.path(), "/next");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(matches!(chunk, Message::Payload(PayloadItem::Chunk(ref bytes)) if bytes == "abc"));
        assert!(matches!(decoder.decode(&mut buffer).unwrap(), Some(Message::Payload(PayloadItem::Eof))));

        let third = expect_header(&mut decoder, &mut buffer);
        assert_eq!(third.path(), "/last");
        assert!(matches!(decoder.decode(&mut buffer).unwrap(), Some(Message::Payload(PayloadItem::Eof))));
        assert!(buffer.is_empty());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
    }
}

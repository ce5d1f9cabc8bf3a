//! HTTP header decoder implementation for parsing HTTP request headers
//!
//! This module decodes the request line and header block from raw bytes into a
//! [`RequestEntity`]. The header block may arrive across any number of reads: the
//! decoder keeps answering `Ok(None)` until the terminating empty line is buffered.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only supports HTTP/1.0 and HTTP/1.1
//!
//! # Implementation Details
//!
//! 1. Parse raw bytes using `httparse`
//! 2. Record header name/value byte ranges
//! 3. Split the header bytes off the buffer and build `http::HeaderMap` values as
//!    slices of them, so no header byte is copied
//! 4. Determine the body framing from `Content-Length` / `Transfer-Encoding`

use std::mem::MaybeUninit;

use bytes::BytesMut;
use http::{HeaderName, HeaderValue, Method, Request, Uri, Version};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RequestEntity, RequestHeader};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
pub(crate) const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request headers implementing the [`Decoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = RequestEntity;
    type Error = ParseError;

    /// Attempts to decode a request line and header block from `src`.
    ///
    /// - `Ok(Some(request))` if a complete header was parsed; the header bytes are removed
    ///   from `src`, any body bytes stay
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the bytes can never form a valid header
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let mut req = httparse::Request::new(&mut []);
        let mut headers: [MaybeUninit<httparse::Header<'_>>; MAX_HEADER_NUM] = [const { MaybeUninit::uninit() }; MAX_HEADER_NUM];

        let parsed_result = req.parse_with_uninit_headers(src, &mut headers).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(header_size = body_offset, "parsed request header");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let header_count = req.headers.len();
                ensure!(header_count <= MAX_HEADER_NUM, ParseError::too_many_headers(header_count));

                let mut header_index: [HeaderIndex; MAX_HEADER_NUM] = EMPTY_HEADER_INDEX_ARRAY;
                HeaderIndex::record(src, req.headers, &mut header_index);

                let version = match req.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    v => return Err(ParseError::InvalidVersion(v)),
                };

                let method = req
                    .method
                    .and_then(|method| Method::from_bytes(method.as_bytes()).ok())
                    .ok_or(ParseError::InvalidMethod)?;
                let uri = req.path.and_then(|path| path.parse::<Uri>().ok()).ok_or(ParseError::InvalidUri)?;

                let mut request = Request::new(());
                *request.method_mut() = method;
                *request.uri_mut() = uri;
                *request.version_mut() = version;

                let headers = request.headers_mut();
                headers.reserve(header_count);

                // from here on the header bytes are no longer part of the stream
                let header_bytes = src.split_to(body_offset).freeze();
                for index in &header_index[..header_count] {
                    let name = HeaderName::from_bytes(&header_bytes[index.name.0..index.name.1])
                        .map_err(ParseError::invalid_header)?;
                    let value = HeaderValue::from_maybe_shared(header_bytes.slice(index.value.0..index.value.1))
                        .map_err(ParseError::invalid_header)?;
                    headers.append(name, value);
                }

                let header = RequestHeader::from(request);
                let payload_size = parse_payload(&header)?;

                Ok(Some(RequestEntity::new(header, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Byte range positions of a header's name and value within the original buffer.
#[derive(Clone, Copy)]
struct HeaderIndex {
    name: (usize, usize),
    value: (usize, usize),
}

const EMPTY_HEADER_INDEX: HeaderIndex = HeaderIndex { name: (0, 0), value: (0, 0) };

const EMPTY_HEADER_INDEX_ARRAY: [HeaderIndex; MAX_HEADER_NUM] = [EMPTY_HEADER_INDEX; MAX_HEADER_NUM];

impl HeaderIndex {
    fn record(bytes: &[u8], headers: &[httparse::Header<'_>], indices: &mut [HeaderIndex]) {
        let bytes_ptr = bytes.as_ptr() as usize;
        for (header, indices) in headers.iter().zip(indices.iter_mut()) {
            let name_start = header.name.as_ptr() as usize - bytes_ptr;
            let name_end = name_start + header.name.len();
            indices.name = (name_start, name_end);
            let value_start = header.value.as_ptr() as usize - bytes_ptr;
            let value_end = value_start + header.value.len();
            indices.value = (value_start, value_end);
        }
    }
}

/// Determines the body framing of a request according to RFC 9112 section 6.
///
/// - neither header: no body
/// - `Transfer-Encoding` ending in `chunked`: chunked body
/// - `Content-Length`: fixed length body
/// - both: rejected, this is how request smuggling starts
fn parse_payload(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    // refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding
    let te_header = header.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = header.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_empty()),

        (te_value @ Some(_), None) => {
            if is_chunked(te_value) {
                Ok(PayloadSize::new_chunked())
            } else {
                Ok(PayloadSize::new_empty())
            }
        }

        (None, Some(cl_value)) => {
            let cl_str = cl_value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;

            let length = cl_str
                .trim()
                .parse::<u64>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {cl_str} is not u64")))?;

            if length == 0 { Ok(PayloadSize::new_empty()) } else { Ok(PayloadSize::new_length(length)) }
        }

        (Some(_), Some(_)) => {
            Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers"))
        }
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&HeaderValue>) -> bool {
    const CHUNKED: &[u8] = b"chunked";
    if let Some(value) = header_value {
        if let Some(bytes) = value.as_bytes().rsplit(|b| *b == b',').next() {
            return bytes.trim_ascii().eq_ignore_ascii_case(CHUNKED);
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderMap;
    use indoc::indoc;

    #[test]
    fn check_is_chunked() {
        {
            let headers = HeaderMap::new();
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)))
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Accept", "foo".parse().unwrap());
            headers.insert("Transfer-Encoding", "gzip, chunked".parse().unwrap());
            headers.insert("Host", "bar".parse().unwrap());
            assert!(is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "chunked, gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip".parse().unwrap());
            assert!(!is_chunked(headers.get(http::header::TRANSFER_ENCODING)));
        }
    }

    #[test]
    fn header_is_split_from_body() {
        let str = indoc! {r##"
        POST /upload HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Length: 3

        123"##};

        let mut bytes = BytesMut::from(str.replace('\n', "\r\n").as_str());

        let request = HeaderDecoder.decode(&mut bytes).unwrap().unwrap();

        assert_eq!(request.payload_size(), PayloadSize::Length(3));
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);

        let request = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(request.payload_size().is_empty());
        assert!(buf.is_empty());

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.path(), "/index.html");
        assert_eq!(request.query(), None);
        assert!(request.keep_alive());
        assert!(!request.is_websocket());

        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.header_str(http::header::ACCEPT), Some("*/*"));
        assert_eq!(request.header_str("host"), Some("127.0.0.1:8080"));
        assert_eq!(request.header_str("USER-AGENT"), Some("curl/7.79.1"));
    }

    #[test]
    fn header_across_reads() {
        let mut buf = BytesMut::from("GET /chat HTTP/1.1\r\nHost: exa");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"mple.com\r\nUpgrade: websocket\r\n");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\r\n");
        let request = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert!(request.is_websocket());
        assert_eq!(request.header_str("host"), Some("example.com"));
    }

    #[test]
    fn rejects_malformed_request_line() {
        let mut buf = BytesMut::from("GET /index.html HTTP/9.9\r\n\r\n");
        assert!(HeaderDecoder.decode(&mut buf).is_err());

        let mut buf = BytesMut::from("GE T / HTTP/1.1\r\nHost: a\r\n\r\n");
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidHeader { .. })));

        let mut buf = BytesMut::from("XYZ\r\n\r\n");
        assert!(HeaderDecoder.decode(&mut buf).is_err());

        let mut buf = BytesMut::from("GE");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn rejects_oversized_header() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\n");
        buf.extend_from_slice(format!("X-Large: {}\r\n", "a".repeat(MAX_HEADER_BYTES)).as_bytes());

        let result = HeaderDecoder.decode(&mut buf);
        assert!(matches!(result, Err(ParseError::TooLargeHeader { .. })));
    }

    #[test]
    fn rejects_too_many_headers() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..=MAX_HEADER_NUM {
            raw.push_str(&format!("X-{i}: v\r\n"));
        }
        raw.push_str("\r\n");

        let mut buf = BytesMut::from(raw.as_str());
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::TooManyHeaders { .. })));
    }

    #[test]
    fn body_framing() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");
        assert!(HeaderDecoder.decode(&mut buf).unwrap().unwrap().payload_size().is_chunked());

        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: abc\r\n\r\n");
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidContentLength { .. })));

        let mut buf =
            BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 3\r\nTransfer-Encoding: chunked\r\n\r\n");
        assert!(matches!(HeaderDecoder.decode(&mut buf), Err(ParseError::InvalidContentLength { .. })));

        // GET bodies are framed like any other body, otherwise they would be parsed as the next request
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi");
        assert_eq!(HeaderDecoder.decode(&mut buf).unwrap().unwrap().payload_size(), PayloadSize::Length(2));
    }
}

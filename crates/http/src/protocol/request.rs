//! HTTP request header handling implementation.
//!
//! [`RequestHeader`] wraps a body-less `http::Request<()>`. [`RequestEntity`] is what the
//! message stream hands out: the header plus everything derived from it while parsing
//! (body framing, keep-alive intent, websocket upgrade detection).

use http::header::{CONNECTION, EXPECT, UPGRADE};
use http::request::Parts;
use http::{HeaderMap, HeaderName, Method, Request, Uri, Version};

use crate::protocol::PayloadSize;

/// Represents an HTTP request header.
#[derive(Debug)]
pub struct RequestHeader {
    inner: Request<()>,
}

impl AsRef<Request<()>> for RequestHeader {
    fn as_ref(&self) -> &Request<()> {
        &self.inner
    }
}

impl AsMut<Request<()>> for RequestHeader {
    fn as_mut(&mut self) -> &mut Request<()> {
        &mut self.inner
    }
}

impl RequestHeader {
    /// Consumes the header and returns the inner `Request<()>`.
    pub fn into_inner(self) -> Request<()> {
        self.inner
    }

    /// Attaches a body to this header, converting it into a full `Request<T>`.
    pub fn body<T>(self, body: T) -> Request<T> {
        self.inner.map(|_| body)
    }

    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    pub fn version(&self) -> Version {
        self.inner.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns true if any comma separated token of any `name` header equals `token`,
    /// ignoring ASCII case.
    pub fn has_token(&self, name: &HeaderName, token: &str) -> bool {
        self.headers()
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(','))
            .any(|item| item.trim().eq_ignore_ascii_case(token))
    }
}

/// Converts request parts into a RequestHeader.
impl From<Parts> for RequestHeader {
    #[inline]
    fn from(parts: Parts) -> Self {
        Self { inner: Request::from_parts(parts, ()) }
    }
}

/// Converts a bodyless request into a RequestHeader.
impl From<Request<()>> for RequestHeader {
    #[inline]
    fn from(inner: Request<()>) -> Self {
        Self { inner }
    }
}

/// One parsed request on a connection.
///
/// The entity never owns the connection. Its body is read through the
/// [`MessageStream`](crate::stream::MessageStream) it was captured from, and the next
/// pipelined request is obtained with
/// [`MessageStream::next`](crate::stream::MessageStream::next).
#[derive(Debug)]
pub struct RequestEntity {
    header: RequestHeader,
    payload_size: PayloadSize,
    keep_alive: bool,
    is_websocket: bool,
}

impl RequestEntity {
    pub fn new(header: RequestHeader, payload_size: PayloadSize) -> Self {
        let keep_alive = match header.version() {
            Version::HTTP_10 => header.has_token(&CONNECTION, "keep-alive"),
            _ => !header.has_token(&CONNECTION, "close"),
        };
        let is_websocket = header.method() == Method::GET && header.has_token(&UPGRADE, "websocket");

        Self { header, payload_size, keep_alive, is_websocket }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn into_header(self) -> RequestHeader {
        self.header
    }

    pub fn method(&self) -> &Method {
        self.header.method()
    }

    /// The raw request path, without the query string. No security check has been
    /// applied to it.
    pub fn path(&self) -> &str {
        self.header.uri().path()
    }

    pub fn query(&self) -> Option<&str> {
        self.header.uri().query()
    }

    pub fn uri(&self) -> &Uri {
        self.header.uri()
    }

    pub fn version(&self) -> Version {
        self.header.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.header.headers()
    }

    /// First value of the header `name` as a string, if present and visible ASCII.
    pub fn header_str(&self, name: impl http::header::AsHeaderName) -> Option<&str> {
        self.headers().get(name).and_then(|value| value.to_str().ok())
    }

    pub fn payload_size(&self) -> PayloadSize {
        self.payload_size
    }

    pub fn has_body(&self) -> bool {
        !self.payload_size.is_empty()
    }

    /// Whether the client allows further requests on this connection.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close` is sent, HTTP/1.0
    /// defaults to close unless `Connection: keep-alive` is sent.
    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    /// Set when the request asks for `Upgrade: websocket`. The handshake key is
    /// checked later by the upgrade handler.
    pub fn is_websocket(&self) -> bool {
        self.is_websocket
    }

    pub fn expects_continue(&self) -> bool {
        self.headers()
            .get(EXPECT)
            .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"100-continue"))
    }
}

//! Per connection request loop.
//!
//! [`HttpConnection`] owns one accepted transport and drives it through
//! capture, dispatch, and response until the peer leaves, a request asks to close, the
//! request ceiling is reached, or the connection is upgraded to a WebSocket.

mod context;
mod http_connection;

pub use context::{ConnectionContext, DEFAULT_MAX_REQUEST_PER_CONNECTION};
pub use http_connection::HttpConnection;

use tokio::io::{AsyncRead, AsyncWrite};

/// Any duplex byte channel the driver can serve.
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T> Transport for T where T: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

pub type BoxTransport = Box<dyn Transport>;

//! HTTP/1.1 connection engine with WebSocket upgrade support.
//!
//! The crate turns an already accepted duplex byte channel into a sequence of pipelined
//! requests, lets a [`Service`](handler::Service) answer each of them, and performs the
//! WebSocket opening handshake when asked to.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use embed_http::connection::{BoxTransport, ConnectionContext, HttpConnection};
//! use embed_http::handler::{BoxError, Service};
//! use embed_http::protocol::RequestEntity;
//! use embed_http::response::TextResponser;
//! use embed_http::stream::MessageStream;
//! use tokio::net::TcpListener;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Service for Hello {
//!     async fn dispatch(&self, request: &RequestEntity, stream: &mut MessageStream<BoxTransport>) -> Result<bool, BoxError> {
//!         let mut response = TextResponser::new(StatusCode::OK, "Hello World!\r\n");
//!         response.set_keep_alive(request.keep_alive());
//!         let keep_alive = response.keep_alive();
//!         response.send(stream).await?;
//!         Ok(keep_alive)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let service = Arc::new(Hello);
//!     loop {
//!         let (tcp_stream, remote) = listener.accept().await?;
//!         let context = ConnectionContext::new(listener.local_addr()?, remote);
//!         let service = service.clone();
//!         tokio::spawn(async move {
//!             let io: BoxTransport = Box::new(tcp_stream);
//!             let _ = HttpConnection::new(io, context).process(service).await;
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! - [`codec`]: request decoding and response encoding over `BytesMut`
//! - [`protocol`]: message types, the captured request, error types
//! - [`stream`]: [`MessageStream`](stream::MessageStream), the framed connection
//! - [`response`]: fixed length, chunked, text and error response writers
//! - [`websocket`]: accept key, handshake, handoff to a [`Messager`](websocket::Messager)
//! - [`connection`]: the per connection driver
//! - [`handler`]: the [`Service`](handler::Service) trait
//!
//! # Limitations
//!
//! - HTTP/1.0 and HTTP/1.1 requests, HTTP/1.1 responses
//! - no TLS, no timeouts
//! - header block up to 8 KiB with at most 64 headers

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod response;
pub mod stream;
pub mod websocket;

mod utils;
pub(crate) use utils::ensure;

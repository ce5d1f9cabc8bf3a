//! A small embeddable HTTP server on top of `embed-http`.
//!
//! Requests are matched against exact [routes](router::Router); anything unrouted is served
//! as a static file from the configured web root. WebSocket upgrades are answered with
//! the handshake and then handed to a [`Messager`](embed_http::websocket::Messager)
//! chosen by a [`MessagerFactory`].
//!
//! ```no_run
//! use embed_web::Server;
//! use embed_web::router::handler_fn;
//! use embed_http::response::TextResponser;
//! use futures::FutureExt;
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::builder()
//!         .address("127.0.0.1:8080")
//!         .web_root("./web")
//!         .route(
//!             "/hello",
//!             handler_fn(|_request, stream| {
//!                 async move {
//!                     TextResponser::new(StatusCode::OK, "hello").send(stream).await?;
//!                     Ok(true)
//!                 }
//!                 .boxed()
//!             }),
//!         )
//!         .build()
//!         .unwrap();
//!
//!     server.start().await.unwrap();
//! }
//! ```

pub mod config;
pub mod mime_types;
pub mod resource;
pub mod router;

mod server;

pub use config::ServerConfig;
pub use resource::StaticResource;
pub use router::{Router, handler_fn};
pub use server::{MessagerFactory, Server, ServerBuildError, ServerBuilder, ServerError};

use embed_http::connection::BoxTransport;
use embed_http::stream::MessageStream;

/// The stream every route handler writes its response to.
pub type HttpStream = MessageStream<BoxTransport>;

//! The seam between the connection driver and whatever answers requests.

use std::error::Error;

use async_trait::async_trait;
use http::StatusCode;

use crate::connection::{BoxTransport, ConnectionContext, Transport};
use crate::protocol::{ParseError, RequestEntity, SendError};
use crate::response::ErrorResponser;
use crate::stream::MessageStream;
use crate::websocket::Messager;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Answers the requests of a connection, one at a time.
///
/// [`dispatch`](Service::dispatch) writes the complete response to the stream and returns
/// whether the connection may serve another request. An `Err` is answered by the driver
/// through [`server_error`](Service::server_error) and ends the connection.
#[async_trait]
pub trait Service<S: Transport = BoxTransport>: Send + Sync {
    async fn dispatch(&self, request: &RequestEntity, stream: &mut MessageStream<S>) -> Result<bool, BoxError>;

    /// Target of a completed WebSocket handshake. `None` closes the connection.
    fn messager(&self, _request: &RequestEntity, _context: &ConnectionContext) -> Option<Box<dyn Messager<S>>> {
        None
    }

    async fn bad_request(&self, error: &ParseError, stream: &mut MessageStream<S>) -> Result<(), SendError> {
        ErrorResponser::new(StatusCode::BAD_REQUEST, format!("request error: {error}")).send(stream).await
    }

    async fn server_error(&self, error: &BoxError, stream: &mut MessageStream<S>) -> Result<(), SendError> {
        ErrorResponser::new(StatusCode::INTERNAL_SERVER_ERROR, format!("server error: {error}")).send(stream).await
    }
}

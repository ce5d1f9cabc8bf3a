use bytes::Bytes;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::protocol::SendError;
use crate::response::TextResponser;
use crate::stream::MessageStream;

/// A text response for a failed request.
///
/// Any status of 400 and above closes the connection, except `404 Not Found`.
#[derive(Debug)]
pub struct ErrorResponser {
    inner: TextResponser,
}

impl ErrorResponser {
    pub fn new(status: StatusCode, message: impl Into<Bytes>) -> Self {
        let mut inner = TextResponser::new(status, message);
        if closes_connection(status) {
            inner.set_keep_alive(false);
        }
        Self { inner }
    }

    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    pub fn keep_alive(&self) -> bool {
        self.inner.keep_alive()
    }

    /// Only takes effect for statuses that do not force a close.
    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        if !closes_connection(self.status()) {
            self.inner.set_keep_alive(keep_alive);
        }
    }

    pub async fn send<S>(self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.inner.send(stream).await
    }

    pub async fn send_head<S>(self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.inner.send_head(stream).await
    }
}

fn closes_connection(status: StatusCode) -> bool {
    status.as_u16() >= 400 && status != StatusCode::NOT_FOUND
}

use bytes::Bytes;
use http::StatusCode;
use mime::Mime;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::protocol::SendError;
use crate::response::Responser;
use crate::stream::MessageStream;

/// A complete fixed length text response, sent in one call.
#[derive(Debug)]
pub struct TextResponser {
    responser: Responser,
    body: Bytes,
}

impl TextResponser {
    /// Defaults to `text/html; charset=utf-8`.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let mut responser = Responser::fixed(status, body.len() as u64);
        responser.set_content_type(&mime::TEXT_HTML_UTF_8);
        Self { responser, body }
    }

    pub fn with_content_type(mut self, content_type: &Mime) -> Self {
        self.responser.set_content_type(content_type);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.responser.status()
    }

    pub fn keep_alive(&self) -> bool {
        self.responser.keep_alive()
    }

    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.responser.set_keep_alive(keep_alive);
    }

    pub fn responser_mut(&mut self) -> &mut Responser {
        &mut self.responser
    }

    pub async fn send<S>(mut self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if !self.body.is_empty() {
            self.responser.write(stream, &self.body).await?;
        }
        self.responser.end(stream).await
    }

    /// Sends the header block only, `Content-Length` still announcing the body. Used to
    /// answer `HEAD` requests.
    pub async fn send_head<S>(mut self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.responser.end(stream).await
    }
}

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use mime::Mime;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

use crate::protocol::{Message, PayloadItem, PayloadSize, SendError};
use crate::stream::MessageStream;

const KEEP_ALIVE_VALUE: HeaderValue = HeaderValue::from_static("keep-alive");
const CLOSE_VALUE: HeaderValue = HeaderValue::from_static("close");

/// Writes one response onto a [`MessageStream`].
///
/// The status line and headers are fixed by the first body write (or an explicit
/// [`write_header`](Self::write_header)); after that the framing mode can no longer change.
/// The stream is borrowed per call, never owned.
#[derive(Debug)]
pub struct Responser {
    status: StatusCode,
    headers: HeaderMap,
    keep_alive: bool,
    mode: Mode,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Fixed(u64),
    Chunked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    HeaderSent,
    Ended,
}

impl Responser {
    /// A fixed length response with an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self::fixed(status, 0)
    }

    pub fn fixed(status: StatusCode, content_length: u64) -> Self {
        Self { status, headers: HeaderMap::new(), keep_alive: true, mode: Mode::Fixed(content_length), state: State::Pending }
    }

    /// A response whose body is sent as chunks of unknown total length.
    pub fn chunked(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), keep_alive: true, mode: Mode::Chunked, state: State::Pending }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn set_keep_alive(&mut self, keep_alive: bool) {
        self.keep_alive = keep_alive;
    }

    pub fn is_chunked(&self) -> bool {
        self.mode == Mode::Chunked
    }

    pub fn content_length(&self) -> Option<u64> {
        match self.mode {
            Mode::Fixed(length) => Some(length),
            Mode::Chunked => None,
        }
    }

    pub fn is_header_sent(&self) -> bool {
        self.state != State::Pending
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    pub fn set_content_type(&mut self, content_type: &Mime) {
        match HeaderValue::from_str(content_type.as_ref()) {
            Ok(value) => {
                self.headers.insert(CONTENT_TYPE, value);
            }
            Err(e) => warn!(content_type = %content_type, cause = %e, "skip invalid content type"),
        }
    }

    /// Switches to fixed length framing.
    pub fn set_content_length(&mut self, content_length: u64) -> Result<(), SendError> {
        self.check_pending()?;
        self.mode = Mode::Fixed(content_length);
        Ok(())
    }

    /// Switches to chunked framing.
    pub fn set_chunked(&mut self) -> Result<(), SendError> {
        self.check_pending()?;
        self.mode = Mode::Chunked;
        Ok(())
    }

    /// Serializes the status line and headers and flushes them.
    ///
    /// Fails with [`SendError::HeaderAlreadySent`] when called a second time.
    pub async fn write_header<S>(&mut self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.send_header(stream).await?;
        stream.flush().await
    }

    /// Writes body bytes, sending the header first if that did not happen yet.
    ///
    /// In chunked mode every non-empty write becomes one chunk.
    pub async fn write<S>(&mut self, stream: &mut MessageStream<S>, data: &[u8]) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.state {
            State::Pending => self.send_header(stream).await?,
            State::HeaderSent => {}
            State::Ended => return Err(SendError::invalid_body("response already ended")),
        }

        stream.send(Message::Payload(PayloadItem::Chunk(data))).await
    }

    /// Finishes the body and flushes the response. Calling it again does nothing.
    pub async fn end<S>(&mut self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.state {
            State::Pending => self.send_header(stream).await?,
            State::HeaderSent => {}
            State::Ended => return Ok(()),
        }

        stream.send(Message::Payload(PayloadItem::<Bytes>::Eof)).await?;
        self.state = State::Ended;
        stream.flush().await
    }

    async fn send_header<S>(&mut self, stream: &mut MessageStream<S>) -> Result<(), SendError>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.check_pending()?;

        let mut head = Response::new(());
        *head.status_mut() = self.status;
        *head.headers_mut() = self.headers.clone();
        if !head.headers().contains_key(CONNECTION) {
            let value = if self.keep_alive { KEEP_ALIVE_VALUE } else { CLOSE_VALUE };
            head.headers_mut().insert(CONNECTION, value);
        }

        let payload_size = match self.mode {
            Mode::Fixed(length) => PayloadSize::Length(length),
            Mode::Chunked => PayloadSize::Chunked,
        };

        stream.send(Message::<_, Bytes>::Header((head, payload_size))).await?;
        self.state = State::HeaderSent;
        Ok(())
    }

    fn check_pending(&self) -> Result<(), SendError> {
        match self.state {
            State::Pending => Ok(()),
            _ => Err(SendError::HeaderAlreadySent),
        }
    }
}

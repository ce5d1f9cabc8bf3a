use bytes::{Buf, Bytes, BytesMut};
use http::{Response, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadHalf, WriteHalf};
use tokio_util::codec::Decoder;
use tracing::{debug, trace};

use crate::codec::RequestDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestEntity, ResponseHead, SendError};
use crate::stream::body::Body;
use crate::stream::message_writer::MessageWriter;

/// Size of one read from the transport, and of the write buffer.
pub(crate) const BLOCK_SIZE: usize = 8 * 1024;

/// A duplex byte channel framed as a sequence of pipelined HTTP requests and the
/// responses to them.
///
/// At most one request is active at a time: capturing the next request first discards
/// whatever the handler left unread of the current body, so a request never observes
/// bytes that belong to its predecessor.
#[derive(Debug)]
pub struct MessageStream<S> {
    reader: ReadHalf<S>,
    read_buf: BytesMut,
    decoder: RequestDecoder,
    writer: MessageWriter<WriteHalf<S>>,
}

impl<S> MessageStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(io: S) -> Self {
        let (reader, writer) = tokio::io::split(io);
        Self {
            reader,
            read_buf: BytesMut::with_capacity(BLOCK_SIZE),
            decoder: RequestDecoder::new(),
            writer: MessageWriter::with_capacity(writer, BLOCK_SIZE),
        }
    }

    /// Reads until a complete request line and header block is available.
    ///
    /// The unread body of the previous request, if any, is drained first. End of input
    /// before the header is complete yields [`ParseError::ConnectionLost`].
    pub async fn capture(&mut self) -> Result<RequestEntity, ParseError> {
        self.drain_body().await?;

        loop {
            match self.decoder.decode(&mut self.read_buf)? {
                Some(Message::Header(request)) => {
                    trace!(method = %request.method(), path = request.path(), "captured request");
                    return Ok(request);
                }
                Some(Message::Payload(_)) => {
                    return Err(ParseError::invalid_body("payload received while expecting a request header"));
                }
                None => self.fill().await?,
            }
        }
    }

    /// The request pipelined after `previous`.
    ///
    /// Returns `None` when `previous` asked to close the connection, or when the peer ends
    /// the input cleanly between two requests.
    pub async fn next(&mut self, previous: &RequestEntity) -> Result<Option<RequestEntity>, ParseError> {
        if !previous.keep_alive() {
            return Ok(None);
        }

        match self.capture().await {
            Ok(request) => Ok(Some(request)),
            Err(e) if e.is_connection_lost() && self.read_buf.is_empty() && !self.decoder.in_payload() => {
                debug!("input ended between requests");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Bounded view over the body of the current request.
    pub fn body(&mut self) -> Body<'_, S> {
        Body::new(self)
    }

    /// Bytes received but not consumed yet.
    pub fn buffered(&self) -> &[u8] {
        &self.read_buf
    }

    pub(crate) async fn read_payload(&mut self) -> Result<Option<Bytes>, ParseError> {
        while self.decoder.in_payload() {
            match self.decoder.decode(&mut self.read_buf)? {
                Some(Message::Payload(PayloadItem::Chunk(bytes))) => return Ok(Some(bytes)),
                Some(Message::Payload(PayloadItem::Eof)) => return Ok(None),
                Some(Message::Header(_)) => {
                    return Err(ParseError::invalid_body("request header received while reading a body"));
                }
                None => self.fill().await?,
            }
        }

        Ok(None)
    }

    async fn drain_body(&mut self) -> Result<(), ParseError> {
        let mut skipped = 0usize;
        while let Some(bytes) = self.read_payload().await? {
            skipped += bytes.len();
        }
        if skipped > 0 {
            trace!(skipped, "discarded unread request body");
        }
        Ok(())
    }

    async fn fill(&mut self) -> Result<(), ParseError> {
        self.read_buf.reserve(BLOCK_SIZE);
        let read = self.reader.read_buf(&mut self.read_buf).await.map_err(ParseError::io)?;
        if read == 0 {
            return Err(ParseError::ConnectionLost);
        }
        trace!(read, "filled read buffer");
        Ok(())
    }

    /// Encodes a response message into the write buffer, flushing once it grows large.
    pub async fn send<D: Buf>(&mut self, message: Message<(ResponseHead, PayloadSize), D>) -> Result<(), SendError> {
        self.writer.write(message)?;
        if self.writer.needs_flush() {
            self.writer.flush().await?;
        }
        Ok(())
    }

    /// Writes `HTTP/1.1 100 Continue` and flushes it.
    pub async fn send_continue(&mut self) -> Result<(), SendError> {
        let mut head = Response::new(());
        *head.status_mut() = StatusCode::CONTINUE;
        self.writer.write(Message::<_, Bytes>::Header((head, PayloadSize::Empty)))?;
        self.writer.flush().await
    }

    /// Appends bytes that bypass response framing.
    pub async fn write_raw(&mut self, data: &[u8]) -> Result<(), SendError> {
        self.writer.write_raw(data);
        if self.writer.needs_flush() {
            self.writer.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), SendError> {
        self.writer.flush().await
    }

    /// Whether the last response written is still waiting for body bytes.
    pub fn response_pending(&self) -> bool {
        self.writer.in_payload()
    }

    pub async fn shutdown(&mut self) -> Result<(), SendError> {
        self.writer.shutdown().await
    }

    /// Gives up the HTTP framing and hands back the transport together with any bytes
    /// already read past the current request.
    ///
    /// Unflushed response bytes are lost; flush before calling this.
    pub fn into_inner(self) -> (S, BytesMut) {
        let writer = self.writer.into_inner();
        (self.reader.unsplit(writer), self.read_buf)
    }
}

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::protocol::ParseError;
use crate::stream::MessageStream;

/// Body of the request most recently captured on a [`MessageStream`].
///
/// Bounded by `Content-Length` or by chunked framing; a request without a body yields
/// nothing. Once exhausted, every further read returns `None`.
#[derive(Debug)]
pub struct Body<'a, S> {
    stream: &'a mut MessageStream<S>,
}

impl<'a, S> Body<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(stream: &'a mut MessageStream<S>) -> Self {
        Self { stream }
    }

    /// Next slice of body bytes, or `None` once the body is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, ParseError> {
        self.stream.read_payload().await
    }

    /// Collects the rest of the body in memory.
    pub async fn to_bytes(mut self) -> Result<Bytes, ParseError> {
        let mut collected = BytesMut::new();
        while let Some(bytes) = self.chunk().await? {
            collected.extend_from_slice(&bytes);
        }
        Ok(collected.freeze())
    }

    /// Discards the rest of the body, returning how many bytes were skipped.
    pub async fn skip(mut self) -> Result<u64, ParseError> {
        let mut skipped = 0u64;
        while let Some(bytes) = self.chunk().await? {
            skipped += bytes.len() as u64;
        }
        Ok(skipped)
    }
}

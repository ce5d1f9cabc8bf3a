//! WebSocket opening handshake ([RFC 6455 section 4.2](https://www.rfc-editor.org/rfc/rfc6455#section-4.2)).
//!
//! Only the HTTP side of the upgrade lives here. Once `101 Switching Protocols` is out,
//! the stream is handed to a [`Messager`], which owns the frame level conversation.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::header::{CONNECTION, SEC_WEBSOCKET_ACCEPT, SEC_WEBSOCKET_KEY, UPGRADE};
use http::{HeaderValue, StatusCode};
use sha1::{Digest, Sha1};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{info, warn};

use crate::connection::{BoxTransport, ConnectionContext};
use crate::handler::BoxError;
use crate::protocol::{RequestEntity, SendError};
use crate::response::{ErrorResponser, Responser};
use crate::stream::MessageStream;

/// Salt appended to the client key before hashing.
pub const WEBSOCKET_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

const WEBSOCKET_VALUE: HeaderValue = HeaderValue::from_static("websocket");
const UPGRADE_VALUE: HeaderValue = HeaderValue::from_static("Upgrade");

/// Takes over a connection after a successful handshake.
#[async_trait]
pub trait Messager<S = BoxTransport>: Send {
    async fn accept(
        self: Box<Self>,
        request: RequestEntity,
        stream: MessageStream<S>,
        context: ConnectionContext,
    ) -> Result<(), BoxError>;
}

/// `Sec-WebSocket-Accept` for a client's `Sec-WebSocket-Key`.
pub fn accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WEBSOCKET_GUID.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Answers an upgrade request.
///
/// Returns `true` once `101 Switching Protocols` is flushed. A missing or empty
/// `Sec-WebSocket-Key` is answered with `400 Bad Request` instead and returns `false`;
/// the connection must be closed afterwards.
pub async fn upgrade<S>(request: &RequestEntity, stream: &mut MessageStream<S>) -> Result<bool, SendError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let key = match request.header_str(SEC_WEBSOCKET_KEY).map(str::trim) {
        Some(key) if !key.is_empty() => key,
        _ => {
            warn!(path = request.path(), "reject websocket upgrade without key");
            ErrorResponser::new(StatusCode::BAD_REQUEST, "header 'Sec-WebSocket-Key' error").send(stream).await?;
            return Ok(false);
        }
    };

    let accept = HeaderValue::try_from(accept_key(key)).map_err(|e| SendError::invalid_body(e.to_string()))?;

    let mut responser = Responser::new(StatusCode::SWITCHING_PROTOCOLS);
    responser.insert_header(UPGRADE, WEBSOCKET_VALUE);
    responser.insert_header(CONNECTION, UPGRADE_VALUE);
    responser.insert_header(SEC_WEBSOCKET_ACCEPT, accept);
    responser.end(stream).await?;

    info!(path = request.path(), "websocket handshake completed");
    Ok(true)
}

//! Response writers.
//!
//! [`Responser`] is the general writer with fixed length or chunked framing.
//! [`TextResponser`] sends a complete text body in one call, and [`ErrorResponser`] wraps
//! it to apply the connection rules for error statuses.

mod error_responser;
mod responser;
mod text_responser;

pub use error_responser::ErrorResponser;
pub use responser::Responser;
pub use text_responser::TextResponser;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PayloadDecoder;
    use crate::protocol::{PayloadItem, PayloadSize, SendError};
    use crate::stream::MessageStream;
    use bytes::BytesMut;
    use http::StatusCode;
    use tokio::io::{AsyncReadExt, DuplexStream};
    use tokio_util::codec::Decoder;

    async fn written<F>(write: F) -> String
    where
        F: AsyncFnOnce(&mut MessageStream<DuplexStream>),
    {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let mut stream = MessageStream::new(server);
        write(&mut stream).await;
        stream.shutdown().await.unwrap();

        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        output
    }

    fn decode_chunked(body: &str) -> String {
        let mut decoder = PayloadDecoder::from(PayloadSize::Chunked);
        let mut buffer = BytesMut::from(body);
        let mut decoded = Vec::new();
        loop {
            match decoder.decode(&mut buffer).unwrap().unwrap() {
                PayloadItem::Chunk(bytes) => decoded.extend_from_slice(&bytes),
                PayloadItem::Eof => break,
            }
        }
        assert!(buffer.is_empty());
        String::from_utf8(decoded).unwrap()
    }

    #[tokio::test]
    async fn fixed_response() {
        let output = written(async |stream| {
            let mut responser = Responser::fixed(StatusCode::OK, 5);
            responser.set_content_type(&mime::TEXT_PLAIN);
            responser.write(stream, b"hello").await.unwrap();
            responser.end(stream).await.unwrap();
        })
        .await;

        assert_eq!(
            output,
            "HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\nconnection: keep-alive\r\ncontent-length: 5\r\n\r\nhello"
        );
    }

    #[tokio::test]
    async fn chunked_response_round_trips() {
        let output = written(async |stream| {
            let mut responser = Responser::chunked(StatusCode::OK);
            responser.set_keep_alive(false);
            responser.write(stream, b"first ").await.unwrap();
            responser.write(stream, b"").await.unwrap();
            responser.write(stream, b"second").await.unwrap();
            responser.end(stream).await.unwrap();
        })
        .await;

        let (head, body) = output.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("connection: close"));
        assert!(head.contains("transfer-encoding: chunked"));
        assert!(!head.contains("content-length"));
        assert_eq!(decode_chunked(body), "first second");
    }

    #[tokio::test]
    async fn empty_chunked_response() {
        let output = written(async |stream| {
            let mut responser = Responser::chunked(StatusCode::OK);
            responser.end(stream).await.unwrap();
        })
        .await;

        let (_, body) = output.split_once("\r\n\r\n").unwrap();
        assert_eq!(body, "0\r\n\r\n");
        assert_eq!(decode_chunked(body), "");
    }

    #[tokio::test]
    async fn header_is_written_once() {
        written(async |stream| {
            let mut responser = Responser::new(StatusCode::NO_CONTENT);
            responser.write_header(stream).await.unwrap();
            assert!(matches!(responser.write_header(stream).await, Err(SendError::HeaderAlreadySent)));
            assert!(matches!(responser.set_chunked(), Err(SendError::HeaderAlreadySent)));
            assert!(matches!(responser.set_content_length(3), Err(SendError::HeaderAlreadySent)));
            responser.end(stream).await.unwrap();
        })
        .await;
    }

    #[tokio::test]
    async fn error_responses_close_except_not_found() {
        assert!(!ErrorResponser::new(StatusCode::BAD_REQUEST, "bad").keep_alive());
        assert!(!ErrorResponser::new(StatusCode::INTERNAL_SERVER_ERROR, "oops").keep_alive());
        assert!(ErrorResponser::new(StatusCode::NOT_FOUND, "missing").keep_alive());

        let mut forbidden = ErrorResponser::new(StatusCode::FORBIDDEN, "no");
        forbidden.set_keep_alive(true);
        assert!(!forbidden.keep_alive());

        let output = written(async |stream| {
            ErrorResponser::new(StatusCode::BAD_REQUEST, "unsafe path").send(stream).await.unwrap();
        })
        .await;
        assert_eq!(
            output,
            "HTTP/1.1 400 Bad Request\r\ncontent-type: text/html; charset=utf-8\r\nconnection: close\r\ncontent-length: 11\r\n\r\nunsafe path"
        );
    }

    #[tokio::test]
    async fn head_only_error_response() {
        let output = written(async |stream| {
            ErrorResponser::new(StatusCode::NOT_FOUND, "missing").send_head(stream).await.unwrap();
            TextResponser::new(StatusCode::OK, "next").send(stream).await.unwrap();
        })
        .await;
        assert_eq!(
            output,
            "HTTP/1.1 404 Not Found\r\ncontent-type: text/html; charset=utf-8\r\nconnection: keep-alive\r\ncontent-length: 7\r\n\r\n\
             HTTP/1.1 200 OK\r\ncontent-type: text/html; charset=utf-8\r\nconnection: keep-alive\r\ncontent-length: 4\r\n\r\nnext"
        );
    }
}

//! Serves `./web` on 127.0.0.1:8080 with one route and a raw echo for upgraded sockets.
//!
//! Pass a JSON config file as the first argument to override the defaults.

use async_trait::async_trait;
use embed_http::connection::{BoxTransport, ConnectionContext};
use embed_http::handler::BoxError;
use embed_http::protocol::RequestEntity;
use embed_http::response::TextResponser;
use embed_http::stream::MessageStream;
use embed_http::websocket::Messager;
use embed_web::router::handler_fn;
use embed_web::{Server, ServerConfig};
use futures::FutureExt;
use http::StatusCode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Echoes whatever arrives on the upgraded connection, frames untouched.
struct RawEcho;

#[async_trait]
impl Messager for RawEcho {
    async fn accept(
        self: Box<Self>,
        _request: RequestEntity,
        stream: MessageStream<BoxTransport>,
        _context: ConnectionContext,
    ) -> Result<(), BoxError> {
        let (mut io, leftover) = stream.into_inner();
        io.write_all(&leftover).await?;

        let mut buf = vec![0u8; 4096];
        loop {
            let read = io.read(&mut buf).await?;
            if read == 0 {
                return Ok(());
            }
            io.write_all(&buf[..read]).await?;
        }
    }
}

#[tokio::main]
async fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_json_file(path).unwrap(),
        None => ServerConfig { web_root: "./web".into(), ..ServerConfig::default() },
    };

    Server::builder()
        .config(config)
        .route(
            "/api/status",
            handler_fn(|request, stream| {
                async move {
                    let mut response = TextResponser::new(StatusCode::OK, r#"{"status":"ok"}"#)
                        .with_content_type(&mime::APPLICATION_JSON);
                    response.set_keep_alive(request.keep_alive());
                    let keep_alive = response.keep_alive();
                    response.send(stream).await?;
                    Ok(keep_alive)
                }
                .boxed()
            }),
        )
        .messager_factory(|_request: &RequestEntity, _context: &ConnectionContext| {
            Some(Box::new(RawEcho) as Box<dyn Messager>)
        })
        .build()
        .unwrap()
        .start()
        .await
        .unwrap();
}

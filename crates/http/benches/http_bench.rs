use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use embed_http::codec::{RequestDecoder, ResponseEncoder};
use embed_http::connection::{ConnectionContext, HttpConnection};
use embed_http::handler::{BoxError, Service};
use embed_http::protocol::{Message, PayloadItem, PayloadSize, RequestEntity, ResponseHead};
use embed_http::response::TextResponser;
use embed_http::stream::MessageStream;
use http::{Response, StatusCode};
use std::hint::black_box;
use std::{
    io,
    net::SocketAddr,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

// in-memory transport: serves `read_data`, swallows writes
struct MockIO {
    read_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

struct HelloService;

#[async_trait]
impl Service<MockIO> for HelloService {
    async fn dispatch(&self, _request: &RequestEntity, stream: &mut MessageStream<MockIO>) -> Result<bool, BoxError> {
        TextResponser::new(StatusCode::OK, "Hello World!").send(stream).await?;
        Ok(true)
    }
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\nUser-Agent: criterion\r\nAccept: */*\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&request[..]);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_chunked_response(c: &mut Criterion) {
    let chunk = Bytes::from(vec![b'x'; 1024]);

    c.bench_function("encode_chunked_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            let head: ResponseHead = Response::new(());
            encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Chunked)), &mut bytes).unwrap();
            for _ in 0..8 {
                encoder.encode(Message::<(ResponseHead, PayloadSize), _>::Payload(PayloadItem::Chunk(chunk.clone())), &mut bytes).unwrap();
            }
            encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_pipelined_connection(c: &mut Criterion) {
    let request = "GET / HTTP/1.1\r\nHost: localhost\r\n\r\n".repeat(10).into_bytes();
    let service = Arc::new(HelloService);
    let addr: SocketAddr = ([127, 0, 0, 1], 8080).into();
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    c.bench_function("process_pipelined_requests", |b| {
        b.to_async(&runtime).iter(|| {
            let connection = HttpConnection::new(MockIO::new(request.clone()), ConnectionContext::new(addr, addr));
            let service = service.clone();
            async move { black_box(connection.process(service).await.unwrap()) }
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_chunked_response, bench_pipelined_connection);
criterion_main!(benches);

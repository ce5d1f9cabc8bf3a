use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::connection::{ConnectionContext, Transport};
use crate::handler::Service;
use crate::protocol::{HttpError, RequestEntity};
use crate::stream::MessageStream;
use crate::websocket;

/// Drives one connection through its requests.
///
/// ```text
/// AwaitRequest -> Dispatch -> AwaitRequest    handler kept the connection, ceiling not reached
///                          -> Upgrade         websocket handshake, then the stream is handed off
///                          -> Closing         anything else
/// ```
#[derive(Debug)]
pub struct HttpConnection<S> {
    stream: MessageStream<S>,
    context: ConnectionContext,
}

#[derive(Debug)]
enum State {
    AwaitRequest(Option<RequestEntity>),
    Dispatch(RequestEntity),
    Upgrade(RequestEntity),
    Closing,
}

impl<S: Transport> HttpConnection<S> {
    pub fn new(io: S, context: ConnectionContext) -> Self {
        Self { stream: MessageStream::new(io), context }
    }

    pub fn context(&self) -> &ConnectionContext {
        &self.context
    }

    /// Serves requests until the connection ends.
    ///
    /// Failures the peer caused are answered on the wire and end the connection with
    /// `Ok`; an `Err` means a response could not be written.
    pub async fn process<H>(mut self, service: Arc<H>) -> Result<(), HttpError>
    where
        H: Service<S> + ?Sized,
    {
        let mut state = State::AwaitRequest(None);

        loop {
            state = match state {
                State::AwaitRequest(previous) => self.await_request(previous, service.as_ref()).await?,
                State::Dispatch(request) if request.is_websocket() => State::Upgrade(request),
                State::Dispatch(request) => self.dispatch(request, service.as_ref()).await?,
                State::Upgrade(request) => return self.upgrade(request, service.as_ref()).await,
                State::Closing => break,
            };
        }

        debug!(remote = %self.context.remote(), processed = self.context.processed(), "closing connection");
        match self.stream.shutdown().await {
            Err(e) if !e.is_connection_lost() => Err(e.into()),
            _ => Ok(()),
        }
    }

    async fn await_request<H>(&mut self, previous: Option<RequestEntity>, service: &H) -> Result<State, HttpError>
    where
        H: Service<S> + ?Sized,
    {
        let captured = match &previous {
            None => self.stream.capture().await.map(Some),
            Some(previous) => self.stream.next(previous).await,
        };

        match captured {
            Ok(Some(request)) => Ok(State::Dispatch(request)),
            Ok(None) => Ok(State::Closing),
            Err(e) if e.is_connection_lost() => {
                debug!(remote = %self.context.remote(), "connection lost while waiting for a request");
                Ok(State::Closing)
            }
            Err(e) => {
                warn!(remote = %self.context.remote(), cause = %e, "malformed request");
                service.bad_request(&e, &mut self.stream).await?;
                Ok(State::Closing)
            }
        }
    }

    async fn dispatch<H>(&mut self, request: RequestEntity, service: &H) -> Result<State, HttpError>
    where
        H: Service<S> + ?Sized,
    {
        if request.expects_continue() && request.has_body() {
            self.stream.send_continue().await?;
            debug!("sent 100 continue");
        }

        match service.dispatch(&request, &mut self.stream).await {
            Ok(true) => {
                if self.context.record_processed() {
                    return Ok(State::AwaitRequest(Some(request)));
                }
                info!(
                    remote = %self.context.remote(),
                    max = self.context.max_request_per_connection(),
                    "request ceiling reached"
                );
                Ok(State::Closing)
            }
            Ok(false) => Ok(State::Closing),
            Err(e) => {
                error!(method = %request.method(), path = request.path(), cause = %e, "request handling failed");
                if self.stream.response_pending() {
                    // a response is already half written, a 500 would corrupt it
                    return Ok(State::Closing);
                }
                service.server_error(&e, &mut self.stream).await?;
                Ok(State::Closing)
            }
        }
    }

    async fn upgrade<H>(mut self, request: RequestEntity, service: &H) -> Result<(), HttpError>
    where
        H: Service<S> + ?Sized,
    {
        if !websocket::upgrade(&request, &mut self.stream).await? {
            self.stream.shutdown().await?;
            return Ok(());
        }

        match service.messager(&request, &self.context) {
            Some(messager) => {
                if let Err(e) = messager.accept(request, self.stream, self.context).await {
                    warn!(cause = %e, "websocket session ended with error");
                }
            }
            None => {
                debug!(path = request.path(), "no messager for upgraded connection");
                self.stream.shutdown().await?;
            }
        }

        Ok(())
    }
}

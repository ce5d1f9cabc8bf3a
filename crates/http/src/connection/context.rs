use std::net::SocketAddr;

/// Requests one connection may serve before it is closed.
pub const DEFAULT_MAX_REQUEST_PER_CONNECTION: usize = 20;

/// What the driver knows about a connection besides its bytes.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    local: SocketAddr,
    remote: SocketAddr,
    processed: usize,
    max_request_per_connection: usize,
}

impl ConnectionContext {
    pub fn new(local: SocketAddr, remote: SocketAddr) -> Self {
        Self { local, remote, processed: 0, max_request_per_connection: DEFAULT_MAX_REQUEST_PER_CONNECTION }
    }

    pub fn with_max_request_per_connection(mut self, max_request_per_connection: usize) -> Self {
        self.max_request_per_connection = max_request_per_connection;
        self
    }

    pub fn local(&self) -> SocketAddr {
        self.local
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Requests answered so far with the connection kept alive.
    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn max_request_per_connection(&self) -> usize {
        self.max_request_per_connection
    }

    /// Counts one more served request; `false` once the ceiling is reached.
    pub(crate) fn record_processed(&mut self) -> bool {
        self.processed += 1;
        self.processed < self.max_request_per_connection
    }
}

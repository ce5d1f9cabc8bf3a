//! Response head type used by the encoders.
//!
//! The head is a plain `http::Response<()>`: status, version and headers, with the
//! body written separately as payload items.

use http::Response;

/// Type alias for HTTP response headers.
pub type ResponseHead = Response<()>;

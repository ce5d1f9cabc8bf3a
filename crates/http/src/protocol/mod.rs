//! Core HTTP protocol abstractions.
//!
//! - **Message Handling** ([`Message`], [`PayloadItem`], [`PayloadSize`]): headers or
//!   payload chunks flowing through the codecs
//! - **Request Processing** ([`RequestHeader`], [`RequestEntity`]): a parsed request and
//!   the protocol flags derived from it
//! - **Response Processing** ([`ResponseHead`]): response headers before the body
//! - **Error Handling** ([`HttpError`], [`ParseError`], [`SendError`])

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod request;
pub use request::RequestEntity;
pub use request::RequestHeader;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

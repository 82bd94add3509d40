//! Core HTTP protocol abstractions.
//!
//! This module provides the types shared by the parsing and the writing side
//! of a connection. None of them perform I/O.
//!
//! # Architecture
//!
//! - **Headers** ([`headers`]): the case-insensitive, comma-merging
//!   [`Headers`] collection and its incremental field line parser
//!
//! - **Request Processing** ([`request`]): the parsed request
//!   - [`RequestLine`]: method, target and bare version
//!   - [`Request`]: request line, headers, body and [`ParseState`]
//!
//! - **Response Processing** ([`response`], [`message`]): what a response
//!   writer emits
//!   - [`ResponsePart`]: a single piece of a response handed to the encoder
//!   - [`PayloadSize`]: fixed length, chunked, empty or close-delimited body framing
//!   - [`WriterPhase`]: ordering enforced while writing
//!
//! - **Error Handling** ([`error`]): error types
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request parsing errors
//!   - [`SendError`]: Response sending errors

mod headers;
pub use headers::Headers;
pub(crate) use headers::{CRLF, find_crlf};

mod message;
pub use message::PayloadSize;
pub use message::ResponsePart;

mod request;
pub use request::HTTP_VERSION;
pub use request::ParseState;
pub use request::Request;
pub use request::RequestLine;

mod response;
pub use response::WriterPhase;
pub use response::default_headers;

mod error;
pub use error::HandlerError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

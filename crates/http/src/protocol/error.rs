use std::error::Error;
use std::io;
use thiserror::Error;

use crate::protocol::WriterPhase;

/// Boxed error returned by application handlers.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    ApplicationError { source: HandlerError },
}

impl HttpError {
    pub fn handler<E: Into<HandlerError>>(e: E) -> Self {
        Self::ApplicationError { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request-line")]
    MalformedRequestLine,

    #[error("unsupported http version: {version}")]
    UnsupportedVersion { version: String },

    #[error("malformed field line")]
    MalformedFieldLine,

    #[error("malformed field name: {name:?}")]
    MalformedFieldName { name: String },

    #[error("end of stream, request incomplete")]
    IncompleteRequest,

    #[error("request in error state")]
    RequestInErrorState,

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("body size too large, content-length: {content_length} exceed the limit {max_size}")]
    TooLargeBody { content_length: u64, max_size: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn unsupported_version<S: ToString>(version: S) -> Self {
        Self::UnsupportedVersion { version: version.to_string() }
    }

    pub fn malformed_field_name<S: ToString>(name: S) -> Self {
        Self::MalformedFieldName { name: name.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(content_length: u64, max_size: u64) -> Self {
        Self::TooLargeBody { content_length, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// Returns true when the peer sent bytes we refuse to parse, as opposed to
    /// the stream ending or failing underneath us.
    ///
    /// Only these errors can still be answered with `400 Bad Request`.
    pub fn is_bad_request(&self) -> bool {
        !matches!(self, Self::IncompleteRequest | Self::Io { .. })
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("unrecognized status code: {code}")]
    UnrecognizedStatus { code: u16 },

    #[error("out of order write, expect {expected:?} but writer is {actual:?}")]
    OutOfOrder { expected: WriterPhase, actual: WriterPhase },

    #[error("chunk framing requested but the response body is not chunked")]
    NotChunked,

    #[error("body length mismatch, declared content-length {declared} but got {actual} bytes")]
    BodyLengthMismatch { declared: u64, actual: u64 },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn unrecognized_status(code: u16) -> Self {
        Self::UnrecognizedStatus { code }
    }

    pub fn out_of_order(expected: WriterPhase, actual: WriterPhase) -> Self {
        Self::OutOfOrder { expected, actual }
    }

    pub fn body_length_mismatch(declared: u64, actual: u64) -> Self {
        Self::BodyLengthMismatch { declared, actual }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

//! HTTP request representation.
//!
//! A [`Request`] is built up in place by [`RequestParser`](crate::codec::RequestParser)
//! while bytes arrive, and handed to the handler once its [`ParseState`] reaches
//! [`ParseState::Done`].

use std::fmt;

use bytes::{Bytes, BytesMut};

use crate::protocol::Headers;

/// The only protocol version accepted on the request line.
pub const HTTP_VERSION: &str = "1.1";

/// The first line of a request: `METHOD SP TARGET SP VERSION`.
///
/// `http_version` holds the bare version token, so a request sent with
/// `HTTP/1.1` reports `"1.1"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    http_version: String,
}

impl RequestLine {
    pub fn new<M: Into<String>, T: Into<String>, V: Into<String>>(method: M, target: T, http_version: V) -> Self {
        Self { method: method.into(), target: target.into(), http_version: http_version.into() }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn http_version(&self) -> &str {
        &self.http_version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.http_version)
    }
}

/// Progress of a request through the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseState {
    /// Waiting for the request line.
    #[default]
    Init,
    /// Request line stored, reading field lines.
    ParsingHeaders,
    /// Header section complete, reading exactly `content_length` body bytes.
    ParsingBody { content_length: u64 },
    /// The request is complete.
    Done,
    /// The request failed, no further input is accepted.
    Error,
}

impl ParseState {
    /// Returns true once the request line and all header lines were read.
    #[inline]
    pub fn is_head_complete(&self) -> bool {
        matches!(self, ParseState::ParsingBody { .. } | ParseState::Done)
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, ParseState::Done)
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, ParseState::Error)
    }
}

/// An HTTP request with its head and the full body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub(crate) request_line: RequestLine,
    pub(crate) headers: Headers,
    pub(crate) body: BytesMut,
    pub(crate) state: ParseState,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_line(&self) -> &RequestLine {
        &self.request_line
    }

    pub fn method(&self) -> &str {
        self.request_line.method()
    }

    pub fn target(&self) -> &str {
        self.request_line.target()
    }

    pub fn http_version(&self) -> &str {
        self.request_line.http_version()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Splits the request into its line, headers and body.
    pub fn into_parts(self) -> (RequestLine, Headers, Bytes) {
        (self.request_line, self.headers, self.body.freeze())
    }
}

//! Incremental HTTP/1.1 request parser.
//!
//! The parser is a state machine over [`ParseState`]:
//!
//! ```text
//! Init ──request line──▶ ParsingHeaders ──blank line──▶ ParsingBody ──content-length bytes──▶ Done
//!                                            └──────── no content-length / 0 ───────────────▶ Done
//! any parse failure ──▶ Error
//! ```
//!
//! Input is handed to [`RequestParser::feed`] as whatever the socket produced so
//! far. The parser never keeps bytes it did not consume: the caller drops the
//! consumed prefix and presents the rest again, together with newly read bytes,
//! on the next call. A single call advances through as many states as the
//! input allows.

use std::str;

use tracing::trace;

use crate::ensure;
use crate::protocol::{CRLF, HTTP_VERSION, ParseError, ParseState, Request, RequestLine, find_crlf};

/// Parses a single request from a byte stream delivered in arbitrary pieces.
#[derive(Debug, Clone)]
pub struct RequestParser {
    request: Request,
    head_bytes: usize,
    max_body_bytes: u64,
    taken: bool,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self { request: Request::new(), head_bytes: 0, max_body_bytes: u64::MAX, taken: false }
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser refusing declared bodies larger than `max_body_bytes`.
    pub fn with_max_body_bytes(max_body_bytes: u64) -> Self {
        Self { max_body_bytes, ..Self::default() }
    }

    pub fn state(&self) -> ParseState {
        self.request.state
    }

    /// The request parsed so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Bytes consumed by the request line and header section so far.
    pub fn head_bytes(&self) -> usize {
        self.head_bytes
    }

    /// Moves the parser into the terminal error state.
    pub fn fail(&mut self) {
        self.request.state = ParseState::Error;
    }

    /// Takes the finished request out of the parser.
    ///
    /// Returns `None` unless the parser is done, and for every call after
    /// the request was handed out. The parser stays in [`ParseState::Done`],
    /// so it can't be used for a second request.
    pub fn take_request(&mut self) -> Option<Request> {
        if self.taken || !self.request.state.is_done() {
            return None;
        }
        self.taken = true;
        let request = std::mem::take(&mut self.request);
        self.request.state = ParseState::Done;
        Some(request)
    }

    /// Consumes as much of `data` as possible and returns how many bytes were
    /// used.
    ///
    /// Returning fewer bytes than `data.len()` without an error means more
    /// input is needed, or that the request is done and the rest belongs to
    /// nobody.
    ///
    /// # Errors
    ///
    /// Any parse error moves the parser to [`ParseState::Error`], after which
    /// every call fails with [`ParseError::RequestInErrorState`].
    pub fn feed(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        self.parse(data).inspect_err(|_| self.fail())
    }

    fn parse(&mut self, data: &[u8]) -> Result<usize, ParseError> {
        let mut read = 0;

        loop {
            let current = &data[read..];
            match self.request.state {
                ParseState::Error => return Err(ParseError::RequestInErrorState),

                ParseState::Init => {
                    let Some((request_line, n)) = parse_request_line(current)? else {
                        break;
                    };
                    trace!(request_line = %request_line, "parsed request line");

                    self.request.request_line = request_line;
                    self.request.state = ParseState::ParsingHeaders;
                    self.head_bytes += n;
                    read += n;
                }

                ParseState::ParsingHeaders => {
                    let (n, done) = self.request.headers.parse_from(current)?;
                    self.head_bytes += n;
                    read += n;

                    if !done {
                        break;
                    }

                    self.request.state = match self.request.headers.content_length() {
                        Some(content_length) if content_length > 0 => {
                            ensure!(
                                content_length <= self.max_body_bytes,
                                ParseError::too_large_body(content_length, self.max_body_bytes)
                            );
                            ParseState::ParsingBody { content_length }
                        }
                        _ => ParseState::Done,
                    };
                }

                ParseState::ParsingBody { content_length } => {
                    if current.is_empty() {
                        break;
                    }

                    let body = &mut self.request.body;
                    let remaining = content_length - body.len() as u64;
                    let n = usize::try_from(remaining).map_or(current.len(), |remaining| remaining.min(current.len()));

                    body.extend_from_slice(&current[..n]);
                    read += n;

                    if body.len() as u64 == content_length {
                        self.request.state = ParseState::Done;
                    }
                }

                ParseState::Done => break,
            }
        }

        Ok(read)
    }
}

/// Parses the request line at the start of `data`.
///
/// Returns `Ok(None)` when no full line is available yet, otherwise the
/// line together with the number of bytes it occupied including the CRLF.
fn parse_request_line(data: &[u8]) -> Result<Option<(RequestLine, usize)>, ParseError> {
    let Some(index) = find_crlf(data) else {
        return Ok(None);
    };

    let line = str::from_utf8(&data[..index]).map_err(|e| {
        trace!(cause = %e, "request line is not utf-8");
        ParseError::MalformedRequestLine
    })?;

    let parts = line.split(' ').collect::<Vec<_>>();
    let [method, target, version] = parts.as_slice() else {
        return Err(ParseError::MalformedRequestLine);
    };
    ensure!(!method.is_empty() && !target.is_empty(), ParseError::MalformedRequestLine);

    let http_version = normalize_version(version).ok_or_else(|| ParseError::unsupported_version(*version))?;

    Ok(Some((RequestLine::new(*method, *target, http_version), index + CRLF.len())))
}

/// Accepts `HTTP/1.1` or a bare `1.1` and returns the bare version.
fn normalize_version(version: &str) -> Option<&'static str> {
    let bare = match version.split_once('/') {
        Some(("HTTP", bare)) => bare,
        Some(_) => return None,
        None => version,
    };

    (bare == HTTP_VERSION).then_some(HTTP_VERSION)
}

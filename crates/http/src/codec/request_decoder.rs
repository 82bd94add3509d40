//! HTTP request decoder module
//!
//! This module connects the [`RequestParser`] state machine to a byte stream
//! through tokio-util's [`Decoder`] trait, so a connection can drive it with
//! [`FramedRead`](tokio_util::codec::FramedRead).
//!
//! The read buffer is a growable [`BytesMut`]. After every parser call the
//! consumed prefix is dropped with [`Buf::advance`], and whatever is left
//! stays at the front of the buffer to be presented again together with the
//! next read.
//!
//! # Example
//!
//! ```
//! use wire_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET / HTTP/1.1\r\nHo"[..]);
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"st: x\r\n\r\n");
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.headers().get("host"), Some("x"));
//! ```

use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::RequestParser;
use crate::protocol::{ParseError, Request};

/// Maximum size in bytes allowed for the request line and header section
pub const DEFAULT_MAX_HEAD_BYTES: usize = 8 * 1024;

/// Maximum declared content-length accepted by default
pub const DEFAULT_MAX_BODY_BYTES: u64 = 8 * 1024 * 1024;

/// A decoder yielding exactly one [`Request`] from a byte stream.
///
/// # State Machine
///
/// Parsing progress lives in the wrapped [`RequestParser`]. Once the request
/// has been yielded the decoder is finished and yields nothing more.
#[derive(Debug)]
pub struct RequestDecoder {
    parser: RequestParser,
    max_head_bytes: usize,
    finished: bool,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` with the default limits
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder with explicit limits for the head and the body
    pub fn with_limits(max_head_bytes: usize, max_body_bytes: u64) -> Self {
        Self { parser: RequestParser::with_max_body_bytes(max_body_bytes), max_head_bytes, finished: false }
    }

    pub fn parser(&self) -> &RequestParser {
        &self.parser
    }

    fn do_decode(&mut self, src: &mut BytesMut) -> Result<Option<Request>, ParseError> {
        if self.finished {
            return Ok(None);
        }

        let consumed = self.parser.feed(src)?;
        src.advance(consumed);
        trace!(consumed, remaining = src.len(), state = ?self.parser.state(), "fed request parser");

        // bytes of an unfinished line are buffered until its CRLF shows up,
        // bound them together with everything already parsed of the head
        let pending = if self.parser.state().is_head_complete() { 0 } else { src.len() };
        let head_size = self.parser.head_bytes() + pending;
        if head_size > self.max_head_bytes {
            self.parser.fail();
            return Err(ParseError::too_large_header(head_size, self.max_head_bytes));
        }

        if let Some(request) = self.parser.take_request() {
            self.finished = true;
            return Ok(Some(request));
        }

        Ok(None)
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MAX_HEAD_BYTES, DEFAULT_MAX_BODY_BYTES)
    }
}

impl Decoder for RequestDecoder {
    type Item = Request;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: the request is complete, body included
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: encountered a parsing error
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.do_decode(src)
    }

    /// Called once the peer closed its side of the stream.
    ///
    /// Anything short of a complete request at this point is reported as
    /// [`ParseError::IncompleteRequest`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.finished {
            return Ok(None);
        }

        match self.do_decode(src)? {
            Some(request) => Ok(Some(request)),
            None => {
                self.parser.fail();
                Err(ParseError::IncompleteRequest)
            }
        }
    }
}

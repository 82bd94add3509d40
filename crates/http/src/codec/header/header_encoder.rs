//! HTTP header encoder implementation for serializing response heads
//!
//! This module writes the status line and header blocks of a response. The
//! same header block format serves the header section and the trailer
//! section that follows the last chunk of a chunked body.
//!
//! # Features
//!
//! - Status line with the canonical reason phrase
//! - `name: value` lines in the collection's iteration order
//! - Terminating blank line included in every header block

use crate::protocol::{Headers, SendError};

use bytes::{BufMut, BytesMut};

use http::StatusCode;
use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::error;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for status lines and header blocks implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<StatusCode> for HeaderEncoder {
    type Error = SendError;

    /// Encodes `HTTP/1.1 <code> <reason>\r\n`.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::UnrecognizedStatus`] and writes nothing when the
    /// status has no canonical reason phrase.
    fn encode(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let Some(reason) = status.canonical_reason() else {
            error!(status = status.as_u16(), "unrecognized status code");
            return Err(SendError::unrecognized_status(status.as_u16()));
        };

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", status.as_str(), reason)?;
        Ok(())
    }
}

impl Encoder<&Headers> for HeaderEncoder {
    type Error = SendError;

    /// Encodes every field as `name: value\r\n`, then the blank line.
    fn encode(&mut self, headers: &Headers, dst: &mut BytesMut) -> Result<(), Self::Error> {
        for (name, value) in headers {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
pub(crate) struct FastWrite<'a>(pub(crate) &'a mut BytesMut);

impl Write for FastWrite<'_> {
    /// Writes a buffer into this writer, returning how many bytes were written.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    /// Flush this output stream, ensuring that all intermediately buffered contents reach their destination.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::default_headers;

    #[test]
    fn status_lines() {
        let mut dst = BytesMut::new();

        HeaderEncoder.encode(StatusCode::OK, &mut dst).unwrap();
        HeaderEncoder.encode(StatusCode::BAD_REQUEST, &mut dst).unwrap();
        HeaderEncoder.encode(StatusCode::INTERNAL_SERVER_ERROR, &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.1 200 OK\r\nHTTP/1.1 400 Bad Request\r\nHTTP/1.1 500 Internal Server Error\r\n"[..]);
    }

    #[test]
    fn unknown_status_writes_nothing() {
        let mut dst = BytesMut::new();
        let status = StatusCode::from_u16(599).unwrap();

        let result = HeaderEncoder.encode(status, &mut dst);

        assert!(matches!(result, Err(SendError::UnrecognizedStatus { code: 599 })));
        assert!(dst.is_empty());
    }

    #[test]
    fn header_block() {
        let mut dst = BytesMut::new();

        HeaderEncoder.encode(&default_headers(0), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"content-length: 0\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\n"[..]);
    }

    #[test]
    fn empty_header_block_is_blank_line() {
        let mut dst = BytesMut::new();

        HeaderEncoder.encode(&Headers::new(), &mut dst).unwrap();

        assert_eq!(&dst[..], &b"\r\n"[..]);
    }
}

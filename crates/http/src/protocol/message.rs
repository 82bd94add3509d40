use http::StatusCode;

use crate::protocol::Headers;

/// One piece of a response, in the order it goes onto the wire.
///
/// The generic `'a` lets header collections and body bytes be borrowed from
/// the caller, nothing is copied until the encoder writes into its buffer.
#[derive(Debug, Clone, Copy)]
pub enum ResponsePart<'a> {
    /// `HTTP/1.1 <code> <reason>`
    StatusLine(StatusCode),
    /// The header section, or the trailer section once the last chunk is out
    Headers(&'a Headers),
    /// Body bytes, framed as a chunk when the body is chunked
    Body(&'a [u8]),
    /// The zero length chunk ending a chunked body
    LastChunk,
    /// Completes whatever framing is still open
    Finish,
}

/// Represents the size information of an HTTP payload.
///
/// This enum is used to determine how the payload should be written:
/// - Known length: write exactly that many bytes
/// - Chunked: frame each write as a chunk
/// - Empty: no payload at all
/// - Close delimited: no declared length, bytes pass through until the
///   connection closes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Payload with known length in bytes
    Length(u64),
    /// Payload using chunked transfer encoding
    Chunked,
    /// Empty payload (no body)
    Empty,
    /// Neither `content-length` nor chunked, the body ends with the connection
    CloseDelimited,
}

impl PayloadSize {
    /// Chooses the body framing announced by a response header section.
    ///
    /// `transfer-encoding` whose last coding is `chunked` wins, refer:
    /// <https://www.rfc-editor.org/rfc/rfc9112.html#name-transfer-encoding>.
    /// Otherwise a declared `content-length` is used, an unparsable value
    /// meaning an empty body. Without either the body is close delimited,
    /// refer: <https://www.rfc-editor.org/rfc/rfc9112.html#section-6.3>.
    pub fn from_headers(headers: &Headers) -> Self {
        if is_chunked(headers.get("transfer-encoding")) {
            return PayloadSize::Chunked;
        }

        if !headers.contains("content-length") {
            return PayloadSize::CloseDelimited;
        }

        match headers.content_length() {
            Some(0) | None => PayloadSize::Empty,
            Some(length) => PayloadSize::Length(length),
        }
    }

    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, PayloadSize::Chunked)
    }

    /// Returns true if the payload is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty)
    }
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&str>) -> bool {
    header_value
        .and_then(|value| value.rsplit(',').next())
        .is_some_and(|last| last.trim().eq_ignore_ascii_case("chunked"))
}

//! HTTP response helpers.
//!
//! Responses are never materialized as a value: a handler writes them piece
//! by piece through a [`ResponseWriter`](crate::connection::ResponseWriter).
//! This module holds what that writer needs to know about the protocol
//! ordering, and the header block most responses start from.

use crate::protocol::Headers;

/// Where a response writer is in the status → headers → body → trailers order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterPhase {
    /// Nothing written yet, a status line is expected.
    AwaitingStatus,
    /// Status line written, the header section is expected.
    AwaitingHeaders,
    /// Header section written, body bytes may follow.
    AwaitingBody,
    /// The last chunk of a chunked body was written, trailers are expected.
    AwaitingTrailers,
    /// The response is complete.
    Closed,
}

/// Headers for a simple fixed-length plain text response.
///
/// Callers adjust the result before writing it, e.g. replacing the
/// `content-type`, or deleting `content-length` in favor of
/// `transfer-encoding: chunked`.
pub fn default_headers(content_length: u64) -> Headers {
    let mut headers = Headers::with_capacity(3);
    headers.set("content-length", content_length.to_string());
    headers.set("connection", "close");
    headers.set("content-type", mime::TEXT_PLAIN.as_ref());
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_headers_content() {
        let headers = default_headers(42);

        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("content-length", "42"), ("connection", "close"), ("content-type", "text/plain")]
        );
    }
}

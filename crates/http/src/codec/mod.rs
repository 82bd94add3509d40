//! HTTP codec module for decoding requests and encoding responses
//!
//! This module provides the sans-IO core of the server. Nothing here touches
//! a socket: decoders consume bytes that were already read, encoders produce
//! bytes into a buffer that someone else writes out.
//!
//! # Architecture
//!
//! The codec module is organized into several components:
//!
//! - Request handling:
//!   - [`RequestParser`]: the incremental request state machine
//!   - [`RequestDecoder`]: adapts the parser to tokio-util's `Decoder`,
//!     compacting the read buffer and reporting early end of stream
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: encodes the parts of a response in order
//!   - Header encoding via the `header` module
//!   - Payload encoding via the `body` module
//!
//! # Example
//!
//! ```
//! use wire_http::codec::{RequestDecoder, ResponseEncoder};
//! use wire_http::protocol::{default_headers, ResponsePart};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//! use http::StatusCode;
//!
//! // Decode incoming request
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);
//! let request = decoder.decode(&mut request_buffer).unwrap().unwrap();
//! assert_eq!(request.target(), "/");
//!
//! // Encode outgoing response
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! let headers = default_headers(2);
//! encoder.encode(ResponsePart::StatusLine(StatusCode::OK), &mut response_buffer).unwrap();
//! encoder.encode(ResponsePart::Headers(&headers), &mut response_buffer).unwrap();
//! encoder.encode(ResponsePart::Body(b"ok"), &mut response_buffer).unwrap();
//! ```

mod body;
mod header;
mod request_decoder;
mod request_parser;
mod response_encoder;

pub use header::HeaderEncoder;
pub use request_decoder::{DEFAULT_MAX_BODY_BYTES, DEFAULT_MAX_HEAD_BYTES, RequestDecoder};
pub use request_parser::RequestParser;
pub use response_encoder::ResponseEncoder;

//! HTTP body encoding module for writing response payloads
//!
//! Request bodies are read directly by the request parser, which only ever
//! sees `content-length` framed bodies. Responses can be written with either
//! framing.
//!
//! # Components
//!
//! - [`ChunkedEncoder`]: Implements chunked transfer encoding
//! - [`LengthEncoder`]: Handles fixed-length payload encoding
//! - [`PayloadEncoder`]: Main encoder that manages different encoding strategies
//!
//! # Features
//!
//! - Support for chunked transfer encoding (RFC 7230)
//! - Content-Length based payload handling with length accounting
//! - Efficient memory usage through BytesMut

mod chunked_encoder;
mod length_encoder;
mod payload_encoder;

pub use payload_encoder::PayloadEncoder;

//! HTTP header encoding module
//!
//! This module provides functionality for serializing the head of a response:
//! the status line and header blocks.
//!
//! # Components
//!
//! - [`HeaderEncoder`]: Encodes status lines and header blocks to bytes
//!   - Implements standard HTTP/1.1 status line formatting
//!   - Writes the header section and the trailer section of chunked bodies
//!
//! Request heads are parsed field line by field line in
//! [`Headers::parse_from`](crate::protocol::Headers::parse_from) instead, since
//! the request parser has to make progress on partial input.

mod header_encoder;

pub(crate) use header_encoder::FastWrite;
pub use header_encoder::HeaderEncoder;

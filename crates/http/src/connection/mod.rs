//! HTTP connection handling module
//!
//! This module drives one request/response exchange over an async byte
//! stream pair.
//!
//! # Components
//!
//! - [`HttpConnection`]: reads one request through the
//!   [`RequestDecoder`](crate::codec::RequestDecoder), runs the handler and
//!   closes the connection. Malformed requests are answered with `400`,
//!   handler failures with `500` when nothing was written yet.
//! - [`ResponseWriter`]: the ordered status → headers → body → trailers
//!   writer a handler responds through.

mod http_connection;
mod response_writer;

pub use http_connection::HttpConnection;
pub use response_writer::ResponseWriter;

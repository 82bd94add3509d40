//! HTTP/1.1 straight on top of a TCP stream
//!
//! This crate parses one request per connection with an incremental state
//! machine and lets a handler write the response piece by piece, with either
//! a fixed length or a chunked body followed by trailers. Every connection is
//! closed after its response.
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::StatusCode;
//! use tokio::io::AsyncWrite;
//! use wire_http::connection::ResponseWriter;
//! use wire_http::handler::Handler;
//! use wire_http::protocol::{HandlerError, Request};
//!
//! struct HelloWorld;
//!
//! #[async_trait]
//! impl Handler for HelloWorld {
//!     async fn call<W>(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError>
//!     where
//!         W: AsyncWrite + Unpin + Send,
//!     {
//!         let body = format!("Hello {}!\n", request.target());
//!         writer.write_status_line(StatusCode::OK)?;
//!         writer.write_headers(&ResponseWriter::<W>::default_headers(body.len() as u64)).await?;
//!         writer.write_body(body.as_bytes()).await?;
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let server = wire_http::server::serve(42069, HelloWorld).await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.close().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: headers, request, response phases and error types, no I/O
//! - [`codec`]: the request parser and decoder, the response encoders
//! - [`connection`]: one request/response exchange over a stream pair
//! - [`handler`]: the application callback
//! - [`server`] and [`config`]: the TCP accept loop and its settings
//!
//! # Limitations
//!
//! - HTTP/1.1 only, one request per connection
//! - Request bodies are delimited by `content-length` only, chunked request
//!   bodies are not understood
//! - Maximum head size 8KiB and maximum body size 8MiB unless configured

pub mod codec;
pub mod config;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;

mod utils;
pub(crate) use utils::ensure;

//! Request handler abstraction.
//!
//! A [`Handler`] receives the fully parsed [`Request`] together with the
//! connection's [`ResponseWriter`] and writes its response through it. The
//! connection finishes the response once the handler returns, so a handler
//! that forgets to end a chunked body still produces a well formed message.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use crate::connection::ResponseWriter;
use crate::protocol::{HandlerError, Request};

#[async_trait]
pub trait Handler: Send + Sync {
    /// Handles one request.
    ///
    /// Returning an error before anything was written makes the connection
    /// answer `500 Internal Server Error`.
    async fn call<W>(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send;
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler,
{
    async fn call<W>(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        (**self).call(writer, request).await
    }
}

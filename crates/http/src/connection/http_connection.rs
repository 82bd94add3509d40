use std::sync::Arc;

use futures::StreamExt;
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use crate::codec::RequestDecoder;
use crate::config::ServerConfig;
use crate::connection::ResponseWriter;
use crate::handler::Handler;
use crate::protocol::{HttpError, ParseError, Request, SendError, default_headers};

/// A single HTTP exchange over a reader/writer pair.
///
/// `HttpConnection` reads exactly one request, hands it to a [`Handler`]
/// together with a [`ResponseWriter`], completes the response and shuts the
/// write side down. A malformed request is answered with
/// `400 Bad Request`; a peer that goes away mid request gets no response.
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    writer: ResponseWriter<W>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, &ServerConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: &ServerConfig) -> Self {
        let decoder = RequestDecoder::with_limits(config.max_head_bytes(), config.max_body_bytes());
        Self {
            framed_read: FramedRead::with_capacity(reader, decoder, config.read_buffer_capacity()),
            writer: ResponseWriter::new(writer),
        }
    }

    pub async fn process<H>(mut self, handler: Arc<H>) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let outcome = self.do_process(handler.as_ref()).await;

        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "failed to shutdown connection");
        }

        outcome
    }

    async fn do_process<H>(&mut self, handler: &H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        let request = match self.framed_read.next().await {
            Some(Ok(request)) => request,

            Some(Err(e)) if e.is_bad_request() => {
                warn!(cause = %e, "malformed request, respond bad request");
                self.send_status(StatusCode::BAD_REQUEST).await?;
                return Err(e.into());
            }

            Some(Err(ParseError::IncompleteRequest)) | None => {
                info!("connection closed before a full request arrived");
                return Ok(());
            }

            Some(Err(e)) => {
                error!(cause = %e, "can't receive request");
                return Err(e.into());
            }
        };

        info!(request_line = %request.request_line(), "received request");
        self.handle(handler, request).await
    }

    async fn handle<H>(&mut self, handler: &H, request: Request) -> Result<(), HttpError>
    where
        H: Handler,
    {
        if let Err(e) = handler.call(&mut self.writer, request).await {
            error!(cause = %e, "handle request error");

            if self.writer.is_pristine() {
                self.writer.reset();
                self.send_status(StatusCode::INTERNAL_SERVER_ERROR).await?;
            } else {
                // part of the response is out already, complete what can be completed
                if let Err(e) = self.writer.finish().await {
                    debug!(cause = %e, "can't complete response after handler error");
                }
            }
            return Err(HttpError::handler(e));
        }

        if self.writer.is_pristine() {
            warn!(phase = ?self.writer.phase(), "handler returned without writing a response");
            self.writer.reset();
            return Ok(());
        }

        Ok(self.writer.finish().await?)
    }

    async fn send_status(&mut self, status: StatusCode) -> Result<(), SendError> {
        self.writer.write_status_line(status)?;
        self.writer.write_headers(&default_headers(0)).await?;
        self.writer.finish().await
    }
}

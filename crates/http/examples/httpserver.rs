use async_trait::async_trait;
use http::StatusCode;
use indoc::indoc;
use sha2::{Digest, Sha256};
use tokio::io::AsyncWrite;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use wire_http::config::DEFAULT_PORT;
use wire_http::connection::ResponseWriter;
use wire_http::handler::Handler;
use wire_http::protocol::{HandlerError, Headers, Request};

const BAD_REQUEST_HTML: &str = indoc! {r#"
    <html>
      <head>
        <title>400 Bad Request</title>
      </head>
      <body>
        <h1>Bad Request</h1>
        <p>Your request honestly kinda sucked.</p>
      </body>
    </html>
"#};

const INTERNAL_SERVER_ERROR_HTML: &str = indoc! {r#"
    <html>
      <head>
        <title>500 Internal Server Error</title>
      </head>
      <body>
        <h1>Internal Server Error</h1>
        <p>Okay, you know what? This one is on me.</p>
      </body>
    </html>
"#};

const OK_HTML: &str = indoc! {r#"
    <html>
      <head>
        <title>200 OK</title>
      </head>
      <body>
        <h1>Success!</h1>
        <p>Your request was an absolute banger.</p>
      </body>
    </html>
"#};

const STREAM_CHUNK_SIZE: usize = 32;
const MAX_STREAM_LINES: usize = 1000;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let server = match wire_http::server::serve(DEFAULT_PORT, Routes).await {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "error starting server");
            return;
        }
    };
    info!(port = DEFAULT_PORT, "server started");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(cause = %e, "unable to listen for shutdown signal");
    }

    server.close().await;
    info!("server gracefully stopped");
}

struct Routes;

#[async_trait]
impl Handler for Routes {
    async fn call<W>(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        if let Some(count) = stream_count(request.target()) {
            return stream_lines(writer, count).await;
        }

        let (status, body) = match request.target() {
            "/yourproblem" => (StatusCode::BAD_REQUEST, BAD_REQUEST_HTML),
            "/myproblem" => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_HTML),
            _ => (StatusCode::OK, OK_HTML),
        };

        let mut headers = ResponseWriter::<W>::default_headers(body.len() as u64);
        headers.replace("content-type", mime::TEXT_HTML.as_ref());

        writer.write_status_line(status)?;
        writer.write_headers(&headers).await?;
        writer.write_body(body.as_bytes()).await?;
        Ok(())
    }
}

/// Line count requested by `/stream/<n>`, capped at [`MAX_STREAM_LINES`].
fn stream_count(target: &str) -> Option<usize> {
    let count = target.strip_prefix("/stream/")?;
    Some(count.parse::<usize>().unwrap_or(0).min(MAX_STREAM_LINES))
}

/// Streams `count` numbered lines as a chunked body, followed by the SHA-256
/// digest and total length of the body as trailers.
async fn stream_lines<W>(writer: &mut ResponseWriter<W>, count: usize) -> Result<(), HandlerError>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut headers = ResponseWriter::<W>::default_headers(0);
    headers.delete("content-length");
    headers.set("transfer-encoding", "chunked");
    headers.set("trailer", "X-Content-SHA256, X-Content-Length");

    writer.write_status_line(StatusCode::OK)?;
    writer.write_headers(&headers).await?;

    let mut hasher = Sha256::new();
    let mut total = 0;
    for n in 0..count {
        let line = format!("{{\"line\": {n}, \"message\": \"streamed from wire-http\"}}\n");
        hasher.update(line.as_bytes());
        total += writer.write_chunks(line.as_bytes(), STREAM_CHUNK_SIZE).await?;
    }

    let mut trailers = Headers::new();
    trailers.set("X-Content-SHA256", format!("{:x}", hasher.finalize()));
    trailers.set("X-Content-Length", total.to_string());
    writer.write_trailers(&trailers).await?;
    Ok(())
}

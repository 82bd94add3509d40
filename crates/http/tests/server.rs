use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;
use indoc::indoc;
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Notify;

use wire_http::config::{ServerConfig, ShutdownMode};
use wire_http::connection::ResponseWriter;
use wire_http::handler::Handler;
use wire_http::protocol::{HandlerError, Headers, Request};
use wire_http::server::Server;

const CHUNKED_BODY: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

struct Routes;

#[async_trait]
impl Handler for Routes {
    async fn call<W>(&self, writer: &mut ResponseWriter<W>, request: Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match request.target() {
            "/yourproblem" => {
                writer.write_status_line(StatusCode::BAD_REQUEST)?;
                writer.write_headers(&ResponseWriter::<W>::default_headers(0)).await?;
            }
            "/chunked" => {
                let mut headers = ResponseWriter::<W>::default_headers(0);
                headers.delete("content-length");
                headers.set("transfer-encoding", "chunked");
                headers.set("trailer", "X-Content-SHA256");
                headers.set("trailer", "X-Content-Length");

                writer.write_status_line(StatusCode::OK)?;
                writer.write_headers(&headers).await?;
                writer.write_chunks(CHUNKED_BODY, 32).await?;

                let mut trailers = Headers::new();
                trailers.set("X-Content-SHA256", format!("{:x}", Sha256::digest(CHUNKED_BODY)));
                trailers.set("X-Content-Length", CHUNKED_BODY.len().to_string());
                writer.write_trailers(&trailers).await?;
            }
            "/headers" => {
                let mut headers = ResponseWriter::<W>::default_headers(0);
                headers.set("X-Custom", "one");
                headers.set("X-Custom", "two");
                writer.write_status_line(StatusCode::OK)?;
                writer.write_headers(&headers).await?;
            }
            _ => {
                let body = request.body().to_vec();
                writer.write_status_line(StatusCode::OK)?;
                writer.write_headers(&ResponseWriter::<W>::default_headers(body.len() as u64)).await?;
                writer.write_body(&body).await?;
            }
        }
        Ok(())
    }
}

/// Holds every request until released.
struct Gate {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl Handler for Gate {
    async fn call<W>(&self, writer: &mut ResponseWriter<W>, _request: Request) -> Result<(), HandlerError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        self.entered.notify_one();
        self.release.notified().await;

        writer.write_status_line(StatusCode::OK)?;
        writer.write_headers(&ResponseWriter::<W>::default_headers(0)).await?;
        Ok(())
    }
}

fn local_config() -> ServerConfig {
    ServerConfig::builder().address(([127, 0, 0, 1], 0)).build()
}

async fn send(addr: SocketAddr, request: &[u8]) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

fn crlf(s: &str) -> String {
    s.replace('\n', "\r\n")
}

#[tokio::test]
async fn yourproblem_is_bad_request() {
    let server = Server::bind(local_config(), Routes).await.unwrap();

    let response = send(
        server.local_addr(),
        crlf(indoc! {r"
            GET /yourproblem HTTP/1.1
            Host: localhost:42069
            User-Agent: curl/7.81.0
            Accept: */*

        "})
        .as_bytes(),
    )
    .await;

    assert_eq!(
        response,
        crlf(indoc! {r"
            HTTP/1.1 400 Bad Request
            content-length: 0
            connection: close
            content-type: text/plain

        "})
    );
    server.close().await;
}

#[tokio::test]
async fn malformed_request_is_bad_request() {
    let server = Server::bind(local_config(), Routes).await.unwrap();

    let response = send(server.local_addr(), b"GET / HTTP/1.1\r\nHost : localhost\r\n\r\n").await;

    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(response.ends_with("content-length: 0\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\n"));
    server.close().await;
}

#[tokio::test]
async fn incomplete_request_gets_no_response() {
    let server = Server::bind(local_config(), Routes).await.unwrap();

    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.write_all(b"POST /echo HTTP/1.1\r\nContent-Length: 20\r\n\r\nonly part").await.unwrap();
    stream.shutdown().await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    assert!(response.is_empty());
    server.close().await;
}

#[tokio::test]
async fn echoes_body_sent_byte_by_byte() {
    let server = Server::bind(local_config(), Routes).await.unwrap();
    let request = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";

    let mut stream = TcpStream::connect(server.local_addr()).await.unwrap();
    stream.set_nodelay(true).unwrap();
    for byte in request {
        stream.write_all(std::slice::from_ref(byte)).await.unwrap();
    }

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();

    assert_eq!(
        String::from_utf8(response).unwrap(),
        "HTTP/1.1 200 OK\r\ncontent-length: 5\r\nconnection: close\r\ncontent-type: text/plain\r\n\r\nhello"
    );
    server.close().await;
}

#[tokio::test]
async fn chunked_response_with_trailers() {
    let server = Server::bind(local_config(), Routes).await.unwrap();

    let response = send(server.local_addr(), b"GET /chunked HTTP/1.1\r\n\r\n").await;

    let (head, rest) = response.split_once("\r\n\r\n").unwrap();
    assert_eq!(
        head,
        crlf(indoc! {r"
            HTTP/1.1 200 OK
            connection: close
            content-type: text/plain
            transfer-encoding: chunked
            trailer: X-Content-SHA256,X-Content-Length"})
    );

    let body_and_last_chunk = crlf(indoc! {r"
        20
        abcdefghijklmnopqrstuvwxyz012345
        4
        6789
        0
    "});
    let trailer_section = rest.strip_prefix(body_and_last_chunk.as_str()).unwrap();

    let mut trailers = Headers::new();
    let (consumed, done) = trailers.parse_from(trailer_section.as_bytes()).unwrap();
    assert!(done);
    assert_eq!(consumed, trailer_section.len());
    assert_eq!(
        trailers.get("x-content-sha256"),
        Some("011fc2994e39d251141540f87a69092b3f22a86767f7283de7eeedb3897bedf6")
    );
    assert_eq!(trailers.get("x-content-length"), Some("36"));
    server.close().await;
}

#[tokio::test]
async fn response_header_section_parses_back() {
    let server = Server::bind(local_config(), Routes).await.unwrap();

    let response = send(server.local_addr(), b"GET /headers HTTP/1.1\r\n\r\n").await;
    let (status_line, header_section) = response.split_once("\r\n").unwrap();

    let mut parsed = Headers::new();
    let (consumed, done) = parsed.parse_from(header_section.as_bytes()).unwrap();

    let mut written = ResponseWriter::<Vec<u8>>::default_headers(0);
    written.set("X-Custom", "one");
    written.set("X-Custom", "two");

    assert_eq!(status_line, "HTTP/1.1 200 OK");
    assert!(done);
    assert_eq!(consumed, header_section.len());
    assert_eq!(parsed, written);
    assert_eq!(parsed.get("x-custom"), Some("one,two"));
    server.close().await;
}

#[tokio::test]
async fn max_connections_defers_accept() {
    let gate = Arc::new(Gate { entered: Notify::new(), release: Notify::new() });
    let config = ServerConfig::builder().address(([127, 0, 0, 1], 0)).max_connections(1).build();
    let server = Server::bind(config, Arc::clone(&gate)).await.unwrap();
    let addr = server.local_addr();

    let first = tokio::spawn(send(addr, b"GET /first HTTP/1.1\r\n\r\n"));
    gate.entered.notified().await;

    let second = tokio::spawn(send(addr, b"GET /second HTTP/1.1\r\n\r\n"));
    // the second connection waits in the backlog, its handler is not entered
    let entered = tokio::time::timeout(Duration::from_millis(200), gate.entered.notified()).await;
    assert!(entered.is_err());

    gate.release.notify_one();
    assert!(first.await.unwrap().starts_with("HTTP/1.1 200 OK\r\n"));

    gate.entered.notified().await;
    gate.release.notify_one();
    assert!(second.await.unwrap().starts_with("HTTP/1.1 200 OK\r\n"));

    server.close().await;
}

#[tokio::test]
async fn zero_max_connections_still_serves() {
    let config = ServerConfig::builder().address(([127, 0, 0, 1], 0)).max_connections(0).build();
    let server = Server::bind(config, Routes).await.unwrap();

    let response = tokio::time::timeout(Duration::from_secs(5), send(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n"))
        .await
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    server.close().await;
}

#[tokio::test]
async fn graceful_close_waits_for_in_flight() {
    let gate = Arc::new(Gate { entered: Notify::new(), release: Notify::new() });
    let server = Server::bind(local_config(), Arc::clone(&gate)).await.unwrap();
    let addr = server.local_addr();

    let in_flight = tokio::spawn(send(addr, b"GET / HTTP/1.1\r\n\r\n"));
    gate.entered.notified().await;

    let closing = tokio::spawn(server.close());
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!closing.is_finished());
    assert!(TcpStream::connect(addr).await.is_err());

    gate.release.notify_one();
    closing.await.unwrap();
    assert!(in_flight.await.unwrap().starts_with("HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn abort_close_drops_in_flight() {
    let gate = Arc::new(Gate { entered: Notify::new(), release: Notify::new() });
    let config = ServerConfig::builder().address(([127, 0, 0, 1], 0)).shutdown(ShutdownMode::Abort).build();
    let server = Server::bind(config, Arc::clone(&gate)).await.unwrap();

    let in_flight = tokio::spawn(send(server.local_addr(), b"GET / HTTP/1.1\r\n\r\n"));
    gate.entered.notified().await;

    server.close().await;

    assert!(in_flight.await.unwrap().is_empty());
}

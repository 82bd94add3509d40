//! Prints every request arriving on port 42069 without answering it.
//!
//! ```sh
//! cargo run --example request_dump
//! curl -X POST -d 'hello' http://localhost:42069/coffee
//! ```

use std::time::Duration;

use futures::StreamExt;
use tokio::net::TcpListener;
use tokio_util::codec::FramedRead;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use wire_http::codec::RequestDecoder;
use wire_http::config::DEFAULT_PORT;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let tcp_listener = match TcpListener::bind(("0.0.0.0", DEFAULT_PORT)).await {
        Ok(tcp_listener) => tcp_listener,
        Err(e) => {
            error!(cause = %e, "bind server error");
            return;
        }
    };
    info!(port = DEFAULT_PORT, "start listening");

    loop {
        let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
            Ok(stream_and_addr) => stream_and_addr,
            Err(e) => {
                warn!(cause = %e, "failed to accept");
                tokio::time::sleep(Duration::from_millis(100)).await;
                continue;
            }
        };
        info!(remote_addr = %remote_addr, "connection accepted");

        let mut requests = FramedRead::new(tcp_stream, RequestDecoder::new());
        match requests.next().await {
            Some(Ok(request)) => {
                println!("Request line:");
                println!("- Method: {}", request.method());
                println!("- Target: {}", request.target());
                println!("- Version: {}", request.http_version());
                println!("Headers:");
                for (name, value) in request.headers() {
                    println!("- {name}: {value}");
                }
                println!("Body:");
                println!("{}", String::from_utf8_lossy(request.body()));
            }
            Some(Err(e)) => warn!(cause = %e, "can't parse request"),
            None => {}
        }
        info!(remote_addr = %remote_addr, "connection closed");
    }
}

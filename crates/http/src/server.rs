//! TCP server accepting connections and serving one request on each.
//!
//! Every accepted connection runs as its own tokio task, tracked by a
//! [`TaskTracker`] so [`Server::close`] can wait for, or with
//! [`ShutdownMode::Abort`] cancel, the connections still in flight.
//!
//! ```no_run
//! use wire_http::config::ServerConfig;
//! use wire_http::server::Server;
//! # use wire_http::handler::Handler;
//! # async fn run<H: Handler + 'static>(handler: H) -> std::io::Result<()> {
//! let server = Server::bind(ServerConfig::builder().port(8080).build(), handler).await?;
//! tokio::signal::ctrl_c().await?;
//! server.close().await;
//! # Ok(())
//! # }
//! ```

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::select;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::config::{ServerConfig, ShutdownMode};
use crate::connection::HttpConnection;
use crate::handler::Handler;

/// Pause after a failed `accept` before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Handle to a running server.
///
/// Dropping the handle leaves the server running in the background, call
/// [`close`](Server::close) to stop it.
#[derive(Debug)]
pub struct Server {
    local_addr: SocketAddr,
    shutdown: ShutdownMode,
    accept_token: CancellationToken,
    connection_token: CancellationToken,
    tracker: TaskTracker,
    accept_task: JoinHandle<()>,
}

/// Binds every interface on `port` with the default configuration.
pub async fn serve<H>(port: u16, handler: H) -> io::Result<Server>
where
    H: Handler + 'static,
{
    Server::bind(ServerConfig::builder().port(port).build(), handler).await
}

impl Server {
    /// Binds the configured address and starts accepting on a spawned task.
    pub async fn bind<H>(config: ServerConfig, handler: H) -> io::Result<Self>
    where
        H: Handler + 'static,
    {
        let listener = TcpListener::bind(config.address())
            .await
            .inspect_err(|e| error!(cause = %e, address = %config.address(), "bind server error"))?;
        let local_addr = listener.local_addr()?;
        info!(address = %local_addr, max_connections = ?config.max_connections(), "start listening");

        let accept_token = CancellationToken::new();
        let connection_token = CancellationToken::new();
        let tracker = TaskTracker::new();
        let shutdown = config.shutdown();

        let acceptor = Acceptor {
            listener,
            handler: Arc::new(handler),
            limiter: config.max_connections().map(|permits| Arc::new(Semaphore::new(permits))),
            config: Arc::new(config),
            accept_token: accept_token.clone(),
            connection_token: connection_token.clone(),
            tracker: tracker.clone(),
        };
        let accept_task = tokio::spawn(acceptor.run());

        Ok(Self { local_addr, shutdown, accept_token, connection_token, tracker, accept_task })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting and releases the listener.
    ///
    /// With [`ShutdownMode::Graceful`] this waits until every in-flight
    /// connection has finished; with [`ShutdownMode::Abort`] those
    /// connections are dropped first.
    pub async fn close(self) {
        self.accept_token.cancel();
        if let Err(e) = self.accept_task.await {
            error!(cause = %e, "accept loop terminated abnormally");
        }

        if self.shutdown == ShutdownMode::Abort {
            self.connection_token.cancel();
        }

        self.tracker.close();
        info!(in_flight = self.tracker.len(), mode = ?self.shutdown, "waiting for connections");
        self.tracker.wait().await;
        info!(address = %self.local_addr, "server closed");
    }
}

struct Acceptor<H> {
    listener: TcpListener,
    handler: Arc<H>,
    config: Arc<ServerConfig>,
    limiter: Option<Arc<Semaphore>>,
    accept_token: CancellationToken,
    connection_token: CancellationToken,
    tracker: TaskTracker,
}

impl<H> Acceptor<H>
where
    H: Handler + 'static,
{
    async fn run(self) {
        loop {
            // admission comes first, a full server leaves new peers in the backlog
            let permit = match &self.limiter {
                Some(limiter) => select! {
                    () = self.accept_token.cancelled() => break,
                    permit = Arc::clone(limiter).acquire_owned() => match permit {
                        Ok(permit) => Some(permit),
                        Err(_closed) => break,
                    },
                },
                None => None,
            };

            let (tcp_stream, remote_addr) = select! {
                () = self.accept_token.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(stream_and_addr) => stream_and_addr,
                    Err(e) => {
                        warn!(cause = %e, backoff = ?ACCEPT_ERROR_BACKOFF, "failed to accept");
                        if back_off(&self.accept_token, ACCEPT_ERROR_BACKOFF).await {
                            continue;
                        }
                        break;
                    }
                },
            };

            self.spawn_connection(tcp_stream, remote_addr, permit);
        }

        info!("stop accepting connections");
    }

    fn spawn_connection(&self, tcp_stream: TcpStream, remote_addr: SocketAddr, permit: Option<OwnedSemaphorePermit>) {
        let handler = Arc::clone(&self.handler);
        let config = Arc::clone(&self.config);
        let cancelled = self.connection_token.clone();

        self.tracker.spawn(async move {
            // held until the connection is done
            let _permit = permit;

            let (reader, writer) = tcp_stream.into_split();
            let connection = HttpConnection::with_config(reader, writer, &config);

            select! {
                () = cancelled.cancelled() => {
                    info!(remote_addr = %remote_addr, "connection aborted");
                }
                result = connection.process(handler) => match result {
                    Ok(()) => info!(remote_addr = %remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(remote_addr = %remote_addr, cause = %e, "service has error, connection shutdown"),
                },
            }
        });
    }
}

/// Sleeps for `delay`, returns `false` if `token` is cancelled first.
async fn back_off(token: &CancellationToken, delay: Duration) -> bool {
    select! {
        () = token.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn back_off_waits_for_delay() {
        let token = CancellationToken::new();
        let start = Instant::now();

        assert!(back_off(&token, Duration::from_millis(30)).await);
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn back_off_stops_on_cancel() {
        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let start = Instant::now();
        assert!(!back_off(&token, Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}

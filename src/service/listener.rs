use futures::StreamExt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, instrument, warn};

use crate::config::{ListenerConfig, OpenerConfig};
use crate::core::codec::LocatorCodec;
use crate::error::{OpenerError, Result};
use crate::platform::{Mounter, Opener, SystemMount, SystemOpen};
use crate::protocol::dispatcher::{Dispatcher, Outcome};
use crate::utils::time::{elapsed, Clock};
use crate::utils::timeout::read_within;

/// Accepts one connection at a time and dispatches the line it carries.
///
/// Handling is done inline on the accept loop, so request N+1 is not
/// accepted until request N (including its mount) has returned.
pub struct Listener {
    listener: TcpListener,
    dispatcher: Dispatcher,
    clock: Arc<dyn Clock>,
    max_line_bytes: usize,
    read_timeout: Duration,
}

impl Listener {
    /// Wrap an already bound socket
    pub fn new(
        listener: TcpListener,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
        config: &ListenerConfig,
    ) -> Self {
        Self {
            listener,
            dispatcher,
            clock,
            max_line_bytes: config.max_line_bytes,
            read_timeout: config.read_timeout,
        }
    }

    /// Bind the configured address with the configured backlog
    pub async fn bind(
        config: &ListenerConfig,
        dispatcher: Dispatcher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let listener = bind_socket(&config.address, config.backlog).await?;
        Ok(Self::new(listener, dispatcher, clock, config))
    }

    /// Bind and wire up the platform mount and open actions
    pub async fn from_config(config: &OpenerConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        let mounter = Mounter::new(
            config.mount.root.clone(),
            Arc::new(SystemMount::new(config.locator.scheme.clone())),
        );
        let opener = Opener::new(Arc::new(SystemOpen));
        let dispatcher = Dispatcher::new(config.locator.scheme.clone(), mounter, opener);
        Self::bind(&config.listener, dispatcher, clock).await
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until Ctrl-C
    pub async fn run(self) -> Result<()> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received shutdown signal"),
                Err(e) => {
                    error!(error = %e, "Unable to listen for shutdown signal");
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves. A request already being handled
    /// is finished before the loop notices the signal.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!(address = %addr, "Listening");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Listener stopped");
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        self.serve(stream, peer).await;
                    }
                    Err(e) => {
                        error!(error = %e, "Error accepting connection");
                    }
                }
            }
        }
    }

    #[instrument(skip(self, stream), fields(peer = %peer))]
    async fn serve(&self, stream: TcpStream, peer: SocketAddr) -> Option<Outcome> {
        let started = self.clock.now();
        let mut framed = FramedRead::new(stream, LocatorCodec::new(self.max_line_bytes));

        let read = read_within(self.read_timeout, async {
            framed.next().await.transpose()
        })
        .await;

        let outcome = match read {
            Ok(Some(line)) => self.dispatcher.dispatch(&line).await,
            Ok(None) => {
                debug!("Connection closed without data");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read locator");
                return None;
            }
        };

        debug!(
            outcome = ?outcome,
            elapsed_ms = elapsed(started, self.clock.now()).as_millis() as u64,
            "Request handled"
        );
        Some(outcome)
    }
}

async fn bind_socket(address: &str, backlog: u32) -> Result<TcpListener> {
    let addr = tokio::net::lookup_host(address)
        .await?
        .next()
        .ok_or_else(|| OpenerError::Config(format!("address {address:?} did not resolve")))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    Ok(socket.listen(backlog)?)
}

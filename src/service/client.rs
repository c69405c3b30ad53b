use futures::SinkExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_util::codec::FramedWrite;
use tracing::{debug, instrument};

use crate::core::codec::LocatorCodec;
use crate::error::Result;

/// Deliver one locator to a running daemon.
///
/// The daemon never replies, so this returns as soon as the line is
/// written and the write half is shut down.
#[instrument(skip(locator), fields(address = %addr))]
pub async fn send_locator(addr: &str, locator: &str, max_line_bytes: usize) -> Result<()> {
    let stream = TcpStream::connect(addr).await?;
    let mut framed = FramedWrite::new(stream, LocatorCodec::new(max_line_bytes));
    framed.send(locator.trim().to_string()).await?;

    let mut stream = framed.into_inner();
    stream.shutdown().await?;
    debug!("Locator sent");
    Ok(())
}

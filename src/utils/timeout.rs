use std::time::Duration;
use tokio::time;
use crate::error::{Result, OpenerError};

/// Default time a peer gets to deliver its locator (5 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bound the read of a peer's line so a connection that never writes
/// cannot hold the sequential accept loop. Expiry becomes `Timeout`.
pub async fn read_within<T>(
    limit: Duration,
    read: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    time::timeout(limit, read)
        .await
        .unwrap_or(Err(OpenerError::Timeout))
}

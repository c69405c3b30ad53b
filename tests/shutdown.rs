
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use smb_opener::config::ListenerConfig;
use smb_opener::service::Listener;
use test_utils::{dispatcher, FixedClock, RecordingMount, RecordingOpen};

#[tokio::test]
async fn test_listener_graceful_shutdown() -> smb_opener::error::Result<()> {
    let root = tempfile::tempdir()?;
    let (open, _rx) = RecordingOpen::new();
    let config = ListenerConfig {
        address: "127.0.0.1:0".to_string(),
        ..ListenerConfig::default()
    };

    let listener = Listener::bind(
        &config,
        dispatcher(
            root.path(),
            Arc::new(RecordingMount::new(root.path())),
            Arc::new(open),
        ),
        Arc::new(FixedClock::new()),
    )
    .await?;
    let addr = listener.local_addr()?;

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    let server_handle = tokio::spawn(listener.run_until(async move {
        let _ = shutdown_rx.recv().await;
    }));

    sleep(Duration::from_millis(100)).await;
    assert!(TcpStream::connect(addr).await.is_ok(), "listener should accept before shutdown");

    let _ = shutdown_tx.send(()).await;
    let result = timeout(Duration::from_secs(5), server_handle)
        .await
        .expect("listener did not stop");
    assert!(matches!(result, Ok(Ok(()))));

    // The socket is closed once the listener is dropped.
    sleep(Duration::from_millis(100)).await;
    assert!(TcpStream::connect(addr).await.is_err(), "listener should be gone");
    Ok(())
}

#[tokio::test]
async fn test_bind_with_backlog_on_loopback() -> smb_opener::error::Result<()> {
    let root = tempfile::tempdir()?;
    let (open, _rx) = RecordingOpen::new();
    let config = ListenerConfig {
        address: "127.0.0.1:0".to_string(),
        backlog: 1,
        ..ListenerConfig::default()
    };

    let listener = Listener::bind(
        &config,
        dispatcher(
            root.path(),
            Arc::new(RecordingMount::new(root.path())),
            Arc::new(open),
        ),
        Arc::new(FixedClock::new()),
    )
    .await?;
    assert!(listener.local_addr()?.ip().is_loopback());
    Ok(())
}

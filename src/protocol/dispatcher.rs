use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::core::locator::ShareLocator;
use crate::error::{OpenerError, Result};
use crate::platform::{Mounter, Opener};

/// What happened to one received line
#[derive(Debug)]
pub enum Outcome {
    /// Nothing but whitespace was received
    Empty,
    /// The line did not start with the accepted scheme
    Ignored,
    /// The target was handed to the open action
    Opened(PathBuf),
    /// Handling failed; the error has already been logged
    Failed(OpenerError),
}

/// Routes a received line through parse, mount and open.
///
/// `dispatch` is the failure boundary for a single request: every error
/// and every panic raised while handling is logged here and never reaches
/// the listener.
pub struct Dispatcher {
    scheme: String,
    prefix: String,
    mounter: Mounter,
    opener: Opener,
}

impl Dispatcher {
    pub fn new(scheme: impl Into<String>, mounter: Mounter, opener: Opener) -> Self {
        let scheme = scheme.into();
        let prefix = format!("{scheme}://");
        Self {
            scheme,
            prefix,
            mounter,
            opener,
        }
    }

    pub async fn dispatch(&self, line: &str) -> Outcome {
        let line = line.trim();
        if line.is_empty() {
            return Outcome::Empty;
        }

        info!(locator = %line, "Received");
        if !line.starts_with(&self.prefix) {
            info!("Ignoring non-{} request", self.scheme);
            return Outcome::Ignored;
        }

        match AssertUnwindSafe(self.handle(line)).catch_unwind().await {
            Ok(Ok(target)) => Outcome::Opened(target),
            Ok(Err(e)) => {
                warn!(error = %e, "Error handling locator");
                Outcome::Failed(e)
            }
            Err(panic) => {
                let e = OpenerError::Unexpected(panic_message(panic.as_ref()));
                error!(error = %e, "Error handling locator");
                Outcome::Failed(e)
            }
        }
    }

    async fn handle(&self, line: &str) -> Result<PathBuf> {
        let locator = ShareLocator::parse(line, &self.scheme)?;
        let mount_point = self
            .mounter
            .ensure_mounted(&locator.host, &locator.share)
            .await?;
        self.opener
            .open_target(&mount_point, &locator.relative_path)
            .await
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic while handling request".to_string()
    }
}

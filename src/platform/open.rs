use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::{find_in_path, OpenAction, ShellCommand};
use crate::core::locator::MountPoint;
use crate::error::{OpenerError, Result};

/// Opens a path under a mounted share if it exists
pub struct Opener {
    action: Arc<dyn OpenAction>,
}

impl Opener {
    pub fn new(action: Arc<dyn OpenAction>) -> Self {
        Self { action }
    }

    /// Resolve `relative_path` below `mount_point` and open it.
    ///
    /// A missing target is reported as `PathNotFound`, a target outside
    /// the mount point as `MalformedLocator`. Neither invokes the open action.
    pub async fn open_target(&self, mount_point: &MountPoint, relative_path: &str) -> Result<PathBuf> {
        let target = mount_point.resolve(relative_path)?;
        if !target.exists() {
            warn!("Path does not exist: {}", target.display());
            return Err(OpenerError::PathNotFound(target));
        }

        info!("Opening {}", target.display());
        self.action.open(&target).await?;
        Ok(target)
    }
}

/// Opens paths with the desktop's default handler
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemOpen;

impl SystemOpen {
    pub fn command(&self, path: &Path) -> ShellCommand {
        let target = path.to_string_lossy().to_string();

        #[cfg(target_os = "macos")]
        let program = "open";
        #[cfg(windows)]
        let program = "explorer";
        #[cfg(not(any(target_os = "macos", windows)))]
        let program = "xdg-open";

        ShellCommand::new(find_in_path(program), vec![target])
    }
}

#[async_trait]
impl OpenAction for SystemOpen {
    async fn open(&self, path: &Path) -> Result<()> {
        let command = self.command(path);
        // Not awaited: the opened application outlives the request.
        command
            .to_tokio()
            .spawn()
            .map_err(|e| OpenerError::OpenFailure(format!("{}: {e}", command.program)))?;
        Ok(())
    }
}

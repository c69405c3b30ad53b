use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{find_in_path, MountAction, ShellCommand};
use crate::core::locator::{share_url, MountPoint};
use crate::error::{OpenerError, Result};

/// Ensures a share is reachable under the mount root.
///
/// An existing entry at the mount point is taken to be the share; it is
/// not checked against the remote host.
pub struct Mounter {
    root: PathBuf,
    action: Arc<dyn MountAction>,
}

impl Mounter {
    pub fn new(root: impl Into<PathBuf>, action: Arc<dyn MountAction>) -> Self {
        Self {
            root: root.into(),
            action,
        }
    }

    /// Return the mount point for `share`, mounting it first if absent
    #[instrument(skip(self))]
    pub async fn ensure_mounted(&self, host: &str, share: &str) -> Result<MountPoint> {
        let mount_point = MountPoint::for_share(&self.root, share);
        if mount_point.exists() {
            debug!(path = %mount_point.path().display(), "Share already mounted");
            return Ok(mount_point);
        }

        info!("Mounting //{host}/{share} to {}", mount_point.path().display());
        self.action.mount(host, share).await?;
        Ok(mount_point)
    }
}

/// Mounts shares with the platform's own tooling
#[derive(Clone, Debug)]
pub struct SystemMount {
    scheme: String,
}

impl SystemMount {
    pub fn new(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
        }
    }

    /// Command that mounts `scheme://host/share`
    ///
    /// macOS asks Finder via AppleScript so the share lands in `/Volumes`.
    /// Elsewhere GIO handles the mount.
    pub fn command(&self, host: &str, share: &str) -> ShellCommand {
        let url = share_url(&self.scheme, host, share);

        #[cfg(target_os = "macos")]
        {
            ShellCommand::new(
                find_in_path("osascript"),
                vec![
                    "-e".to_string(),
                    format!("mount volume \"{}\"", applescript_escape(&url)),
                ],
            )
        }

        #[cfg(not(target_os = "macos"))]
        {
            ShellCommand::new(find_in_path("gio"), vec!["mount".to_string(), url])
        }
    }
}

#[async_trait]
impl MountAction for SystemMount {
    async fn mount(&self, host: &str, share: &str) -> Result<()> {
        let command = self.command(host, share);
        let failure = |reason: String| OpenerError::MountFailure {
            host: host.to_string(),
            share: share.to_string(),
            reason,
        };

        let status = command
            .to_tokio()
            .status()
            .await
            .map_err(|e| failure(format!("{}: {e}", command.program)))?;

        if !status.success() {
            return Err(failure(format!("{} exited with {status}", command.program)));
        }
        Ok(())
    }
}

/// Escape a value for use inside an AppleScript string literal
pub fn applescript_escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}

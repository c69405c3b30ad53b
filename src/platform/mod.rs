//! # Platform actions
//!
//! This file is part of the SMB Opener project.
//!
//! The daemon touches the outside world through two narrow capabilities:
//! mounting a remote share and opening a local path with the default
//! application. Both are traits so the dispatcher can be driven by fakes
//! in tests; [`SystemMount`] and [`SystemOpen`] shell out to the real
//! platform tools.
//!
//! ## Components
//! - `mount`: [`Mounter`], the "already mounted?" check plus the mount action
//! - `open`: [`Opener`], the "does the target exist?" check plus the open action
use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod mount;
pub mod open;

pub use mount::{Mounter, SystemMount};
pub use open::{Opener, SystemOpen};

/// Mount `//host/share` so that it shows up under the mount root.
///
/// Must not return until the platform tool has finished.
#[async_trait]
pub trait MountAction: Send + Sync {
    async fn mount(&self, host: &str, share: &str) -> Result<()>;
}

/// Hand `path` to the default application without waiting for it.
#[async_trait]
pub trait OpenAction: Send + Sync {
    async fn open(&self, path: &Path) -> Result<()>;
}

/// A program plus its arguments
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub(crate) fn to_tokio(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args).stdin(std::process::Stdio::null());
        cmd
    }
}

/// Resolve `program` through `PATH`, falling back to the bare name.
pub(crate) fn find_in_path(program: &str) -> String {
    which::which(program)
        .ok()
        .map(|p: PathBuf| p.to_string_lossy().to_string())
        .unwrap_or_else(|| program.to_string())
}

//! # Error
//!
//! This file is part of the SMB Opener project.
//!
//! It defines the error types used throughout the daemon.
//!
//! Every stage of request handling (framing, locator parsing, mounting,
//! opening) reports failures through [`OpenerError`]. The dispatcher logs
//! and swallows these errors so that a bad request never reaches the
//! listener loop; only startup errors (bind, configuration) are returned
//! to the caller of `main`.
//!
//! It uses the `thiserror` crate for ergonomic error definition.
//!
//! A custom `Result<T>` alias is provided to simplify signatures across the crate.
//!
//! # Example Usage
//! ```rust
//! use smb_opener::error::{OpenerError, Result};
//!
//! fn require_share(share: &str) -> Result<&str> {
//!     if share.is_empty() {
//!         return Err(OpenerError::MalformedLocator("missing share name".into()));
//!     }
//!     Ok(share)
//! }
//!
//! assert!(require_share("docs").is_ok());
//! assert!(require_share("").is_err());
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OpenerError>;

#[derive(Error, Debug)]
pub enum OpenerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed locator: {0}")]
    MalformedLocator(String),

    #[error("Locator too long: {0} bytes")]
    LocatorTooLong(usize),

    #[error("Locator is not valid UTF-8")]
    InvalidEncoding,

    #[error("Failed to mount //{host}/{share}: {reason}")]
    MountFailure {
        host: String,
        share: String,
        reason: String,
    },

    #[error("Path does not exist: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Failed to open path: {0}")]
    OpenFailure(String),

    #[error("Timeout occurred")]
    Timeout,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

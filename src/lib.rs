//! # SMB Opener
//! This file is part of the SMB Opener project.
//!
//! A loopback daemon that receives one `smb://host/share/path` locator per
//! TCP connection, makes sure the share is mounted locally, and opens the
//! resolved path with the default application.
//!
//! The main components include:
//! - Core: locator parsing and line framing
//! - Protocol: the per-request dispatch boundary
//! - Platform: mount and open actions behind traits
//! - Service: the sequential listener and the sender client
//! - Utils: logging, clock, timeouts
pub mod config;
pub mod error;

pub mod core {
    pub mod codec;
    pub mod locator;
}

pub mod platform;
pub mod protocol;
pub mod service;
pub mod utils;

pub use config::OpenerConfig;
pub use error::*;
pub use core::locator::{MountPoint, ShareLocator};
pub use core::codec::LocatorCodec;

//! # Protocol
//!
//! This file is part of the SMB Opener project.
//!
//! The wire protocol is a single line per connection with no reply. This
//! module owns what happens to that line once it has been read.
pub mod dispatcher;

pub use dispatcher::{Dispatcher, Outcome};

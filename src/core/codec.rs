//! # Codec
//!
//! This file is part of the SMB Opener project.
//!
//! It frames the single line a peer sends per connection. The
//! `LocatorCodec` struct implements the [`Decoder`] and [`Encoder`] traits
//! from [`tokio_util::codec`], so the listener reads with `FramedRead` and
//! the sender client writes with `FramedWrite`.
//!
//! ## Responsibilities
//! - End a line at `\n` or at end of stream
//! - Reject lines longer than the configured limit instead of truncating
//! - Reject bytes that are not UTF-8
//!
//! Trimming and dispatch are left to the caller.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_LINE_BYTES;
use crate::error::{OpenerError, Result};

#[derive(Debug, Clone, Copy)]
pub struct LocatorCodec {
    max_len: usize,
}

impl Default for LocatorCodec {
    fn default() -> Self {
        Self::new(MAX_LINE_BYTES)
    }
}

impl LocatorCodec {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    fn take_line(&self, src: &mut BytesMut, len: usize, consume: usize) -> Result<String> {
        if len > self.max_len {
            return Err(OpenerError::LocatorTooLong(len));
        }
        let buf = src.split_to(consume);
        let line = std::str::from_utf8(&buf[..len]).map_err(|_| OpenerError::InvalidEncoding)?;
        Ok(line.to_string())
    }
}

impl Decoder for LocatorCodec {
    type Item = String;
    type Error = OpenerError;

    /// Returns `None` until a newline arrives.
    ///
    /// # Errors
    /// `LocatorTooLong` as soon as the buffered bytes exceed the limit
    /// without a newline, `InvalidEncoding` for non UTF-8 input.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        match src.iter().position(|b| *b == b'\n') {
            Some(pos) => self.take_line(src, pos, pos + 1).map(Some),
            None if src.len() > self.max_len => Err(OpenerError::LocatorTooLong(src.len())),
            None => Ok(None),
        }
    }

    /// The sender may close without a trailing newline.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let len = src.len();
        self.take_line(src, len, len).map(Some)
    }
}

impl Encoder<String> for LocatorCodec {
    type Error = OpenerError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        if line.len() > self.max_len {
            return Err(OpenerError::LocatorTooLong(line.len()));
        }
        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

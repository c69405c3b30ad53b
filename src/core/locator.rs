//! # Locator
//!
//! This file is part of the SMB Opener project.
//!
//! It defines [`ShareLocator`], the parsed form of a
//! `scheme://host/share[/relative/path]` string, and [`MountPoint`], the
//! local directory a share is expected to appear under once mounted.
//!
//! Parsing is a pure function: it never touches the filesystem and never
//! checks whether the host is reachable.
//!
//! ## Rules
//! - The scheme must match the configured one exactly
//! - The host is taken verbatim from the URL
//! - The first path segment is the share, the rest is the relative path
//! - Segments are percent-decoded; `..`, NUL and embedded separators are refused
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::error::{OpenerError, Result};

/// A parsed locator naming a share and a path inside it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLocator {
    pub host: String,
    pub share: String,
    pub relative_path: String,
}

impl ShareLocator {
    /// Parse `raw`, requiring the given scheme (without `://`)
    pub fn parse(raw: &str, scheme: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| OpenerError::MalformedLocator(format!("{raw}: {e}")))?;

        if url.scheme() != scheme {
            return Err(OpenerError::MalformedLocator(format!(
                "invalid scheme {:?}, expected {scheme:?}",
                url.scheme()
            )));
        }

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(OpenerError::MalformedLocator(format!("{raw}: missing host"))),
        };

        let (share, relative_path) = split_share_path(url.path())?;

        Ok(Self {
            host,
            share,
            relative_path,
        })
    }
}

/// Characters escaped when a share name goes back into a URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// `scheme://host/share`, with the share escaped as a single path segment
pub fn share_url(scheme: &str, host: &str, share: &str) -> String {
    format!("{scheme}://{host}/{}", utf8_percent_encode(share, SEGMENT))
}

/// Strip outer slashes and split on the first remaining one
fn split_share_path(path: &str) -> Result<(String, String)> {
    let trimmed = path.trim_matches('/');
    let (share, rest) = match trimmed.split_once('/') {
        Some((share, rest)) => (share, rest),
        None => (trimmed, ""),
    };

    let share = decode_segment(share)?;
    if share.is_empty() {
        return Err(OpenerError::MalformedLocator("missing share name".into()));
    }

    let relative = rest
        .split('/')
        .map(decode_segment)
        .collect::<Result<Vec<_>>>()?
        .join("/");

    Ok((share, relative))
}

fn decode_segment(segment: &str) -> Result<String> {
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| OpenerError::MalformedLocator(format!("{segment:?} is not valid UTF-8")))?;

    // A decoded separator would let a segment climb out of the share.
    if decoded == ".." || decoded.contains(&['\0', '/', '\\'][..]) {
        return Err(OpenerError::MalformedLocator(format!("invalid path segment {segment:?}")));
    }
    Ok(decoded.into_owned())
}

/// Local directory where a share appears once mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPoint {
    local_path: PathBuf,
}

impl MountPoint {
    /// `<root>/<share>`
    pub fn for_share(root: &Path, share: &str) -> Self {
        Self {
            local_path: root.join(share),
        }
    }

    pub fn path(&self) -> &Path {
        &self.local_path
    }

    /// Whether something already occupies the mount point
    pub fn exists(&self) -> bool {
        self.local_path.exists()
    }

    /// Resolve a share-relative path beneath this mount point.
    ///
    /// Anything that would land outside the mount point (an absolute
    /// path, a parent component) is `MalformedLocator`.
    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        if relative_path.is_empty() {
            return Ok(self.local_path.clone());
        }
        let relative = Path::new(relative_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        let target = self.local_path.join(relative);
        if escapes || !target.starts_with(&self.local_path) {
            return Err(OpenerError::MalformedLocator(format!(
                "{relative_path:?} escapes {}",
                self.local_path.display()
            )));
        }
        Ok(target)
    }
}

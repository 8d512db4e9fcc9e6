//! Revocable display references for binary blobs.
//!
//! The display layer never holds image bytes directly. It renders an
//! [`ObjectUrl`] issued here, and the owner releases the reference once it is
//! superseded or the owning tool is torn down.

use crate::error::ResourceError;
use bytes::Bytes;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// Opaque, renderable reference to a blob held by an [`ObjectUrlRegistry`].
///
/// Rendered as `blob:aidit/<registry>/<n>`, where `n` counts up per registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl {
    href: String,
    registry: Uuid,
    seq: u64,
}

impl ObjectUrl {
    fn issue(registry: Uuid, seq: u64) -> Self {
        Self {
            href: format!("blob:aidit/{}/{}", registry, seq),
            registry,
            seq,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.href
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href)
    }
}

impl Serialize for ObjectUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.href)
    }
}

/// Bytes and content type behind an [`ObjectUrl`].
#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Bytes,
    pub mime_type: String,
}

/// Registry of live display references for one tool instance.
///
/// Only live blobs are stored. Whether a reference was issued here is
/// derived from the registry id and the sequence counter, so released
/// references leave nothing behind.
#[derive(Debug)]
pub struct ObjectUrlRegistry {
    id: Uuid,
    next_seq: u64,
    live: HashMap<u64, Blob>,
    peak_live: usize,
}

impl Default for ObjectUrlRegistry {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            next_seq: 0,
            live: HashMap::new(),
            peak_live: 0,
        }
    }
}

impl ObjectUrlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return a fresh reference to it.
    pub fn create(&mut self, bytes: Bytes, mime_type: impl Into<String>) -> ObjectUrl {
        let url = ObjectUrl::issue(self.id, self.next_seq);
        self.next_seq += 1;
        self.live.insert(
            url.seq,
            Blob {
                bytes,
                mime_type: mime_type.into(),
            },
        );
        self.peak_live = self.peak_live.max(self.live.len());
        url
    }

    /// Look up the blob behind a live reference.
    pub fn resolve(&self, url: &ObjectUrl) -> Option<&Blob> {
        if !self.issued_here(url) {
            return None;
        }
        self.live.get(&url.seq)
    }

    /// Release a reference. Each reference may be released exactly once.
    ///
    /// # Errors
    /// Returns [`ResourceError::AlreadyReleased`] for a second release and
    /// [`ResourceError::Unknown`] for a reference this registry never issued.
    pub fn revoke(&mut self, url: &ObjectUrl) -> Result<(), ResourceError> {
        if !self.issued_here(url) {
            return Err(ResourceError::Unknown(url.to_string()));
        }
        match self.live.remove(&url.seq) {
            Some(_) => Ok(()),
            None => Err(ResourceError::AlreadyReleased(url.to_string())),
        }
    }

    /// Number of references issued and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of references issued over the registry's lifetime.
    pub fn issued_count(&self) -> u64 {
        self.next_seq
    }

    /// Highest number of references that were ever live at once.
    pub fn peak_live_count(&self) -> usize {
        self.peak_live
    }

    /// How many times `url` has been released. Never more than one, since a
    /// second release is rejected.
    pub fn revocations_of(&self, url: &ObjectUrl) -> usize {
        usize::from(self.issued_here(url) && !self.live.contains_key(&url.seq))
    }

    fn issued_here(&self, url: &ObjectUrl) -> bool {
        url.registry == self.id && url.seq < self.next_seq
    }
}

impl Drop for ObjectUrlRegistry {
    fn drop(&mut self) {
        if !self.live.is_empty() {
            tracing::debug!(
                live = self.live.len(),
                "releasing display references on teardown"
            );
        }
    }
}

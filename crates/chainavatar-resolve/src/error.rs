//! Resolution error taxonomy.
//!
//! Not-found conditions (no resolver, no record, unrecognized scheme, missing
//! image) are *not* errors; they surface as `Ok(None)` from the engine.
//! Everything here is a genuine fault the caller may want to retry or report.

use thiserror::Error;

use chainavatar_core::TransportError;

/// Errors produced by the resolution engine.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The JSON-RPC transport failed (connection, timeout, protocol).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The token metadata document could not be fetched.
    #[error("metadata fetch failed for {url}: {reason}")]
    MetadataFetch { url: String, reason: String },

    /// The token metadata response was not valid JSON.
    #[error("metadata at {url} is not valid JSON: {reason}")]
    MetadataJson { url: String, reason: String },

    /// An `ipfs:` locator that matches neither historical form.
    ///
    /// This is a record/configuration fault, not a not-found condition, and
    /// is never converted into a `None` result.
    #[error("unsupported IPFS link format: {0}")]
    UnsupportedIpfsLink(String),
}

impl ResolveError {
    /// Returns `true` if retrying the resolution may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_retryable(),
            Self::MetadataFetch { .. } => true,
            Self::MetadataJson { .. } | Self::UnsupportedIpfsLink(_) => false,
        }
    }
}

//! Engine configuration.
//!
//! Everything the engine needs beyond the transport is explicit here. There
//! is no global provider instance, so tests can construct engines around
//! scripted doubles.

use std::time::Duration;

use alloy_primitives::Address;

use chainavatar_abi::ENS_REGISTRY;

/// Default public IPFS gateway base (the path is appended directly).
pub const DEFAULT_IPFS_GATEWAY: &str = "https://gateway.ipfs.io/ipfs/";

/// Configuration for [`AvatarResolver`](crate::AvatarResolver).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Registry contract answering `resolver(bytes32)`.
    pub registry: Address,
    /// Gateway base URL substituted for `ipfs://` locators.
    pub ipfs_gateway: String,
    /// Timeout for the token-metadata HTTP fetch.
    pub metadata_timeout: Duration,
    /// TTL for the resolver-handle cache; `None` disables caching (the
    /// engine is then fully stateless across calls).
    pub resolver_cache_ttl: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry: ENS_REGISTRY,
            ipfs_gateway: DEFAULT_IPFS_GATEWAY.to_string(),
            metadata_timeout: Duration::from_secs(30),
            resolver_cache_ttl: None,
        }
    }
}

//! The resolution engine: orchestrates the registry walk, record reads,
//! classification, NFT verification and metadata retrieval.

use std::sync::Arc;

use alloy_primitives::{Address, U256};

use chainavatar_abi::{codec, namehash, selector};
use chainavatar_core::RpcTransport;

use crate::avatar::{classify, Avatar, ClassifiedRecord, LinkageStep, NftDetails, NftKind};
use crate::cache::ResolverCache;
use crate::client::{CallOutcome, ChainClient};
use crate::config::EngineConfig;
use crate::error::ResolveError;
use crate::ipfs;
use crate::locator::{self, ResolverHandle};
use crate::nft;

/// An identifier resolved to both of its halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub address: Address,
    /// The primary (reverse-registered) name, when one exists.
    pub name: Option<String>,
}

/// Name and avatar resolver over an ENS-style registry.
///
/// Construction takes an explicit transport and configuration; there is no
/// global provider instance. Each resolution call is independent, and the
/// only state shared between calls is the optional resolver-handle cache.
pub struct AvatarResolver {
    client: ChainClient,
    http: reqwest::Client,
    config: EngineConfig,
    cache: Option<ResolverCache>,
}

impl AvatarResolver {
    /// Create a resolver; the metadata HTTP client is built from the
    /// configured timeout.
    pub fn new(transport: Arc<dyn RpcTransport>, config: EngineConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.metadata_timeout)
            .build()
            .expect("failed to build reqwest client");
        Self::with_http_client(transport, http, config)
    }

    /// Create a resolver around a caller-supplied metadata HTTP client.
    pub fn with_http_client(
        transport: Arc<dyn RpcTransport>,
        http: reqwest::Client,
        config: EngineConfig,
    ) -> Self {
        let cache = config.resolver_cache_ttl.map(ResolverCache::new);
        Self {
            client: ChainClient::new(transport),
            http,
            config,
            cache,
        }
    }

    /// Resolve the avatar for a name or account address.
    ///
    /// Returns `Ok(None)` for every expected not-found condition: no reverse
    /// name, no resolver, no record, unrecognized scheme, unusable NFT
    /// metadata. Transport and gateway faults are errors.
    pub async fn resolve_avatar(&self, identifier: &str) -> Result<Option<Avatar>, ResolveError> {
        let mut linkage = Vec::new();

        let name = match parse_address(identifier) {
            Some(address) => {
                linkage.push(LinkageStep::new("address", address.to_string()));
                // The avatar record binds to the name, not the address, so
                // an address always resolves through its primary name.
                match self.reverse_lookup(address).await? {
                    Some(name) => name,
                    None => {
                        tracing::debug!(%address, "no primary name registered");
                        return Ok(None);
                    }
                }
            }
            None => identifier.to_string(),
        };

        linkage.push(LinkageStep::new("name", &name));
        self.resolve_name_avatar(&name, linkage).await
    }

    /// Forward lookup: the address record of a name.
    pub async fn forward_lookup(&self, name: &str) -> Result<Option<Address>, ResolveError> {
        let Some(handle) = self.locate(name).await? else {
            return Ok(None);
        };
        self.addr_record(&handle).await
    }

    /// Reverse lookup: the primary name registered for an address.
    pub async fn reverse_lookup(&self, address: Address) -> Result<Option<String>, ResolveError> {
        let node_name = namehash::reverse_node(address);
        let Some(handle) = self.locate(&node_name).await? else {
            return Ok(None);
        };
        self.name_record(&handle).await
    }

    /// Resolve an identifier to address + primary name in one call.
    ///
    /// A name that does not forward-resolve is `Ok(None)`; an address is
    /// always an identity, with or without a primary name.
    pub async fn resolve_identifier(&self, identifier: &str) -> Result<Option<Identity>, ResolveError> {
        if let Some(address) = parse_address(identifier) {
            let name = self.reverse_lookup(address).await?;
            return Ok(Some(Identity { address, name }));
        }

        match self.forward_lookup(identifier).await? {
            Some(address) => Ok(Some(Identity {
                address,
                name: Some(identifier.to_string()),
            })),
            None => Ok(None),
        }
    }

    /// Find the resolver for a name, through the cache when enabled.
    async fn locate(&self, name: &str) -> Result<Option<ResolverHandle>, ResolveError> {
        match &self.cache {
            Some(cache) => {
                cache
                    .get_or_locate(name, || {
                        locator::locate(&self.client, self.config.registry, name)
                    })
                    .await
            }
            None => locator::locate(&self.client, self.config.registry, name).await,
        }
    }

    async fn resolve_name_avatar(
        &self,
        name: &str,
        mut linkage: Vec<LinkageStep>,
    ) -> Result<Option<Avatar>, ResolveError> {
        let Some(handle) = self.locate(name).await? else {
            tracing::debug!(name, "no resolver bound");
            return Ok(None);
        };

        let Some(record) = self.text_record(&handle, "avatar").await? else {
            tracing::debug!(name, "no avatar record");
            return Ok(None);
        };

        let Some(classified) = classify(&record) else {
            tracing::debug!(name, record = %record, "unrecognized avatar record");
            return Ok(None);
        };

        match classified {
            ClassifiedRecord::Https => {
                linkage.push(LinkageStep::new("url", &record));
                Ok(Some(Avatar {
                    scheme: classified.scheme(),
                    url: record,
                    linkage,
                    nft: None,
                }))
            }
            ClassifiedRecord::Data => {
                linkage.push(LinkageStep::new("data", &record));
                Ok(Some(Avatar {
                    scheme: classified.scheme(),
                    url: record,
                    linkage,
                    nft: None,
                }))
            }
            ClassifiedRecord::Ipfs => {
                linkage.push(LinkageStep::new("ipfs", &record));
                let url = ipfs::ipfs_gateway_url(&self.config.ipfs_gateway, &record)?;
                Ok(Some(Avatar {
                    scheme: classified.scheme(),
                    url,
                    linkage,
                    nft: None,
                }))
            }
            ClassifiedRecord::Nft {
                kind,
                contract,
                token_id,
                ..
            } => {
                self.resolve_nft_avatar(&handle, kind, contract, token_id, record, linkage)
                    .await
            }
        }
    }

    async fn resolve_nft_avatar(
        &self,
        handle: &ResolverHandle,
        kind: NftKind,
        contract: Address,
        token_id: U256,
        record: String,
        mut linkage: Vec<LinkageStep>,
    ) -> Result<Option<Avatar>, ResolveError> {
        linkage.push(LinkageStep::new(kind.as_str(), &record));

        // The name's own address is the ownership candidate.
        let candidate = self.addr_record(handle).await?;

        // Ownership probe and metadata-URI read are independent once the
        // contract and token id are known.
        let (ownership, base_uri) = tokio::join!(
            nft::verify_ownership(&self.client, kind, contract, token_id, candidate),
            nft::metadata_uri(&self.client, kind, contract, token_id),
        );
        let ownership = ownership?;
        let Some(base_uri) = base_uri? else {
            tracing::debug!(%contract, %token_id, "token has no metadata URI");
            return Ok(None);
        };

        if let Some(owner) = ownership.owner {
            linkage.push(LinkageStep::new("owner", owner.to_string()));
        }
        if let Some(balance) = ownership.balance {
            linkage.push(LinkageStep::new("balance", balance.to_string()));
        }

        linkage.push(LinkageStep::new("metadata-url-base", &base_uri));

        let Some(meta) = nft::fetch_metadata(
            &self.http,
            &self.config.ipfs_gateway,
            kind,
            token_id,
            base_uri,
        )
        .await?
        else {
            return Ok(None);
        };

        if let Some(expanded) = &meta.expanded_uri {
            linkage.push(LinkageStep::new("metadata-url-expanded", expanded));
        }
        linkage.push(LinkageStep::new("metadata-url", &meta.fetch_url));
        linkage.push(LinkageStep::new(
            "metadata",
            serde_json::to_string(&meta.document).unwrap_or_default(),
        ));
        if let Some(raw) = &meta.image_ipfs {
            linkage.push(LinkageStep::new("url-ipfs", raw));
        }
        linkage.push(LinkageStep::new("url", &meta.image_url));

        Ok(Some(Avatar {
            scheme: kind.into(),
            url: meta.image_url.clone(),
            linkage,
            nft: Some(NftDetails {
                owner: ownership.owner,
                balance: ownership.balance,
                owned: ownership.owned,
                metadata: Some(meta.document),
            }),
        }))
    }

    /// `text(node, key)` through a resolver. A revert means the resolver
    /// predates text records, which is the same outcome as an empty record.
    async fn text_record(
        &self,
        handle: &ResolverHandle,
        key: &str,
    ) -> Result<Option<String>, ResolveError> {
        let node = namehash::namehash(&handle.name);
        let calldata = codec::encode_call(
            selector::TEXT,
            &[codec::AbiArg::word(node), codec::AbiArg::string(key)],
        );
        match self.client.eth_call(handle.address, calldata).await? {
            CallOutcome::Data(raw) => {
                Ok(codec::decode_string(&raw, 0).filter(|s| !s.is_empty()))
            }
            CallOutcome::Revert(err) => {
                tracing::debug!(resolver = %handle.address, key, error = %err, "text record read reverted");
                Ok(None)
            }
        }
    }

    /// `addr(node)` through a resolver; the zero address means unset.
    async fn addr_record(&self, handle: &ResolverHandle) -> Result<Option<Address>, ResolveError> {
        let node = namehash::namehash(&handle.name);
        let calldata = codec::encode_call(selector::ADDR, &[codec::AbiArg::word(node)]);
        match self.client.eth_call(handle.address, calldata).await? {
            CallOutcome::Data(raw) => {
                Ok(codec::decode_address(&raw).filter(|addr| !addr.is_zero()))
            }
            CallOutcome::Revert(err) => {
                tracing::debug!(resolver = %handle.address, error = %err, "addr record read reverted");
                Ok(None)
            }
        }
    }

    /// `name(node)` through a reverse resolver; empty means unset.
    async fn name_record(&self, handle: &ResolverHandle) -> Result<Option<String>, ResolveError> {
        let node = namehash::namehash(&handle.name);
        let calldata = codec::encode_call(selector::NAME, &[codec::AbiArg::word(node)]);
        match self.client.eth_call(handle.address, calldata).await? {
            CallOutcome::Data(raw) => {
                Ok(codec::decode_string(&raw, 0).filter(|s| !s.is_empty()))
            }
            CallOutcome::Revert(err) => {
                tracing::debug!(resolver = %handle.address, error = %err, "name record read reverted");
                Ok(None)
            }
        }
    }
}

/// Parse a `0x`-prefixed 20-byte account address.
///
/// Anything else, including a bare hex string without the prefix, is
/// treated as a name.
fn parse_address(identifier: &str) -> Option<Address> {
    if !identifier.starts_with("0x") && !identifier.starts_with("0X") {
        return None;
    }
    identifier.parse().ok()
}

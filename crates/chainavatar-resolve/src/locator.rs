//! Resolver location: the upward registry walk.

use alloy_primitives::Address;

use chainavatar_abi::{codec, namehash, selector};

use crate::client::{CallOutcome, ChainClient};
use crate::error::ResolveError;

/// The resolver contract discovered for a name, paired with the full name it
/// answers for (which may be a descendant of the label the resolver is bound
/// to, when wildcard resolution applied).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverHandle {
    pub address: Address,
    pub name: String,
}

/// Find the resolver contract responsible for `name`.
///
/// Walks upward from the full name, stripping the leftmost label until a
/// registry entry is found. An exact-match resolver is returned directly; a
/// resolver bound to an ancestor label is only usable if it advertises the
/// ENSIP-10 wildcard capability. Legacy resolvers cannot answer for
/// descendant names and yield `None`.
///
/// The walk strictly decreases the label count, so it terminates after at
/// most `labels + 1` iterations.
pub async fn locate(
    client: &ChainClient,
    registry: Address,
    name: &str,
) -> Result<Option<ResolverHandle>, ResolveError> {
    let mut current = name;

    loop {
        if current.is_empty() || current == "." {
            return Ok(None);
        }

        // The top-level `eth` node never carries a wildcard resolver for
        // subnames; skip the wasted registry call unless `eth` itself was
        // queried.
        if name != "eth" && current == "eth" {
            return Ok(None);
        }

        if let Some(resolver) = registry_resolver(client, registry, current).await? {
            if current == name {
                tracing::debug!(name, resolver = %resolver, "resolver found (exact)");
                return Ok(Some(ResolverHandle {
                    address: resolver,
                    name: name.to_string(),
                }));
            }

            // Ancestor match: only safe through a wildcard-aware resolver.
            if !supports_wildcard(client, resolver).await? {
                tracing::debug!(name, node = current, resolver = %resolver,
                    "legacy resolver on ancestor node; unusable for descendant");
                return Ok(None);
            }

            tracing::debug!(name, node = current, resolver = %resolver, "resolver found (wildcard)");
            return Ok(Some(ResolverHandle {
                address: resolver,
                name: name.to_string(),
            }));
        }

        current = match current.split_once('.') {
            Some((_, parent)) => parent,
            None => return Ok(None),
        };
    }
}

/// Query the registry for the resolver bound to `node_name`.
///
/// The registry signals an unbound node with the zero address.
async fn registry_resolver(
    client: &ChainClient,
    registry: Address,
    node_name: &str,
) -> Result<Option<Address>, ResolveError> {
    let node = namehash::namehash(node_name);
    let calldata = codec::encode_call(selector::RESOLVER, &[codec::AbiArg::word(node)]);
    let raw = client.eth_call_data(registry, calldata).await?;

    Ok(codec::decode_address(&raw).filter(|addr| !addr.is_zero()))
}

/// ERC-165 probe for the ENSIP-10 wildcard capability.
///
/// A revert counts as "unsupported": pre-ERC-165 resolvers have no
/// `supportsInterface` at all.
async fn supports_wildcard(
    client: &ChainClient,
    resolver: Address,
) -> Result<bool, ResolveError> {
    let calldata = codec::encode_call(
        selector::SUPPORTS_INTERFACE,
        &[codec::AbiArg::bytes4(selector::WILDCARD_INTERFACE_ID)],
    );

    match client.eth_call(resolver, calldata).await? {
        CallOutcome::Data(raw) => Ok(codec::decode_bool(&raw).unwrap_or(false)),
        CallOutcome::Revert(_) => Ok(false),
    }
}

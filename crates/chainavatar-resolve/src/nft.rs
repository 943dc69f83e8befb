//! NFT ownership verification and token metadata retrieval.

use alloy_primitives::{Address, U256};

use chainavatar_abi::{codec, selector};

use crate::avatar::NftKind;
use crate::client::{CallOutcome, ChainClient};
use crate::error::ResolveError;
use crate::ipfs;

/// Result of the on-chain ownership probe.
///
/// All fields are `None` when the probe reverted (ownership unknown) or when
/// no candidate address was available to check against. `owned` is derived
/// strictly from chain state, never from metadata content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnershipReport {
    /// `ownerOf` result (erc721).
    pub owner: Option<Address>,
    /// `balanceOf` result (erc1155).
    pub balance: Option<U256>,
    /// Whether `candidate` holds the token.
    pub owned: Option<bool>,
}

/// Verify that `candidate` owns the token, per the scheme's standard.
///
/// - erc721: `ownerOf(tokenId)`, compared against the candidate. Address
///   comparison happens on the parsed 20 bytes, so hex-case differences in
///   the source records cannot produce a false negative.
/// - erc1155: `balanceOf(candidate, tokenId)`, owned iff non-zero.
///
/// A revert (non-existent token, non-conforming contract) yields an empty
/// report rather than failing the resolution; a transport error propagates.
pub async fn verify_ownership(
    client: &ChainClient,
    kind: NftKind,
    contract: Address,
    token_id: U256,
    candidate: Option<Address>,
) -> Result<OwnershipReport, ResolveError> {
    match kind {
        NftKind::Erc721 => {
            let calldata =
                codec::encode_call(selector::OWNER_OF, &[codec::AbiArg::uint(token_id)]);
            match client.eth_call(contract, calldata).await? {
                CallOutcome::Data(raw) => {
                    let owner = codec::decode_address(&raw);
                    Ok(OwnershipReport {
                        owner,
                        balance: None,
                        owned: match (owner, candidate) {
                            (Some(owner), Some(candidate)) => Some(owner == candidate),
                            _ => None,
                        },
                    })
                }
                CallOutcome::Revert(err) => {
                    tracing::warn!(contract = %contract, %token_id, error = %err,
                        "ownerOf reverted; ownership unknown");
                    Ok(OwnershipReport::default())
                }
            }
        }
        NftKind::Erc1155 => {
            let Some(candidate) = candidate else {
                // No address record for the name, nothing to probe with.
                return Ok(OwnershipReport::default());
            };
            let calldata = codec::encode_call(
                selector::BALANCE_OF,
                &[codec::AbiArg::address(candidate), codec::AbiArg::uint(token_id)],
            );
            match client.eth_call(contract, calldata).await? {
                CallOutcome::Data(raw) => {
                    let balance = codec::decode_u256(&raw);
                    Ok(OwnershipReport {
                        owner: None,
                        balance,
                        owned: balance.map(|b| !b.is_zero()),
                    })
                }
                CallOutcome::Revert(err) => {
                    tracing::warn!(contract = %contract, %token_id, error = %err,
                        "balanceOf reverted; ownership unknown");
                    Ok(OwnershipReport::default())
                }
            }
        }
    }
}

/// Read the metadata URI from the token contract.
///
/// Uses `tokenURI(uint256)` for erc721 and `uri(uint256)` for erc1155. A
/// revert or an undecodable return yields `None`: the token has no usable
/// metadata pointer.
pub async fn metadata_uri(
    client: &ChainClient,
    kind: NftKind,
    contract: Address,
    token_id: U256,
) -> Result<Option<String>, ResolveError> {
    let sel = match kind {
        NftKind::Erc721 => selector::TOKEN_URI,
        NftKind::Erc1155 => selector::URI,
    };
    let calldata = codec::encode_call(sel, &[codec::AbiArg::uint(token_id)]);

    match client.eth_call(contract, calldata).await? {
        CallOutcome::Data(raw) => Ok(codec::decode_string(&raw, 0)),
        CallOutcome::Revert(err) => {
            tracing::debug!(contract = %contract, %token_id, error = %err,
                "metadata URI call reverted");
            Ok(None)
        }
    }
}

/// The token id as ERC-1155 templates expect it: lower-case hex, no prefix,
/// zero-padded to 64 digits.
pub fn token_id_hex(token_id: U256) -> String {
    hex::encode(token_id.to_be_bytes::<32>())
}

/// Substitute the token id for the `{id}` placeholder (first occurrence, as
/// ERC-1155 clients conventionally do).
pub fn expand_id_placeholder(uri: &str, token_id: U256) -> String {
    uri.replacen("{id}", &token_id_hex(token_id), 1)
}

/// The intermediate URLs and final image produced by a metadata fetch.
#[derive(Debug, Clone)]
pub struct TokenMetadata {
    /// Metadata URI as returned by the contract.
    pub base_uri: String,
    /// After `{id}` substitution (erc1155 only).
    pub expanded_uri: Option<String>,
    /// The URL actually fetched (after gateway translation).
    pub fetch_url: String,
    /// The parsed metadata document.
    pub document: serde_json::Value,
    /// The raw `image` value when it needed gateway translation.
    pub image_ipfs: Option<String>,
    /// The final, fetchable image URL.
    pub image_url: String,
}

/// Fetch and decode the token metadata document reachable from `base_uri`.
///
/// Applies `{id}` substitution for erc1155, translates `ipfs://` locators,
/// performs the HTTP GET, and extracts the `image` field. Returns `Ok(None)`
/// when the document has no usable image (absent, non-string, or an
/// unfetchable scheme); fetch and JSON failures are errors.
pub async fn fetch_metadata(
    http: &reqwest::Client,
    gateway: &str,
    kind: NftKind,
    token_id: U256,
    base_uri: String,
) -> Result<Option<TokenMetadata>, ResolveError> {
    let expanded_uri = match kind {
        NftKind::Erc1155 => Some(expand_id_placeholder(&base_uri, token_id)),
        NftKind::Erc721 => None,
    };

    let unresolved = expanded_uri.clone().unwrap_or_else(|| base_uri.clone());
    let fetch_url = if ipfs::is_ipfs_link(&unresolved) {
        ipfs::ipfs_gateway_url(gateway, &unresolved)?
    } else {
        unresolved
    };

    tracing::debug!(url = %fetch_url, "fetching token metadata");
    let resp = http
        .get(&fetch_url)
        .send()
        .await
        .map_err(|e| ResolveError::MetadataFetch {
            url: fetch_url.clone(),
            reason: e.to_string(),
        })?;

    if !resp.status().is_success() {
        return Err(ResolveError::MetadataFetch {
            url: fetch_url,
            reason: format!("HTTP {}", resp.status().as_u16()),
        });
    }

    let body = resp.bytes().await.map_err(|e| ResolveError::MetadataFetch {
        url: fetch_url.clone(),
        reason: e.to_string(),
    })?;
    let document: serde_json::Value =
        serde_json::from_slice(&body).map_err(|e| ResolveError::MetadataJson {
            url: fetch_url.clone(),
            reason: e.to_string(),
        })?;

    let Some((image_ipfs, image_url)) = extract_image(&document, gateway)? else {
        return Ok(None);
    };

    Ok(Some(TokenMetadata {
        base_uri,
        expanded_uri,
        fetch_url,
        document,
        image_ipfs,
        image_url,
    }))
}

/// Pull the image URL out of a metadata document.
///
/// The `image` field must be a string. `https://` and `data:` URLs pass
/// through; `ipfs://` is translated (returning the raw locator alongside for
/// the linkage trace); anything else is unresolvable.
fn extract_image(
    document: &serde_json::Value,
    gateway: &str,
) -> Result<Option<(Option<String>, String)>, ResolveError> {
    let Some(image) = document.get("image").and_then(|v| v.as_str()) else {
        return Ok(None);
    };

    if starts_with_ignore_case(image, "https://") || starts_with_ignore_case(image, "data:") {
        return Ok(Some((None, image.to_string())));
    }

    if ipfs::is_ipfs_link(image) {
        let url = ipfs::ipfs_gateway_url(gateway, image)?;
        return Ok(Some((Some(image.to_string()), url)));
    }

    Ok(None)
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

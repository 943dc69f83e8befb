//! Avatar record classification and the resolved descriptor.

use alloy_primitives::{Address, U256};
use serde::{Serialize, Serializer};

/// NFT standard backing an avatar record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NftKind {
    Erc721,
    Erc1155,
}

impl NftKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erc721 => "erc721",
            Self::Erc1155 => "erc1155",
        }
    }
}

/// The five recognized avatar record schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarScheme {
    UriHttps,
    UriData,
    UriIpfs,
    NftErc721,
    NftErc1155,
}

impl AvatarScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UriHttps => "uri:https",
            Self::UriData => "uri:data",
            Self::UriIpfs => "uri:ipfs",
            Self::NftErc721 => "nft:erc721",
            Self::NftErc1155 => "nft:erc1155",
        }
    }
}

impl std::fmt::Display for AvatarScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AvatarScheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<NftKind> for AvatarScheme {
    fn from(kind: NftKind) -> Self {
        match kind {
            NftKind::Erc721 => Self::NftErc721,
            NftKind::Erc1155 => Self::NftErc1155,
        }
    }
}

/// A raw avatar record, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedRecord {
    /// `https://...` — already fetchable, used verbatim.
    Https,
    /// `data:...` — inline payload, used verbatim.
    Data,
    /// `ipfs://...` — needs gateway translation.
    Ipfs,
    /// `eip155:<chain>/erc721:<contract>/<id>` or the `erc1155` variant.
    Nft {
        kind: NftKind,
        chain_id: u64,
        contract: Address,
        token_id: U256,
    },
}

impl ClassifiedRecord {
    pub fn scheme(&self) -> AvatarScheme {
        match self {
            Self::Https => AvatarScheme::UriHttps,
            Self::Data => AvatarScheme::UriData,
            Self::Ipfs => AvatarScheme::UriIpfs,
            Self::Nft { kind, .. } => (*kind).into(),
        }
    }
}

/// Classify a raw avatar text record.
///
/// Patterns are tried in fixed order and the first match wins; an
/// unrecognized record (or a CAIP asset reference that fails to parse)
/// yields `None`. Matching is case-insensitive on the scheme portion.
pub fn classify(record: &str) -> Option<ClassifiedRecord> {
    if starts_with_ignore_case(record, "https://") {
        return Some(ClassifiedRecord::Https);
    }
    if starts_with_ignore_case(record, "data:") {
        return Some(ClassifiedRecord::Data);
    }
    if starts_with_ignore_case(record, "ipfs://") {
        return Some(ClassifiedRecord::Ipfs);
    }
    classify_caip_asset(record)
}

/// Parse `eip155:<chainId>/erc<N>:<contract>/<tokenId>`.
fn classify_caip_asset(record: &str) -> Option<ClassifiedRecord> {
    let rest = strip_prefix_ignore_case(record, "eip155:")?;
    let (chain_id, rest) = rest.split_once('/')?;
    let chain_id: u64 = chain_id.parse().ok()?;

    let (kind_tag, asset) = rest.split_once(':')?;
    let kind = if kind_tag.eq_ignore_ascii_case("erc721") {
        NftKind::Erc721
    } else if kind_tag.eq_ignore_ascii_case("erc1155") {
        NftKind::Erc1155
    } else {
        return None;
    };

    // Exactly <contract>/<tokenId>
    let mut comps = asset.split('/');
    let contract = comps.next()?;
    let token_id = comps.next()?;
    if comps.next().is_some() {
        return None;
    }

    let contract: Address = contract.parse().ok()?;
    let token_id = parse_token_id(token_id)?;

    Some(ClassifiedRecord::Nft {
        kind,
        chain_id,
        contract,
        token_id,
    })
}

/// Token ids appear both as decimal and as `0x`-hex in the wild.
fn parse_token_id(s: &str) -> Option<U256> {
    if let Some(hex_part) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        U256::from_str_radix(hex_part, 16).ok()
    } else {
        U256::from_str_radix(s, 10).ok()
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    starts_with_ignore_case(s, prefix).then(|| &s[prefix.len()..])
}

/// One recorded resolution step. Serialized as `{type, content}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkageStep {
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl LinkageStep {
    pub fn new(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            content: content.into(),
        }
    }
}

/// On-chain verification and metadata details for NFT-backed avatars.
#[derive(Debug, Clone, Serialize)]
pub struct NftDetails {
    /// `ownerOf` result (erc721 only).
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_address"
    )]
    pub owner: Option<Address>,
    /// `balanceOf` result (erc1155 only), as a decimal string.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_u256"
    )]
    pub balance: Option<U256>,
    /// Whether the name's address holds the token. `None` means the probe
    /// failed or no candidate address was available: "unknown", which is
    /// distinct from a verified `false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,
    /// The fetched token metadata document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

fn serialize_opt_address<S: Serializer>(
    value: &Option<Address>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    // Only reached when Some (skip_serializing_if)
    match value {
        Some(addr) => serializer.collect_str(addr),
        None => serializer.serialize_none(),
    }
}

fn serialize_opt_u256<S: Serializer>(
    value: &Option<U256>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(balance) => serializer.collect_str(balance),
        None => serializer.serialize_none(),
    }
}

/// A fully resolved avatar: the final URL, its scheme, and the audit trail
/// of every step taken to reach it.
#[derive(Debug, Clone, Serialize)]
pub struct Avatar {
    pub scheme: AvatarScheme,
    pub url: String,
    pub linkage: Vec<LinkageStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nft: Option<NftDetails>,
}

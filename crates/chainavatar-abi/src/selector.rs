//! 4-byte function selectors for the registry, resolver and token contracts.

/// A 4-byte function selector.
pub type Selector = [u8; 4];

/// `resolver(bytes32)` — ENS registry.
pub const RESOLVER: Selector = [0x01, 0x78, 0xb8, 0xbf];

/// `addr(bytes32)` — resolver, forward address record.
pub const ADDR: Selector = [0x3b, 0x3b, 0x57, 0xde];

/// `name(bytes32)` — resolver, reverse name record.
pub const NAME: Selector = [0x69, 0x1f, 0x34, 0x31];

/// `text(bytes32,string)` — resolver, text record lookup.
pub const TEXT: Selector = [0x59, 0xd1, 0xd4, 0x3c];

/// `supportsInterface(bytes4)` — ERC-165 capability probe.
pub const SUPPORTS_INTERFACE: Selector = [0x01, 0xff, 0xc9, 0xa7];

/// Interface id of ENSIP-10 `resolve(bytes,bytes)` — the wildcard capability.
pub const WILDCARD_INTERFACE_ID: Selector = [0x90, 0x61, 0xb9, 0x23];

/// `ownerOf(uint256)` — ERC-721.
pub const OWNER_OF: Selector = [0x63, 0x52, 0x21, 0x1e];

/// `balanceOf(address,uint256)` — ERC-1155.
pub const BALANCE_OF: Selector = [0x00, 0xfd, 0xd5, 0x8e];

/// `tokenURI(uint256)` — ERC-721 metadata.
pub const TOKEN_URI: Selector = [0xc8, 0x7b, 0x56, 0xdd];

/// `uri(uint256)` — ERC-1155 metadata.
pub const URI: Selector = [0x0e, 0x89, 0x34, 0x1c];

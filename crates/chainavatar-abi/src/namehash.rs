//! EIP-137 namehash and the reverse-registrar node.

use alloy_primitives::{address, keccak256, Address, B256};

/// ENS registry address on mainnet (`0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e`).
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

/// Parent domain of all reverse records.
pub const REVERSE_REGISTRAR_DOMAIN: &str = "addr.reverse";

/// Returns the namehash of a dotted name as specified in
/// [EIP-137](https://eips.ethereum.org/EIPS/eip-137).
///
/// The empty name hashes to the zero node.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return B256::ZERO;
    }

    // Fold over labels right to left: node = keccak(parent ++ keccak(label))
    name.rsplit('.')
        .fold([0u8; 32], |node, label| {
            *keccak256([node, *keccak256(label.as_bytes())].concat())
        })
        .into()
}

/// Returns the reverse-registrar node name for an address:
/// `<lowercase-hex-without-0x>.addr.reverse`.
pub fn reverse_node(addr: Address) -> String {
    format!("{}.{REVERSE_REGISTRAR_DOMAIN}", hex::encode(addr.as_slice()))
}

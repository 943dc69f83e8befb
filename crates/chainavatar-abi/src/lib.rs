//! chainavatar-abi — the binary layer of the resolution engine.
//!
//! The engine talks to exactly nine contract functions, so there is no ABI
//! schema here: calldata is built by hand from 4-byte selectors and 32-byte
//! words, and return data is decoded by hand from offset/length words.
//!
//! - [`selector`] — the selector constants
//! - [`codec`] — calldata encoding and returndata decoding
//! - [`namehash`] — EIP-137 namehash and reverse-node construction

pub mod codec;
pub mod namehash;
pub mod selector;

pub use codec::{
    decode_address, decode_bool, decode_bytes, decode_string, decode_u256, encode_call, AbiArg,
};
pub use namehash::{namehash, reverse_node, ENS_REGISTRY, REVERSE_REGISTRAR_DOMAIN};

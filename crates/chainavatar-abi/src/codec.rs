//! Manual calldata encoding and returndata decoding.
//!
//! Calldata follows the standard head/tail layout: one 32-byte head slot per
//! argument, where a dynamic argument's slot holds the byte offset (relative
//! to the start of the argument area) of its `length ++ data` tail.
//!
//! Decoding never panics: the empty-call sentinel (`0x`) and any
//! offset/length that falls outside the buffer yield `None`.

use alloy_primitives::{Address, B256, U256};

use crate::selector::Selector;

const WORD: usize = 32;

/// A single encoded call argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiArg {
    /// A static 32-byte word (uint256, bytes32, address, bytes4...).
    Word([u8; 32]),
    /// A dynamic byte string (`string` / `bytes`).
    Bytes(Vec<u8>),
}

impl AbiArg {
    /// A `bytes32` word.
    pub fn word(value: B256) -> Self {
        Self::Word(value.0)
    }

    /// An `address`, left-padded to 32 bytes.
    pub fn address(value: Address) -> Self {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(value.as_slice());
        Self::Word(word)
    }

    /// A `uint256`, big-endian.
    pub fn uint(value: U256) -> Self {
        Self::Word(value.to_be_bytes::<32>())
    }

    /// A `bytes4`, right-padded to 32 bytes (fixed bytes are left-aligned).
    pub fn bytes4(value: Selector) -> Self {
        let mut word = [0u8; 32];
        word[..4].copy_from_slice(&value);
        Self::Word(word)
    }

    /// A `string` argument.
    pub fn string(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

/// Encode a function call: `selector ++ head ++ tail`.
pub fn encode_call(selector: Selector, args: &[AbiArg]) -> Vec<u8> {
    let head_len = args.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        match arg {
            AbiArg::Word(word) => head.extend_from_slice(word),
            AbiArg::Bytes(bytes) => {
                let offset = head_len + tail.len();
                head.extend_from_slice(&U256::from(offset).to_be_bytes::<32>());
                tail.extend_from_slice(&U256::from(bytes.len()).to_be_bytes::<32>());
                tail.extend_from_slice(bytes);
                // Pad the data to a word boundary
                let rem = bytes.len() % WORD;
                if rem != 0 {
                    tail.extend(std::iter::repeat(0u8).take(WORD - rem));
                }
            }
        }
    }

    let mut calldata = Vec::with_capacity(4 + head.len() + tail.len());
    calldata.extend_from_slice(&selector);
    calldata.extend_from_slice(&head);
    calldata.extend_from_slice(&tail);
    calldata
}

/// Read the 32-byte word starting at byte `offset`, if in range.
fn word_at(result: &[u8], offset: usize) -> Option<&[u8]> {
    let end = offset.checked_add(WORD)?;
    result.get(offset..end)
}

/// Read the word at byte `offset` as a `usize`, if it fits.
fn usize_at(result: &[u8], offset: usize) -> Option<usize> {
    let word = word_at(result, offset)?;
    let value = U256::from_be_slice(word);
    usize::try_from(value).ok()
}

/// Decode a dynamic byte string whose pointer word starts at byte `start`.
///
/// Reads the pointer word, then the length word it points at, then slices
/// `length` bytes immediately following. Returns `None` for the empty-call
/// sentinel and for any out-of-range offset or length.
pub fn decode_bytes(result: &[u8], start: usize) -> Option<Vec<u8>> {
    if result.is_empty() {
        return None;
    }

    let offset = usize_at(result, start)?;
    let length = usize_at(result, offset)?;
    let data_start = offset.checked_add(WORD)?;
    let data_end = data_start.checked_add(length)?;
    result.get(data_start..data_end).map(<[u8]>::to_vec)
}

/// Decode a dynamic string; invalid UTF-8 yields `None` rather than an error.
pub fn decode_string(result: &[u8], start: usize) -> Option<String> {
    String::from_utf8(decode_bytes(result, start)?).ok()
}

/// Decode the first return word as an address (last 20 bytes of the word).
pub fn decode_address(result: &[u8]) -> Option<Address> {
    let word = word_at(result, 0)?;
    Some(Address::from_slice(&word[12..]))
}

/// Decode the first return word as an unsigned 256-bit integer.
pub fn decode_u256(result: &[u8]) -> Option<U256> {
    word_at(result, 0).map(U256::from_be_slice)
}

/// Decode the first return word as a boolean (non-zero = true).
pub fn decode_bool(result: &[u8]) -> Option<bool> {
    word_at(result, 0).map(|word| word.iter().any(|b| *b != 0))
}

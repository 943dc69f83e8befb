//! chainavatar-core — foundation traits and types for ChainAvatar.
//!
//! # Overview
//!
//! ChainAvatar resolves names and NFT avatars against an ENS-style on-chain
//! registry. The core crate defines:
//!
//! - [`RpcTransport`] — the central async trait every transport implements
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`] — wire types
//! - [`CallRequest`] — the `eth_call` transaction object
//! - [`TransportError`] — structured error type
//! - [`RetryPolicy`] — bounded exponential-backoff retry for read calls

pub mod error;
pub mod policy;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use policy::{RetryConfig, RetryPolicy};
pub use request::{CallRequest, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use transport::RpcTransport;

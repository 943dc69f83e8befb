//! chainavatar-resolve — the name and avatar resolution engine.
//!
//! # Overview
//!
//! The engine takes an identifier (a dotted name such as `alice.eth`, or a
//! 20-byte account address) and produces a fully resolved avatar URL plus a
//! linkage trace of every resolution step:
//!
//! 1. Walk the registry upward from the name to the responsible resolver
//!    contract, honoring the ENSIP-10 wildcard capability for ancestor
//!    matches ([`locator`]).
//! 2. Read the `avatar` text record through that resolver.
//! 3. Classify the record into one of five schemes ([`avatar`]).
//! 4. For NFT-backed schemes, verify ownership on chain and fetch the token
//!    metadata document off chain ([`nft`]).
//! 5. Translate content-addressed (`ipfs://`) locators through a public
//!    gateway ([`ipfs`]).
//!
//! Not-found conditions are `Ok(None)`; transport and gateway faults are
//! structured [`ResolveError`]s and are never collapsed into `None`.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use chainavatar_resolve::{AvatarResolver, EngineConfig};
//! # let transport: Arc<dyn chainavatar_core::RpcTransport> = unimplemented!();
//!
//! let resolver = AvatarResolver::new(transport, EngineConfig::default());
//! if let Some(avatar) = resolver.resolve_avatar("alice.eth").await? {
//!     println!("{} ({})", avatar.url, avatar.scheme);
//! }
//! # Ok(())
//! # }
//! ```

pub mod avatar;
mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod ipfs;
pub mod locator;
pub mod nft;

pub use avatar::{Avatar, AvatarScheme, ClassifiedRecord, LinkageStep, NftDetails, NftKind};
pub use config::EngineConfig;
pub use engine::{AvatarResolver, Identity};
pub use error::ResolveError;
pub use locator::ResolverHandle;
pub use nft::OwnershipReport;

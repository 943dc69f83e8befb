//! Typed `eth_call` wrapper over the transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;

use chainavatar_core::{CallRequest, JsonRpcError, JsonRpcRequest, RpcTransport, TransportError};

/// Outcome of a read-only contract call.
///
/// A revert is not a transport failure: for `eth_call` the node reports it as
/// a JSON-RPC error object, and several resolution steps legitimately probe
/// contracts that may revert (ownership of a non-existent token, capability
/// probes against pre-ERC-165 resolvers). Callers decide per call site
/// whether a revert is fatal.
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// The call executed; raw return data (may be empty, the `0x` sentinel).
    Data(Vec<u8>),
    /// The node rejected execution (revert or equivalent).
    Revert(JsonRpcError),
}

/// Issues `eth_call`s through an [`RpcTransport`], hex-decoding results.
pub struct ChainClient {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl ChainClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    /// Endpoint identifier, for logging.
    pub fn endpoint(&self) -> &str {
        self.transport.url()
    }

    /// Execute a read-only call against `to` with raw calldata.
    pub async fn eth_call(
        &self,
        to: Address,
        calldata: Vec<u8>,
    ) -> Result<CallOutcome, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let call = CallRequest::new(
            format!("0x{}", hex::encode(to.as_slice())),
            format!("0x{}", hex::encode(&calldata)),
        );
        let resp = self
            .transport
            .send(JsonRpcRequest::eth_call(id, &call))
            .await?;

        match resp.into_result() {
            Ok(value) => {
                let hex_str = value.as_str().ok_or_else(|| {
                    TransportError::Other("eth_call result is not a string".into())
                })?;
                let raw = hex::decode(hex_str.trim_start_matches("0x"))
                    .map_err(|e| TransportError::Other(format!("invalid hex in result: {e}")))?;
                Ok(CallOutcome::Data(raw))
            }
            Err(err) => {
                tracing::debug!(to = %to, code = err.code, message = %err.message, "call reverted");
                Ok(CallOutcome::Revert(err))
            }
        }
    }

    /// Execute a call where a revert is a hard failure.
    ///
    /// Used for the registry and record reads, where the contracts signal
    /// "not found" with zero/empty returns rather than reverts.
    pub async fn eth_call_data(
        &self,
        to: Address,
        calldata: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        match self.eth_call(to, calldata).await? {
            CallOutcome::Data(raw) => Ok(raw),
            CallOutcome::Revert(err) => Err(TransportError::Rpc(err)),
        }
    }
}

//! End-to-end engine tests over a scripted transport.
//!
//! Every chain interaction is an `eth_call`, so the mock keys its replies on
//! `(to, calldata)` and records every call it sees, which also lets the
//! registry-walk tests assert exactly which nodes were probed.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use alloy_primitives::{Address, U256};
use async_trait::async_trait;

use chainavatar_abi::{codec, namehash, selector, ENS_REGISTRY};
use chainavatar_core::{
    CallRequest, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcTransport, TransportError,
};
use chainavatar_resolve::client::ChainClient;
use chainavatar_resolve::{nft, AvatarResolver, AvatarScheme, EngineConfig, NftKind};

#[derive(Clone)]
enum Reply {
    Data(String),
    Revert,
}

#[derive(Default)]
struct MockTransport {
    replies: HashMap<(String, String), Reply>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockTransport {
    fn new() -> Self {
        Self::default()
    }

    fn on(mut self, to: Address, calldata: Vec<u8>, reply: Reply) -> Self {
        self.replies.insert(key(to, &calldata), reply);
        self
    }

    fn recorded_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

fn key(to: Address, calldata: &[u8]) -> (String, String) {
    (
        format!("0x{}", hex::encode(to.as_slice())),
        format!("0x{}", hex::encode(calldata)),
    )
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        assert_eq!(req.method, "eth_call");
        let call: CallRequest = serde_json::from_value(req.params[0].clone()).unwrap();
        self.calls
            .lock()
            .unwrap()
            .push((call.to.clone(), call.data.clone()));

        // Unscripted calls behave like an empty return (the `0x` sentinel).
        let reply = self
            .replies
            .get(&(call.to, call.data))
            .cloned()
            .unwrap_or(Reply::Data("0x".into()));

        Ok(match reply {
            Reply::Data(data) => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: req.id,
                result: Some(serde_json::Value::String(data)),
                error: None,
            },
            Reply::Revert => JsonRpcResponse {
                jsonrpc: "2.0".into(),
                id: req.id,
                result: None,
                error: Some(JsonRpcError {
                    code: 3,
                    message: "execution reverted".into(),
                    data: None,
                }),
            },
        })
    }

    fn url(&self) -> &str {
        "mock://chain"
    }
}

// ---- calldata / returndata builders ----------------------------------------

fn registry_probe(name: &str) -> Vec<u8> {
    codec::encode_call(
        selector::RESOLVER,
        &[codec::AbiArg::word(namehash::namehash(name))],
    )
}

fn text_avatar_call(name: &str) -> Vec<u8> {
    codec::encode_call(
        selector::TEXT,
        &[
            codec::AbiArg::word(namehash::namehash(name)),
            codec::AbiArg::string("avatar"),
        ],
    )
}

fn addr_call(name: &str) -> Vec<u8> {
    codec::encode_call(
        selector::ADDR,
        &[codec::AbiArg::word(namehash::namehash(name))],
    )
}

fn name_call(node_name: &str) -> Vec<u8> {
    codec::encode_call(
        selector::NAME,
        &[codec::AbiArg::word(namehash::namehash(node_name))],
    )
}

fn wildcard_probe() -> Vec<u8> {
    codec::encode_call(
        selector::SUPPORTS_INTERFACE,
        &[codec::AbiArg::bytes4(selector::WILDCARD_INTERFACE_ID)],
    )
}

fn address_result(addr: Address) -> Reply {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr.as_slice());
    Reply::Data(format!("0x{}", hex::encode(word)))
}

fn uint_result(value: U256) -> Reply {
    Reply::Data(format!("0x{}", hex::encode(value.to_be_bytes::<32>())))
}

fn bool_result(value: bool) -> Reply {
    uint_result(U256::from(value as u64))
}

fn string_result(s: &str) -> Reply {
    let mut out = Vec::new();
    out.extend_from_slice(&U256::from(32u64).to_be_bytes::<32>());
    out.extend_from_slice(&U256::from(s.len() as u64).to_be_bytes::<32>());
    out.extend_from_slice(s.as_bytes());
    let rem = s.len() % 32;
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(32 - rem));
    }
    Reply::Data(format!("0x{}", hex::encode(out)))
}

fn resolver_contract() -> Address {
    Address::repeat_byte(0x52)
}

fn engine(mock: MockTransport) -> AvatarResolver {
    AvatarResolver::new(Arc::new(mock), EngineConfig::default())
}

// ---- registry walk ---------------------------------------------------------

#[tokio::test]
async fn walk_probes_each_ancestor_but_never_eth() {
    let mock = Arc::new(MockTransport::new());
    let resolver = AvatarResolver::new(mock.clone(), EngineConfig::default());

    let result = resolver.resolve_avatar("sub.sub.example.eth").await.unwrap();
    assert!(result.is_none());

    let calls = mock.recorded_calls();
    let expected: Vec<(String, String)> = ["sub.sub.example.eth", "sub.example.eth", "example.eth"]
        .iter()
        .map(|name| {
            let (to, data) = key(ENS_REGISTRY, &registry_probe(name));
            (to, data)
        })
        .collect();
    assert_eq!(calls, expected, "walk must probe exactly the three subname nodes");
}

#[tokio::test]
async fn locating_eth_itself_probes_the_eth_node() {
    let mock = Arc::new(MockTransport::new());
    let resolver = AvatarResolver::new(mock.clone(), EngineConfig::default());

    assert!(resolver.forward_lookup("eth").await.unwrap().is_none());

    let calls = mock.recorded_calls();
    let (to, data) = key(ENS_REGISTRY, &registry_probe("eth"));
    assert_eq!(calls, vec![(to, data)]);
}

#[tokio::test]
async fn wildcard_resolver_answers_for_descendants() {
    let resolver_addr = resolver_contract();
    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("example.eth"), address_result(resolver_addr))
        .on(resolver_addr, wildcard_probe(), bool_result(true))
        .on(
            resolver_addr,
            text_avatar_call("sub.example.eth"),
            string_result("https://img/wild.png"),
        );

    let avatar = engine(mock)
        .resolve_avatar("sub.example.eth")
        .await
        .unwrap()
        .expect("wildcard resolver should resolve the descendant");
    assert_eq!(avatar.url, "https://img/wild.png");
}

#[tokio::test]
async fn legacy_resolver_on_ancestor_is_rejected() {
    let resolver_addr = resolver_contract();
    // supportsInterface reverts: pre-ERC-165 resolver.
    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("example.eth"), address_result(resolver_addr))
        .on(resolver_addr, wildcard_probe(), Reply::Revert);

    let result = engine(mock).resolve_avatar("sub.example.eth").await.unwrap();
    assert!(result.is_none());
}

// ---- URI schemes -----------------------------------------------------------

#[tokio::test]
async fn https_record_resolves_verbatim() {
    let resolver_addr = resolver_contract();
    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(resolver_addr))
        .on(
            resolver_addr,
            text_avatar_call("alice.eth"),
            string_result("https://img/a.png"),
        );

    let avatar = engine(mock)
        .resolve_avatar("alice.eth")
        .await
        .unwrap()
        .expect("https record should resolve");

    assert_eq!(avatar.scheme, AvatarScheme::UriHttps);
    assert_eq!(avatar.url, "https://img/a.png");
    assert!(avatar.nft.is_none());
    assert_eq!(avatar.linkage.len(), 2);
    assert_eq!(avatar.linkage[0].kind, "name");
    assert_eq!(avatar.linkage[0].content, "alice.eth");
    assert_eq!(avatar.linkage[1].kind, "url");
}

#[tokio::test]
async fn ipfs_record_resolves_through_gateway() {
    let resolver_addr = resolver_contract();
    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(resolver_addr))
        .on(
            resolver_addr,
            text_avatar_call("alice.eth"),
            string_result("ipfs://QmAvatar/a.png"),
        );

    let avatar = engine(mock).resolve_avatar("alice.eth").await.unwrap().unwrap();
    assert_eq!(avatar.scheme, AvatarScheme::UriIpfs);
    assert_eq!(avatar.url, "https://gateway.ipfs.io/ipfs/QmAvatar/a.png");
}

#[tokio::test]
async fn unrecognized_record_is_not_found() {
    let resolver_addr = resolver_contract();
    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(resolver_addr))
        .on(
            resolver_addr,
            text_avatar_call("alice.eth"),
            string_result("ftp://files/a.png"),
        );

    assert!(engine(mock).resolve_avatar("alice.eth").await.unwrap().is_none());
}

// ---- reverse path ----------------------------------------------------------

#[tokio::test]
async fn address_without_reverse_name_is_not_found() {
    let mock = MockTransport::new();
    let result = engine(mock)
        .resolve_avatar("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn address_resolves_through_primary_name() {
    let account = Address::from_str("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap();
    let reverse_resolver = Address::repeat_byte(0x77);
    let forward_resolver = resolver_contract();
    let reverse = namehash::reverse_node(account);

    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe(&reverse), address_result(reverse_resolver))
        .on(reverse_resolver, name_call(&reverse), string_result("alice.eth"))
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(forward_resolver))
        .on(
            forward_resolver,
            text_avatar_call("alice.eth"),
            string_result("https://img/a.png"),
        );

    let avatar = engine(mock)
        .resolve_avatar("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
        .await
        .unwrap()
        .expect("address with primary name should resolve");

    assert_eq!(avatar.url, "https://img/a.png");
    assert_eq!(avatar.linkage[0].kind, "address");
    assert_eq!(avatar.linkage[1].kind, "name");
    assert_eq!(avatar.linkage[1].content, "alice.eth");
}

#[tokio::test]
async fn resolve_identifier_returns_both_halves() {
    let account = Address::from_str("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap();
    let forward_resolver = resolver_contract();

    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(forward_resolver))
        .on(forward_resolver, addr_call("alice.eth"), address_result(account));

    let identity = engine(mock)
        .resolve_identifier("alice.eth")
        .await
        .unwrap()
        .expect("name with addr record resolves");
    assert_eq!(identity.address, account);
    assert_eq!(identity.name.as_deref(), Some("alice.eth"));
}

// ---- NFT ownership ---------------------------------------------------------

fn chain_client(mock: MockTransport) -> ChainClient {
    ChainClient::new(Arc::new(mock))
}

fn owner_of_call(token_id: U256) -> Vec<u8> {
    codec::encode_call(selector::OWNER_OF, &[codec::AbiArg::uint(token_id)])
}

fn balance_of_call(owner: Address, token_id: U256) -> Vec<u8> {
    codec::encode_call(
        selector::BALANCE_OF,
        &[codec::AbiArg::address(owner), codec::AbiArg::uint(token_id)],
    )
}

#[tokio::test]
async fn erc721_ownership_ignores_source_hex_case() {
    let contract = Address::repeat_byte(0x10);
    let token_id = U256::from(29233u64);
    // Same 20 bytes, originally written in different hex case.
    let owner = Address::from_str("0xAAAABBBBCCCCDDDDEEEEFFFF0000111122223333").unwrap();
    let candidate = Address::from_str("0xaaaabbbbccccddddeeeeffff0000111122223333").unwrap();

    let mock = MockTransport::new().on(contract, owner_of_call(token_id), address_result(owner));
    let report = nft::verify_ownership(
        &chain_client(mock),
        NftKind::Erc721,
        contract,
        token_id,
        Some(candidate),
    )
    .await
    .unwrap();

    assert_eq!(report.owner, Some(owner));
    assert_eq!(report.owned, Some(true));
}

#[tokio::test]
async fn erc1155_zero_balance_is_not_owned() {
    let contract = Address::repeat_byte(0x10);
    let token_id = U256::from(7u64);
    let candidate = Address::repeat_byte(0xaa);

    let mock = MockTransport::new().on(
        contract,
        balance_of_call(candidate, token_id),
        uint_result(U256::ZERO),
    );
    let report = nft::verify_ownership(
        &chain_client(mock),
        NftKind::Erc1155,
        contract,
        token_id,
        Some(candidate),
    )
    .await
    .unwrap();

    assert_eq!(report.balance, Some(U256::ZERO));
    assert_eq!(report.owned, Some(false));
}

#[tokio::test]
async fn erc1155_nonzero_balance_is_owned() {
    let contract = Address::repeat_byte(0x10);
    let token_id = U256::from(7u64);
    let candidate = Address::repeat_byte(0xaa);

    let mock = MockTransport::new().on(
        contract,
        balance_of_call(candidate, token_id),
        uint_result(U256::from(3u64)),
    );
    let report = nft::verify_ownership(
        &chain_client(mock),
        NftKind::Erc1155,
        contract,
        token_id,
        Some(candidate),
    )
    .await
    .unwrap();

    assert_eq!(report.owned, Some(true));
}

#[tokio::test]
async fn reverted_ownership_probe_is_unknown_not_fatal() {
    let contract = Address::repeat_byte(0x10);
    let token_id = U256::from(404u64);

    let mock = MockTransport::new().on(contract, owner_of_call(token_id), Reply::Revert);
    let report = nft::verify_ownership(
        &chain_client(mock),
        NftKind::Erc721,
        contract,
        token_id,
        Some(Address::repeat_byte(0xaa)),
    )
    .await
    .unwrap();

    assert_eq!(report.owner, None);
    assert_eq!(report.owned, None);
}

// ---- full NFT resolution against a local metadata server -------------------

/// Serve one HTTP request with a fixed JSON body, returning the bound port
/// and the path that was requested.
async fn serve_metadata_once(
    body: &'static str,
) -> (u16, tokio::sync::oneshot::Receiver<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (path_tx, path_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = stream.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).to_string();
        let path = request
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or_default()
            .to_string();
        let _ = path_tx.send(path);

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    (port, path_rx)
}

#[tokio::test]
async fn erc1155_avatar_resolves_with_padded_id_substitution() {
    let (port, path_rx) = serve_metadata_once(r#"{"image":"https://img/nft.png"}"#).await;

    let account = Address::from_str("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045").unwrap();
    let contract = Address::repeat_byte(0x10);
    let token_id = U256::from(1u64);
    let resolver_addr = resolver_contract();
    let record = format!("eip155:1/erc1155:0x{}/1", hex::encode(contract.as_slice()));

    let uri_call = codec::encode_call(selector::URI, &[codec::AbiArg::uint(token_id)]);
    let template = format!("http://127.0.0.1:{port}/{{id}}.json");

    let mock = MockTransport::new()
        .on(ENS_REGISTRY, registry_probe("alice.eth"), address_result(resolver_addr))
        .on(resolver_addr, text_avatar_call("alice.eth"), string_result(&record))
        .on(resolver_addr, addr_call("alice.eth"), address_result(account))
        .on(contract, balance_of_call(account, token_id), uint_result(U256::from(1u64)))
        .on(contract, uri_call, string_result(&template));

    let avatar = engine(mock)
        .resolve_avatar("alice.eth")
        .await
        .unwrap()
        .expect("erc1155 avatar should resolve");

    assert_eq!(avatar.scheme, AvatarScheme::NftErc1155);
    assert_eq!(avatar.url, "https://img/nft.png");

    let nft = avatar.nft.expect("nft details present");
    assert_eq!(nft.balance, Some(U256::from(1u64)));
    assert_eq!(nft.owned, Some(true));

    // The fetched path carries the padded hex id, not the decimal value.
    let path = path_rx.await.unwrap();
    assert_eq!(
        path,
        "/0000000000000000000000000000000000000000000000000000000000000001.json"
    );

    let kinds: Vec<&str> = avatar.linkage.iter().map(|s| s.kind.as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "name",
            "erc1155",
            "balance",
            "metadata-url-base",
            "metadata-url-expanded",
            "metadata-url",
            "metadata",
            "url"
        ]
    );
}

// ---- fault propagation -----------------------------------------------------

struct FailingTransport;

#[async_trait]
impl RpcTransport for FailingTransport {
    async fn send(&self, _req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        Err(TransportError::Http("connection refused".into()))
    }

    fn url(&self) -> &str {
        "mock://down"
    }
}

#[tokio::test]
async fn transport_failure_is_an_error_not_none() {
    let resolver = AvatarResolver::new(Arc::new(FailingTransport), EngineConfig::default());
    let err = resolver.resolve_avatar("alice.eth").await.unwrap_err();
    assert!(err.is_retryable());
}

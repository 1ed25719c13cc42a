//! Client ↔ host over in-memory pipes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use toolwire_application::ToolClientPort;
use toolwire_domain::{Arguments, HostState, SessionState, ToolCallResult};
use toolwire_infrastructure::{
    ClientConfig, ClientError, Framing, HostSessionReport, ToolClient, ToolHost, ToolRegistry,
    Transport, register_builtin_tools,
    transport::FramedTransport,
};

type PipeTransport = FramedTransport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

fn pipe(framing: Framing) -> (PipeTransport, PipeTransport) {
    let (a, b) = tokio::io::duplex(64 * 1024);
    let (ar, aw) = tokio::io::split(a);
    let (br, bw) = tokio::io::split(b);
    (
        FramedTransport::new(ar, aw, framing).with_label("client-pipe"),
        FramedTransport::new(br, bw, framing).with_label("host-pipe"),
    )
}

fn args(value: Value) -> Arguments {
    value.as_object().cloned().unwrap()
}

fn builtin_host() -> Arc<ToolHost> {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry).unwrap();
    Arc::new(ToolHost::new(Arc::new(registry)).with_instructions("demo tools"))
}

async fn connected(config: ClientConfig) -> (ToolClient, JoinHandle<HostSessionReport>) {
    let (client_side, host_side) = pipe(config.framing);
    let host = builtin_host();
    let task = tokio::spawn(async move { host.serve(host_side).await });

    let client = ToolClient::new(config);
    client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap();
    (client, task)
}

/// A host that completes the handshake but never answers `tools/call`.
async fn silent_host(mut transport: PipeTransport, answer_handshake: bool) {
    while let Ok(Some(frame)) = transport.receive().await {
        let message: Value = serde_json::from_slice(&frame).unwrap();
        let Some(id) = message.get("id").cloned() else {
            continue;
        };
        let result = match (answer_handshake, message["method"].as_str()) {
            (true, Some("initialize")) => json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {"tools": {"listChanged": false}},
                "serverInfo": {"name": "silent", "version": "0.0.1"}
            }),
            (true, Some("tools/list")) => json!({
                "tools": [{
                    "name": "slow",
                    "description": "Never returns",
                    "inputSchema": {"type": "object", "properties": {}}
                }]
            }),
            _ => continue,
        };
        let reply = json!({"jsonrpc": "2.0", "id": id, "result": result});
        transport
            .send(&serde_json::to_vec(&reply).unwrap())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn handshake_caches_tools_in_registration_order() {
    let (client, host) = connected(ClientConfig::default()).await;

    assert_eq!(client.state(), SessionState::Ready);
    let names: Vec<_> = client
        .list_tools()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["echo", "sum"]);
    assert_eq!(client.server_info().unwrap().name, "toolwire");

    let remote = client.list_tools_remote().await.unwrap();
    assert_eq!(remote, client.list_tools().unwrap());
    client.ping().await.unwrap();

    client.disconnect().await;
    let report = host.await.unwrap();
    assert_eq!(report.final_state, HostState::Closed);
    assert_eq!(report.client.unwrap().name, "toolwire-client");
    // initialize, tools/list (handshake), tools/list (remote), ping
    assert_eq!(report.requests, 4);
    assert!(report.error.is_none());
}

#[tokio::test]
async fn calls_echo_and_sum() {
    let (client, host) = connected(ClientConfig::default()).await;

    let echoed = client
        .call_tool("echo", args(json!({"text": "hello"})))
        .await
        .unwrap();
    assert_eq!(echoed, ToolCallResult::success(json!("hello")));

    // integral strings are coerced by the host's validator
    let total = client
        .call_tool("sum", args(json!({"a": 2, "b": "3"})))
        .await
        .unwrap();
    assert_eq!(total, ToolCallResult::success(json!(5)));

    client.disconnect().await;
    assert_eq!(host.await.unwrap().tool_calls, 2);
}

#[tokio::test]
async fn content_length_framing_end_to_end() {
    let config = ClientConfig::default().with_framing(Framing::ContentLength);
    let (client, host) = connected(config).await;

    let total = client
        .call_tool("sum", args(json!({"a": 40, "b": 2})))
        .await
        .unwrap();
    assert_eq!(total.payload(), Some(&json!(42)));

    client.disconnect().await;
    host.await.unwrap();
}

#[tokio::test]
async fn unknown_tool_fails_without_a_round_trip() {
    let (client, host) = connected(ClientConfig::default()).await;

    let err = client
        .call_tool("forecast_sales", Arguments::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnknownTool(ref name) if name == "forecast_sales"));
    assert_eq!(err.to_string(), "unknown tool: forecast_sales");

    client.disconnect().await;
    assert_eq!(host.await.unwrap().tool_calls, 0);
}

#[tokio::test]
async fn validation_failure_is_a_result_not_an_error() {
    let (client, host) = connected(ClientConfig::default()).await;

    let result = client
        .call_tool("sum", args(json!({"a": "x", "b": 1})))
        .await
        .unwrap();
    let message = result.failure_message().unwrap();
    assert!(message.contains("'a'"), "{message}");

    let result = client
        .call_tool("echo", args(json!({"text": "hi", "extra": true})))
        .await
        .unwrap();
    assert!(!result.is_success());

    // session still usable
    assert!(client.is_ready());
    client.disconnect().await;
    host.await.unwrap();
}

#[tokio::test]
async fn disconnect_is_idempotent() {
    let (client, host) = connected(ClientConfig::default()).await;

    client.disconnect().await;
    assert_eq!(client.state(), SessionState::Closed);
    client.disconnect().await;
    assert_eq!(client.state(), SessionState::Closed);
    assert!(matches!(
        client.call_tool("echo", Arguments::new()).await,
        Err(ClientError::NotConnected)
    ));
    host.await.unwrap();
}

#[tokio::test]
async fn connect_when_ready_is_a_noop() {
    let (client, host) = connected(ClientConfig::default()).await;

    // a second transport is ignored while the first session is Ready
    let (spare, _unused_host_side) = pipe(Framing::JsonLines);
    client.connect_transport(Box::new(spare)).await.unwrap();
    assert!(client.is_ready());
    client.ping().await.unwrap();
    ToolClientPort::ping(&client).await.unwrap();

    client.disconnect().await;
    assert_eq!(host.await.unwrap().requests, 4);
}

#[tokio::test]
async fn call_timeout_closes_the_session() {
    let (client_side, host_side) = pipe(Framing::JsonLines);
    tokio::spawn(silent_host(host_side, true));

    let client =
        ToolClient::new(ClientConfig::default().with_call_timeout(Duration::from_millis(150)));
    client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap();
    assert_eq!(client.server_info().unwrap().name, "silent");

    let started = Instant::now();
    let err = client
        .call_tool("slow", Arguments::new())
        .await
        .unwrap_err();
    let elapsed = started.elapsed();
    assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_millis(150)));
    assert!(elapsed >= Duration::from_millis(150));
    assert!(elapsed < Duration::from_millis(150) + Duration::from_secs(1));
    assert_eq!(client.state(), SessionState::Closed);

    // no stale reply can be read as the next answer: the session is gone
    assert!(matches!(
        client.call_tool("slow", Arguments::new()).await,
        Err(ClientError::NotConnected)
    ));
}

#[tokio::test]
async fn abandoned_call_closes_the_session() {
    let (client_side, host_side) = pipe(Framing::JsonLines);
    tokio::spawn(silent_host(host_side, true));

    let client = ToolClient::new(ClientConfig::default());
    client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap();

    // the caller gives up long before the call timeout
    let call = client.call_tool("slow", Arguments::new());
    let abandoned = tokio::time::timeout(Duration::from_millis(100), call).await;
    assert!(abandoned.is_err());

    assert!(!client.is_ready());
    assert!(matches!(
        client.call_tool("slow", Arguments::new()).await,
        Err(ClientError::NotConnected)
    ));
}

#[tokio::test]
async fn handshake_timeout() {
    let (client_side, host_side) = pipe(Framing::JsonLines);
    tokio::spawn(silent_host(host_side, false));

    let client = ToolClient::new(
        ClientConfig::default().with_handshake_timeout(Duration::from_millis(100)),
    );
    let err = client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "{err:?}");
    assert_eq!(client.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn tcp_connect_gives_up_within_handshake_timeout() {
    // RFC 5737 TEST-NET-1: either unroutable or refused, never a tool host
    let client = ToolClient::new(
        ClientConfig::tcp("192.0.2.1:9").with_handshake_timeout(Duration::from_millis(200)),
    );

    let started = Instant::now();
    let err = client.connect().await.unwrap_err();
    assert!(started.elapsed() < Duration::from_millis(200) + Duration::from_secs(1));
    assert!(matches!(
        err,
        ClientError::Timeout(_) | ClientError::Transport(_)
    ));
    assert!(!client.is_ready());
}

#[tokio::test]
async fn closer_releases_a_pending_call() {
    let (client_side, host_side) = pipe(Framing::JsonLines);
    tokio::spawn(silent_host(host_side, true));

    let client = Arc::new(ToolClient::new(ClientConfig::default()));
    client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap();
    let closer = client.closer().unwrap();

    let pending = {
        let client = Arc::clone(&client);
        tokio::spawn(async move { client.call_tool("slow", Arguments::new()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    closer.close();

    let result = tokio::time::timeout(Duration::from_secs(5), pending)
        .await
        .expect("pending call was not released")
        .unwrap();
    assert!(matches!(result, Err(ClientError::ConnectionLost(_))), "{result:?}");
    assert!(closer.is_closed());
    assert!(!client.is_ready());
}

#[tokio::test]
async fn host_hangup_is_connection_lost() {
    let (client_side, mut host_side) = pipe(Framing::JsonLines);
    let host = tokio::spawn(async move {
        // answer the handshake, then hang up on the first call
        let mut seen = 0;
        while let Ok(Some(frame)) = host_side.receive().await {
            let message: Value = serde_json::from_slice(&frame).unwrap();
            let Some(id) = message.get("id").cloned() else {
                continue;
            };
            seen += 1;
            if seen == 3 {
                host_side.close().await.unwrap();
                return;
            }
            let result = if message["method"] == "initialize" {
                json!({
                    "protocolVersion": "2025-06-18",
                    "capabilities": {},
                    "serverInfo": {"name": "flaky", "version": "1"}
                })
            } else {
                json!({"tools": [{"name": "echo", "description": "", "inputSchema": {"type": "object"}}]})
            };
            let reply = json!({"jsonrpc": "2.0", "id": id, "result": result});
            host_side
                .send(&serde_json::to_vec(&reply).unwrap())
                .await
                .unwrap();
        }
    });

    let client = ToolClient::new(ClientConfig::default());
    client
        .connect_transport(Box::new(client_side))
        .await
        .unwrap();
    let err = client
        .call_tool("echo", args(json!({"text": "x"})))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::ConnectionLost(_)), "{err:?}");
    assert_eq!(client.state(), SessionState::Closed);
    host.await.unwrap();
}

#[tokio::test]
async fn tcp_host_serves_concurrent_sessions() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let shutdown = tokio_util::sync::CancellationToken::new();
    let server = tokio::spawn(builtin_host().serve_tcp(
        listener,
        Framing::JsonLines,
        shutdown.clone(),
    ));

    let first = ToolClient::connect_with(ClientConfig::tcp(addr.clone()))
        .await
        .unwrap();
    let second = ToolClient::connect_with(ClientConfig::tcp(addr))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        first.call_tool("sum", args(json!({"a": 1, "b": 2}))),
        second.call_tool("echo", args(json!({"text": "two"}))),
    );
    assert_eq!(a.unwrap(), ToolCallResult::success(json!(3)));
    assert_eq!(b.unwrap(), ToolCallResult::success(json!("two")));

    first.disconnect().await;
    second.disconnect().await;
    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn tcp_host_enforces_max_frame_size() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let shutdown = tokio_util::sync::CancellationToken::new();
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry).unwrap();
    let host = ToolHost::new(Arc::new(registry)).with_max_frame_size(2048);
    let server = tokio::spawn(Arc::new(host).serve_tcp(
        listener,
        Framing::JsonLines,
        shutdown.clone(),
    ));

    let client = ToolClient::connect_with(ClientConfig::tcp(addr)).await.unwrap();
    let small = client.call_tool("echo", args(json!({"text": "fits"}))).await;
    assert_eq!(small.unwrap(), ToolCallResult::success(json!("fits")));

    let oversized = "x".repeat(8192);
    let err = client
        .call_tool("echo", args(json!({"text": oversized})))
        .await
        .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(client.state(), SessionState::Closed);

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

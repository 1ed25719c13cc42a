//! Host session engine driven with raw JSON-RPC frames.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{DuplexStream, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use toolwire_domain::HostState;
use toolwire_infrastructure::{
    Framing, HostSessionReport, ToolHost, ToolRegistry, Transport, register_builtin_tools,
    transport::FramedTransport,
};

type PipeTransport = FramedTransport<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

struct Peer {
    transport: PipeTransport,
    host: JoinHandle<HostSessionReport>,
}

impl Peer {
    fn start() -> Self {
        let (a, b) = tokio::io::duplex(64 * 1024);
        let (ar, aw) = tokio::io::split(a);
        let (br, bw) = tokio::io::split(b);

        let mut registry = ToolRegistry::new();
        register_builtin_tools(&mut registry).unwrap();
        let host = Arc::new(ToolHost::new(Arc::new(registry)).with_server_info("test-host", "9.9.9"));
        let host_side = FramedTransport::new(br, bw, Framing::JsonLines);
        let task = tokio::spawn(async move { host.serve(host_side).await });

        Self {
            transport: FramedTransport::new(ar, aw, Framing::JsonLines),
            host: task,
        }
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.transport.send(bytes).await.unwrap();
    }

    async fn send(&mut self, message: Value) {
        self.send_raw(&serde_json::to_vec(&message).unwrap()).await;
    }

    async fn recv(&mut self) -> Value {
        let frame = self.transport.receive().await.unwrap().unwrap();
        serde_json::from_slice(&frame).unwrap()
    }

    async fn request(&mut self, id: Value, method: &str, params: Value) -> Value {
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        self.recv().await
    }

    async fn initialize(&mut self) -> Value {
        self.request(
            json!(1),
            "initialize",
            json!({
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "raw-peer", "version": "0.1"}
            }),
        )
        .await
    }

    async fn finish(mut self) -> HostSessionReport {
        self.transport.close().await.unwrap();
        self.host.await.unwrap()
    }
}

#[tokio::test]
async fn initialize_returns_server_info_and_capabilities() {
    let mut peer = Peer::start();
    let reply = peer.initialize().await;

    assert_eq!(reply["id"], 1);
    assert_eq!(reply["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(reply["result"]["serverInfo"]["name"], "test-host");
    assert_eq!(reply["result"]["serverInfo"]["version"], "9.9.9");
    assert!(reply["result"]["capabilities"]["tools"].is_object());

    let report = peer.finish().await;
    assert_eq!(report.client.unwrap().name, "raw-peer");
    assert_eq!(report.final_state, HostState::Closed);
}

#[tokio::test]
async fn requests_before_initialize_are_rejected() {
    let mut peer = Peer::start();

    let reply = peer.request(json!(7), "tools/list", json!({})).await;
    assert_eq!(reply["id"], 7);
    assert_eq!(reply["error"]["code"], -32002);
    assert!(reply.get("result").is_none());

    let reply = peer
        .request(json!(8), "tools/call", json!({"name": "echo", "arguments": {"text": "x"}}))
        .await;
    assert_eq!(reply["error"]["code"], -32002);

    // ping is always answered, and the session can still initialize
    let reply = peer.request(json!(9), "ping", json!({})).await;
    assert_eq!(reply["result"], json!({}));
    let reply = peer.initialize().await;
    assert!(reply.get("error").is_none());

    let report = peer.finish().await;
    assert_eq!(report.tool_calls, 0);
    assert_eq!(report.protocol_errors, 2);
}

#[tokio::test]
async fn malformed_frame_is_answered_with_parse_error() {
    let mut peer = Peer::start();

    peer.send_raw(b"{not json").await;
    let reply = peer.recv().await;
    assert_eq!(reply["error"]["code"], -32700);
    assert_eq!(reply["id"], Value::Null);

    // the session survives
    let reply = peer.initialize().await;
    assert_eq!(reply["result"]["serverInfo"]["name"], "test-host");
    peer.finish().await;
}

#[tokio::test]
async fn message_without_id_or_method_is_invalid_request() {
    let mut peer = Peer::start();
    peer.send(json!({"jsonrpc": "2.0", "result": {}})).await;
    let reply = peer.recv().await;
    assert_eq!(reply["error"]["code"], -32600);
    peer.finish().await;
}

#[tokio::test]
async fn second_initialize_is_rejected_and_session_stays_ready() {
    let mut peer = Peer::start();
    peer.initialize().await;

    let reply = peer.initialize().await;
    assert_eq!(reply["error"]["code"], -32600);

    let reply = peer.request(json!(2), "tools/list", json!({})).await;
    assert_eq!(reply["result"]["tools"].as_array().unwrap().len(), 2);
    peer.finish().await;
}

#[tokio::test]
async fn unknown_method_and_notification() {
    let mut peer = Peer::start();
    peer.initialize().await;

    // notifications get no reply, even unknown ones
    peer.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
        .await;
    peer.send(json!({"jsonrpc": "2.0", "method": "notifications/whatever"}))
        .await;

    let reply = peer.request(json!(3), "resources/list", json!({})).await;
    assert_eq!(reply["id"], 3);
    assert_eq!(reply["error"]["code"], -32601);
    peer.finish().await;
}

#[tokio::test]
async fn tools_list_shape() {
    let mut peer = Peer::start();
    peer.initialize().await;

    let reply = peer.request(json!(2), "tools/list", json!({})).await;
    let tools = reply["result"]["tools"].as_array().unwrap();
    assert_eq!(tools[0]["name"], "echo");
    assert_eq!(tools[1]["name"], "sum");
    assert_eq!(tools[1]["inputSchema"]["type"], "object");
    assert_eq!(tools[1]["inputSchema"]["required"], json!(["a", "b"]));
    peer.finish().await;
}

#[tokio::test]
async fn tool_call_results_and_failures() {
    let mut peer = Peer::start();
    peer.initialize().await;

    let reply = peer
        .request(json!("call-1"), "tools/call", json!({"name": "sum", "arguments": {"a": 4, "b": 5}}))
        .await;
    assert_eq!(reply["id"], "call-1");
    assert_eq!(reply["result"]["isError"], false);
    assert_eq!(reply["result"]["structuredContent"], 9);
    assert_eq!(reply["result"]["content"][0]["text"], "9");

    let reply = peer
        .request(json!(5), "tools/call", json!({"name": "nope", "arguments": {}}))
        .await;
    assert_eq!(reply["result"]["isError"], true);
    assert_eq!(reply["result"]["content"][0]["text"], "unknown tool: nope");

    let reply = peer
        .request(json!(6), "tools/call", json!({"arguments": {}}))
        .await;
    assert_eq!(reply["error"]["code"], -32602);

    let reply = peer
        .request(json!(7), "tools/call", json!({"name": "sum", "arguments": [1, 2]}))
        .await;
    assert_eq!(reply["error"]["code"], -32602);

    let report = peer.finish().await;
    assert_eq!(report.tool_calls, 2);
}

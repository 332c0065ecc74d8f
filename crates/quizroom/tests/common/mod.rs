//! Test utilities and common setup.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use futures::{SinkExt, StreamExt};
use quizroom::api;
use quizroom::room::{FixedCodes, MemoryRoomStore, RegistryConfig, RoomRegistry};
use quizroom::settings::ServerConfig;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// How long a test waits for an expected frame.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// State whose rooms get the given codes in order.
pub fn test_state(codes: &[&str]) -> api::AppState {
    let registry = RoomRegistry::with_parts(
        RegistryConfig::default(),
        MemoryRoomStore::new(),
        FixedCodes::new(codes.iter().copied()),
    );
    api::AppState::new(registry, 100)
}

/// Create a test application with default server settings.
pub fn test_app() -> Router {
    api::create_router(test_state(&["4821"]), &ServerConfig::default())
}

/// Serve a test application on an ephemeral local port.
pub async fn spawn_server(codes: &[&str]) -> SocketAddr {
    let app = api::create_router(test_state(codes), &ServerConfig::default());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Minimal WebSocket client speaking the quizroom protocol.
pub struct TestClient {
    pub id: String,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    /// Connect and consume the `connected` greeting.
    pub async fn connect(addr: SocketAddr) -> Self {
        let (stream, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
        let mut client = Self {
            id: String::new(),
            stream,
        };
        let hello = client.recv().await;
        assert_eq!(hello["event"], "connected");
        client.id = hello["data"]["id"].as_str().unwrap().to_string();
        client
    }

    pub async fn send(&mut self, frame: Value) {
        self.stream
            .send(Message::Text(frame.to_string().into()))
            .await
            .unwrap();
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .unwrap();
    }

    /// Next JSON frame, skipping keepalive pings.
    pub async fn recv(&mut self) -> Value {
        loop {
            let msg = tokio::time::timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .expect("timed out waiting for frame")
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = msg {
                let value: Value = serde_json::from_str(text.as_str()).unwrap();
                if value["event"] != "ping" {
                    return value;
                }
            }
        }
    }

    /// Assert nothing arrives within a short window.
    pub async fn expect_silence(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(200), self.stream.next()).await;
        assert!(result.is_err(), "unexpected frame: {:?}", result);
    }

    pub async fn close(mut self) {
        self.stream.close(None).await.ok();
    }
}

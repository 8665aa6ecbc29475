//! Live Relay Tests
//!
//! Runs the server on an ephemeral port and drives real websocket clients
//! against it while webhooks are posted over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use voice_relay::{
    cache::AudioCache,
    create_router,
    models::SynthesisRequest,
    upstream::{AudioStream, SpeechProvider},
    AppError, AppState,
};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct NoSpeech;

#[async_trait]
impl SpeechProvider for NoSpeech {
    async fn synthesize(&self, _req: &SynthesisRequest) -> voice_relay::Result<Bytes> {
        Err(AppError::Upstream("unused".to_string()))
    }

    async fn stream(&self, _req: &SynthesisRequest) -> voice_relay::Result<AudioStream> {
        Err(AppError::Upstream("unused".to_string()))
    }

    async fn list_voices(&self) -> voice_relay::Result<Value> {
        Ok(json!({"voices": []}))
    }
}

// == Helper Functions ==

async fn spawn_server() -> (SocketAddr, AppState) {
    let state = AppState::new(AudioCache::new(10), Arc::new(NoSpeech));
    let app = create_router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn connect(addr: SocketAddr, query: &str) -> Client {
    let url = format!("ws://{}/ws{}", addr, query);
    let (client, _) = connect_async(url).await.unwrap();
    client
}

/// Polls until the registry reports the expected connection state.
async fn wait_for_connection(state: &AppState, user_id: &str, connected: bool) {
    for _ in 0..100 {
        if state.registry.is_connected(user_id).await == connected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("connection state for {} never became {}", user_id, connected);
}

/// Next text or close frame, skipping control traffic.
async fn next_message(client: &mut Client) -> Option<Message> {
    let read = async {
        while let Some(frame) = client.next().await {
            match frame {
                Ok(msg @ Message::Text(_)) | Ok(msg @ Message::Close(_)) => return Some(msg),
                Ok(_) => continue,
                Err(_) => return None,
            }
        }
        None
    };
    tokio::time::timeout(Duration::from_secs(5), read)
        .await
        .expect("timed out waiting for a frame")
}

async fn post_webhook(addr: SocketAddr, body: Value) -> Value {
    let response = reqwest::Client::new()
        .post(format!("http://{}/vital/webhook", addr))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    response.json().await.unwrap()
}

// == Tests ==

#[tokio::test]
async fn test_webhook_reaches_connected_client() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr, "?userId=A").await;
    wait_for_connection(&state, "A", true).await;

    let ack = post_webhook(
        addr,
        json!({
            "event_type": "daily.data.activity.created",
            "user_id": "A",
            "data": {"hr_avg": 131, "calories_total": 300, "calendar_date": "2024-06-03"}
        }),
    )
    .await;
    assert_eq!(ack["outcome"], "delivered");

    let Some(Message::Text(text)) = next_message(&mut client).await else {
        panic!("expected a metrics message");
    };
    let message: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(message["type"], "metrics");
    assert_eq!(message["event_type"], "daily.data.activity.created");
    assert_eq!(message["data"]["heart_rate"], 131.0);
    assert_eq!(message["data"]["calories"], 300.0);
    assert!(message["data"]["distance_km"].is_null());
}

#[tokio::test]
async fn test_events_only_reach_their_own_user() {
    let (addr, state) = spawn_server().await;
    let mut client_a = connect(addr, "?userId=A").await;
    let mut client_b = connect(addr, "?userId=B").await;
    wait_for_connection(&state, "A", true).await;
    wait_for_connection(&state, "B", true).await;

    post_webhook(
        addr,
        json!({
            "event_type": "daily.data.workouts.created",
            "user_id": "B",
            "data": {"distance": 1000}
        }),
    )
    .await;

    let Some(Message::Text(text)) = next_message(&mut client_b).await else {
        panic!("expected a metrics message for B");
    };
    let message: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(message["data"]["distance_km"], 1.0);

    // A receives nothing
    let quiet = tokio::time::timeout(Duration::from_millis(200), client_a.next()).await;
    assert!(quiet.is_err());
}

#[tokio::test]
async fn test_missing_user_id_is_rejected() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr, "").await;

    let Some(Message::Close(Some(frame))) = next_message(&mut client).await else {
        panic!("expected a close frame");
    };
    assert_eq!(u16::from(frame.code), 1008);
    assert!(state.registry.is_empty().await);
}

#[tokio::test]
async fn test_newer_connection_replaces_older() {
    let (addr, state) = spawn_server().await;
    let mut first = connect(addr, "?userId=A").await;
    wait_for_connection(&state, "A", true).await;

    let mut second = connect(addr, "?userId=A").await;

    // The superseded socket is closed by the server
    let Some(Message::Close(Some(frame))) = next_message(&mut first).await else {
        panic!("expected the first connection to be closed");
    };
    assert_eq!(u16::from(frame.code), 1000);
    assert_eq!(state.registry.len().await, 1);

    post_webhook(
        addr,
        json!({
            "event_type": "daily.data.activity.created",
            "user_id": "A",
            "data": {"calories_total": 50}
        }),
    )
    .await;

    let Some(Message::Text(text)) = next_message(&mut second).await else {
        panic!("expected the newest connection to receive the event");
    };
    let message: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(message["data"]["calories"], 50.0);
}

#[tokio::test]
async fn test_disconnect_unregisters() {
    let (addr, state) = spawn_server().await;
    let mut client = connect(addr, "?userId=A").await;
    wait_for_connection(&state, "A", true).await;

    client.send(Message::Close(None)).await.unwrap();
    wait_for_connection(&state, "A", false).await;

    let ack = post_webhook(
        addr,
        json!({
            "event_type": "daily.data.activity.created",
            "user_id": "A",
            "data": {}
        }),
    )
    .await;
    assert_eq!(ack["outcome"], "dropped");
}

//! End-to-end tests: a real server on a random port, real WebSocket
//! clients, and a manual clock so countdowns are deterministic.

use std::time::Duration;

use chessclock::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

const RECV_TIMEOUT: Duration = Duration::from_secs(3);

struct TestServer {
    addr: String,
    clock: ManualClock,
    handle: ServerHandle<chessclock_protocol::JsonCodec>,
}

/// Starts a server on a random port with a manual clock at t = 1_000_000.
async fn start_server(time_limit_ms: u64) -> TestServer {
    let clock = ManualClock::new(1_000_000);
    let server = ChessClockServer::builder()
        .bind("127.0.0.1:0")
        .room_config(RoomConfig { time_limit_ms })
        .tick_config(TickConfig::with_rate(20))
        .clock(clock.clone())
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();
    let handle = server.handle();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    TestServer {
        addr,
        clock,
        handle,
    }
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn send(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

/// Next JSON message from the server, skipping control frames.
async fn recv(ws: &mut ClientWs) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("stream ended")
            .expect("ws error");
        if msg.is_text() || msg.is_binary() {
            return serde_json::from_slice(&msg.into_data()).expect("server sends JSON");
        }
    }
}

/// Reads messages until one satisfies `pred`.
async fn recv_until(ws: &mut ClientWs, pred: impl Fn(&Value) -> bool) -> Value {
    loop {
        let msg = recv(ws).await;
        if pred(&msg) {
            return msg;
        }
    }
}

async fn recv_error(ws: &mut ClientWs) -> String {
    let msg = recv_until(ws, |m| m["type"] == "error").await;
    msg["message"].as_str().expect("message is a string").to_owned()
}

async fn join(ws: &mut ClientWs, room: &str, name: &str) -> Value {
    send(ws, json!({ "type": "joinRoom", "roomId": room, "username": name })).await;
    let name = name.to_owned();
    recv_until(ws, move |m| {
        m["type"] == "gameState"
            && m["state"]["players"]
                .as_array()
                .is_some_and(|ps| ps.iter().any(|p| p["name"] == name.as_str()))
    })
    .await
}

/// Polls `check` until it holds or a few seconds pass.
async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..100 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("condition never became true");
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_join_creates_room_and_sends_snapshot() {
    let server = start_server(60_000).await;
    let mut ws = connect(&server.addr).await;

    let msg = join(&mut ws, "lobby", "alice").await;

    let state = &msg["state"];
    assert_eq!(state["players"].as_array().unwrap().len(), 1);
    assert_eq!(state["players"][0]["remainingTime"], 60_000);
    assert_eq!(state["running"], false);
    assert_eq!(state["timeLimit"], 60_000);
    assert!(state["winnerIndex"].is_null());
    assert_eq!(server.handle.room_ids().await, vec![RoomId::from("lobby")]);
}

#[tokio::test]
async fn test_second_join_is_broadcast_to_first_player() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "r", "A").await;

    join(&mut b, "r", "B").await;

    let seen_by_a = recv_until(&mut a, |m| {
        m["state"]["players"].as_array().is_some_and(|ps| ps.len() == 2)
    })
    .await;
    assert_eq!(seen_by_a["state"]["players"][1]["name"], "B");
}

#[tokio::test]
async fn test_blank_username_or_room_gets_error_reply() {
    let server = start_server(60_000).await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, json!({ "type": "joinRoom", "roomId": "r", "username": "" })).await;
    assert_eq!(recv_error(&mut ws).await, "username must not be empty");

    send(&mut ws, json!({ "type": "joinRoom", "roomId": "", "username": "a" })).await;
    assert_eq!(recv_error(&mut ws).await, "room id must not be empty");

    assert_eq!(server.handle.room_count().await, 0);
}

#[tokio::test]
async fn test_action_before_join_gets_error_reply() {
    let server = start_server(60_000).await;
    let mut ws = connect(&server.addr).await;

    send(&mut ws, json!({ "type": "tap" })).await;

    assert_eq!(recv_error(&mut ws).await, "join a room first");
}

#[tokio::test]
async fn test_garbage_and_unknown_types_are_ignored() {
    let server = start_server(60_000).await;
    let mut ws = connect(&server.addr).await;

    ws.send(Message::Text("{not json".into())).await.unwrap();
    send(&mut ws, json!({ "type": "fly" })).await;
    let msg = join(&mut ws, "r", "alice").await;

    // The connection survived and the first reply is the join snapshot.
    assert_eq!(msg["type"], "gameState");
}

// =========================================================================
// Game flow
// =========================================================================

#[tokio::test]
async fn test_two_player_game_runs_to_timeout() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "classic", "A").await;
    join(&mut b, "classic", "B").await;

    // A taps: clock starts with B to move.
    send(&mut a, json!({ "type": "tap" })).await;
    let msg = recv_until(&mut b, |m| m["state"]["running"] == true).await;
    assert_eq!(msg["state"]["currentPlayerIndex"], 1);

    // 30 s pass; the ticker settles them.
    server.clock.advance(30_000);
    recv_until(&mut b, |m| m["state"]["players"][1]["remainingTime"] == 30_000).await;

    // B taps: A to move.
    send(&mut b, json!({ "type": "tap" })).await;
    let msg = recv_until(&mut a, |m| {
        m["state"]["running"] == true && m["state"]["currentPlayerIndex"] == 0
    })
    .await;
    assert_eq!(msg["state"]["players"][1]["remainingTime"], 30_000);
    assert_eq!(msg["state"]["lastTickTimestamp"], 1_030_000);

    // A runs out; the ticker ends the game with B as winner.
    server.clock.advance(60_000);
    let msg = recv_until(&mut a, |m| m["state"]["running"] == false).await;
    assert_eq!(msg["state"]["winnerIndex"], 1);
    assert_eq!(msg["state"]["players"][0]["remainingTime"], 0);
    assert_eq!(msg["state"]["currentPlayerIndex"], 1);
    assert!(server.handle.running_room_ids().await.is_empty());
}

#[tokio::test]
async fn test_out_of_turn_tap_is_silent_noop() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "r", "A").await;
    join(&mut b, "r", "B").await;

    // B starts the clock; A is still to move.
    send(&mut b, json!({ "type": "tap" })).await;
    recv_until(&mut b, |m| m["state"]["running"] == true).await;

    send(&mut b, json!({ "type": "tap" })).await;
    let msg = recv(&mut b).await;

    assert_eq!(msg["type"], "gameState", "no error reply for out-of-turn taps");
    assert_eq!(msg["state"]["currentPlayerIndex"], 0);
    assert_eq!(msg["state"]["players"][0]["remainingTime"], 60_000);
}

#[tokio::test]
async fn test_reset_and_change_time() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "r", "A").await;
    join(&mut b, "r", "B").await;
    send(&mut a, json!({ "type": "tap" })).await;
    server.clock.advance(5_000);
    recv_until(&mut a, |m| m["state"]["players"][1]["remainingTime"] == 55_000).await;

    send(&mut a, json!({ "type": "reset" })).await;
    let msg = recv_until(&mut a, |m| m["state"]["running"] == false).await;
    assert_eq!(msg["state"]["players"][1]["remainingTime"], 60_000);
    assert_eq!(msg["state"]["currentPlayerIndex"], 1);
    assert_eq!(msg["state"]["winnerIndex"], 1);

    send(&mut b, json!({ "type": "changeTime", "time": -1 })).await;
    assert_eq!(recv_error(&mut b).await, "time limit must be positive, got -1");

    send(&mut b, json!({ "type": "changeTime", "time": 180_000 })).await;
    let msg = recv_until(&mut a, |m| m["state"]["timeLimit"] == 180_000).await;
    assert_eq!(msg["state"]["players"][0]["remainingTime"], 180_000);
    assert!(msg["state"]["winnerIndex"].is_null());
}

// =========================================================================
// Connections
// =========================================================================

#[tokio::test]
async fn test_close_unsubscribes_but_keeps_seat() {
    let server = start_server(60_000).await;
    let room = RoomId::from("r");
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "r", "A").await;
    join(&mut b, "r", "B").await;
    assert_eq!(server.handle.subscriber_count(&room).await, Some(2));

    b.close(None).await.unwrap();

    let handle = server.handle.clone();
    let room_id = room.clone();
    eventually(move || {
        let handle = handle.clone();
        let room_id = room_id.clone();
        async move { handle.subscriber_count(&room_id).await == Some(1) }
    })
    .await;

    // A still gets broadcasts, and B's seat is still there.
    send(&mut a, json!({ "type": "reset" })).await;
    let msg = recv_until(&mut a, |m| m["type"] == "gameState").await;
    assert_eq!(msg["state"]["players"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_reconnect_by_name_keeps_time_and_turn() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    join(&mut a, "r", "A").await;
    join(&mut b, "r", "B").await;
    send(&mut a, json!({ "type": "tap" })).await;
    server.clock.advance(7_000);
    recv_until(&mut a, |m| m["state"]["players"][1]["remainingTime"] == 53_000).await;
    b.close(None).await.unwrap();

    let mut b2 = connect(&server.addr).await;
    let msg = join(&mut b2, "r", "B").await;

    assert_eq!(msg["state"]["players"].as_array().unwrap().len(), 2);
    assert_eq!(msg["state"]["players"][1]["remainingTime"], 53_000);
    assert_eq!(msg["state"]["currentPlayerIndex"], 1);

    // The new connection's taps count.
    send(&mut b2, json!({ "type": "tap" })).await;
    recv_until(&mut a, |m| {
        m["state"]["running"] == true && m["state"]["currentPlayerIndex"] == 0
    })
    .await;
}

#[tokio::test]
async fn test_rejoin_other_room_moves_subscription() {
    let server = start_server(60_000).await;
    let mut ws = connect(&server.addr).await;
    join(&mut ws, "one", "alice").await;

    join(&mut ws, "two", "alice").await;

    assert_eq!(
        server.handle.subscriber_count(&RoomId::from("one")).await,
        Some(0)
    );
    assert_eq!(
        server.handle.subscriber_count(&RoomId::from("two")).await,
        Some(1)
    );
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let server = start_server(60_000).await;
    let mut a = connect(&server.addr).await;
    let mut b = connect(&server.addr).await;
    let mut c = connect(&server.addr).await;
    join(&mut a, "busy", "A").await;
    join(&mut b, "busy", "B").await;
    join(&mut c, "quiet", "C").await;

    send(&mut a, json!({ "type": "tap" })).await;
    recv_until(&mut a, |m| m["state"]["running"] == true).await;

    assert_eq!(
        server.handle.running_room_ids().await,
        vec![RoomId::from("busy")]
    );
    // Nothing from the busy room reaches the quiet one.
    let quiet = tokio::time::timeout(Duration::from_millis(200), c.next()).await;
    assert!(quiet.is_err(), "stopped room gets no tick broadcasts");
}

//! Server, client and replay paths exercised end to end.

use std::sync::Arc;
use std::time::Duration;

use agora_clock::ManualClock;
use agora_core::OrderEvent;
use agora_engine::{ChannelSink, Engine, EngineConfig};
use agora_runner::{ListenAddr, RunnerError, Server, replay, send_commands, send_to};
use tokio::sync::{mpsc::UnboundedReceiver, oneshot};
use tokio::time::timeout;

const SESSION: &str = "\
# resting liquidity
S 1 AAPL 101 5
S 2 AAPL 102 5

B 3 AAPL 102 7
C 2
C 1
";

fn engine() -> (Engine, UnboundedReceiver<OrderEvent>) {
    let _ = env_logger::try_init();
    let (sink, rx) = ChannelSink::pair();
    let engine = Engine::new(
        EngineConfig::default(),
        Arc::new(ManualClock::stepping(0, 1)),
        Arc::new(sink),
    )
    .unwrap();
    (engine, rx)
}

fn summary(events: &[OrderEvent]) -> Vec<String> {
    events
        .iter()
        .map(|e| match e {
            OrderEvent::Added(a) => format!("{} {}", a.order.side, a.order.order_id),
            OrderEvent::Executed(x) => format!(
                "E {} {} {} {}",
                x.resting_order_id, x.incoming_order_id, x.price, x.quantity
            ),
            OrderEvent::Deleted(d) => {
                format!("X {} {}", d.order.order_id, if d.accepted { 'A' } else { 'R' })
            }
        })
        .collect()
}

fn expected_session() -> Vec<String> {
    ["S 1", "S 2", "E 1 3 101 5", "E 2 3 102 2", "X 2 R", "X 1 R"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

async fn collect(rx: &mut UnboundedReceiver<OrderEvent>, count: usize) -> Vec<OrderEvent> {
    let mut events = Vec::new();
    while events.len() < count {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("event arrives")
            .expect("sink open");
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_replay_session() {
    let (engine, mut rx) = engine();

    let submitted = replay(&engine, SESSION.as_bytes()).await.unwrap();
    assert_eq!(submitted, 5);
    engine.shutdown().await.unwrap();

    let events = collect(&mut rx, 6).await;
    assert_eq!(summary(&events), expected_session());
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_replay_stops_at_bad_line() {
    let (engine, mut rx) = engine();

    let input = "B 1 X 100 1\nB 2 X\nB 3 X 100 1\n";
    let err = replay(&engine, input.as_bytes()).await.unwrap_err();
    assert!(matches!(err, RunnerError::Replay { line: 2, .. }));

    engine.shutdown().await.unwrap();
    let events = collect(&mut rx, 1).await;
    assert_eq!(summary(&events), vec!["B 1"]);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_send_commands_writes_records() {
    let mut out = Vec::new();
    let sent = send_commands(SESSION.as_bytes(), &mut out).await.unwrap();
    assert_eq!(sent, 5);
    assert_eq!(out.len(), 5 * agora_engine::RECORD_LEN);

    let first = agora_engine::decode_record(out[..28].try_into().unwrap()).unwrap();
    assert_eq!(first, agora_core::OrderRequest::sell(1, "AAPL", 101, 5));
}

async fn serve_session(listen: ListenAddr) {
    let (engine, mut rx) = engine();
    let server = Server::bind(&listen).await.unwrap();
    let addr = server.local_addr().clone();

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(server.run(engine, async {
        let _ = stop_rx.await;
    }));

    let sent = send_to(&addr, SESSION.as_bytes()).await.unwrap();
    assert_eq!(sent, 5);

    let events = collect(&mut rx, 6).await;
    assert_eq!(summary(&events), expected_session());

    stop_tx.send(()).unwrap();
    let connections = timeout(Duration::from_secs(5), running)
        .await
        .expect("server stops")
        .unwrap()
        .unwrap();
    assert_eq!(connections, 1);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_tcp_server_session() {
    serve_session(ListenAddr::Tcp("127.0.0.1:0".to_string())).await;
}

#[cfg(unix)]
#[tokio::test]
async fn test_unix_server_session() {
    let path = std::env::temp_dir().join(format!("agora-test-{}.sock", std::process::id()));
    serve_session(ListenAddr::Unix(path.clone())).await;
    assert!(!path.exists(), "socket file removed on shutdown");
}

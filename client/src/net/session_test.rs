use super::*;
use crate::net::socket::WsConnector;
use crate::net::transport::HandleId;
use crate::net::transport::test_helpers::{Recorder, RecordingConnector, RecordingTransport};
use crate::state::identity::MemoryIdentityStore;

const ENDPOINT: &str = "ws://relay/ws";

fn start(username: &str) -> (ChatSession<RecordingTransport>, Recorder, MemoryIdentityStore) {
    let identity = MemoryIdentityStore::with_username(username);
    let (mut connector, recorder) = RecordingConnector::new();
    let session = ChatSession::start(Box::new(identity.clone()), &mut connector, ENDPOINT).expect("identity is set");
    (session, recorder, identity)
}

fn connected(username: &str) -> (ChatSession<RecordingTransport>, Recorder, MemoryIdentityStore) {
    let (mut session, recorder, identity) = start(username);
    session.handle_transport_event(TransportEvent::Opened);
    (session, recorder, identity)
}

fn scrolled_away(session: &mut ChatSession<RecordingTransport>) {
    session.report_scroll(ScrollPosition::new(2000.0, 0.0, 400.0));
    assert!(!session.viewport().at_live_edge);
}

fn message_frames(recorder: &Recorder) -> Vec<serde_json::Value> {
    recorder
        .sent_json()
        .into_iter()
        .filter(|v| v["type"] == "message")
        .collect()
}

// =============================================================
// start
// =============================================================

#[test]
fn start_without_identity_returns_none() {
    let (mut connector, recorder) = RecordingConnector::new();
    let session: Option<ChatSession<RecordingTransport>> =
        ChatSession::start(Box::new(MemoryIdentityStore::new()), &mut connector, ENDPOINT);
    assert!(session.is_none());
    assert!(recorder.endpoints().is_empty());
}

#[test]
fn start_opens_one_transport_and_is_connecting() {
    let (session, recorder, _) = start("ann");
    assert_eq!(session.username(), "ann");
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert!(session.messages().is_empty());
    assert_eq!(session.viewport(), ViewportState::default());
    assert_eq!(recorder.endpoints(), vec![ENDPOINT.to_owned()]);
}

#[test]
fn start_with_rejected_endpoint_is_disconnected() {
    let mut connector = RecordingConnector { reject: true, ..RecordingConnector::default() };
    let session = ChatSession::start(Box::new(MemoryIdentityStore::with_username("ann")), &mut connector, "bogus")
        .expect("identity is set");
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
}

// =============================================================
// connection lifecycle
// =============================================================

#[test]
fn open_event_connects_and_sends_join() {
    let (mut session, recorder, _) = start("ann");
    let updates = session.handle_transport_event(TransportEvent::Opened);
    assert_eq!(updates, vec![SessionUpdate::StatusChanged(ConnectionStatus::Connected)]);
    assert_eq!(recorder.sent_json(), vec![serde_json::json!({"type": "join", "username": "ann"})]);
}

#[test]
fn close_from_connecting_or_connected_disconnects() {
    let (mut a, _, _) = start("ann");
    assert_eq!(
        a.handle_transport_event(TransportEvent::Closed),
        vec![SessionUpdate::StatusChanged(ConnectionStatus::Disconnected)]
    );

    let (mut b, _, _) = connected("ann");
    b.handle_transport_event(TransportEvent::Error("boom".into()));
    assert_eq!(b.status(), ConnectionStatus::Disconnected);
}

#[test]
fn send_after_disconnect_echoes_locally_only() {
    let (mut session, recorder, _) = connected("ann");
    session.handle_transport_event(TransportEvent::Closed);
    let before = recorder.sent().len();

    session.send("still here");
    assert_eq!(session.messages().len(), 1);
    assert_eq!(recorder.sent().len(), before);
}

// =============================================================
// send
// =============================================================

#[test]
fn blank_send_is_a_no_op() {
    let (mut session, recorder, _) = connected("ann");
    assert!(session.send("").is_empty());
    assert!(session.send("   ").is_empty());
    assert!(session.messages().is_empty());
    assert!(message_frames(&recorder).is_empty());
}

#[test]
fn send_while_connecting_appends_without_transmitting() {
    let (mut session, recorder, _) = start("ann");
    session.send("hi");
    assert_eq!(session.messages().len(), 1);
    assert!(recorder.sent().is_empty());
}

#[test]
fn send_while_connected_appends_and_transmits_once() {
    let (mut session, recorder, _) = connected("ann");
    let updates = session.send("  hi  ");

    assert_eq!(session.messages().len(), 1);
    let msg = session.messages().last().expect("appended");
    assert_eq!(msg.user, "ann");
    assert_eq!(msg.text, "hi");
    assert!(matches!(&updates[0], SessionUpdate::MessageAppended(m) if m.id == msg.id));
    assert!(updates.contains(&SessionUpdate::ScrollToTail));

    assert_eq!(
        message_frames(&recorder),
        vec![serde_json::json!({"type": "message", "username": "ann", "text": "hi"})]
    );
}

#[test]
fn transport_send_failure_keeps_local_echo() {
    let (mut session, recorder, _) = connected("ann");
    recorder.fail_sends(true);
    session.send("hi");
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.status(), ConnectionStatus::Connected);
}

// =============================================================
// inbound
// =============================================================

#[test]
fn inbound_message_is_appended_in_arrival_order() {
    let (mut session, _, _) = connected("ann");
    session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"one","time":5}"#.into()));
    session.send("two");
    session.handle_transport_event(TransportEvent::Message(r#"{"user":"cat","text":"three","time":1}"#.into()));

    let texts: Vec<&str> = session.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "three"]);
}

#[test]
fn self_echo_is_never_appended() {
    let (mut session, _, _) = connected("ann");
    let payloads = [
        r#"{"user":"ann","text":"echo"}"#,
        r#"{"user":"bob","text":"hi"}"#,
        r#"{"user":"ann"}"#,
        "garbage",
        r#"{"user":"ann","text":"again","time":3}"#,
    ];
    for raw in payloads {
        session.handle_transport_event(TransportEvent::Message(raw.into()));
    }
    assert_eq!(session.messages().len(), 2);
    assert!(session.messages().iter().all(|m| m.user != "ann"));
}

#[test]
fn malformed_inbound_becomes_server_line() {
    let (mut session, _, _) = connected("ann");
    session.handle_transport_event(TransportEvent::Message("not json".into()));
    let msg = session.messages().last().expect("appended");
    assert_eq!(msg.user, "server");
    assert_eq!(msg.text, "not json");
    assert_eq!(session.status(), ConnectionStatus::Connected);
}

// =============================================================
// viewport
// =============================================================

#[test]
fn inbound_while_away_counts_unread() {
    let (mut session, _, _) = connected("ann");
    session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"a"}"#.into()));
    scrolled_away(&mut session);
    let before = session.messages().len();

    let updates = session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"b"}"#.into()));
    assert_eq!(session.messages().len(), before + 1);
    assert_eq!(session.viewport(), ViewportState { at_live_edge: false, unread_count: 1 });
    assert!(!updates.contains(&SessionUpdate::ScrollToTail));
    assert!(updates.contains(&SessionUpdate::ViewportChanged(session.viewport())));
}

#[test]
fn local_send_while_away_also_counts_unread() {
    let (mut session, _, _) = connected("ann");
    scrolled_away(&mut session);
    session.send("hi");
    assert_eq!(session.viewport().unread_count, 1);
}

#[test]
fn jump_to_live_edge_resets_and_scrolls() {
    let (mut session, _, _) = connected("ann");
    scrolled_away(&mut session);
    session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"a"}"#.into()));

    let updates = session.jump_to_live_edge();
    assert_eq!(session.viewport(), ViewportState { at_live_edge: true, unread_count: 0 });
    assert!(updates.contains(&SessionUpdate::ScrollToTail));

    // Already at the edge: state unchanged, scroll still requested.
    assert_eq!(session.jump_to_live_edge(), vec![SessionUpdate::ScrollToTail]);
}

#[test]
fn scrolling_back_resets_unread() {
    let (mut session, _, _) = connected("ann");
    scrolled_away(&mut session);
    session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"a"}"#.into()));
    session.report_scroll(ScrollPosition::new(2000.0, 1600.0, 400.0));
    assert_eq!(session.viewport(), ViewportState::default());
}

// =============================================================
// leave
// =============================================================

#[test]
fn leave_closes_once_and_clears_identity() {
    let (mut session, recorder, identity) = connected("ann");
    assert_eq!(session.leave(), vec![SessionUpdate::StatusChanged(ConnectionStatus::Disconnected)]);
    assert!(session.leave().is_empty());
    assert!(session.leave().is_empty());

    assert_eq!(recorder.closes(), 1);
    assert!(session.is_ended());
    assert_eq!(identity.get().expect("get"), None);
}

#[test]
fn leave_then_drop_still_closes_once() {
    let (mut session, recorder, _) = connected("ann");
    session.leave();
    drop(session);
    assert_eq!(recorder.closes(), 1);
}

#[test]
fn drop_without_leave_closes_but_keeps_identity() {
    let (session, recorder, identity) = connected("ann");
    drop(session);
    assert_eq!(recorder.closes(), 1);
    assert_eq!(identity.get().expect("get").as_deref(), Some("ann"));
}

#[test]
fn leave_while_connecting_closes_handle() {
    let (mut session, recorder, _) = start("ann");
    session.leave();
    assert_eq!(recorder.closes(), 1);
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
}

#[test]
fn commands_and_events_after_leave_are_ignored() {
    let (mut session, recorder, _) = connected("ann");
    session.leave();
    let sent = recorder.sent().len();

    assert!(session.send("late").is_empty());
    assert!(session.handle_transport_event(TransportEvent::Message(r#"{"user":"bob","text":"x"}"#.into())).is_empty());
    assert!(session.handle_transport_event(TransportEvent::Opened).is_empty());
    assert!(session.messages().is_empty());
    assert_eq!(recorder.sent().len(), sent);
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
}

#[test]
fn new_session_uses_fresh_handle() {
    let identity = MemoryIdentityStore::with_username("ann");
    let (mut connector, recorder) = RecordingConnector::new();

    let first = ChatSession::start(Box::new(identity.clone()), &mut connector, ENDPOINT).expect("first");
    drop(first);
    let second = ChatSession::start(Box::new(identity), &mut connector, ENDPOINT).expect("second");

    assert_eq!(recorder.endpoints().len(), 2);
    assert_eq!(recorder.closes(), 1);
    assert_eq!(second.status(), ConnectionStatus::Connecting);
}

#[test]
fn socket_events_from_earlier_handle_are_dropped() {
    let identity = MemoryIdentityStore::with_username("ann");
    let (mut connector, _) = RecordingConnector::new();

    let first = ChatSession::start(Box::new(identity.clone()), &mut connector, ENDPOINT).expect("first");
    drop(first);
    let mut second = ChatSession::start(Box::new(identity), &mut connector, ENDPOINT).expect("second");

    let stale = SocketEvent { handle: HandleId(1), event: TransportEvent::Closed };
    assert!(second.handle_socket_event(stale).is_empty());
    let stale_open = SocketEvent { handle: HandleId(1), event: TransportEvent::Opened };
    assert!(second.handle_socket_event(stale_open).is_empty());
    assert_eq!(second.status(), ConnectionStatus::Connecting);

    let own = SocketEvent { handle: HandleId(2), event: TransportEvent::Opened };
    assert_eq!(
        second.handle_socket_event(own),
        vec![SessionUpdate::StatusChanged(ConnectionStatus::Connected)]
    );
}

#[tokio::test]
async fn recreated_session_ignores_previous_socket_on_shared_connector() {
    // Accepts TCP but never answers the websocket handshake.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let silent = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.expect("accept");
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        drop(tcp);
    });

    let identity = MemoryIdentityStore::with_username("ann");
    let (mut connector, mut events) = WsConnector::new();
    let first = ChatSession::start(Box::new(identity.clone()), &mut connector, "ws://127.0.0.1:1/ws").expect("first");
    drop(first);
    let mut second =
        ChatSession::start(Box::new(identity), &mut connector, &format!("ws://{addr}/ws")).expect("second");

    let event = tokio::time::timeout(std::time::Duration::from_secs(2), events.recv())
        .await
        .expect("first socket never reported")
        .expect("event channel closed");
    assert!(matches!(event.event, TransportEvent::Closed | TransportEvent::Error(_)));

    assert!(second.handle_socket_event(event).is_empty());
    assert_eq!(second.status(), ConnectionStatus::Connecting);
    silent.abort();
}

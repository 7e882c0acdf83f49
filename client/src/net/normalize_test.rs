use super::*;

const NOW: i64 = 1_700_000_000_000;

fn accepted(raw: &str, own: &str) -> ChatMessage {
    match normalize_inbound(raw, own, NOW) {
        Inbound::Accepted(msg) => msg,
        Inbound::SelfEcho => panic!("expected accepted message for {raw}"),
    }
}

#[test]
fn full_payload_maps_all_fields() {
    let msg = accepted(r#"{"user":"bob","text":"hello","time":1234}"#, "ann");
    assert_eq!(msg.user, "bob");
    assert_eq!(msg.text, "hello");
    assert_eq!(msg.time, 1234);
}

#[test]
fn malformed_payload_falls_back_to_server_line() {
    let msg = accepted("not json", "ann");
    assert_eq!(msg.user, "server");
    assert_eq!(msg.text, "not json");
    assert_eq!(msg.time, NOW);
}

#[test]
fn non_object_json_falls_back_to_server_line() {
    for raw in ["42", "\"hi\"", "[1,2]", "null", "true"] {
        let msg = accepted(raw, "ann");
        assert_eq!(msg.user, "server");
        assert_eq!(msg.text, raw);
    }
}

#[test]
fn missing_user_defaults_to_unknown() {
    let msg = accepted(r#"{"text":"hi"}"#, "ann");
    assert_eq!(msg.user, "unknown");
    assert_eq!(msg.text, "hi");
}

#[test]
fn missing_text_reserializes_payload() {
    let msg = accepted(r#"{"user":"bob","kind":"ping"}"#, "ann");
    assert_eq!(msg.user, "bob");
    let echoed: serde_json::Value = serde_json::from_str(&msg.text).expect("text is json");
    assert_eq!(echoed, serde_json::json!({"user": "bob", "kind": "ping"}));
}

#[test]
fn missing_or_non_numeric_time_defaults_to_now() {
    assert_eq!(accepted(r#"{"user":"bob","text":"a"}"#, "ann").time, NOW);
    assert_eq!(accepted(r#"{"user":"bob","text":"a","time":"soon"}"#, "ann").time, NOW);
    assert_eq!(accepted(r#"{"user":"bob","text":"a","time":null}"#, "ann").time, NOW);
}

#[test]
fn fractional_time_is_truncated() {
    assert_eq!(accepted(r#"{"user":"bob","text":"a","time":1500.9}"#, "ann").time, 1500);
}

#[test]
fn null_fields_use_defaults() {
    let msg = accepted(r#"{"user":null,"text":"x"}"#, "ann");
    assert_eq!(msg.user, "unknown");
}

#[test]
fn non_string_fields_are_stringified() {
    let msg = accepted(r#"{"user":7,"text":{"a":1}}"#, "ann");
    assert_eq!(msg.user, "7");
    assert_eq!(msg.text, r#"{"a":1}"#);
}

#[test]
fn own_username_is_suppressed() {
    assert_eq!(normalize_inbound(r#"{"user":"ann","text":"mine"}"#, "ann", NOW), Inbound::SelfEcho);
}

#[test]
fn self_echo_check_is_exact_match() {
    assert_eq!(accepted(r#"{"user":"Ann","text":"x"}"#, "ann").user, "Ann");
    assert_eq!(accepted(r#"{"user":"ann ","text":"x"}"#, "ann").user, "ann ");
}

#[test]
fn absent_user_is_not_self_echo_even_for_unknown_username() {
    let msg = accepted(r#"{"text":"x"}"#, "unknown");
    assert_eq!(msg.user, "unknown");
}

#[test]
fn fallback_is_never_suppressed() {
    let msg = accepted("plain text", "server");
    assert_eq!(msg.user, "server");
}

#[test]
fn each_accepted_message_gets_fresh_id() {
    let a = accepted(r#"{"user":"bob","text":"same","time":1}"#, "ann");
    let b = accepted(r#"{"user":"bob","text":"same","time":1}"#, "ann");
    assert_ne!(a.id, b.id);
}

#[test]
fn payload_id_is_ignored() {
    let msg = accepted(r#"{"id":"00000000-0000-0000-0000-000000000000","user":"bob","text":"x"}"#, "ann");
    assert_ne!(msg.id, uuid::Uuid::nil());
}

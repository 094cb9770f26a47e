// Unit tests for the JSON control-frame wire format.

use coach_live::ws::{InboundMessage, OutboundMessage};

#[test]
fn test_parse_system_notice() {
    let parsed = InboundMessage::parse(r#"{"type":"system","message":"Voice session connected."}"#);

    assert_eq!(
        parsed,
        Some(InboundMessage::System {
            message: "Voice session connected.".to_string()
        })
    );
}

#[test]
fn test_parse_agent_transcript() {
    let parsed = InboundMessage::parse(r#"{"type":"agent_transcript","text":"Tell me about yourself."}"#);

    assert_eq!(
        parsed,
        Some(InboundMessage::AgentTranscript {
            text: "Tell me about yourself.".to_string()
        })
    );
}

#[test]
fn test_parse_pong_and_turn_complete() {
    assert_eq!(
        InboundMessage::parse(r#"{"type":"pong"}"#),
        Some(InboundMessage::Pong)
    );
    assert_eq!(
        InboundMessage::parse(r#"{"type":"agent_turn_complete"}"#),
        Some(InboundMessage::AgentTurnComplete)
    );
}

#[test]
fn test_parse_unknown_type_is_tolerated() {
    let parsed = InboundMessage::parse(r#"{"type":"telemetry","level":3}"#);
    assert_eq!(parsed, Some(InboundMessage::Unknown));
}

#[test]
fn test_parse_malformed_payloads() {
    assert_eq!(InboundMessage::parse("not json at all"), None);
    assert_eq!(InboundMessage::parse(""), None);
    assert_eq!(InboundMessage::parse("[1,2,3]"), None);
    // Recognized tag but missing required field
    assert_eq!(InboundMessage::parse(r#"{"type":"system"}"#), None);
}

#[test]
fn test_ping_wire_format() {
    assert_eq!(OutboundMessage::Ping.to_json(), r#"{"type":"ping"}"#);
}

#[test]
fn test_candidate_transcript_wire_format() {
    let frame = OutboundMessage::CandidateTranscript {
        text: "I led the migration project.".to_string(),
    };

    let value: serde_json::Value = serde_json::from_str(&frame.to_json()).unwrap();
    assert_eq!(value["type"], "candidate_transcript");
    assert_eq!(value["text"], "I led the migration project.");
}

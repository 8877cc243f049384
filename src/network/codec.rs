use crate::common::ChatMessage;
use crate::error::ChatError;

/// Serialize an envelope into the text frame sent over the socket.
pub fn encode(message: &ChatMessage) -> Result<String, ChatError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse an inbound text frame.
///
/// Never fails: anything that is not a protocol envelope comes back as a plain
/// text message from `System` carrying the raw payload.
pub fn decode(raw: &str) -> ChatMessage {
    match serde_json::from_str::<ChatMessage>(raw) {
        Ok(message) => message,
        Err(err) => {
            log::debug!("Inbound frame is not an envelope ({err}); treating as plain text");
            ChatMessage::plain_text(raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::common::{LocalIdentity, SystemAction, TextMessage, types::SYSTEM_USER};

    fn round_trip(message: ChatMessage) {
        let encoded = encode(&message).unwrap();
        assert_eq!(decode(&encoded), message, "frame was {encoded}");
    }

    #[test]
    fn every_kind_survives_a_round_trip() {
        let me = LocalIdentity::new("User42");
        round_trip(ChatMessage::text(&me, "hello there"));
        round_trip(ChatMessage::system(&me, SystemAction::Join));
        round_trip(ChatMessage::system(&me, SystemAction::Leave));
        round_trip(ChatMessage::typing(&me, true));
        round_trip(ChatMessage::PresenceCount { count: 7 });
    }

    #[test]
    fn encodes_the_wire_field_names() {
        let me = LocalIdentity::new("User1");
        let value: serde_json::Value =
            serde_json::from_str(&encode(&ChatMessage::system(&me, SystemAction::Join)).unwrap())
                .unwrap();
        assert_eq!(value["type"], "system");
        assert_eq!(value["action"], "join");
        assert_eq!(value["user"], "User1");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));

        let value: serde_json::Value =
            serde_json::from_str(&encode(&ChatMessage::typing(&me, false)).unwrap()).unwrap();
        assert_eq!(value["type"], "typing");
        assert_eq!(value["typing"], false);
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn decodes_browser_envelopes() {
        let message = decode(
            r#"{"type":"message","user":"User7","text":"hey","timestamp":"2024-05-01T10:15:30.250Z"}"#,
        );
        assert_eq!(
            message,
            ChatMessage::Message(TextMessage {
                user: "User7".into(),
                text: "hey".into(),
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30).unwrap()
                    + chrono::Duration::milliseconds(250),
            })
        );

        assert_eq!(
            decode(r#"{"type":"userCount","count":3}"#),
            ChatMessage::PresenceCount { count: 3 }
        );
    }

    #[test]
    fn non_json_becomes_plain_text() {
        for raw in ["hello world", "{not json", "", "<b>hi</b>"] {
            match decode(raw) {
                ChatMessage::Message(message) => {
                    assert_eq!(message.user, SYSTEM_USER);
                    assert_eq!(message.text, raw);
                }
                other => panic!("expected plain text for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_conforming_envelope_becomes_plain_text() {
        let raw = r#"{"type":"message","user":"User7"}"#;
        match decode(raw) {
            ChatMessage::Message(message) => assert_eq!(message.text, raw),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_kept_as_unknown() {
        assert_eq!(
            decode(r#"{"type":"reaction","user":"User7","emoji":"+1"}"#),
            ChatMessage::Unknown
        );
    }
}

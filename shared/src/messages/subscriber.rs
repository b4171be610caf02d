//! Frames pushed to a subscriber over its WebSocket

use serde::{Deserialize, Serialize};

use crate::types::SubscriberId;

/// Server → browser frame
///
/// Untagged so the JSON matches what the frontend expects:
/// `{"ws_id": ...}` once on connect, then `{"session": n, "response": "..."}`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum ServerMessage {
    Welcome { ws_id: SubscriberId },
    Progress { session: u32, response: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_welcome_frame_shape() {
        let id: SubscriberId = "sub-42".parse().unwrap();
        let frame = ServerMessage::Welcome { ws_id: id };
        assert_eq!(serde_json::to_value(&frame).unwrap(), json!({"ws_id": "sub-42"}));
    }

    #[test]
    fn test_progress_frame_shape() {
        let frame = ServerMessage::Progress { session: 3, response: "✅ [완료] ok".to_string() };
        assert_eq!(
            serde_json::to_value(&frame).unwrap(),
            json!({"session": 3, "response": "✅ [완료] ok"})
        );
    }

    #[test]
    fn test_frames_parse_back_to_the_right_variant() {
        let welcome: ServerMessage = serde_json::from_str(r#"{"ws_id": "abc"}"#).unwrap();
        assert!(matches!(welcome, ServerMessage::Welcome { .. }));

        let progress: ServerMessage = serde_json::from_str(r#"{"session": 1, "response": "x"}"#).unwrap();
        assert_eq!(progress, ServerMessage::Progress { session: 1, response: "x".to_string() });
    }
}

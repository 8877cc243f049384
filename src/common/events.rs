use chrono::{DateTime, Utc};

use super::types::{SystemAction, TextMessage};

/// Mức độ của dòng trạng thái hiển thị cho người dùng.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

/// Sự kiện từ tầng mạng gửi lên UI.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    MessageReceived(TextMessage),
    SystemEvent {
        action: SystemAction,
        user: String,
    },
    TypingChanged {
        user: String,
        typing: bool,
    },
    PresenceCount(u64),
    ConnectionChanged(bool),
    Status {
        text: String,
        level: StatusLevel,
        at: DateTime<Utc>,
    },
}

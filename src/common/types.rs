use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tên người gửi dùng cho payload không đúng giao thức.
pub const SYSTEM_USER: &str = "System";

/// Domain model đại diện một envelope trên kết nối `/room`.
///
/// The `type` field selects the variant; each variant carries only the fields
/// that kind of envelope has on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ChatMessage {
    #[serde(rename = "message")]
    Message(TextMessage),
    #[serde(rename = "system")]
    SystemEvent {
        action: SystemAction,
        user: String,
        timestamp: DateTime<Utc>,
    },
    #[serde(rename = "typing")]
    TypingEvent {
        user: String,
        typing: bool,
    },
    #[serde(rename = "userCount")]
    PresenceCount { count: u64 },
    /// Envelope with a `type` this client does not know yet.
    #[serde(other)]
    Unknown,
}

/// Tin nhắn chat thông thường.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub user: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemAction {
    Join,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Message,
    SystemEvent,
    TypingEvent,
    PresenceCount,
    Unknown,
}

impl ChatMessage {
    pub fn text(user: &LocalIdentity, text: impl Into<String>) -> Self {
        Self::Message(TextMessage {
            user: user.display_name().to_string(),
            text: text.into(),
            timestamp: now_timestamp(),
        })
    }

    pub fn system(user: &LocalIdentity, action: SystemAction) -> Self {
        Self::SystemEvent {
            action,
            user: user.display_name().to_string(),
            timestamp: now_timestamp(),
        }
    }

    pub fn typing(user: &LocalIdentity, typing: bool) -> Self {
        Self::TypingEvent {
            user: user.display_name().to_string(),
            typing,
        }
    }

    /// Plain-text fallback for payloads that are not a protocol envelope.
    pub fn plain_text(raw: impl Into<String>) -> Self {
        Self::Message(TextMessage {
            user: SYSTEM_USER.to_string(),
            text: raw.into(),
            timestamp: now_timestamp(),
        })
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Message(_) => MessageKind::Message,
            Self::SystemEvent { .. } => MessageKind::SystemEvent,
            Self::TypingEvent { .. } => MessageKind::TypingEvent,
            Self::PresenceCount { .. } => MessageKind::PresenceCount,
            Self::Unknown => MessageKind::Unknown,
        }
    }
}

/// Current time at millisecond precision, the resolution browser peers use.
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Trạng thái kết nối, chỉ `ChatClient` được phép thay đổi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// Danh tính cục bộ, tạo một lần khi khởi động (không có đăng nhập).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalIdentity {
    display_name: String,
}

impl LocalIdentity {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }

    /// Random `UserNNN` name in the range 0..1000.
    pub fn generate() -> Self {
        let suffix = Uuid::new_v4().as_u128() % 1000;
        Self::new(format!("User{suffix}"))
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is(&self, user: &str) -> bool {
        self.display_name == user
    }
}

impl fmt::Display for LocalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

use std::collections::BTreeSet;

use chrono::{DateTime, Local, Utc};

use crate::common::{ChatEvent, LocalIdentity, StatusLevel, SystemAction, TextMessage};

/// Giữ tối đa bấy nhiêu dòng để không chiếm quá nhiều bộ nhớ.
const MAX_LINES: usize = 500;

/// Một dòng trong khung chat.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatLine {
    Message { message: TextMessage, own: bool },
    Notice { text: String, level: StatusLevel },
}

/// Trạng thái cục bộ của UI.
pub struct AppState {
    pub identity: LocalIdentity,
    pub lines: Vec<ChatLine>,
    pub input_text: String,
    pub connected: bool,
    pub user_count: Option<u64>,
    /// Những người đang gõ (không bao gồm mình).
    pub typing_users: BTreeSet<String>,
}

impl AppState {
    pub fn new(identity: LocalIdentity) -> Self {
        Self {
            identity,
            lines: Vec::new(),
            input_text: String::new(),
            connected: false,
            user_count: None,
            typing_users: BTreeSet::new(),
        }
    }

    pub fn apply(&mut self, event: ChatEvent) {
        match event {
            ChatEvent::MessageReceived(message) => {
                let own = self.identity.is(&message.user);
                self.typing_users.remove(&message.user);
                self.push_line(ChatLine::Message { message, own });
            }
            ChatEvent::SystemEvent { action, user } => {
                let verb = match action {
                    SystemAction::Join => "joined",
                    SystemAction::Leave => {
                        self.typing_users.remove(&user);
                        "left"
                    }
                };
                self.push_notice(format!("{user} has {verb} the chat"), StatusLevel::Info);
            }
            ChatEvent::TypingChanged { user, typing } => {
                if typing {
                    self.typing_users.insert(user);
                } else {
                    self.typing_users.remove(&user);
                }
            }
            ChatEvent::PresenceCount(count) => self.user_count = Some(count),
            ChatEvent::ConnectionChanged(connected) => {
                self.connected = connected;
                if !connected {
                    self.typing_users.clear();
                }
            }
            ChatEvent::Status { text, level, .. } => self.push_notice(text, level),
        }
    }

    /// Text to submit, if any; the input field is cleared either way.
    pub fn take_input(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.input_text);
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    }

    /// "alice is typing..." / "alice, bob are typing...", or `None` when nobody is.
    pub fn typing_label(&self) -> Option<String> {
        match self.typing_users.len() {
            0 => None,
            1 => self
                .typing_users
                .iter()
                .next()
                .map(|user| format!("{user} is typing...")),
            _ => {
                let names: Vec<&str> = self.typing_users.iter().map(String::as_str).collect();
                Some(format!("{} are typing...", names.join(", ")))
            }
        }
    }

    fn push_notice(&mut self, text: String, level: StatusLevel) {
        self.push_line(ChatLine::Notice { text, level });
    }

    fn push_line(&mut self, line: ChatLine) {
        self.lines.push(line);
        if self.lines.len() > MAX_LINES {
            let overflow = self.lines.len() - MAX_LINES;
            self.lines.drain(..overflow);
        }
    }
}

/// `HH:MM` in local time.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::now_timestamp;

    fn state() -> AppState {
        AppState::new(LocalIdentity::new("me"))
    }

    fn message(user: &str, text: &str) -> TextMessage {
        TextMessage {
            user: user.into(),
            text: text.into(),
            timestamp: now_timestamp(),
        }
    }

    #[test]
    fn own_messages_are_marked() {
        let mut state = state();
        state.apply(ChatEvent::MessageReceived(message("me", "hi")));
        state.apply(ChatEvent::MessageReceived(message("bob", "yo")));

        let owners: Vec<bool> = state
            .lines
            .iter()
            .map(|line| matches!(line, ChatLine::Message { own: true, .. }))
            .collect();
        assert_eq!(owners, vec![true, false]);
    }

    #[test]
    fn join_and_leave_become_notices() {
        let mut state = state();
        state.apply(ChatEvent::SystemEvent {
            action: SystemAction::Join,
            user: "bob".into(),
        });
        state.apply(ChatEvent::SystemEvent {
            action: SystemAction::Leave,
            user: "bob".into(),
        });

        assert_eq!(
            state.lines,
            vec![
                ChatLine::Notice {
                    text: "bob has joined the chat".into(),
                    level: StatusLevel::Info
                },
                ChatLine::Notice {
                    text: "bob has left the chat".into(),
                    level: StatusLevel::Info
                },
            ]
        );
    }

    #[test]
    fn typing_indicator_tracks_remote_users() {
        let mut state = state();
        assert_eq!(state.typing_label(), None);

        state.apply(ChatEvent::TypingChanged {
            user: "bob".into(),
            typing: true,
        });
        assert_eq!(state.typing_label().as_deref(), Some("bob is typing..."));

        state.apply(ChatEvent::TypingChanged {
            user: "amy".into(),
            typing: true,
        });
        assert_eq!(state.typing_label().as_deref(), Some("amy, bob are typing..."));

        state.apply(ChatEvent::MessageReceived(message("amy", "done")));
        state.apply(ChatEvent::TypingChanged {
            user: "bob".into(),
            typing: false,
        });
        assert_eq!(state.typing_label(), None);
    }

    #[test]
    fn submitting_clears_the_input_field() {
        let mut state = state();
        state.input_text = "  hi \n".into();

        assert_eq!(state.take_input().as_deref(), Some("hi"));
        assert!(state.input_text.is_empty());

        state.input_text = "   ".into();
        assert_eq!(state.take_input(), None);
        assert!(state.input_text.is_empty());
    }

    #[test]
    fn presence_and_connection_are_tracked() {
        let mut state = state();
        state.apply(ChatEvent::ConnectionChanged(true));
        state.apply(ChatEvent::PresenceCount(3));
        assert!(state.connected);
        assert_eq!(state.user_count, Some(3));

        state.apply(ChatEvent::TypingChanged {
            user: "bob".into(),
            typing: true,
        });
        state.apply(ChatEvent::ConnectionChanged(false));
        assert!(!state.connected);
        assert!(state.typing_users.is_empty());
    }

    #[test]
    fn old_lines_are_dropped() {
        let mut state = state();
        for i in 0..MAX_LINES + 10 {
            state.apply(ChatEvent::MessageReceived(message("bob", &i.to_string())));
        }
        assert_eq!(state.lines.len(), MAX_LINES);
        assert!(matches!(
            &state.lines[0],
            ChatLine::Message { message, .. } if message.text == "10"
        ));
    }
}

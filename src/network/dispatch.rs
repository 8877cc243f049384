use tokio::sync::mpsc;

use crate::common::types::now_timestamp;
use crate::common::{ChatEvent, ChatMessage, LocalIdentity, StatusLevel, SystemAction, TextMessage};

/// Callbacks the presentation layer implements.
pub trait EventSink {
    fn on_message(&mut self, message: TextMessage);
    fn on_system_event(&mut self, action: SystemAction, user: String);
    fn on_typing_change(&mut self, user: String, typing: bool);
    fn on_presence_count(&mut self, count: u64);
    fn on_connection_state_change(&mut self, connected: bool);
    /// User-visible status line (connected, connection lost, fatal errors).
    fn on_status(&mut self, text: String, level: StatusLevel);
}

/// Route a decoded envelope to the matching callback.
///
/// Our own typing notifications are dropped; unknown kinds are ignored.
pub fn route(message: ChatMessage, identity: &LocalIdentity, sink: &mut dyn EventSink) {
    match message {
        ChatMessage::Message(message) => sink.on_message(message),
        ChatMessage::SystemEvent { action, user, .. } => sink.on_system_event(action, user),
        ChatMessage::TypingEvent { user, typing } => {
            if identity.is(&user) {
                return;
            }
            sink.on_typing_change(user, typing);
        }
        ChatMessage::PresenceCount { count } => sink.on_presence_count(count),
        ChatMessage::Unknown => log::debug!("Ignoring envelope of unknown type"),
    }
}

/// Forwards every callback as a `ChatEvent` to the UI thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<ChatEvent>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::UnboundedSender<ChatEvent>) -> Self {
        Self { sender }
    }

    fn emit(&self, event: ChatEvent) {
        if let Err(err) = self.sender.send(event) {
            log::warn!("UI is gone, dropping event: {:?}", err.0);
        }
    }
}

impl EventSink for ChannelSink {
    fn on_message(&mut self, message: TextMessage) {
        self.emit(ChatEvent::MessageReceived(message));
    }

    fn on_system_event(&mut self, action: SystemAction, user: String) {
        self.emit(ChatEvent::SystemEvent { action, user });
    }

    fn on_typing_change(&mut self, user: String, typing: bool) {
        self.emit(ChatEvent::TypingChanged { user, typing });
    }

    fn on_presence_count(&mut self, count: u64) {
        self.emit(ChatEvent::PresenceCount(count));
    }

    fn on_connection_state_change(&mut self, connected: bool) {
        self.emit(ChatEvent::ConnectionChanged(connected));
    }

    fn on_status(&mut self, text: String, level: StatusLevel) {
        self.emit(ChatEvent::Status {
            text,
            level,
            at: now_timestamp(),
        });
    }
}

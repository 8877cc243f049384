use std::future;
use std::time::Duration;

use tokio::sync::mpsc;
use url::Url;

use crate::common::{
    ChatMessage, ClientCommand, ConnectionState, LocalIdentity, StatusLevel, SystemAction,
};
use crate::error::ChatError;

use super::codec;
use super::dispatch::{EventSink, route};
use super::timer::Timer;
use super::transport::{Connector, TransportLink, TransportSignal};
use super::typing::{TYPING_DEBOUNCE, TypingTracker};

pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Knobs of the connection state machine.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub room_url: Url,
    /// Fixed delay before every reconnect attempt. No backoff, no cap.
    pub reconnect_delay: Duration,
    pub typing_debounce: Duration,
}

impl ClientSettings {
    pub fn new(room_url: Url) -> Self {
        Self {
            room_url,
            reconnect_delay: RECONNECT_DELAY,
            typing_debounce: TYPING_DEBOUNCE,
        }
    }
}

/// Who we are and where the connection stands.
#[derive(Debug)]
struct Session {
    identity: LocalIdentity,
    state: ConnectionState,
}

/// Connection manager: owns the transport, the reconnect timer and the typing tracker.
///
/// Everything runs inside [`ChatClient::run`], one event at a time.
pub struct ChatClient<C, S> {
    session: Session,
    settings: ClientSettings,
    connector: C,
    sink: S,
    command_receiver: mpsc::Receiver<ClientCommand>,
    link: Option<TransportLink>,
    typing: TypingTracker,
    reconnect: Timer,
}

impl<C: Connector, S: EventSink> ChatClient<C, S> {
    pub fn new(
        settings: ClientSettings,
        identity: LocalIdentity,
        connector: C,
        sink: S,
        command_receiver: mpsc::Receiver<ClientCommand>,
    ) -> Self {
        let typing = TypingTracker::new(settings.typing_debounce);
        Self {
            session: Session {
                identity,
                state: ConnectionState::Disconnected,
            },
            settings,
            connector,
            sink,
            command_receiver,
            link: None,
            typing,
            reconnect: Timer::idle(),
        }
    }

    pub async fn run(mut self) -> Result<(), ChatError> {
        log::info!(
            "Joining {} as {}",
            self.settings.room_url,
            self.session.identity
        );
        self.connect()?;

        loop {
            tokio::select! {
                command = self.command_receiver.recv() => {
                    match command {
                        Some(ClientCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                signal = next_signal(&mut self.link) => {
                    self.handle_signal(signal);
                }
                () = self.typing.expired() => {
                    self.send_typing(false);
                }
                () = self.reconnect.fired() => {
                    log::info!("Reconnecting to {}", self.settings.room_url);
                    self.connect()?;
                }
            }
        }

        self.teardown().await;
        Ok(())
    }

    /// Disconnected → Connecting. Only an unsupported environment is an error.
    pub fn connect(&mut self) -> Result<(), ChatError> {
        if self.session.state != ConnectionState::Disconnected {
            return Ok(());
        }

        match self.connector.open(&self.settings.room_url) {
            Ok(link) => {
                self.link = Some(link);
                self.set_state(ConnectionState::Connecting);
                Ok(())
            }
            Err(err) => {
                log::error!("Cannot open chat transport: {err}");
                self.sink
                    .on_status(format!("Error: {err}"), StatusLevel::Error);
                Err(err)
            }
        }
    }

    pub fn handle_signal(&mut self, signal: TransportSignal) {
        match signal {
            TransportSignal::Open => self.on_open(),
            TransportSignal::Frame(raw) => {
                let message = codec::decode(&raw);
                route(message, &self.session.identity, &mut self.sink);
            }
            TransportSignal::Error(reason) => {
                log::warn!("Transport error: {reason}");
                if self.session.state != ConnectionState::Disconnected {
                    self.sink
                        .on_status("Connection error".to_string(), StatusLevel::Error);
                }
                self.on_disconnect();
            }
            TransportSignal::Closed => self.on_disconnect(),
        }
    }

    pub fn handle_command(&mut self, command: ClientCommand) {
        match command {
            ClientCommand::InputChanged => {
                if let Some(typing) = self.typing.on_input() {
                    self.send_typing(typing);
                }
            }
            ClientCommand::SubmitText(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return;
                }
                let message = ChatMessage::text(&self.session.identity, text);
                self.send(&message);
                // Sending always ends the burst, even if no `true` went out.
                self.typing.on_submit();
                self.send_typing(false);
            }
            ClientCommand::Shutdown => {}
        }
    }

    /// Send an envelope. Silently dropped unless connected; never queued.
    pub fn send(&mut self, message: &ChatMessage) -> bool {
        let link = match (&self.link, self.session.state) {
            (Some(link), ConnectionState::Connected) => link,
            _ => {
                log::debug!("Not connected, dropping {:?}", message.kind());
                return false;
            }
        };

        let frame = match codec::encode(message) {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("Failed to serialize message: {err}");
                return false;
            }
        };

        match link.send(frame) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("Send failed: {err}");
                false
            }
        }
    }

    /// Cancel timers, say goodbye if connected, and release the transport.
    pub async fn teardown(&mut self) {
        self.typing.reset();
        self.reconnect.cancel();

        if self.session.state == ConnectionState::Connected {
            let leave = ChatMessage::system(&self.session.identity, SystemAction::Leave);
            self.send(&leave);
        }
        self.set_state(ConnectionState::Disconnected);

        if let Some(link) = self.link.take() {
            link.close().await;
        }
        log::info!("Chat client stopped");
    }

    fn on_open(&mut self) {
        if self.session.state != ConnectionState::Connecting {
            return;
        }
        self.set_state(ConnectionState::Connected);
        self.sink.on_connection_state_change(true);
        self.sink
            .on_status("Connected to chat server".to_string(), StatusLevel::Success);

        let join = ChatMessage::system(&self.session.identity, SystemAction::Join);
        self.send(&join);
    }

    fn on_disconnect(&mut self) {
        if self.session.state == ConnectionState::Disconnected {
            return;
        }
        self.set_state(ConnectionState::Disconnected);
        // Pump task is finishing on its own; nothing left to flush.
        self.link = None;
        self.typing.reset();

        self.sink.on_connection_state_change(false);
        self.sink.on_status(
            "Connection lost. Attempting to reconnect...".to_string(),
            StatusLevel::Error,
        );
        self.reconnect.arm(self.settings.reconnect_delay);
    }

    fn send_typing(&mut self, typing: bool) {
        let message = ChatMessage::typing(&self.session.identity, typing);
        self.send(&message);
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.session.state != state {
            log::info!("Connection {} -> {}", self.session.state, state);
            self.session.state = state;
        }
    }
}

async fn next_signal(link: &mut Option<TransportLink>) -> TransportSignal {
    match link {
        Some(link) => link.next_signal().await,
        None => future::pending().await,
    }
}

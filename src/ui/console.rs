use std::future::Future;
use std::io::BufRead;

use tokio::sync::mpsc;

use crate::common::{ChatEvent, ClientCommand, LocalIdentity};

use super::state::{AppState, ChatLine, format_time};

/// Read stdin on a plain thread so a blocked read never holds up runtime shutdown.
///
/// The receiver yields `None` once stdin hits EOF or fails.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    log::error!("Failed to read stdin: {err}");
                    return;
                }
            }
        }
    });
    line_rx
}

/// Line-oriented front end: input lines are sent, events are printed.
///
/// Returns when `shutdown` resolves, input ends, or the client goes away.
pub async fn run(
    identity: LocalIdentity,
    mut input: mpsc::UnboundedReceiver<String>,
    shutdown: impl Future<Output = ()>,
    command_sender: mpsc::Sender<ClientCommand>,
    mut event_receiver: mpsc::UnboundedReceiver<ChatEvent>,
) {
    let mut state = AppState::new(identity);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = input.recv() => {
                let Some(line) = line else { break };
                // Mỗi dòng nhập tính là một lần gõ rồi gửi
                let commands = [ClientCommand::InputChanged, ClientCommand::SubmitText(line)];
                for command in commands {
                    if command_sender.send(command).await.is_err() {
                        return;
                    }
                }
            }
            event = event_receiver.recv() => {
                match event {
                    Some(event) => {
                        if let Some(rendered) = render_event(&mut state, event) {
                            println!("{rendered}");
                        }
                    }
                    None => break,
                }
            }
            _ = &mut shutdown => {
                log::info!("Received shutdown signal, leaving the room...");
                break;
            }
        }
    }
}

/// Apply the event and describe what changed, if it is worth printing.
fn render_event(state: &mut AppState, event: ChatEvent) -> Option<String> {
    let typing_before = state.typing_label();
    let lines_before = state.lines.len();
    let count_before = state.user_count;
    state.apply(event);

    if state.lines.len() != lines_before {
        return state.lines.last().map(render_line);
    }
    if state.user_count != count_before {
        return state.user_count.map(|count| format!("* {count} online"));
    }
    let typing_after = state.typing_label();
    if typing_after != typing_before {
        return typing_after.map(|label| format!("* {label}"));
    }
    None
}

fn render_line(line: &ChatLine) -> String {
    match line {
        ChatLine::Message { message, own } => {
            let name = if *own { "you" } else { message.user.as_str() };
            format!("[{}] {name}: {}", format_time(message.timestamp), message.text)
        }
        ChatLine::Notice { text, .. } => format!("-- {text} --"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::common::TextMessage;
    use crate::common::types::now_timestamp;

    #[test]
    fn renders_messages_and_presence() {
        let mut state = AppState::new(LocalIdentity::new("me"));
        let rendered = render_event(
            &mut state,
            ChatEvent::MessageReceived(TextMessage {
                user: "bob".into(),
                text: "hello".into(),
                timestamp: now_timestamp(),
            }),
        )
        .unwrap();
        assert!(rendered.ends_with("bob: hello"));

        assert_eq!(
            render_event(&mut state, ChatEvent::PresenceCount(4)).as_deref(),
            Some("* 4 online")
        );
        assert_eq!(render_event(&mut state, ChatEvent::PresenceCount(4)), None);
    }

    #[test]
    fn typing_changes_are_printed_once() {
        let mut state = AppState::new(LocalIdentity::new("me"));
        let typing = ChatEvent::TypingChanged {
            user: "bob".into(),
            typing: true,
        };
        assert_eq!(
            render_event(&mut state, typing.clone()).as_deref(),
            Some("* bob is typing...")
        );
        assert_eq!(render_event(&mut state, typing), None);
    }

    #[tokio::test]
    async fn shutdown_signal_ends_session_while_input_stays_open() {
        let (_line_tx, line_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);
        let (_event_tx, event_rx) = mpsc::unbounded_channel();

        let session = run(
            LocalIdentity::new("me"),
            line_rx,
            std::future::ready(()),
            cmd_tx,
            event_rx,
        );
        tokio::time::timeout(Duration::from_secs(1), session)
            .await
            .expect("console must return once shutdown resolves");
        assert!(cmd_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn input_lines_are_typed_then_submitted() {
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let (cmd_tx, mut cmd_rx) = mpsc::channel(8);
        let (_event_tx, event_rx) = mpsc::unbounded_channel();

        line_tx.send("hello".to_string()).unwrap();
        drop(line_tx);
        let session = run(
            LocalIdentity::new("me"),
            line_rx,
            std::future::pending(),
            cmd_tx,
            event_rx,
        );
        tokio::time::timeout(Duration::from_secs(1), session)
            .await
            .expect("console must return at end of input");

        assert_eq!(cmd_rx.recv().await, Some(ClientCommand::InputChanged));
        assert_eq!(
            cmd_rx.recv().await,
            Some(ClientCommand::SubmitText("hello".into()))
        );
        assert_eq!(cmd_rx.recv().await, None);
    }

    #[test]
    fn connection_flag_alone_prints_nothing() {
        let mut state = AppState::new(LocalIdentity::new("me"));
        assert_eq!(render_event(&mut state, ChatEvent::ConnectionChanged(true)), None);
        assert!(state.connected);
    }
}

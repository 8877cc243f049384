use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

use crate::error::ChatError;

pub const ROOM_PATH: &str = "/room";

/// How long teardown waits for queued frames (the `leave` notice) to hit the wire.
const FLUSH_GRACE: Duration = Duration::from_secs(1);

/// Lifecycle and data signals coming up from a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSignal {
    Open,
    Frame(String),
    Error(String),
    Closed,
}

/// One live connection attempt: frames go down `outbound`, signals come up `inbound`.
#[derive(Debug)]
pub struct TransportLink {
    outbound: mpsc::UnboundedSender<String>,
    inbound: mpsc::UnboundedReceiver<TransportSignal>,
    task: Option<JoinHandle<()>>,
}

impl TransportLink {
    pub fn new(
        outbound: mpsc::UnboundedSender<String>,
        inbound: mpsc::UnboundedReceiver<TransportSignal>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            outbound,
            inbound,
            task,
        }
    }

    /// Queue a frame. Fire-and-forget: delivery is never confirmed.
    pub fn send(&self, frame: String) -> Result<(), ChatError> {
        self.outbound
            .send(frame)
            .map_err(|_| ChatError::TransportClosed)
    }

    /// Next signal; a vanished transport reads as `Closed`.
    pub async fn next_signal(&mut self) -> TransportSignal {
        self.inbound.recv().await.unwrap_or(TransportSignal::Closed)
    }

    /// Stop sending and give the transport a moment to flush what is queued.
    pub async fn close(self) {
        let Self { outbound, task, .. } = self;
        drop(outbound);
        if let Some(task) = task {
            if tokio::time::timeout(FLUSH_GRACE, task).await.is_err() {
                log::warn!("Transport did not flush within {FLUSH_GRACE:?}");
            }
        }
    }
}

/// Opens transport links. Non-blocking: the outcome arrives as signals.
pub trait Connector {
    fn open(&mut self, url: &Url) -> Result<TransportLink, ChatError>;
}

/// `ws://host/room` or `wss://host/room` depending on whether the origin is secure.
///
/// `host` is an authority (`name` or `name:port`); anything carrying a path,
/// query, fragment or credentials is rejected rather than folded into the url.
pub fn room_url(host: &str, secure: bool) -> Result<Url, ChatError> {
    let host = host.trim();
    let malformed = host.is_empty()
        || host.contains(['/', '\\', '?', '#', '@'])
        || host.contains(char::is_whitespace);
    if malformed {
        return Err(ChatError::InvalidHost(host.to_string()));
    }

    let scheme = if secure { "wss" } else { "ws" };
    let url = Url::parse(&format!("{scheme}://{host}{ROOM_PATH}"))?;
    if url.host_str().is_none_or(str::is_empty) || url.path() != ROOM_PATH {
        return Err(ChatError::InvalidHost(host.to_string()));
    }
    Ok(url)
}

/// WebSocket transport backed by tokio-tungstenite.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    fn check_support(url: &Url) -> Result<(), ChatError> {
        match url.scheme() {
            "ws" => Ok(()),
            "wss" if cfg!(feature = "tls") => Ok(()),
            "wss" => Err(ChatError::UnsupportedEnvironment(
                "secure web sockets need the `tls` feature".to_string(),
            )),
            other => Err(ChatError::UnsupportedEnvironment(format!(
                "no web socket transport for scheme `{other}`"
            ))),
        }
    }
}

impl Connector for WebSocketConnector {
    fn open(&mut self, url: &Url) -> Result<TransportLink, ChatError> {
        Self::check_support(url)?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(pump(url.clone(), outbound_rx, signal_tx));

        Ok(TransportLink::new(outbound_tx, signal_rx, Some(task)))
    }
}

async fn pump(
    url: Url,
    mut outbound: mpsc::UnboundedReceiver<String>,
    signals: mpsc::UnboundedSender<TransportSignal>,
) {
    let (socket, _) = match connect_async(url.as_str()).await {
        Ok(ok) => ok,
        Err(err) => {
            log::warn!("Connect to {url} failed: {err}");
            let _ = signals.send(TransportSignal::Error(err.to_string()));
            let _ = signals.send(TransportSignal::Closed);
            return;
        }
    };
    let _ = signals.send(TransportSignal::Open);

    let (mut write, mut read) = socket.split();
    loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => {
                    if let Err(err) = write.send(Message::Text(text.into())).await {
                        let _ = signals.send(TransportSignal::Error(err.to_string()));
                        break;
                    }
                }
                None => {
                    // Owner hung up; everything queued before that has been written.
                    if let Err(err) = write.send(Message::Close(None)).await {
                        log::debug!("Close frame not sent: {err}");
                    }
                    return;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let _ = signals.send(TransportSignal::Frame(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    let text = String::from_utf8_lossy(&data).into_owned();
                    let _ = signals.send(TransportSignal::Frame(text));
                }
                Some(Ok(Message::Close(frame))) => {
                    log::info!("Server closed the connection: {frame:?}");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    let _ = signals.send(TransportSignal::Error(err.to_string()));
                    break;
                }
                None => break,
            },
        }
    }

    let _ = signals.send(TransportSignal::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_url_follows_origin_security() {
        assert_eq!(
            room_url("chat.example.com", true).unwrap().as_str(),
            "wss://chat.example.com/room"
        );
        assert_eq!(
            room_url("localhost:8080", false).unwrap().as_str(),
            "ws://localhost:8080/room"
        );
    }

    #[test]
    fn room_url_rejects_garbage_hosts() {
        assert!(room_url("", false).is_err());

        for host in ["   ", "example.com/chat", "user@example.com", "example.com?x=1", "a b"] {
            assert!(
                matches!(room_url(host, false), Err(ChatError::InvalidHost(_))),
                "{host:?} should be rejected"
            );
        }
        assert!(matches!(
            room_url("localhost:notaport", false),
            Err(ChatError::InvalidUrl(_))
        ));
    }

    #[test]
    fn room_url_always_targets_room_path() {
        let url = room_url(" localhost:8080 ", true).unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
        assert_eq!(url.path(), ROOM_PATH);
    }

    #[test]
    fn unknown_schemes_are_unsupported() {
        let url = Url::parse("http://localhost/room").unwrap();
        assert!(matches!(
            WebSocketConnector.open(&url),
            Err(ChatError::UnsupportedEnvironment(_))
        ));
    }

    #[cfg(not(feature = "tls"))]
    #[test]
    fn secure_sockets_need_tls_feature() {
        let url = room_url("localhost", true).unwrap();
        assert!(matches!(
            WebSocketConnector.open(&url),
            Err(ChatError::UnsupportedEnvironment(_))
        ));
    }

    #[tokio::test]
    async fn link_reports_closed_when_transport_vanishes() {
        let (outbound_tx, _outbound_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let mut link = TransportLink::new(outbound_tx, signal_rx, None);
        signal_tx.send(TransportSignal::Open).unwrap();
        drop(signal_tx);

        assert_eq!(link.next_signal().await, TransportSignal::Open);
        assert_eq!(link.next_signal().await, TransportSignal::Closed);
    }

    #[test]
    fn send_fails_once_transport_dropped_its_end() {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (_signal_tx, signal_rx) = mpsc::unbounded_channel();
        let link = TransportLink::new(outbound_tx, signal_rx, None);
        drop(outbound_rx);

        assert!(matches!(
            link.send("x".into()),
            Err(ChatError::TransportClosed)
        ));
    }
}

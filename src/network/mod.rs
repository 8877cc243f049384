pub mod client;
pub mod codec;
pub mod dispatch;
pub mod timer;
pub mod transport;
pub mod typing;

pub use client::{ChatClient, ClientSettings};
pub use dispatch::ChannelSink;
pub use transport::{WebSocketConnector, room_url};

pub mod commands;
pub mod events;
pub mod types;

pub use commands::ClientCommand;
pub use events::{ChatEvent, StatusLevel};
pub use types::{ChatMessage, ConnectionState, LocalIdentity, SystemAction, TextMessage};

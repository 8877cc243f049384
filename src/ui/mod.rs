pub mod app;
pub mod components;
pub mod console;
pub mod state;

pub use app::ChatApp;

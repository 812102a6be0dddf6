pub mod manager;
pub mod messages;

pub use manager::DraftConnectionManager;
pub use messages::{ClientMessage, ServerMessage};

//! Session-level types shared with the gateway boundary.

pub mod message;
pub mod stream;

pub use message::{Message, Role};
pub use stream::StreamEvent;

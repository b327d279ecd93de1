//! Live event-stream rendering.

pub mod renderer;

pub use renderer::LiveRenderer;

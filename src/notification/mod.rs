pub mod message;
pub mod render;
pub mod terminal;

pub use message::{ItemAction, Message};
pub use render::{Edge, MemoryView, RenderTarget, RenderedItem};
pub use terminal::TerminalView;

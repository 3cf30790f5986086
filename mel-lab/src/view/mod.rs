//! Presentation helpers: tab scroll memory, emphasis parsing, terminal output

pub mod rich_text;
pub mod tabs;
pub mod terminal;

pub use tabs::{TabScrollMemory, ViewTab};

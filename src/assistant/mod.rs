//! The contact assistant: the entry program shipped with the bootstrap

pub mod commands;
pub mod session;
pub mod view;

pub use commands::{parse_input, Assistant, Command, Flow};
pub use session::{run_chat, spawn_line_feeder, ChannelReader, Input, LineReader, Session};
pub use view::{ConsoleView, View};

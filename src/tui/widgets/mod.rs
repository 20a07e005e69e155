//! Reusable TUI widgets

pub mod file_panel;
pub mod input;
pub mod message_list;
pub mod mode_bar;
pub mod status_bar;

pub use file_panel::{FilePanel, FilePanelState};
pub use input::InputWidget;
pub use message_list::{MessageList, MessageListState};
pub use mode_bar::{mode_description, mode_hotkey, mode_icon, mode_label, ModeBar};
pub use status_bar::StatusBar;

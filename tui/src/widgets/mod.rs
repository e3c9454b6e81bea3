//! Widgets drawn onto compositor layers

pub mod labels;
pub mod log_panel;
pub mod status;

pub use labels::draw_labels;
pub use log_panel::{LogPanel, LogPanelState};
pub use status::{draw_footer, draw_header, draw_prompt};

//! The toolbar widget set.
//!
//! - [`ToolBar`]: the item strip with overflow handling
//! - [`ToolBarPanel`]: the main-strip items host and overflow partition
//! - [`ToolBarOverflowPanel`]: the wrapping overflow surface
//! - [`OverflowPopup`]: the popup hosting the overflow surface
//! - [`ToolBarTray`]: bands of toolbars with drag rearrangement
//! - [`DragThumb`]: the drag grip and its drag-vector protocol

mod drag_thumb;
mod overflow_panel;
mod overflow_popup;
mod tool_bar;
mod tool_bar_panel;
mod tool_bar_tray;

pub use drag_thumb::{DragEvent, DragThumb};
pub use overflow_panel::ToolBarOverflowPanel;
pub use overflow_popup::OverflowPopup;
pub use tool_bar::{OverflowOpenState, ToolBar, ToolBarStyle};
pub use tool_bar_panel::ToolBarPanel;
pub use tool_bar_tray::ToolBarTray;

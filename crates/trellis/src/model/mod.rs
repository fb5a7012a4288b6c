//! Item model for toolbars.
//!
//! The application describes toolbar content as [`ToolItem`]s in an
//! observable [`ToolItemList`]; the widgets realize containers around the
//! items and keep them synchronized through the list's [`ListSignals`].

mod item;
mod list;

pub use item::{ButtonItem, ChoiceItem, LabelItem, OverflowMode, SeparatorItem, ToolItem};
pub use list::{ListSignals, ToolItemList};

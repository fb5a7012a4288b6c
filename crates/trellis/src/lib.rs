//! Trellis: banded toolbar widgets.
//!
//! Trellis is a toolbar kit for GUI embeddings: toolbars with
//! space-driven overflow into a popup surface, arranged by a tray into
//! draggable bands. The embedding supplies rendering and windowing; the
//! kit supplies layout, overflow partitioning, band packing and the drag
//! protocol.
//!
//! # Overview
//!
//! - Content is described as [`model::ToolItem`]s in an observable
//!   [`model::ToolItemList`].
//! - A [`widget::ToolBar`] realizes containers for its items and, on
//!   every measure, partitions them between its main strip and its
//!   overflow surface based on each item's
//!   [`model::OverflowMode`] and the available space.
//! - A [`widget::ToolBarTray`] groups toolbars into bands, negotiates
//!   shared space through each toolbar's min/max lengths, and turns
//!   [`widget::DragThumb`] drags into live resize, reorder and reband
//!   operations.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use trellis::geometry::{Rect, Size};
//! use trellis::model::{ButtonItem, ToolItem};
//! use trellis::widget::{ToolBar, ToolBarTray};
//!
//! trellis_core::init_global_registry();
//!
//! let bar = ToolBar::new();
//! bar.items().push(Arc::new(ButtonItem::new("Open", Size::new(40.0, 24.0))) as Arc<dyn ToolItem>);
//! bar.items().push(Arc::new(ButtonItem::new("Save", Size::new(40.0, 24.0))) as Arc<dyn ToolItem>);
//!
//! let mut tray = ToolBarTray::new();
//! tray.push_tool_bar(bar);
//!
//! let size = tray.measure(Size::new(400.0, 100.0));
//! tray.arrange(Rect::from_origin_size(Default::default(), size));
//! ```

pub mod geometry;
pub mod model;
pub mod widget;

/// The common imports.
pub mod prelude {
    pub use crate::geometry::{Orientation, Point, Rect, Size};
    pub use crate::model::{OverflowMode, ToolItem, ToolItemList};
    pub use crate::widget::{
        DragEvent, DragThumb, ToolBar, ToolBarOverflowPanel, ToolBarPanel, ToolBarTray, Widget,
    };
    pub use trellis_core::{Object, ObjectId, init_global_registry};
}

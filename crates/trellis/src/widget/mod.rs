//! Widget infrastructure and the toolbar widgets.

pub mod base;
pub mod cursor;
pub mod events;
pub mod geometry;
pub mod input;
pub mod items;
pub mod traits;
pub mod widgets;

pub use base::WidgetBase;
pub use cursor::CursorShape;
pub use events::{
    CaptureLostEvent, EventBase, KeyboardModifiers, MouseButton, MouseMoveEvent, MousePressEvent,
    MouseReleaseEvent, ResizeEvent, WidgetEvent,
};
pub use geometry::{SizeHint, SizePolicy, SizePolicyPair};
pub use input::{PointerEvent, PointerTracker};
pub use items::{
    ContainerEntry, ContainerFactory, ContainerMirror, HostFactory, ItemWidget, Placement,
    ToolItemHost,
};
pub use traits::Widget;
pub use widgets::{
    DragEvent, DragThumb, OverflowOpenState, OverflowPopup, ToolBar, ToolBarOverflowPanel,
    ToolBarPanel, ToolBarStyle, ToolBarTray,
};

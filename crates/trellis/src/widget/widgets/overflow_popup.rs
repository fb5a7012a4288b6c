//! The popup surface hosting a toolbar's overflow panel.
//!
//! A deliberately small widget: it tracks open state and the rectangle the
//! popup occupies in the owning toolbar's coordinate space. The toolbar
//! decides placement; the popup just remembers it for hit testing.

use trellis_core::{Object, ObjectId, Signal};

use crate::geometry::{Point, Rect};
use crate::widget::base::WidgetBase;
use crate::widget::geometry::SizeHint;
use crate::widget::traits::Widget;

/// The overflow popup of a toolbar.
pub struct OverflowPopup {
    base: WidgetBase,
    open: bool,
    /// The popup rectangle in toolbar-local coordinates, valid while open.
    placement: Rect,

    /// Signal emitted when the popup opens.
    pub opened: Signal<()>,
    /// Signal emitted when the popup closes.
    pub closed: Signal<()>,
}

impl OverflowPopup {
    /// Create a closed popup.
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            open: false,
            placement: Rect::ZERO,
            opened: Signal::new(),
            closed: Signal::new(),
        }
    }

    /// Whether the popup is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The popup rectangle in toolbar-local coordinates.
    pub fn placement_rect(&self) -> Rect {
        self.placement
    }

    /// Open the popup at the given toolbar-local rectangle.
    pub fn open_at(&mut self, rect: Rect) {
        self.placement = rect;
        self.base.set_geometry(rect);
        if !self.open {
            self.open = true;
            self.opened.emit(());
        }
    }

    /// Close the popup.
    pub fn close(&mut self) {
        if self.open {
            self.open = false;
            self.base.update();
            self.closed.emit(());
        }
    }

    /// Whether a toolbar-local point lies inside the open popup.
    pub fn contains(&self, point: Point) -> bool {
        self.open && self.placement.contains(point)
    }
}

impl Default for OverflowPopup {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for OverflowPopup {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for OverflowPopup {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::new(self.placement.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::init_global_registry;

    #[test]
    fn test_open_close_signals() {
        init_global_registry();
        let mut popup = OverflowPopup::new();
        let log = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));

        let recv = log.clone();
        popup.opened.connect(move |()| recv.lock().push("open"));
        let recv = log.clone();
        popup.closed.connect(move |()| recv.lock().push("close"));

        popup.open_at(Rect::new(0.0, 30.0, 120.0, 60.0));
        assert!(popup.is_open());
        // Re-opening while open only updates placement.
        popup.open_at(Rect::new(0.0, 30.0, 140.0, 60.0));
        popup.close();
        popup.close();

        assert_eq!(*log.lock(), vec!["open", "close"]);
    }

    #[test]
    fn test_contains_only_while_open() {
        init_global_registry();
        let mut popup = OverflowPopup::new();
        let inside = Point::new(10.0, 40.0);

        assert!(!popup.contains(inside));
        popup.open_at(Rect::new(0.0, 30.0, 120.0, 60.0));
        assert!(popup.contains(inside));
        assert!(!popup.contains(Point::new(10.0, 10.0)));

        popup.close();
        assert!(!popup.contains(inside));
    }
}

//! Widget base implementation.
//!
//! [`WidgetBase`] carries the state every control needs: object identity,
//! geometry, visibility, enabled/hover flags and the repaint request flag.
//! Widget structs embed it as a field and delegate.

use trellis_core::{Object, ObjectBase, ObjectId, ObjectResult, Signal};

use crate::geometry::{Point, Rect, Size};
use crate::widget::geometry::{SizePolicy, SizePolicyPair};

/// The base implementation for all widgets.
pub struct WidgetBase {
    object_base: ObjectBase,

    /// Geometry (position relative to parent, and size).
    geometry: Rect,

    /// Size policy for layout.
    size_policy: SizePolicyPair,

    visible: bool,
    enabled: bool,
    hovered: bool,

    /// Set once the widget has received its first real geometry. Stands in
    /// for a framework "loaded" notification: deferred work that needs
    /// layout to have happened keys off this.
    loaded: bool,

    needs_repaint: bool,

    /// Signal emitted when the geometry changes.
    pub geometry_changed: Signal<Rect>,
    /// Signal emitted when visibility changes.
    pub visible_changed: Signal<bool>,
    /// Signal emitted when enabled state changes.
    pub enabled_changed: Signal<bool>,
}

impl WidgetBase {
    /// Create a new widget base.
    ///
    /// # Panics
    ///
    /// Panics if the global object registry is not initialized.
    pub fn new<T: Object + 'static>() -> Self {
        Self {
            object_base: ObjectBase::new::<T>(),
            geometry: Rect::ZERO,
            size_policy: SizePolicyPair::default(),
            visible: true,
            enabled: true,
            hovered: false,
            loaded: false,
            needs_repaint: true,
            geometry_changed: Signal::new(),
            visible_changed: Signal::new(),
            enabled_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Object System Delegation
    // =========================================================================

    /// The widget's unique object id.
    #[inline]
    pub fn object_id(&self) -> ObjectId {
        self.object_base.id()
    }

    /// The widget's name.
    pub fn name(&self) -> String {
        self.object_base.name()
    }

    /// Set the widget's name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.object_base.set_name(name);
    }

    /// The parent widget's object id.
    pub fn parent_id(&self) -> Option<ObjectId> {
        self.object_base.parent()
    }

    /// Re-parent the widget.
    pub fn set_parent(&self, parent: Option<ObjectId>) -> ObjectResult<()> {
        self.object_base.set_parent(parent)
    }

    /// Child widget ids.
    pub fn children_ids(&self) -> Vec<ObjectId> {
        self.object_base.children()
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// The widget's geometry (position and size).
    #[inline]
    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    /// Set the widget's geometry, emitting `geometry_changed` on change.
    ///
    /// The first non-empty geometry marks the widget loaded.
    pub fn set_geometry(&mut self, rect: Rect) {
        if !rect.size.is_empty() {
            self.loaded = true;
        }
        if self.geometry != rect {
            self.geometry = rect;
            self.needs_repaint = true;
            self.geometry_changed.emit(rect);
        }
    }

    /// The widget's position relative to its parent.
    #[inline]
    pub fn pos(&self) -> Point {
        self.geometry.origin
    }

    /// Set the widget's position relative to its parent.
    pub fn set_pos(&mut self, pos: Point) {
        if self.geometry.origin != pos {
            self.geometry.origin = pos;
            self.needs_repaint = true;
            self.geometry_changed.emit(self.geometry);
        }
    }

    /// The widget's size.
    #[inline]
    pub fn size(&self) -> Size {
        self.geometry.size
    }

    /// Set the widget's size.
    pub fn set_size(&mut self, size: Size) {
        self.set_geometry(Rect::from_origin_size(self.geometry.origin, size));
    }

    /// The widget's local coordinate rectangle: (0, 0) with its size.
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO, self.geometry.size)
    }

    /// Whether the widget has received its first real geometry.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    // =========================================================================
    // Size Policy
    // =========================================================================

    /// The widget's size policy.
    #[inline]
    pub fn size_policy(&self) -> SizePolicyPair {
        self.size_policy
    }

    /// Set the widget's size policy.
    pub fn set_size_policy(&mut self, policy: SizePolicyPair) {
        self.size_policy = policy;
    }

    /// Set only the horizontal policy.
    pub fn set_horizontal_policy(&mut self, policy: SizePolicy) {
        self.size_policy.horizontal = policy;
    }

    /// Set only the vertical policy.
    pub fn set_vertical_policy(&mut self, policy: SizePolicy) {
        self.size_policy.vertical = policy;
    }

    // =========================================================================
    // Visibility / Enabled / Hover
    // =========================================================================

    /// Whether the widget is visible.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set whether the widget is visible.
    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.needs_repaint = true;
            self.visible_changed.emit(visible);
        }
    }

    /// Whether the widget is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Set whether the widget is enabled.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.enabled = enabled;
            self.needs_repaint = true;
            self.enabled_changed.emit(enabled);
        }
    }

    /// Whether the mouse is currently over this widget.
    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Set the hover state (used by the event routing).
    pub fn set_hovered(&mut self, hovered: bool) {
        if self.hovered != hovered {
            self.hovered = hovered;
            self.needs_repaint = true;
        }
    }

    // =========================================================================
    // Repaint
    // =========================================================================

    /// Whether the widget needs to be repainted.
    #[inline]
    pub fn needs_repaint(&self) -> bool {
        self.needs_repaint
    }

    /// Request a repaint of the widget.
    pub fn update(&mut self) {
        self.needs_repaint = true;
    }

    /// Clear the repaint flag.
    pub fn clear_repaint_flag(&mut self) {
        self.needs_repaint = false;
    }

    // =========================================================================
    // Coordinate Mapping
    // =========================================================================

    /// Map a point from widget-local coordinates to parent coordinates.
    #[inline]
    pub fn map_to_parent(&self, point: Point) -> Point {
        point + self.geometry.origin
    }

    /// Map a point from parent coordinates to widget-local coordinates.
    #[inline]
    pub fn map_from_parent(&self, point: Point) -> Point {
        point - self.geometry.origin
    }

    /// Check if a point (in local coordinates) is inside the widget.
    #[inline]
    pub fn contains_point(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

impl Object for WidgetBase {
    fn object_id(&self) -> ObjectId {
        self.object_base.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::init_global_registry;

    struct Probe {
        base: WidgetBase,
    }

    impl Object for Probe {
        fn object_id(&self) -> ObjectId {
            self.base.object_id()
        }
    }

    fn setup() {
        init_global_registry();
    }

    #[test]
    fn test_geometry_and_signals() {
        setup();
        let mut base = WidgetBase::new::<Probe>();
        assert!(!base.is_loaded());

        let fired = std::sync::Arc::new(parking_lot::Mutex::new(0));
        let recv = fired.clone();
        base.geometry_changed.connect(move |_| *recv.lock() += 1);

        base.set_geometry(Rect::new(0.0, 0.0, 100.0, 30.0));
        assert!(base.is_loaded());
        assert_eq!(*fired.lock(), 1);

        // Same geometry: no notification.
        base.set_geometry(Rect::new(0.0, 0.0, 100.0, 30.0));
        assert_eq!(*fired.lock(), 1);
    }

    #[test]
    fn test_empty_geometry_does_not_load() {
        setup();
        let mut base = WidgetBase::new::<Probe>();
        base.set_geometry(Rect::new(10.0, 10.0, 0.0, 0.0));
        assert!(!base.is_loaded());
    }

    #[test]
    fn test_coordinate_mapping() {
        setup();
        let mut base = WidgetBase::new::<Probe>();
        base.set_geometry(Rect::new(40.0, 10.0, 100.0, 30.0));

        assert_eq!(base.map_from_parent(Point::new(50.0, 15.0)), Point::new(10.0, 5.0));
        assert_eq!(base.map_to_parent(Point::new(10.0, 5.0)), Point::new(50.0, 15.0));
        assert!(base.contains_point(Point::new(0.0, 0.0)));
        assert!(!base.contains_point(Point::new(100.0, 0.0)));
    }
}

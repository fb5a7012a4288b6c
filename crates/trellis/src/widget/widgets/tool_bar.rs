//! The toolbar container.
//!
//! `ToolBar` owns the pieces a toolbar is made of (the item list, the
//! main-strip panel, the overflow panel, the overflow popup and the drag
//! thumb) as plain fields, wired at construction. It contributes the
//! chrome around the panel (thumb grip, paddings, overflow button),
//! aggregates the panel's min/max lengths for the tray, runs the overflow
//! popup's open state machine, and routes pointer events to its parts.

use std::sync::Arc;

use trellis_core::logging::targets;
use trellis_core::{Object, ObjectId, Property, Signal};

use crate::geometry::{Orientation, Point, Rect, Size};
use crate::model::{OverflowMode, ToolItemList};
use crate::widget::base::WidgetBase;
use crate::widget::events::WidgetEvent;
use crate::widget::geometry::{SizeHint, SizePolicy, SizePolicyPair};
use crate::widget::items::ContainerFactory;
use crate::widget::traits::Widget;

use super::drag_thumb::{DragEvent, DragThumb};
use super::overflow_panel::ToolBarOverflowPanel;
use super::overflow_popup::OverflowPopup;
use super::tool_bar_panel::ToolBarPanel;

/// Metric configuration for toolbar chrome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolBarStyle {
    /// Padding around all content.
    pub padding: f32,
    /// Main-axis extent of the drag thumb grip.
    pub thumb_extent: f32,
    /// Main-axis extent reserved for the overflow button.
    pub overflow_button_extent: f32,
}

impl Default for ToolBarStyle {
    fn default() -> Self {
        Self {
            padding: 4.0,
            thumb_extent: 10.0,
            overflow_button_extent: 16.0,
        }
    }
}

impl ToolBarStyle {
    /// The main-axis extent the chrome adds around the panel.
    pub fn chrome_main_extent(&self) -> f32 {
        self.padding * 2.0 + self.thumb_extent + self.overflow_button_extent
    }

    /// The cross-axis extent the chrome adds around the panel.
    pub fn chrome_cross_extent(&self) -> f32 {
        self.padding * 2.0
    }
}

/// The overflow popup's open state.
///
/// Opening before the toolbar has been laid out parks the request in
/// `PendingOpen`; the first layout completes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowOpenState {
    /// The popup is closed.
    #[default]
    Closed,
    /// An open was requested before the toolbar was loaded; it completes
    /// at the first layout.
    PendingOpen,
    /// The popup is open.
    Open,
}

/// A toolbar: an item strip with overflow handling and a drag grip.
///
/// # Signals
///
/// - [`band_changed`](Self::band_changed) / [`band_index_changed`](Self::band_index_changed):
///   tray identity changes
/// - [`orientation_changed`](Self::orientation_changed): effective orientation changes
/// - [`overflow_open_changed`](Self::overflow_open_changed): popup opened or closed
/// - [`has_overflow_items_changed`](Self::has_overflow_items_changed): overflow affordance
/// - [`button_clicked`](Self::button_clicked): an activation container was clicked
pub struct ToolBar {
    base: WidgetBase,
    style: ToolBarStyle,

    items: Arc<ToolItemList>,
    panel: ToolBarPanel,
    overflow_panel: ToolBarOverflowPanel,
    popup: OverflowPopup,
    thumb: DragThumb,

    /// Stored orientation; the tray's orientation wins while hosted.
    orientation: Orientation,
    tray_orientation: Option<Orientation>,

    band: i32,
    band_index: i32,

    /// Main-axis length forced by the tray during drags. `None` is
    /// auto-size.
    explicit_length: Option<f32>,

    overflow_state: OverflowOpenState,
    has_overflow_items: Property<bool>,

    min_length: f32,
    max_length: f32,
    desired_size: Size,

    /// Chrome rectangles from the last arrange, toolbar-local.
    thumb_rect: Rect,
    panel_rect: Rect,
    overflow_button_rect: Rect,

    /// Signal emitted when the band number changes.
    pub band_changed: Signal<i32>,
    /// Signal emitted when the in-band position changes.
    pub band_index_changed: Signal<i32>,
    /// Signal emitted when the effective orientation changes.
    pub orientation_changed: Signal<Orientation>,
    /// Signal emitted when the overflow popup opens or closes.
    pub overflow_open_changed: Signal<bool>,
    /// Signal emitted when the overflow affordance appears or disappears.
    pub has_overflow_items_changed: Signal<bool>,
    /// Signal emitted when an activation container is clicked, with the
    /// container's id.
    pub button_clicked: Signal<ObjectId>,
}

impl ToolBar {
    /// Create an empty toolbar with its own item list.
    pub fn new() -> Self {
        let list = Arc::new(ToolItemList::new());
        Self::with_items(list)
    }

    /// Create a toolbar over an existing item list.
    pub fn with_items(items: Arc<ToolItemList>) -> Self {
        let mut base = WidgetBase::new::<Self>();
        base.set_size_policy(SizePolicyPair::new(SizePolicy::Preferred, SizePolicy::Fixed));

        let mut panel = ToolBarPanel::new();
        panel.attach_items(items.clone());

        let mut overflow_panel = ToolBarOverflowPanel::new();
        overflow_panel.attach_mirror(panel.mirror());

        Self {
            base,
            style: ToolBarStyle::default(),
            items,
            panel,
            overflow_panel,
            popup: OverflowPopup::new(),
            thumb: DragThumb::new(),
            orientation: Orientation::Horizontal,
            tray_orientation: None,
            band: 0,
            band_index: 0,
            explicit_length: None,
            overflow_state: OverflowOpenState::Closed,
            has_overflow_items: Property::new(false),
            min_length: 0.0,
            max_length: 0.0,
            desired_size: Size::ZERO,
            thumb_rect: Rect::ZERO,
            panel_rect: Rect::ZERO,
            overflow_button_rect: Rect::ZERO,
            band_changed: Signal::new(),
            band_index_changed: Signal::new(),
            orientation_changed: Signal::new(),
            overflow_open_changed: Signal::new(),
            has_overflow_items_changed: Signal::new(),
            button_clicked: Signal::new(),
        }
    }

    /// Create a toolbar whose panel realizes containers through `factory`.
    pub fn with_factory(items: Arc<ToolItemList>, factory: Arc<dyn ContainerFactory>) -> Self {
        let mut bar = Self::with_items(items.clone());
        let mut panel = ToolBarPanel::with_factory(factory);
        panel.attach_items(items);
        let mut overflow_panel = ToolBarOverflowPanel::new();
        overflow_panel.attach_mirror(panel.mirror());
        bar.panel = panel;
        bar.overflow_panel = overflow_panel;
        bar
    }

    // =========================================================================
    // Parts and content
    // =========================================================================

    /// The toolbar's item list.
    pub fn items(&self) -> Arc<ToolItemList> {
        self.items.clone()
    }

    /// The main-strip panel.
    pub fn panel(&self) -> &ToolBarPanel {
        &self.panel
    }

    /// The overflow panel.
    pub fn overflow_panel(&self) -> &ToolBarOverflowPanel {
        &self.overflow_panel
    }

    /// Mutable access to the overflow panel (e.g. to set the wrap width).
    pub fn overflow_panel_mut(&mut self) -> &mut ToolBarOverflowPanel {
        &mut self.overflow_panel
    }

    /// The drag thumb.
    pub fn thumb(&self) -> &DragThumb {
        &self.thumb
    }

    /// The chrome metrics.
    pub fn style(&self) -> &ToolBarStyle {
        &self.style
    }

    /// Replace the chrome metrics.
    pub fn set_style(&mut self, style: ToolBarStyle) {
        if self.style != style {
            self.style = style;
            self.invalidate_layout();
        }
    }

    /// Style builder.
    pub fn with_style(mut self, style: ToolBarStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the overflow policy of a generated container.
    ///
    /// Changing the policy resets the cached min/max lengths and forces a
    /// fresh partition on the next measure.
    pub fn set_overflow_mode(&mut self, id: ObjectId, mode: OverflowMode) {
        if self.panel.set_overflow_mode(id, mode) {
            self.invalidate_layout();
        }
    }

    /// Reset cached lengths and request a fresh measure.
    pub fn invalidate_layout(&mut self) {
        self.min_length = 0.0;
        self.max_length = 0.0;
        self.panel.invalidate();
        self.base.update();
    }

    /// Whether a measure is pending.
    pub fn needs_measure(&self) -> bool {
        self.panel.needs_measure()
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// The band number.
    pub fn band(&self) -> i32 {
        self.band
    }

    /// Set the band number.
    pub fn set_band(&mut self, band: i32) {
        if self.band != band {
            self.band = band;
            self.band_changed.emit(band);
        }
    }

    /// Band builder.
    pub fn with_band(mut self, band: i32) -> Self {
        self.band = band;
        self
    }

    /// The position within the band.
    pub fn band_index(&self) -> i32 {
        self.band_index
    }

    /// Set the position within the band.
    pub fn set_band_index(&mut self, index: i32) {
        if self.band_index != index {
            self.band_index = index;
            self.band_index_changed.emit(index);
        }
    }

    /// Band-index builder.
    pub fn with_band_index(mut self, index: i32) -> Self {
        self.band_index = index;
        self
    }

    // =========================================================================
    // Orientation
    // =========================================================================

    /// The effective orientation: the hosting tray's while hosted, the
    /// stored value otherwise.
    pub fn orientation(&self) -> Orientation {
        self.tray_orientation.unwrap_or(self.orientation)
    }

    /// Set the stored orientation. Has no visible effect while a tray
    /// coerces it.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        let before = self.orientation();
        self.orientation = orientation;
        let after = self.orientation();
        if before != after {
            self.apply_orientation(after);
        }
    }

    /// Orientation builder.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.set_orientation(orientation);
        self
    }

    /// Inject or clear the hosting tray's orientation override.
    pub(crate) fn set_tray_orientation(&mut self, orientation: Option<Orientation>) {
        let before = self.orientation();
        self.tray_orientation = orientation;
        let after = self.orientation();
        if before != after {
            self.apply_orientation(after);
        }
    }

    fn apply_orientation(&mut self, orientation: Orientation) {
        let policy = match orientation {
            Orientation::Horizontal => {
                SizePolicyPair::new(SizePolicy::Preferred, SizePolicy::Fixed)
            }
            Orientation::Vertical => SizePolicyPair::new(SizePolicy::Fixed, SizePolicy::Preferred),
        };
        self.base.set_size_policy(policy);
        self.orientation_changed.emit(orientation);
        self.invalidate_layout();
    }

    // =========================================================================
    // Lengths
    // =========================================================================

    /// Minimum main-axis length: the panel's minimum plus chrome.
    pub fn min_length(&self) -> f32 {
        self.min_length
    }

    /// Maximum main-axis length: the panel's maximum plus chrome.
    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    /// The main-axis length forced by the tray, if any.
    pub fn explicit_length(&self) -> Option<f32> {
        self.explicit_length
    }

    /// Force or release the main-axis length.
    pub fn set_explicit_length(&mut self, length: Option<f32>) {
        if let Some(len) = length {
            if !len.is_finite() || len < 0.0 {
                return;
            }
        }
        if self.explicit_length != length {
            self.explicit_length = length;
            self.invalidate_layout();
        }
    }

    /// The desired size from the last measure.
    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    // =========================================================================
    // Overflow popup state machine
    // =========================================================================

    /// The popup's open state.
    pub fn overflow_open_state(&self) -> OverflowOpenState {
        self.overflow_state
    }

    /// Whether the popup is open.
    pub fn is_overflow_open(&self) -> bool {
        self.overflow_state == OverflowOpenState::Open
    }

    /// Whether any item currently renders in the overflow surface. This
    /// is what shows the overflow affordance.
    pub fn has_overflow_items(&self) -> bool {
        self.has_overflow_items.get()
    }

    /// Open or close the overflow popup.
    ///
    /// Opening before the first layout parks the request; it completes
    /// when the load happens.
    pub fn set_overflow_open(&mut self, open: bool) {
        if open {
            match self.overflow_state {
                OverflowOpenState::Open => {}
                _ if !self.base.is_loaded() => {
                    self.overflow_state = OverflowOpenState::PendingOpen;
                }
                _ => self.open_overflow_now(),
            }
        } else {
            let was_open = self.overflow_state == OverflowOpenState::Open;
            self.overflow_state = OverflowOpenState::Closed;
            if was_open {
                self.popup.close();
                self.overflow_open_changed.emit(false);
            }
        }
    }

    /// Close the overflow popup.
    pub fn close_overflow(&mut self) {
        self.set_overflow_open(false);
    }

    fn open_overflow_now(&mut self) {
        self.overflow_state = OverflowOpenState::Open;
        self.place_popup();
        self.overflow_open_changed.emit(true);
    }

    /// Measure the overflow panel and place the popup next to the strip.
    fn place_popup(&mut self) {
        let orientation = self.orientation();
        let bar_size = self.base.size();
        let width_limit = orientation.main_extent(bar_size).max(1.0);

        let size = self.overflow_panel.measure(Size::new(width_limit, f32::MAX));

        let origin = match orientation {
            Orientation::Horizontal => Point::new(
                (self.overflow_button_rect.left() + self.overflow_button_rect.width()
                    - size.width)
                    .max(0.0),
                bar_size.height,
            ),
            Orientation::Vertical => Point::new(
                bar_size.width,
                (self.overflow_button_rect.top() + self.overflow_button_rect.height()
                    - size.height)
                    .max(0.0),
            ),
        };

        self.popup.open_at(Rect::from_origin_size(origin, size));
        self.overflow_panel
            .widget_base_mut()
            .set_pos(origin);
        self.overflow_panel.arrange(size);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Measure the toolbar.
    pub fn measure(&mut self, constraint: Size) -> Size {
        let orientation = self.orientation();
        self.panel.set_orientation(orientation);

        let chrome_main = self.style.chrome_main_extent();
        let chrome_cross = self.style.chrome_cross_extent();

        // The tray's explicit length (set during drags) constrains the
        // partition just as a narrower tray would.
        let main_constraint = self
            .explicit_length
            .unwrap_or_else(|| orientation.main_extent(constraint));

        let inner = orientation.pack(
            (main_constraint - chrome_main).max(0.0),
            (orientation.cross_extent(constraint) - chrome_cross).max(0.0),
        );
        let panel_desired = self.panel.measure(inner);

        // The tray negotiates with these: the panel's lengths plus the
        // chrome extent around the panel.
        self.min_length = self.panel.min_length() + chrome_main;
        self.max_length = self.panel.max_length() + chrome_main;

        let has_overflow = self.panel.has_overflow_items();
        if self.has_overflow_items.set(has_overflow) {
            self.has_overflow_items_changed.emit(has_overflow);
        }

        let desired_main = match self.explicit_length {
            Some(len) => len.max(self.min_length),
            None => orientation.main_extent(panel_desired) + chrome_main,
        };
        let desired_cross = orientation.cross_extent(panel_desired) + chrome_cross;
        self.desired_size = orientation.pack(desired_main, desired_cross);

        tracing::debug!(
            target: targets::PANEL,
            min = self.min_length,
            max = self.max_length,
            ?orientation,
            "toolbar measured"
        );

        self.desired_size
    }

    /// Arrange the toolbar into `rect` (parent coordinates).
    pub fn arrange(&mut self, rect: Rect) {
        self.base.set_geometry(rect);

        let orientation = self.orientation();
        let size = rect.size;
        let padding = self.style.padding;
        let cross_inner = (orientation.cross_extent(size) - self.style.chrome_cross_extent()).max(0.0);
        let main = orientation.main_extent(size);

        self.thumb_rect = Rect::from_origin_size(
            orientation.pack_point(padding, padding),
            orientation.pack(self.style.thumb_extent, cross_inner),
        );
        self.thumb.widget_base_mut().set_geometry(self.thumb_rect);

        let panel_main = (main - self.style.chrome_main_extent()).max(0.0);
        self.panel_rect = Rect::from_origin_size(
            orientation.pack_point(padding + self.style.thumb_extent, padding),
            orientation.pack(panel_main, cross_inner),
        );
        self.panel
            .widget_base_mut()
            .set_pos(self.panel_rect.origin);
        self.panel.arrange(self.panel_rect.size);

        self.overflow_button_rect = Rect::from_origin_size(
            orientation.pack_point(main - padding - self.style.overflow_button_extent, padding),
            orientation.pack(self.style.overflow_button_extent, cross_inner),
        );

        // The load transition: a parked open request completes now.
        if self.overflow_state == OverflowOpenState::PendingOpen && self.base.is_loaded() {
            self.open_overflow_now();
        } else if self.overflow_state == OverflowOpenState::Open {
            self.place_popup();
        }
    }

    /// Whether a parent-space point hits the toolbar or its open popup.
    pub fn hit_test_in_parent(&self, point: Point) -> bool {
        let geometry = self.base.geometry();
        geometry.contains(point) || self.popup.contains(point - geometry.origin)
    }

    // =========================================================================
    // Pointer routing
    // =========================================================================

    /// The main-strip container under a toolbar-local point.
    fn main_container_at(&self, point: Point) -> Option<ObjectId> {
        let panel_local = point - self.panel_rect.origin;
        let mirror = self.panel.mirror();
        let mirror = mirror.lock();
        mirror
            .entries()
            .iter()
            .find(|e| {
                e.placement() == crate::widget::items::Placement::Main
                    && e.widget().widget_base().geometry().contains(panel_local)
            })
            .map(|e| e.id())
    }

    fn container_is_selection_host(&self, id: ObjectId) -> bool {
        let mirror = self.panel.mirror();
        let mirror = mirror.lock();
        mirror
            .index_of(id)
            .is_some_and(|i| mirror.entries()[i].widget().is_selection_host())
    }

    fn container_is_activation_host(&self, id: ObjectId) -> bool {
        let mirror = self.panel.mirror();
        let mirror = mirror.lock();
        mirror
            .index_of(id)
            .is_some_and(|i| mirror.entries()[i].widget().is_activation_host())
    }

    /// Route a toolbar-local pointer event to the toolbar's parts.
    ///
    /// Drag lifecycle events from the thumb are returned to the caller;
    /// the hosting tray consumes them; a standalone toolbar drops them.
    pub fn route_event(&mut self, event: &mut WidgetEvent) -> Option<DragEvent> {
        match event {
            WidgetEvent::MousePress(e) => {
                let pos = e.local_pos;

                if self.popup.contains(pos) {
                    // Presses inside the popup must not bubble into outer
                    // containers' gesture handling.
                    e.base.accept();
                    return None;
                }

                if self.thumb_rect.contains(pos) {
                    let mut local = *e;
                    local.local_pos = pos - self.thumb_rect.origin;
                    let result = self.thumb.handle_press(&mut local);
                    if local.base.is_accepted() {
                        e.base.accept();
                    }
                    return result;
                }

                if self.overflow_button_rect.contains(pos) && self.has_overflow_items() {
                    let open = !self.is_overflow_open();
                    self.set_overflow_open(open);
                    e.base.accept();
                }
                None
            }

            WidgetEvent::MouseRelease(e) => {
                if self.thumb.is_dragging() {
                    let mut local = *e;
                    local.local_pos = e.local_pos - self.thumb_rect.origin;
                    let result = self.thumb.handle_release(&mut local);
                    if local.base.is_accepted() {
                        e.base.accept();
                    }
                    return result;
                }

                let pos = e.local_pos;
                if self.popup.contains(pos) {
                    let panel_local = pos - self.popup.placement_rect().origin;
                    let target = self.overflow_panel.child_at(panel_local);

                    if let Some(id) = target {
                        if self.container_is_activation_host(id) {
                            self.button_clicked.emit(id);
                        }
                        if self.container_is_selection_host(id) {
                            // Selection-style controls keep their own
                            // release handling; don't hijack it.
                            return None;
                        }
                    }
                    self.close_overflow();
                    e.base.accept();
                    return None;
                }

                if let Some(id) = self.main_container_at(pos) {
                    if self.container_is_activation_host(id) {
                        self.button_clicked.emit(id);
                        // A click on a direct child closes an open
                        // overflow popup.
                        if self.is_overflow_open() {
                            self.close_overflow();
                        }
                        e.base.accept();
                    }
                }
                None
            }

            WidgetEvent::MouseMove(e) => {
                if self.thumb.is_dragging() {
                    let mut local = *e;
                    local.local_pos = e.local_pos - self.thumb_rect.origin;
                    return self.thumb.handle_move(&local);
                }
                None
            }

            WidgetEvent::CaptureLost(e) => self.thumb.handle_capture_lost(e),

            _ => None,
        }
    }
}

impl Default for ToolBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for ToolBar {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for ToolBar {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::new(self.desired_size)
    }

    fn event(&mut self, event: &mut WidgetEvent) -> bool {
        let drag = self.route_event(event);
        drag.is_some() || event.base().is_accepted()
    }
}

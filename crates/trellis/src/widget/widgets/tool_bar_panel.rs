//! The toolbar's main-strip panel.
//!
//! `ToolBarPanel` is the items host inside a [`ToolBar`](super::ToolBar).
//! It owns the generated-container mirror for the toolbar's item list and
//! runs the two-pass overflow partition that decides, per container,
//! whether it renders in the main strip or the overflow surface.
//!
//! The partition works in two passes over the generated list:
//!
//! 1. Items whose policy is `Always` or `Never` are placed unconditionally
//!    (overflow and main strip respectively). After this pass the
//!    accumulated main-axis extent is the panel's *minimum length*, the
//!    size it reaches when every flexible item is sent to overflow.
//! 2. `AsNeeded` items are tested in list order against the available
//!    extent. A one-way latch trips on the first item that does not fit;
//!    every later flexible item overflows with it, regardless of its own
//!    size. An item whose extent exactly matches the remaining space still
//!    fits.
//!
//! The *maximum length* is the final main-strip extent plus everything
//! parked in overflow: the size the bar would need to show all of it.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;
use trellis_core::logging::targets;
use trellis_core::{ConnectionId, Object, ObjectId};

use crate::geometry::{Orientation, Rect, Size, definitely_greater};
use crate::model::{OverflowMode, ToolItemList};
use crate::widget::base::WidgetBase;
use crate::widget::geometry::SizeHint;
use crate::widget::items::{ContainerFactory, ContainerMirror, HostFactory, Placement};
use crate::widget::traits::Widget;

/// Connection ids held against an attached item list, in a fixed order so
/// they can be disconnected again.
struct SourceConnections {
    inserted: ConnectionId,
    removed: ConnectionId,
    replaced: ConnectionId,
    moved: ConnectionId,
    reset: ConnectionId,
}

/// The main-strip items host of a toolbar.
pub struct ToolBarPanel {
    base: WidgetBase,
    orientation: Orientation,

    mirror: Arc<Mutex<ContainerMirror>>,
    source: Option<Arc<ToolItemList>>,
    connections: Option<SourceConnections>,

    /// Set by the list slots; cleared by measure.
    dirty: Arc<AtomicBool>,

    min_length: f32,
    max_length: f32,
    has_overflow_items: bool,
    desired_size: Size,
}

impl ToolBarPanel {
    /// Create a panel with the default container factory.
    pub fn new() -> Self {
        Self::with_factory(Arc::new(HostFactory))
    }

    /// Create a panel realizing containers through `factory`.
    pub fn with_factory(factory: Arc<dyn ContainerFactory>) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            orientation: Orientation::Horizontal,
            mirror: Arc::new(Mutex::new(ContainerMirror::new(factory))),
            source: None,
            connections: None,
            dirty: Arc::new(AtomicBool::new(true)),
            min_length: 0.0,
            max_length: 0.0,
            has_overflow_items: false,
            desired_size: Size::ZERO,
        }
    }

    /// The shared generated-container mirror.
    ///
    /// The overflow panel of the owning toolbar holds the same handle.
    pub fn mirror(&self) -> Arc<Mutex<ContainerMirror>> {
        self.mirror.clone()
    }

    /// The panel's orientation. Kept in sync with the owning toolbar.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Set the orientation.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.invalidate();
        }
    }

    /// Minimum main-axis length: the extent with every `AsNeeded` item in
    /// overflow.
    pub fn min_length(&self) -> f32 {
        self.min_length
    }

    /// Maximum main-axis length: the extent needed to show every item
    /// allowed in the main strip.
    pub fn max_length(&self) -> f32 {
        self.max_length
    }

    /// Whether any container is currently flagged overflow.
    pub fn has_overflow_items(&self) -> bool {
        self.has_overflow_items
    }

    /// The desired size computed by the last measure.
    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    /// Mark the partition stale. The next measure recomputes everything.
    pub fn invalidate(&mut self) {
        self.dirty.store(true, Ordering::Release);
        self.min_length = 0.0;
        self.max_length = 0.0;
        self.base.update();
    }

    /// Whether a measure is pending.
    pub fn needs_measure(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    // =========================================================================
    // Item source attachment
    // =========================================================================

    /// Attach an item list, replacing any previous source.
    ///
    /// The mirror is rebuilt from the list's current contents and kept
    /// synchronized through the list's change signals from here on.
    pub fn attach_items(&mut self, source: Arc<ToolItemList>) {
        self.detach_items();

        let signals = source.signals();
        let weak = Arc::downgrade(&source);

        let w = weak.clone();
        let m = self.mirror.clone();
        let d = self.dirty.clone();
        let inserted = signals.items_inserted.connect(move |&(first, last)| {
            if let Some(src) = w.upgrade() {
                m.lock().insert_from(&src, first, last);
                d.store(true, Ordering::Release);
            }
        });

        let m = self.mirror.clone();
        let d = self.dirty.clone();
        let removed = signals.items_removed.connect(move |&(first, last)| {
            m.lock().remove_range(first, last - first + 1);
            d.store(true, Ordering::Release);
        });

        let w = weak.clone();
        let m = self.mirror.clone();
        let d = self.dirty.clone();
        let replaced = signals.items_replaced.connect(move |&(first, last)| {
            if let Some(src) = w.upgrade() {
                m.lock().replace_from(&src, first, last);
                d.store(true, Ordering::Release);
            }
        });

        let w = weak.clone();
        let m = self.mirror.clone();
        let d = self.dirty.clone();
        let moved = signals.items_moved.connect(move |&(first, last, dest)| {
            if let Some(src) = w.upgrade() {
                m.lock().move_from(&src, first, last, dest);
                d.store(true, Ordering::Release);
            }
        });

        let w = weak;
        let m = self.mirror.clone();
        let d = self.dirty.clone();
        let reset = signals.list_reset.connect(move |()| {
            if let Some(src) = w.upgrade() {
                m.lock().reset_from(&src);
                d.store(true, Ordering::Release);
            }
        });

        self.connections = Some(SourceConnections {
            inserted,
            removed,
            replaced,
            moved,
            reset,
        });

        // Initial build. Freshly generated containers start unflagged and
        // detached; the first measure partitions them.
        self.mirror.lock().reset_from(&source);
        self.source = Some(source);
        self.invalidate();
    }

    /// Detach the current item list, tearing down all generated
    /// containers. Without an attached source every list edit is a no-op
    /// here; there is nothing to mirror.
    pub fn detach_items(&mut self) {
        if let (Some(source), Some(conns)) = (self.source.take(), self.connections.take()) {
            let signals = source.signals();
            signals.items_inserted.disconnect(conns.inserted);
            signals.items_removed.disconnect(conns.removed);
            signals.items_replaced.disconnect(conns.replaced);
            signals.items_moved.disconnect(conns.moved);
            signals.list_reset.disconnect(conns.reset);
        }
        self.mirror.lock().clear_all();
        self.invalidate();
    }

    /// The attached item list, if any.
    pub fn item_source(&self) -> Option<&Arc<ToolItemList>> {
        self.source.as_ref()
    }

    // =========================================================================
    // Measurement
    // =========================================================================

    /// One partition pass over the generated list.
    ///
    /// `as_needed_pass` selects which policy group is examined: the first
    /// pass handles `Always`/`Never` items, the second the `AsNeeded`
    /// items. Returns whether any examined item landed in overflow and
    /// accumulates the main-axis extent parked there into
    /// `overflow_extent`.
    fn measure_generated_items(
        mirror: &mut ContainerMirror,
        orientation: Orientation,
        as_needed_pass: bool,
        max_extent: f32,
        panel_desired: &mut Size,
        overflow_extent: &mut f32,
    ) -> bool {
        let mut send_to_overflow = false;
        let mut has_overflow_items = false;
        *overflow_extent = 0.0;

        for entry in mirror.entries_mut() {
            let as_needed = entry.overflow_mode == OverflowMode::AsNeeded;
            if as_needed != as_needed_pass {
                continue;
            }

            let child_size = entry.widget.size_hint().preferred;
            let child_main = orientation.main_extent(child_size);
            let child_cross = orientation.cross_extent(child_size);

            if entry.overflow_mode != OverflowMode::Always && !send_to_overflow {
                // Measure for main-bar placement. The flag is cleared so a
                // size query reflects the main-bar rendering; it is set
                // again below if the item ends up overflowing.
                entry.overflow_flag = false;

                if as_needed {
                    let new_extent = child_main + orientation.main_extent(*panel_desired);
                    if definitely_greater(new_extent, max_extent) {
                        // Doesn't fit: this item and every later AsNeeded
                        // item go to overflow.
                        send_to_overflow = true;
                    }
                }

                if !send_to_overflow {
                    *panel_desired = orientation.pack(
                        orientation.main_extent(*panel_desired) + child_main,
                        orientation.cross_extent(*panel_desired).max(child_cross),
                    );
                    entry.placement = Placement::Main;
                }
            }

            if entry.overflow_mode == OverflowMode::Always || send_to_overflow {
                has_overflow_items = true;

                // Track the cross extent so a bar with everything in
                // overflow still has thickness, and the extent saved by
                // overflowing so MinLength/MaxLength stay meaningful.
                *overflow_extent += child_main;
                *panel_desired = orientation.pack(
                    orientation.main_extent(*panel_desired),
                    orientation.cross_extent(*panel_desired).max(child_cross),
                );

                entry.overflow_flag = true;
                entry.placement = Placement::Overflow;
            }
        }

        has_overflow_items
    }

    /// Run the two-pass partition against `constraint` and return the
    /// panel's desired size.
    pub fn measure(&mut self, constraint: Size) -> Size {
        let orientation = self.orientation;
        let max_extent = orientation.main_extent(constraint);
        let mut desired = Size::ZERO;
        let mut overflow_extent = 0.0;
        let mut total_overflow_extent = 0.0;

        let mirror = self.mirror.clone();
        let mut mirror = mirror.lock();

        // First pass: Always and Never items, whose placement is known up
        // front.
        let has_always_overflow = Self::measure_generated_items(
            &mut mirror,
            orientation,
            false,
            max_extent,
            &mut desired,
            &mut overflow_extent,
        );
        total_overflow_extent += overflow_extent;

        // The desired size so far is the minimum size of the bar.
        self.min_length = orientation.main_extent(desired);

        // Second pass: AsNeeded items, partitioned against the remaining
        // space.
        let has_as_needed_overflow = Self::measure_generated_items(
            &mut mirror,
            orientation,
            true,
            max_extent,
            &mut desired,
            &mut overflow_extent,
        );
        total_overflow_extent += overflow_extent;

        self.max_length = orientation.main_extent(desired) + total_overflow_extent;
        self.has_overflow_items = has_always_overflow || has_as_needed_overflow;
        self.desired_size = desired;
        self.dirty.store(false, Ordering::Release);

        tracing::debug!(
            target: targets::PANEL,
            min = self.min_length,
            max = self.max_length,
            overflow = self.has_overflow_items,
            "partitioned"
        );

        desired
    }

    /// Stack the main-strip containers sequentially along the orientation
    /// axis, each at its desired main extent and the arranged cross
    /// extent.
    pub fn arrange(&mut self, final_size: Size) -> Size {
        let orientation = self.orientation;
        let mirror = self.mirror.clone();
        let mut mirror = mirror.lock();

        let mut offset = 0.0;
        for entry in mirror.entries_mut() {
            if entry.placement != Placement::Main {
                continue;
            }
            let child_size = entry.widget.size_hint().preferred;
            let main = orientation.main_extent(child_size);
            let cross = orientation
                .cross_extent(final_size)
                .max(orientation.cross_extent(child_size));

            let origin = orientation.pack_point(offset, 0.0);
            let size = orientation.pack(main, cross);
            entry
                .widget
                .widget_base_mut()
                .set_geometry(Rect::from_origin_size(origin, size));
            offset += main;
        }

        self.base.set_size(final_size);
        final_size
    }

    /// The main-strip container ids, in source order.
    pub fn main_children(&self) -> Vec<ObjectId> {
        self.mirror
            .lock()
            .entries()
            .iter()
            .filter(|e| e.placement() == Placement::Main)
            .map(|e| e.id())
            .collect()
    }

    /// Set the overflow policy for a container. Returns `true` on change;
    /// the caller is expected to invalidate layout.
    pub fn set_overflow_mode(&mut self, id: ObjectId, mode: OverflowMode) -> bool {
        let changed = self.mirror.lock().set_overflow_mode(id, mode);
        if changed {
            self.invalidate();
        }
        changed
    }

    /// Whether the given container is currently flagged overflow.
    pub fn is_overflow_item(&self, id: ObjectId) -> bool {
        self.mirror.lock().is_overflow_item(id)
    }
}

impl Default for ToolBarPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ToolBarPanel {
    fn drop(&mut self) {
        self.detach_items();
    }
}

impl Object for ToolBarPanel {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for ToolBarPanel {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::new(self.desired_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::model::{ButtonItem, LabelItem, ToolItem};
    use trellis_core::init_global_registry;

    fn setup() -> (Arc<ToolItemList>, ToolBarPanel) {
        init_global_registry();
        let list = Arc::new(ToolItemList::new());
        let mut panel = ToolBarPanel::new();
        panel.attach_items(list.clone());
        (list, panel)
    }

    fn item(width: f32) -> Arc<dyn ToolItem> {
        Arc::new(LabelItem::new("i", Size::new(width, 24.0)))
    }

    fn item_with_mode(width: f32, mode: OverflowMode) -> Arc<dyn ToolItem> {
        Arc::new(ButtonItem::new("i", Size::new(width, 24.0)).with_overflow_mode(mode))
    }

    fn flags(panel: &ToolBarPanel) -> Vec<bool> {
        panel
            .mirror()
            .lock()
            .entries()
            .iter()
            .map(|e| e.is_overflow_item())
            .collect()
    }

    #[test]
    fn test_everything_fits() {
        let (list, mut panel) = setup();
        for _ in 0..3 {
            list.push(item(30.0));
        }

        let desired = panel.measure(Size::new(200.0, 40.0));
        assert_eq!(desired, Size::new(90.0, 24.0));
        assert!(!panel.has_overflow_items());
        assert_eq!(panel.min_length(), 0.0);
        assert_eq!(panel.max_length(), 90.0);
        assert_eq!(flags(&panel), vec![false, false, false]);
    }

    #[test]
    fn test_prefix_overflow_partition() {
        // Four 50-wide AsNeeded items at 120 available: the first two stay
        // (sum 100), the rest overflow.
        let (list, mut panel) = setup();
        for _ in 0..4 {
            list.push(item(50.0));
        }

        let desired = panel.measure(Size::new(120.0, 40.0));
        assert_eq!(desired.width, 100.0);
        assert!(panel.has_overflow_items());
        assert_eq!(flags(&panel), vec![false, false, true, true]);
        assert_eq!(panel.min_length(), 0.0);
        assert_eq!(panel.max_length(), 200.0);
    }

    #[test]
    fn test_overflow_is_monotonic_once_tripped() {
        // A small item after the latch trips overflows even though it
        // would fit on its own.
        let (list, mut panel) = setup();
        list.push(item(80.0));
        list.push(item(80.0)); // trips the latch at 100 available
        list.push(item(5.0));

        panel.measure(Size::new(100.0, 40.0));
        assert_eq!(flags(&panel), vec![false, true, true]);
    }

    #[test]
    fn test_exact_fit_stays_in_main_strip() {
        let (list, mut panel) = setup();
        list.push(item(60.0));
        list.push(item(60.0));

        panel.measure(Size::new(120.0, 40.0));
        assert_eq!(flags(&panel), vec![false, false]);
        assert!(!panel.has_overflow_items());
    }

    #[test]
    fn test_never_ignores_available_space() {
        let (list, mut panel) = setup();
        list.push(item_with_mode(80.0, OverflowMode::Never));
        list.push(item_with_mode(80.0, OverflowMode::Never));

        let desired = panel.measure(Size::new(50.0, 40.0));
        assert_eq!(flags(&panel), vec![false, false]);
        assert_eq!(desired.width, 160.0);
        assert_eq!(panel.min_length(), 160.0);
    }

    #[test]
    fn test_always_overflows_with_space_to_spare() {
        let (list, mut panel) = setup();
        list.push(item_with_mode(40.0, OverflowMode::Always));
        list.push(item(30.0));

        let desired = panel.measure(Size::new(500.0, 40.0));
        assert_eq!(flags(&panel), vec![true, false]);
        assert!(panel.has_overflow_items());
        // The strip keeps its thickness from the overflowed item.
        assert_eq!(desired.height, 24.0);
        assert_eq!(desired.width, 30.0);
        // MaxLength counts the overflowed extent.
        assert_eq!(panel.max_length(), 70.0);
    }

    #[test]
    fn test_min_length_excludes_as_needed_items() {
        let (list, mut panel) = setup();
        list.push(item_with_mode(25.0, OverflowMode::Never));
        list.push(item(50.0));
        list.push(item(50.0));

        panel.measure(Size::new(300.0, 40.0));
        assert_eq!(panel.min_length(), 25.0);
        assert_eq!(panel.max_length(), 125.0);
    }

    #[test]
    fn test_desired_between_min_and_max_for_any_constraint() {
        use crate::geometry::LAYOUT_EPSILON;

        let (list, mut panel) = setup();
        list.push(item_with_mode(20.0, OverflowMode::Never));
        list.push(item(50.0));
        list.push(item(50.0));

        for constraint in [20.0, 45.0, 70.0, 95.0, 120.0] {
            panel.invalidate();
            let desired = panel.measure(Size::new(constraint, 40.0));
            assert!(desired.width + LAYOUT_EPSILON >= panel.min_length());
            assert!(desired.width <= panel.max_length() + LAYOUT_EPSILON);
        }
    }

    #[test]
    fn test_mode_change_repartitions() {
        let (list, mut panel) = setup();
        list.push(item(40.0));
        panel.measure(Size::new(200.0, 40.0));
        assert_eq!(flags(&panel), vec![false]);

        let id = panel.mirror().lock().id_at(0).unwrap();
        assert!(panel.set_overflow_mode(id, OverflowMode::Always));
        assert!(panel.needs_measure());

        panel.measure(Size::new(200.0, 40.0));
        assert_eq!(flags(&panel), vec![true]);
    }

    #[test]
    fn test_edits_keep_mirror_synchronized() {
        let (list, mut panel) = setup();
        list.push(item(10.0));
        list.push(item(20.0));
        list.insert(1, item(15.0));
        assert_eq!(panel.mirror().lock().len(), 3);

        list.remove(0);
        assert_eq!(panel.mirror().lock().len(), 2);

        list.clear();
        assert_eq!(panel.mirror().lock().len(), 0);
    }

    #[test]
    fn test_detached_panel_ignores_edits() {
        let (list, mut panel) = setup();
        list.push(item(10.0));
        assert_eq!(panel.mirror().lock().len(), 1);

        panel.detach_items();
        list.push(item(10.0));
        list.remove(0);
        assert_eq!(panel.mirror().lock().len(), 0);
    }

    #[test]
    fn test_arrange_stacks_sequentially() {
        let (list, mut panel) = setup();
        list.push(item(30.0));
        list.push(item(50.0));

        panel.measure(Size::new(200.0, 40.0));
        panel.arrange(Size::new(200.0, 28.0));

        let mirror = panel.mirror();
        let mirror = mirror.lock();
        let rects: Vec<Rect> = mirror
            .entries()
            .iter()
            .map(|e| e.widget().widget_base().geometry())
            .collect();
        assert_eq!(rects[0], Rect::new(0.0, 0.0, 30.0, 28.0));
        assert_eq!(rects[1], Rect::new(30.0, 0.0, 50.0, 28.0));
    }

    #[test]
    fn test_vertical_orientation_mirrors_axes() {
        let (list, mut panel) = setup();
        panel.set_orientation(Orientation::Vertical);
        for _ in 0..4 {
            list.push(Arc::new(LabelItem::new("i", Size::new(24.0, 50.0))));
        }

        let desired = panel.measure(Size::new(40.0, 120.0));
        assert_eq!(desired.height, 100.0);
        assert_eq!(flags(&panel), vec![false, false, true, true]);
    }

    #[test]
    fn test_main_children_in_source_order() {
        let (list, mut panel) = setup();
        list.push(item_with_mode(10.0, OverflowMode::Always));
        list.push(item(20.0));
        list.push(item(30.0));

        panel.measure(Size::new(200.0, 40.0));
        let mirror = panel.mirror();
        let ids: Vec<_> = {
            let m = mirror.lock();
            vec![m.id_at(1).unwrap(), m.id_at(2).unwrap()]
        };
        assert_eq!(panel.main_children(), ids);
    }
}

//! The toolbar tray: band packing and drag rearrangement.
//!
//! `ToolBarTray` groups its toolbars into *bands*: rows (or columns, when
//! vertical) keyed by each toolbar's band number and ordered within the
//! band by band index. The band structure is rebuilt, not patched: any
//! drift between the cached structure and the toolbars' identity
//! properties marks it dirty, and regeneration renormalizes both numbers
//! into dense 0-based sequences.
//!
//! Dragging a toolbar's thumb resizes neighbours within the band (down to
//! their minimum, up to their maximum length), swaps with a neighbour once
//! the pointer crosses it, or carries the toolbar into the band under the
//! pointer, creating a new band above or below the existing ones when the
//! pointer leaves them.

use trellis_core::logging::targets;
use trellis_core::{Object, ObjectId, Signal};

use crate::geometry::{
    Orientation, Point, Rect, Size, definitely_greater, definitely_less, greater_or_close,
    less_or_close,
};
use crate::widget::base::WidgetBase;
use crate::widget::events::WidgetEvent;
use crate::widget::geometry::SizeHint;
use crate::widget::traits::Widget;

use super::drag_thumb::DragEvent;
use super::tool_bar::ToolBar;

/// One band: member toolbars (as indices into the tray's collection, in
/// band-index order) and the thickness from the last measure.
struct BandInfo {
    members: Vec<usize>,
    thickness: f32,
}

/// A container arranging toolbars into draggable bands.
///
/// # Signals
///
/// - [`orientation_changed`](Self::orientation_changed)
/// - [`locked_changed`](Self::locked_changed)
pub struct ToolBarTray {
    base: WidgetBase,
    tool_bars: Vec<ToolBar>,

    bands: Vec<BandInfo>,
    bands_dirty: bool,

    orientation: Orientation,
    locked: bool,

    desired_size: Size,

    /// Index of the toolbar with an active thumb drag, while captured.
    active_drag: Option<usize>,

    /// Signal emitted when the tray orientation changes.
    pub orientation_changed: Signal<Orientation>,
    /// Signal emitted when the locked state changes.
    pub locked_changed: Signal<bool>,
}

impl ToolBarTray {
    /// Create an empty horizontal tray.
    pub fn new() -> Self {
        Self::with_orientation(Orientation::Horizontal)
    }

    /// Create an empty tray with the given orientation.
    pub fn with_orientation(orientation: Orientation) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            tool_bars: Vec::new(),
            bands: Vec::new(),
            bands_dirty: true,
            orientation,
            locked: false,
            desired_size: Size::ZERO,
            active_drag: None,
            orientation_changed: Signal::new(),
            locked_changed: Signal::new(),
        }
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// The tray orientation.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Set the tray orientation. Every hosted toolbar's orientation is
    /// coerced to follow.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            for tool_bar in &mut self.tool_bars {
                tool_bar.set_tray_orientation(Some(orientation));
            }
            self.orientation_changed.emit(orientation);
            self.base.update();
        }
    }

    /// Whether drag rearrangement is disabled.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Lock or unlock drag rearrangement.
    pub fn set_locked(&mut self, locked: bool) {
        if self.locked != locked {
            self.locked = locked;
            self.locked_changed.emit(locked);
        }
    }

    /// The desired size from the last measure.
    pub fn desired_size(&self) -> Size {
        self.desired_size
    }

    // =========================================================================
    // Toolbar collection
    // =========================================================================

    /// Number of hosted toolbars.
    pub fn len(&self) -> usize {
        self.tool_bars.len()
    }

    /// Whether the tray hosts no toolbars.
    pub fn is_empty(&self) -> bool {
        self.tool_bars.is_empty()
    }

    /// The hosted toolbars.
    pub fn tool_bars(&self) -> &[ToolBar] {
        &self.tool_bars
    }

    /// A hosted toolbar by index.
    pub fn tool_bar(&self, index: usize) -> Option<&ToolBar> {
        self.tool_bars.get(index)
    }

    /// Mutable access to a hosted toolbar.
    pub fn tool_bar_mut(&mut self, index: usize) -> Option<&mut ToolBar> {
        self.tool_bars.get_mut(index)
    }

    /// Append a toolbar.
    pub fn push_tool_bar(&mut self, tool_bar: ToolBar) {
        self.insert_tool_bar(self.tool_bars.len(), tool_bar);
    }

    /// Insert a toolbar at `index`.
    pub fn insert_tool_bar(&mut self, index: usize, mut tool_bar: ToolBar) {
        let _ = tool_bar
            .widget_base()
            .set_parent(Some(self.base.object_id()));
        tool_bar.set_tray_orientation(Some(self.orientation));
        self.tool_bars.insert(index, tool_bar);
        self.bands_dirty = true;
        self.base.update();
    }

    /// Remove and return the toolbar at `index`.
    ///
    /// Callers removing the last toolbar of a band are not special-cased;
    /// the next band generation collapses the empty band.
    pub fn remove_tool_bar(&mut self, index: usize) -> ToolBar {
        let mut tool_bar = self.tool_bars.remove(index);
        let _ = tool_bar.widget_base().set_parent(None);
        tool_bar.set_tray_orientation(None);
        if self.active_drag == Some(index) {
            self.active_drag = None;
        }
        self.bands_dirty = true;
        self.base.update();
        tool_bar
    }

    /// Remove every toolbar.
    pub fn clear_tool_bars(&mut self) {
        while !self.tool_bars.is_empty() {
            self.remove_tool_bar(self.tool_bars.len() - 1);
        }
    }

    // =========================================================================
    // Band generation
    // =========================================================================

    /// Whether the cached band structure disagrees with the toolbars'
    /// identity properties.
    pub fn is_bands_dirty(&self) -> bool {
        if self.bands_dirty {
            return true;
        }

        let mut total = 0;
        for (band_index, band) in self.bands.iter().enumerate() {
            for (pos, &ti) in band.members.iter().enumerate() {
                let Some(tool_bar) = self.tool_bars.get(ti) else {
                    return true;
                };
                if tool_bar.band() != band_index as i32 || tool_bar.band_index() != pos as i32 {
                    return true;
                }
            }
            total += band.members.len();
        }
        total != self.tool_bars.len()
    }

    /// Rebuild the band structure if it is dirty.
    ///
    /// Toolbars sharing a band number are grouped into one band, ordered
    /// by band index; afterwards every toolbar's band and band index are
    /// renormalized to their dense positions. The renormalization is an
    /// observable mutation (it fires the toolbars' change signals), and
    /// running it again immediately is a no-op.
    pub fn generate_bands(&mut self) {
        if !self.is_bands_dirty() {
            return;
        }

        self.bands.clear();
        for i in 0..self.tool_bars.len() {
            self.insert_band(i);
        }

        for band_index in 0..self.bands.len() {
            let members = self.bands[band_index].members.clone();
            for (pos, &ti) in members.iter().enumerate() {
                let tool_bar = &mut self.tool_bars[ti];
                tool_bar.set_band(band_index as i32);
                tool_bar.set_band_index(pos as i32);
            }
        }

        self.bands_dirty = false;
        tracing::debug!(target: targets::TRAY, bands = self.bands.len(), "bands generated");
    }

    /// Create the band containing `tool_bar_index`'s band number if it
    /// doesn't exist yet, keeping bands ordered by band number.
    fn insert_band(&mut self, tool_bar_index: usize) {
        let band_number = self.tool_bars[tool_bar_index].band();
        for i in 0..self.bands.len() {
            let current_number = self.tool_bars[self.bands[i].members[0]].band();
            if band_number == current_number {
                return;
            }
            if band_number < current_number {
                let band = self.create_band(tool_bar_index);
                self.bands.insert(i, band);
                return;
            }
        }
        let band = self.create_band(tool_bar_index);
        self.bands.push(band);
    }

    /// Collect every toolbar sharing `start_index`'s band number, sorted
    /// by band index.
    fn create_band(&self, start_index: usize) -> BandInfo {
        let band_number = self.tool_bars[start_index].band();
        let mut members = vec![start_index];
        for i in (start_index + 1)..self.tool_bars.len() {
            if self.tool_bars[i].band() == band_number {
                Self::insert_sorted(&self.tool_bars, &mut members, i);
            }
        }
        BandInfo {
            members,
            thickness: 0.0,
        }
    }

    fn insert_sorted(tool_bars: &[ToolBar], members: &mut Vec<usize>, tool_bar_index: usize) {
        let band_index = tool_bars[tool_bar_index].band_index();
        for i in 0..members.len() {
            if band_index < tool_bars[members[i]].band_index() {
                members.insert(i, tool_bar_index);
                return;
            }
        }
        members.push(tool_bar_index);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Measure the tray.
    ///
    /// Per band: the constraint's main extent minus every member's
    /// minimum length is the shared slack; each member is then measured
    /// with its own minimum plus whatever slack remains, and its actual
    /// desired extent is consumed from the slack as it comes back.
    pub fn measure(&mut self, constraint: Size) -> Size {
        self.generate_bands();

        let orientation = self.orientation;
        let mut tray_desired = Size::ZERO;

        for band_index in 0..self.bands.len() {
            let members = self.bands[band_index].members.clone();

            let mut remaining = orientation.main_extent(constraint);
            for &ti in &members {
                remaining -= self.tool_bars[ti].min_length();
                if definitely_less(remaining, 0.0) {
                    // Over-constrained band: no slack to distribute.
                    remaining = 0.0;
                    break;
                }
            }

            let mut band_thickness = 0.0_f32;
            let mut band_length = 0.0_f32;
            for &ti in &members {
                let tool_bar = &mut self.tool_bars[ti];
                remaining += tool_bar.min_length();
                let child_constraint = orientation.pack(remaining, f32::MAX);
                let desired = tool_bar.measure(child_constraint);

                band_thickness = band_thickness.max(orientation.cross_extent(desired));
                band_length += orientation.main_extent(desired);
                remaining -= orientation.main_extent(desired);
                if definitely_less(remaining, 0.0) {
                    remaining = 0.0;
                }
            }

            self.bands[band_index].thickness = band_thickness;
            tray_desired = orientation.pack(
                orientation.main_extent(tray_desired).max(band_length),
                orientation.cross_extent(tray_desired) + band_thickness,
            );
        }

        self.desired_size = tray_desired;
        tray_desired
    }

    /// Arrange the bands: toolbars stack along the main axis at their
    /// desired extent and the band's thickness; bands stack along the
    /// cross axis.
    pub fn arrange(&mut self, rect: Rect) {
        self.base.set_geometry(rect);

        let orientation = self.orientation;
        let mut cross_offset = 0.0;

        for band_index in 0..self.bands.len() {
            let members = self.bands[band_index].members.clone();
            let thickness = self.bands[band_index].thickness;

            let mut main_offset = 0.0;
            for &ti in &members {
                let tool_bar = &mut self.tool_bars[ti];
                let main = orientation.main_extent(tool_bar.desired_size());
                let child_rect = Rect::from_origin_size(
                    orientation.pack_point(main_offset, cross_offset),
                    orientation.pack(main, thickness),
                );
                tool_bar.arrange(child_rect);
                main_offset += main;
            }

            cross_offset += thickness;
        }
    }

    // =========================================================================
    // Drag processing
    // =========================================================================

    /// The band under a tray-local cross-axis offset: `-1` before the
    /// first band, `bands.len()` past the last.
    fn band_from_offset(&self, offset: f32) -> i32 {
        if definitely_less(offset, 0.0) {
            return -1;
        }
        let mut band_offset = 0.0;
        for (i, band) in self.bands.iter().enumerate() {
            band_offset += band.thickness;
            if definitely_greater(band_offset, offset) {
                return i as i32;
            }
        }
        self.bands.len() as i32
    }

    fn total_minimum(&self, members: &[usize], start: i32, end: i32) -> f32 {
        let mut total = 0.0;
        let mut i = start;
        while i <= end {
            total += self.tool_bars[members[i as usize]].min_length();
            i += 1;
        }
        total
    }

    fn total_maximum(&self, members: &[usize], start: i32, end: i32) -> f32 {
        let mut total = 0.0;
        let mut i = start;
        while i <= end {
            total += self.tool_bars[members[i as usize]].max_length();
            i += 1;
        }
        total
    }

    /// Shrink the toolbars in `members[start..=end]`, nearest first, by
    /// `amount`, spilling whatever a toolbar cannot absorb (its floor is
    /// its minimum length) into the next one toward the band start.
    fn shrink_tool_bars(&mut self, members: &[usize], start: i32, end: i32, mut amount: f32) {
        let orientation = self.orientation;
        let mut i = end;
        while i >= start {
            let tool_bar = &mut self.tool_bars[members[i as usize]];
            let current = orientation.main_extent(tool_bar.widget_base().size());
            let min = tool_bar.min_length();
            if greater_or_close(current - amount, min) {
                tool_bar.set_explicit_length(Some(current - amount));
                break;
            } else {
                tool_bar.set_explicit_length(Some(min));
                amount -= current - min;
            }
            i -= 1;
        }
    }

    /// The expanding mirror image of [`Self::shrink_tool_bars`]; each
    /// toolbar's ceiling is its maximum length.
    fn expand_tool_bars(&mut self, members: &[usize], start: i32, end: i32, mut amount: f32) {
        let orientation = self.orientation;
        let mut i = end;
        while i >= start {
            let tool_bar = &mut self.tool_bars[members[i as usize]];
            let current = orientation.main_extent(tool_bar.widget_base().size());
            let max = tool_bar.max_length();
            if less_or_close(current + amount, max) {
                tool_bar.set_explicit_length(Some(current + amount));
                break;
            } else {
                tool_bar.set_explicit_length(Some(max));
                amount -= max - current;
            }
            i -= 1;
        }
    }

    /// Re-seat a toolbar inside an existing target band at the given
    /// main-axis position, walking the band's members and accumulating
    /// their extents until the position is passed.
    fn move_tool_bar(&mut self, tool_bar_index: usize, new_band: usize, position: f32) {
        let orientation = self.orientation;

        if less_or_close(position, 0.0) {
            // Before everything: band index -1 sorts it first; the next
            // generation normalizes.
            self.tool_bars[tool_bar_index].set_band_index(-1);
            return;
        }

        let members = self.bands[new_band].members.clone();
        let mut offset = 0.0;
        let mut new_index = -1_i32;

        for (i, &ti) in members.iter().enumerate() {
            if new_index == -1 {
                let current = orientation.main_extent(self.tool_bars[ti].widget_base().size());
                offset += current;
                if definitely_greater(offset, position) {
                    new_index = i as i32 + 1;
                    self.tool_bars[tool_bar_index].set_band_index(new_index);

                    // Trim the toolbar the drop lands on so the moved bar
                    // has room after it.
                    let trimmed = self.tool_bars[ti]
                        .min_length()
                        .max(current - offset + position);
                    self.tool_bars[ti].set_explicit_length(Some(trimmed));
                }
            } else {
                self.tool_bars[ti].set_band_index(i as i32 + 1);
            }
        }

        if new_index == -1 {
            self.tool_bars[tool_bar_index].set_band_index(members.len() as i32);
        }
    }

    /// Process a cumulative drag vector from a hosted toolbar's thumb.
    ///
    /// `vector` is the thumb's displacement from its press point; `point`
    /// is the pointer position in tray coordinates. Returns whether the
    /// event was acted on.
    pub fn process_thumb_drag_delta(
        &mut self,
        tool_bar_index: usize,
        vector: Point,
        point: Point,
    ) -> bool {
        if self.locked {
            return false;
        }
        if vector.length() == 0.0 {
            return false;
        }
        if tool_bar_index >= self.tool_bars.len() {
            return false;
        }

        // Bands are normally regenerated by the measure between two
        // moves; be robust against a skipped measure.
        if self.is_bands_dirty() {
            self.generate_bands();
        }

        let orientation = self.orientation;
        let current_band = self.tool_bars[tool_bar_index].band();
        let tool_bar_origin = self.tool_bars[tool_bar_index].widget_base().pos();
        let point_rel_tool_bar = point - tool_bar_origin;

        let hittest_band = self.band_from_offset(orientation.cross_coord(point));
        let thumb_change = orientation.main_coord(vector);
        let tool_bar_position =
            orientation.main_coord(point) - orientation.main_coord(point_rel_tool_bar);
        let new_position = tool_bar_position + thumb_change;

        tracing::trace!(
            target: targets::DRAG,
            tool_bar_index,
            current_band,
            hittest_band,
            thumb_change,
            new_position,
            "drag delta"
        );

        if hittest_band == current_band {
            // Move within the band.
            let band = current_band as usize;
            let members = self.bands[band].members.clone();
            let pos_in_band = self.tool_bars[tool_bar_index].band_index();

            if definitely_less(thumb_change, 0.0) {
                // Toward the band start: shrink the preceding range, or
                // swap once it cannot give any more room and the pointer
                // has crossed the previous toolbar's leading edge.
                let total_minimum = self.total_minimum(&members, 0, pos_in_band - 1);
                if less_or_close(total_minimum, new_position) {
                    self.shrink_tool_bars(&members, 0, pos_in_band - 1, -thumb_change);
                } else if pos_in_band > 0 {
                    let prev = members[pos_in_band as usize - 1];
                    let point_rel_prev = point - self.tool_bars[prev].widget_base().pos();
                    if definitely_less(orientation.main_coord(point_rel_prev), 0.0) {
                        self.tool_bars[prev].set_band_index(pos_in_band);
                        self.bands[band].members[pos_in_band as usize] = prev;

                        self.tool_bars[tool_bar_index].set_band_index(pos_in_band - 1);
                        self.bands[band].members[pos_in_band as usize - 1] = tool_bar_index;

                        if pos_in_band as usize + 1 == members.len() {
                            // The dragged bar was last; the bar swapped
                            // into its place sizes itself.
                            self.tool_bars[prev].set_explicit_length(None);
                        }
                        tracing::debug!(target: targets::DRAG, "swapped with previous");
                    } else {
                        let lead = tool_bar_position;
                        if definitely_less(total_minimum, lead) {
                            self.shrink_tool_bars(&members, 0, pos_in_band - 1, lead - total_minimum);
                        }
                    }
                }
            } else {
                // Toward the band end: expand the preceding range, or
                // swap with the next toolbar once the pointer has crossed
                // its leading edge.
                let total_maximum = self.total_maximum(&members, 0, pos_in_band - 1);
                if definitely_greater(total_maximum, new_position) {
                    self.expand_tool_bars(&members, 0, pos_in_band - 1, thumb_change);
                } else if (pos_in_band as usize) < members.len() - 1 {
                    let next = members[pos_in_band as usize + 1];
                    let point_rel_next = point - self.tool_bars[next].widget_base().pos();
                    if greater_or_close(orientation.main_coord(point_rel_next), 0.0) {
                        self.tool_bars[next].set_band_index(pos_in_band);
                        self.bands[band].members[pos_in_band as usize] = next;

                        self.tool_bars[tool_bar_index].set_band_index(pos_in_band + 1);
                        self.bands[band].members[pos_in_band as usize + 1] = tool_bar_index;

                        if pos_in_band as usize + 2 == members.len() {
                            // The dragged bar became last; it sizes
                            // itself.
                            self.tool_bars[tool_bar_index].set_explicit_length(None);
                        }
                        tracing::debug!(target: targets::DRAG, "swapped with next");
                    } else {
                        self.expand_tool_bars(&members, 0, pos_in_band - 1, thumb_change);
                    }
                } else {
                    self.expand_tool_bars(&members, 0, pos_in_band - 1, thumb_change);
                }
            }
        } else {
            // Carry the toolbar to the band under the pointer.
            self.bands_dirty = true;
            self.tool_bars[tool_bar_index].set_band(hittest_band);
            self.tool_bars[tool_bar_index].set_explicit_length(None);

            if hittest_band >= 0 && (hittest_band as usize) < self.bands.len() {
                self.move_tool_bar(tool_bar_index, hittest_band as usize, new_position);
            }

            // Whatever stays behind in the old band reverts to auto-size.
            let old_members = self.bands[current_band as usize].members.clone();
            for ti in old_members {
                if ti != tool_bar_index {
                    self.tool_bars[ti].set_explicit_length(None);
                }
            }

            tracing::debug!(target: targets::DRAG, from = current_band, to = hittest_band, "rebanded");
        }

        self.base.update();
        true
    }

    // =========================================================================
    // Event routing
    // =========================================================================

    /// The toolbar under a tray-local point (open popups included).
    fn tool_bar_at(&self, point: Point) -> Option<usize> {
        (0..self.tool_bars.len()).find(|&i| self.tool_bars[i].hit_test_in_parent(point))
    }

    fn route_to_tool_bar(&mut self, index: usize, event: &mut WidgetEvent) -> Option<DragEvent> {
        let origin = self.tool_bars[index].widget_base().pos();
        let mut local = *event;
        local.translate_local(origin);
        let drag = self.tool_bars[index].route_event(&mut local);
        if local.base().is_accepted() {
            event.base_mut().accept();
        }
        drag
    }
}

impl Default for ToolBarTray {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for ToolBarTray {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for ToolBarTray {
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
        match event {
            WidgetEvent::MousePress(e) => {
                let point = e.local_pos;
                let Some(index) = self.tool_bar_at(point) else {
                    return false;
                };
                let drag = self.route_to_tool_bar(index, event);
                if matches!(drag, Some(DragEvent::Started(_))) {
                    // Capture: subsequent moves go to this toolbar's
                    // thumb no matter where the pointer is.
                    self.active_drag = Some(index);
                }
                event.base().is_accepted()
            }

            WidgetEvent::MouseMove(e) => {
                let point = e.local_pos;
                let Some(index) = self.active_drag else {
                    return false;
                };
                let drag = self.route_to_tool_bar(index, event);
                if let Some(DragEvent::Delta(vector)) = drag {
                    if self.process_thumb_drag_delta(index, vector, point) {
                        event.base_mut().accept();
                    }
                }
                event.base().is_accepted()
            }

            WidgetEvent::MouseRelease(_) => {
                if let Some(index) = self.active_drag {
                    let drag = self.route_to_tool_bar(index, event);
                    if matches!(drag, Some(DragEvent::Completed(_))) {
                        self.active_drag = None;
                    }
                    return event.base().is_accepted();
                }
                let point = match event.local_pos() {
                    Some(p) => p,
                    None => return false,
                };
                match self.tool_bar_at(point) {
                    Some(index) => {
                        self.route_to_tool_bar(index, event);
                        event.base().is_accepted()
                    }
                    None => false,
                }
            }

            WidgetEvent::CaptureLost(_) => {
                if let Some(index) = self.active_drag.take() {
                    self.route_to_tool_bar(index, event);
                    true
                } else {
                    false
                }
            }

            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LabelItem, ToolItem};
    use crate::widget::events::{
        CaptureLostEvent, KeyboardModifiers, MouseButton, MouseMoveEvent, MousePressEvent,
        MouseReleaseEvent,
    };
    use crate::widget::widgets::tool_bar::ToolBarStyle;
    use std::sync::Arc;
    use trellis_core::init_global_registry;

    /// A bar with a single fixed item and zero-padding chrome: thumb 10,
    /// no overflow button. min = 10, max = 10 + item, desired likewise.
    fn bar(item_width: f32, band: i32, band_index: i32) -> ToolBar {
        let bar = ToolBar::new()
            .with_style(ToolBarStyle {
                padding: 0.0,
                thumb_extent: 10.0,
                overflow_button_extent: 0.0,
            })
            .with_band(band)
            .with_band_index(band_index);
        bar.items()
            .push(Arc::new(LabelItem::new("i", Size::new(item_width, 24.0))) as Arc<dyn ToolItem>);
        bar
    }

    fn layout(tray: &mut ToolBarTray, width: f32, height: f32) {
        tray.measure(Size::new(width, height));
        tray.arrange(Rect::new(0.0, 0.0, width, height));
    }

    fn identities(tray: &ToolBarTray) -> Vec<(i32, i32)> {
        tray.tool_bars()
            .iter()
            .map(|t| (t.band(), t.band_index()))
            .collect()
    }

    fn press(x: f32, y: f32) -> WidgetEvent {
        let p = Point::new(x, y);
        WidgetEvent::MousePress(MousePressEvent::new(
            MouseButton::Left,
            p,
            p,
            p,
            KeyboardModifiers::NONE,
        ))
    }

    fn movement(x: f32, y: f32) -> WidgetEvent {
        let p = Point::new(x, y);
        WidgetEvent::MouseMove(MouseMoveEvent::new(p, p, p, 1, KeyboardModifiers::NONE))
    }

    fn release(x: f32, y: f32) -> WidgetEvent {
        let p = Point::new(x, y);
        WidgetEvent::MouseRelease(MouseReleaseEvent::new(
            MouseButton::Left,
            p,
            p,
            p,
            KeyboardModifiers::NONE,
        ))
    }

    #[test]
    fn test_band_grouping_and_tray_size() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        tray.push_tool_bar(bar(40.0, 1, 0));

        let desired = tray.measure(Size::new(500.0, 100.0));

        // bands = [[t0, t1], [t2]]; each bar desires 50x24.
        assert_eq!(identities(&tray), vec![(0, 0), (0, 1), (1, 0)]);
        assert_eq!(desired, Size::new(100.0, 48.0));
    }

    #[test]
    fn test_normalization_collapses_sparse_numbers() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 3, 7));
        tray.push_tool_bar(bar(40.0, 3, 2));
        tray.push_tool_bar(bar(40.0, 9, 0));

        tray.generate_bands();

        // Band numbers collapse to 0..B-1, indices to 0..K-1, ordered by
        // the original values.
        assert_eq!(identities(&tray), vec![(0, 1), (0, 0), (1, 0)]);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 5, 5));
        tray.push_tool_bar(bar(40.0, 2, 0));

        tray.generate_bands();
        let first = identities(&tray);
        assert!(!tray.is_bands_dirty());

        tray.generate_bands();
        assert_eq!(identities(&tray), first);
    }

    #[test]
    fn test_identity_change_marks_dirty() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        tray.generate_bands();
        assert!(!tray.is_bands_dirty());

        tray.tool_bar_mut(1).unwrap().set_band(1);
        assert!(tray.is_bands_dirty());

        tray.generate_bands();
        assert_eq!(identities(&tray), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_vertical_tray_axes() {
        init_global_registry();
        let mut tray = ToolBarTray::with_orientation(Orientation::Vertical);
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 1, 0));

        // Coerced orientation: items stack vertically, so a bar's main
        // extent is 10 (thumb) + 24 (item height)... the item is 40x24,
        // so vertical desired main = 10 + 24 = 34, cross = 40.
        let desired = tray.measure(Size::new(200.0, 500.0));
        assert_eq!(tray.tool_bar(0).unwrap().orientation(), Orientation::Vertical);
        assert_eq!(desired, Size::new(80.0, 34.0));
    }

    #[test]
    fn test_over_constrained_band_clamps_slack() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        // Minimum lengths are 10 each; a 15-wide tray cannot even fit the
        // minimums.
        tray.push_tool_bar(bar(100.0, 0, 0));
        tray.push_tool_bar(bar(100.0, 0, 1));

        let desired = tray.measure(Size::new(15.0, 100.0));
        // Each bar is measured at its minimum plus zero slack: overflow
        // swallows the items.
        assert_eq!(desired.width, 20.0);
        assert!(tray.tool_bar(0).unwrap().has_overflow_items());
        assert!(tray.tool_bar(1).unwrap().has_overflow_items());
    }

    #[test]
    fn test_drag_shrinks_preceding_tool_bar() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        // Bars at (0,0,50,24) and (50,0,50,24). Drag the second bar's
        // thumb 10 left.
        let handled =
            tray.process_thumb_drag_delta(1, Point::new(-10.0, 0.0), Point::new(45.0, 10.0));

        assert!(handled);
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), Some(40.0));
    }

    #[test]
    fn test_drag_shrink_respects_minimum_then_swaps() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        // Pin the first bar at its minimum.
        tray.tool_bar_mut(0).unwrap().set_explicit_length(Some(10.0));
        layout(&mut tray, 200.0, 100.0);
        assert_eq!(identities(&tray), vec![(0, 0), (0, 1)]);

        // Pointer crosses the first bar's leading edge: swap instead of
        // shrinking below the minimum.
        let handled =
            tray.process_thumb_drag_delta(1, Point::new(-17.0, 0.0), Point::new(-2.0, 10.0));

        assert!(handled);
        assert_eq!(identities(&tray), vec![(0, 1), (0, 0)]);
        // The bar swapped into last place reverts to auto-size.
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), None);
    }

    #[test]
    fn test_drag_expands_preceding_tool_bar() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        tray.tool_bar_mut(0).unwrap().set_explicit_length(Some(20.0));
        layout(&mut tray, 200.0, 100.0);

        // Second bar now starts at 20; drag its thumb 15 right.
        let handled =
            tray.process_thumb_drag_delta(1, Point::new(15.0, 0.0), Point::new(40.0, 10.0));

        assert!(handled);
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), Some(35.0));
    }

    #[test]
    fn test_drag_to_other_band_rebands_and_resets_sizes() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        tray.push_tool_bar(bar(40.0, 1, 0));
        layout(&mut tray, 200.0, 100.0);

        // Give the band-0 bars explicit sizes, then drag the second bar
        // down into band 1's region (band 0 occupies y 0..24).
        tray.tool_bar_mut(0).unwrap().set_explicit_length(Some(45.0));
        tray.tool_bar_mut(1).unwrap().set_explicit_length(Some(45.0));
        layout(&mut tray, 200.0, 100.0);

        let handled =
            tray.process_thumb_drag_delta(1, Point::new(0.0, 24.0), Point::new(50.0, 34.0));

        assert!(handled);
        assert!(tray.is_bands_dirty());
        assert_eq!(tray.tool_bar(1).unwrap().band(), 1);
        // Explicit sizes are cleared on the mover and the stay-behinds.
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), None);
        assert_eq!(tray.tool_bar(1).unwrap().explicit_length(), None);

        // The next layout regenerates bands with the moved bar in band 1.
        layout(&mut tray, 200.0, 100.0);
        assert!(!tray.is_bands_dirty());
        assert_eq!(tray.tool_bar(0).unwrap().band(), 0);
        assert_eq!(tray.tool_bar(1).unwrap().band(), 1);
        assert_eq!(tray.tool_bar(2).unwrap().band(), 1);
    }

    #[test]
    fn test_drag_past_last_band_creates_new_band() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        // Below the single band (thickness 24): hit-test band == 1 ==
        // bands.len().
        let handled =
            tray.process_thumb_drag_delta(1, Point::new(0.0, 30.0), Point::new(55.0, 40.0));

        assert!(handled);
        layout(&mut tray, 200.0, 100.0);
        assert_eq!(identities(&tray), vec![(0, 0), (1, 0)]);
        assert_eq!(tray.desired_size().height, 48.0);
    }

    #[test]
    fn test_drag_above_first_band_creates_leading_band() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        let handled =
            tray.process_thumb_drag_delta(1, Point::new(0.0, -12.0), Point::new(55.0, -2.0));

        assert!(handled);
        layout(&mut tray, 200.0, 100.0);
        // The dragged bar lands in a new first band.
        assert_eq!(identities(&tray), vec![(1, 0), (0, 0)]);
    }

    #[test]
    fn test_locked_tray_ignores_drags() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);
        tray.set_locked(true);

        let handled =
            tray.process_thumb_drag_delta(1, Point::new(-10.0, 0.0), Point::new(45.0, 10.0));

        assert!(!handled);
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), None);
    }

    #[test]
    fn test_zero_delta_is_ignored() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        layout(&mut tray, 200.0, 100.0);

        assert!(!tray.process_thumb_drag_delta(0, Point::ZERO, Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_event_routing_full_drag() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        tray.push_tool_bar(bar(40.0, 0, 1));
        layout(&mut tray, 200.0, 100.0);

        // Press on the second bar's thumb (tray x 50..60).
        let mut e = press(55.0, 10.0);
        assert!(tray.event(&mut e));
        assert!(tray.tool_bar(1).unwrap().thumb().is_dragging());

        // Move left: the preceding bar shrinks.
        let mut e = movement(45.0, 10.0);
        assert!(tray.event(&mut e));
        assert_eq!(tray.tool_bar(0).unwrap().explicit_length(), Some(40.0));

        // Release ends the drag.
        let mut e = release(45.0, 10.0);
        assert!(tray.event(&mut e));
        assert!(!tray.tool_bar(1).unwrap().thumb().is_dragging());
    }

    #[test]
    fn test_capture_loss_ends_drag() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        layout(&mut tray, 200.0, 100.0);

        let mut e = press(5.0, 10.0);
        tray.event(&mut e);
        assert!(tray.tool_bar(0).unwrap().thumb().is_dragging());

        let completed = Arc::new(parking_lot::Mutex::new(false));
        let recv = completed.clone();
        tray.tool_bar(0)
            .unwrap()
            .thumb()
            .drag_completed
            .connect(move |_| *recv.lock() = true);

        let mut e = WidgetEvent::CaptureLost(CaptureLostEvent::new());
        assert!(tray.event(&mut e));
        assert!(!tray.tool_bar(0).unwrap().thumb().is_dragging());
        assert!(*completed.lock());
    }

    #[test]
    fn test_orientation_change_coerces_tool_bars() {
        init_global_registry();
        let mut tray = ToolBarTray::new();
        tray.push_tool_bar(bar(40.0, 0, 0));
        assert_eq!(tray.tool_bar(0).unwrap().orientation(), Orientation::Horizontal);

        tray.set_orientation(Orientation::Vertical);
        assert_eq!(tray.tool_bar(0).unwrap().orientation(), Orientation::Vertical);

        // A removed toolbar is its own master again.
        let bar = tray.remove_tool_bar(0);
        assert_eq!(bar.orientation(), Orientation::Horizontal);
    }
}

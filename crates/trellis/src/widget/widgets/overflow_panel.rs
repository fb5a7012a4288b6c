//! The overflow surface's wrapping panel.
//!
//! `ToolBarOverflowPanel` hosts exactly the containers the main panel
//! flagged as overflow, laying them out as a left-to-right flow that wraps
//! to a new line when the next child would exceed the wrap width. A child
//! wider than the wrap width gets a dedicated line.

use std::sync::Arc;

use parking_lot::Mutex;
use trellis_core::{Object, ObjectId};

use crate::geometry::{Point, Rect, Size, definitely_greater};
use crate::widget::base::WidgetBase;
use crate::widget::geometry::SizeHint;
use crate::widget::items::ContainerMirror;
use crate::widget::traits::Widget;

/// The wrapping panel inside the overflow popup.
pub struct ToolBarOverflowPanel {
    base: WidgetBase,

    /// Explicit wrap width. `None` means "use the measure constraint".
    wrap_width: Option<f32>,

    /// The wrap width actually used, computed in measure and reused by
    /// arrange.
    effective_wrap_width: f32,

    /// Overflow container ids in source order, rebuilt each measure.
    children: Vec<ObjectId>,

    /// The mirror shared with the owning toolbar's main panel.
    mirror: Option<Arc<Mutex<ContainerMirror>>>,

    panel_size: Size,
}

impl ToolBarOverflowPanel {
    /// Create a detached overflow panel.
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            wrap_width: None,
            effective_wrap_width: 0.0,
            children: Vec::new(),
            mirror: None,
            panel_size: Size::ZERO,
        }
    }

    /// Attach the generated-container mirror shared with the main panel.
    pub fn attach_mirror(&mut self, mirror: Arc<Mutex<ContainerMirror>>) {
        self.mirror = Some(mirror);
        self.children.clear();
    }

    /// The explicit wrap width, if set.
    pub fn wrap_width(&self) -> Option<f32> {
        self.wrap_width
    }

    /// Set or clear the explicit wrap width.
    ///
    /// Negative, NaN or infinite widths are invalid and leave the previous
    /// value in place.
    pub fn set_wrap_width(&mut self, width: Option<f32>) {
        if let Some(w) = width {
            if !w.is_finite() || w < 0.0 {
                return;
            }
        }
        if self.wrap_width != width {
            self.wrap_width = width;
            self.base.update();
        }
    }

    /// The size computed by the last measure.
    pub fn panel_size(&self) -> Size {
        self.panel_size
    }

    /// The hosted overflow container ids, in source order.
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    /// Pull the current overflow set out of the mirror, in source order,
    /// excluding separators.
    fn sync_children(&mut self) {
        self.children.clear();
        let Some(mirror) = &self.mirror else { return };
        let mirror = mirror.lock();
        for entry in mirror.entries() {
            if entry.is_overflow_item() && !entry.widget().is_separator() {
                self.children.push(entry.id());
            }
        }
    }

    /// Measure the wrap layout against `constraint`.
    pub fn measure(&mut self, constraint: Size) -> Size {
        self.sync_children();

        let mut wrap_width = self.wrap_width.unwrap_or(constraint.width);
        let mut cur_line = Size::ZERO;
        let mut panel_size = Size::ZERO;

        let sizes: Vec<Size> = match &self.mirror {
            Some(mirror) => {
                let mirror = mirror.lock();
                self.children
                    .iter()
                    .filter_map(|id| mirror.index_of(*id))
                    .map(|i| mirror.entries()[i].widget().size_hint().preferred)
                    .collect()
            }
            None => Vec::new(),
        };

        // A child wider than the wrap width widens it, up to the
        // constraint.
        for size in &sizes {
            if definitely_greater(size.width, wrap_width) {
                wrap_width = size.width;
            }
        }
        wrap_width = wrap_width.min(constraint.width);

        for size in &sizes {
            if definitely_greater(cur_line.width + size.width, wrap_width) {
                // Wrap to the next line.
                panel_size.width = panel_size.width.max(cur_line.width);
                panel_size.height += cur_line.height;
                cur_line = *size;

                if definitely_greater(size.width, wrap_width) {
                    // Wider than the wrap width: dedicated line.
                    panel_size.width = panel_size.width.max(size.width);
                    panel_size.height += size.height;
                    cur_line = Size::ZERO;
                }
            } else {
                cur_line.width += size.width;
                cur_line.height = cur_line.height.max(size.height);
            }
        }

        // The last line, if any.
        panel_size.width = panel_size.width.max(cur_line.width);
        panel_size.height += cur_line.height;

        self.effective_wrap_width = wrap_width;
        self.panel_size = panel_size;
        panel_size
    }

    /// Arrange the overflow containers into their wrapped lines.
    pub fn arrange(&mut self, bounds: Size) -> Size {
        let wrap_width = self.effective_wrap_width.min(bounds.width);
        let Some(mirror) = self.mirror.clone() else {
            return self.panel_size;
        };
        let mut mirror = mirror.lock();

        let sizes: Vec<(usize, Size)> = self
            .children
            .iter()
            .filter_map(|id| mirror.index_of(*id))
            .map(|i| (i, mirror.entries()[i].widget().size_hint().preferred))
            .collect();

        let mut first_in_line = 0;
        let mut cur_line = Size::ZERO;
        let mut accumulated_height = 0.0;

        let arrange_line =
            |mirror: &mut ContainerMirror, y: f32, line_height: f32, start: usize, end: usize| {
                let mut x = 0.0;
                for &(entry_index, size) in &sizes[start..end] {
                    let rect = Rect::from_origin_size(
                        Point::new(x, y),
                        Size::new(size.width, line_height),
                    );
                    mirror.entries_mut()[entry_index]
                        .widget
                        .widget_base_mut()
                        .set_geometry(rect);
                    x += size.width;
                }
            };

        for (i, &(_, size)) in sizes.iter().enumerate() {
            if definitely_greater(cur_line.width + size.width, wrap_width) {
                arrange_line(&mut mirror, accumulated_height, cur_line.height, first_in_line, i);
                accumulated_height += cur_line.height;
                first_in_line = i;
                cur_line = size;
            } else {
                cur_line.width += size.width;
                cur_line.height = cur_line.height.max(size.height);
            }
        }
        arrange_line(
            &mut mirror,
            accumulated_height,
            cur_line.height,
            first_in_line,
            sizes.len(),
        );

        self.base.set_size(self.panel_size);
        self.panel_size
    }

    /// The overflow container under `point` (panel-local), after arrange.
    pub fn child_at(&self, point: Point) -> Option<ObjectId> {
        let mirror = self.mirror.as_ref()?;
        let mirror = mirror.lock();
        self.children.iter().copied().find(|id| {
            mirror
                .index_of(*id)
                .is_some_and(|i| mirror.entries()[i].widget().widget_base().geometry().contains(point))
        })
    }
}

impl Default for ToolBarOverflowPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for ToolBarOverflowPanel {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for ToolBarOverflowPanel {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::new(self.panel_size)
    }
}

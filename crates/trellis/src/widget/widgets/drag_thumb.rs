//! The toolbar drag grip.
//!
//! `DragThumb` converts raw pointer press/move/release into an ordered
//! drag lifecycle: one `drag_started`, any number of `drag_delta`s, and a
//! guaranteed final `drag_completed`, also on capture loss, so a consumer
//! can treat `drag_completed` as the sole end-of-drag signal.
//!
//! Delta vectors are measured from the *original press point*, not from
//! the previous move: the stored point is never updated during the drag.
//! The tray's shrink/expand/swap math is written against these
//! cumulative-from-start vectors; do not switch this to incremental
//! deltas.

use trellis_core::{Object, ObjectId, Signal};

use crate::geometry::Point;
use crate::widget::base::WidgetBase;
use crate::widget::cursor::CursorShape;
use crate::widget::events::{
    CaptureLostEvent, MouseButton, MouseMoveEvent, MousePressEvent, MouseReleaseEvent, WidgetEvent,
};
use crate::widget::geometry::SizeHint;
use crate::widget::traits::Widget;

/// One step of a drag lifecycle, returned to the routing container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// The drag began. Vector: the press point, thumb-local.
    Started(Point),
    /// The pointer moved while dragging. Vector: displacement from the
    /// press point.
    Delta(Point),
    /// The drag ended. Vector: the pointer's final thumb-local position
    /// (the stored press point when ended by capture loss).
    Completed(Point),
}

/// A draggable grip.
///
/// The containing toolbar routes pointer events here; the nearest
/// interested ancestor (the tray) consumes the returned [`DragEvent`]s.
/// The public signals carry the same vectors for external observers.
pub struct DragThumb {
    base: WidgetBase,

    /// The press point of the active drag session. `Some` exactly while
    /// dragging.
    last_point: Option<Point>,

    /// Whether the pressed visual state is active.
    pressed: bool,

    /// Signal emitted when a drag starts. Vector: the press point.
    pub drag_started: Signal<Point>,
    /// Signal emitted on each drag movement. Vector: displacement from
    /// the press point.
    pub drag_delta: Signal<Point>,
    /// Signal emitted when a drag ends, normally or on capture loss.
    pub drag_completed: Signal<Point>,
}

impl DragThumb {
    /// Create a new thumb.
    pub fn new() -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            last_point: None,
            pressed: false,
            drag_started: Signal::new(),
            drag_delta: Signal::new(),
            drag_completed: Signal::new(),
        }
    }

    /// Whether a drag session is active.
    pub fn is_dragging(&self) -> bool {
        self.last_point.is_some()
    }

    /// Whether the pressed visual state is active.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// The cursor to show over the thumb.
    pub fn cursor_shape(&self) -> CursorShape {
        if self.is_dragging() {
            CursorShape::Grabbing
        } else {
            CursorShape::Grab
        }
    }

    /// Handle a press in thumb-local coordinates.
    ///
    /// Accepts the event (the routing host must also grant this thumb
    /// pointer capture and suppress gesture recognition for this press)
    /// and starts the drag session.
    pub fn handle_press(&mut self, event: &mut MousePressEvent) -> Option<DragEvent> {
        if event.button != MouseButton::Left {
            return None;
        }
        event.base.accept();

        let point = event.local_pos;
        self.last_point = Some(point);
        self.pressed = true;
        self.base.update();

        self.drag_started.emit(point);
        Some(DragEvent::Started(point))
    }

    /// Handle a move in thumb-local coordinates.
    ///
    /// The delta is measured from the original press point; the stored
    /// point is deliberately left untouched.
    pub fn handle_move(&mut self, event: &MouseMoveEvent) -> Option<DragEvent> {
        let origin = self.last_point?;
        let vector = event.local_pos - origin;
        self.drag_delta.emit(vector);
        Some(DragEvent::Delta(vector))
    }

    /// Handle a release in thumb-local coordinates.
    pub fn handle_release(&mut self, event: &mut MouseReleaseEvent) -> Option<DragEvent> {
        self.last_point?;
        event.base.accept();
        self.last_point = None;
        self.pressed = false;
        self.base.update();

        let point = event.local_pos;
        self.drag_completed.emit(point);
        Some(DragEvent::Completed(point))
    }

    /// Handle loss of pointer capture.
    ///
    /// If a drag is active it completes with the stored press point, so
    /// `drag_completed` fires even on abnormal termination.
    pub fn handle_capture_lost(&mut self, _event: &CaptureLostEvent) -> Option<DragEvent> {
        let point = self.last_point.take()?;
        self.pressed = false;
        self.base.update();

        self.drag_completed.emit(point);
        Some(DragEvent::Completed(point))
    }
}

impl Default for DragThumb {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for DragThumb {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for DragThumb {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        // The parent decides the grip's extent.
        SizeHint::default()
    }

    fn event(&mut self, event: &mut WidgetEvent) -> bool {
        match event {
            WidgetEvent::MousePress(e) => self.handle_press(e).is_some(),
            WidgetEvent::MouseMove(e) => self.handle_move(e).is_some(),
            WidgetEvent::MouseRelease(e) => self.handle_release(e).is_some(),
            WidgetEvent::CaptureLost(e) => self.handle_capture_lost(e).is_some(),
            _ => false,
        }
    }
}

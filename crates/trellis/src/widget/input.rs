//! Pointer input handling and conversion from platform events.
//!
//! [`PointerTracker`] translates raw winit mouse input into kit events and
//! tracks the two pieces of pointer state the kit relies on: the pressed
//! button set and the capture owner. Capture is what keeps a drag alive
//! while the pointer leaves the originating control; the embedding routes
//! move/release events to [`PointerTracker::capture_target`] while one is
//! set.
//!
//! ```ignore
//! use trellis::widget::input::PointerTracker;
//!
//! let mut tracker = PointerTracker::new();
//!
//! // On winit CursorMoved:
//! let event = tracker.handle_cursor_moved(position, None);
//! // dispatch to tracker.capture_target() or the widget under the cursor
//!
//! // On winit MouseInput:
//! if let Some(event) = tracker.handle_mouse_input(state, button, None) {
//!     // dispatch
//! }
//! ```

use winit::event::{ElementState, MouseButton as WinitMouseButton};

use trellis_core::ObjectId;

use crate::geometry::Point;
use crate::widget::events::{
    CaptureLostEvent, KeyboardModifiers, MouseButton, MouseMoveEvent, MousePressEvent,
    MouseReleaseEvent,
};

/// Converts a winit mouse button to a kit [`MouseButton`].
pub fn from_winit_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Button4),
        WinitMouseButton::Forward => Some(MouseButton::Button5),
        WinitMouseButton::Other(_) => None,
    }
}

/// Pointer input event type returned by the tracker.
#[derive(Debug)]
pub enum PointerEvent {
    /// Mouse button was pressed.
    Press(MousePressEvent),
    /// Mouse button was released.
    Release(MouseReleaseEvent),
    /// Mouse cursor moved.
    Move(MouseMoveEvent),
}

/// Stateful converter from winit input to kit pointer events.
#[derive(Debug)]
pub struct PointerTracker {
    /// Current pointer position in window coordinates.
    current_position: Point,
    /// Previous pointer position for delta queries.
    previous_position: Point,
    /// Currently pressed buttons as a bitfield.
    pressed_buttons: u8,
    /// Current keyboard modifier state.
    modifiers: KeyboardModifiers,
    /// The widget currently holding pointer capture.
    capture: Option<ObjectId>,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PointerTracker {
    /// Create a new tracker.
    pub fn new() -> Self {
        Self {
            current_position: Point::ZERO,
            previous_position: Point::ZERO,
            pressed_buttons: 0,
            modifiers: KeyboardModifiers::NONE,
            capture: None,
        }
    }

    /// The current pointer position in window coordinates.
    pub fn position(&self) -> Point {
        self.current_position
    }

    /// Movement since the previous position update.
    pub fn delta(&self) -> Point {
        self.current_position - self.previous_position
    }

    /// Currently pressed buttons as a bitfield.
    pub fn pressed_buttons(&self) -> u8 {
        self.pressed_buttons
    }

    /// Whether a specific button is pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        (self.pressed_buttons & (1 << button as u8)) != 0
    }

    /// Update the keyboard modifier state.
    pub fn update_modifiers(&mut self, modifiers: KeyboardModifiers) {
        self.modifiers = modifiers;
    }

    // =========================================================================
    // Capture
    // =========================================================================

    /// The widget currently holding pointer capture.
    pub fn capture_target(&self) -> Option<ObjectId> {
        self.capture
    }

    /// Grant pointer capture to a widget.
    ///
    /// If another widget held capture, it is returned together with a
    /// [`CaptureLostEvent`] the embedding must deliver to it.
    pub fn set_capture(&mut self, target: ObjectId) -> Option<(ObjectId, CaptureLostEvent)> {
        let previous = self.capture.replace(target);
        match previous {
            Some(prev) if prev != target => Some((prev, CaptureLostEvent::new())),
            _ => None,
        }
    }

    /// Release pointer capture.
    ///
    /// Returns the previous owner and the [`CaptureLostEvent`] to deliver
    /// to it, if capture was held. Deliver the event even on a normal
    /// release after the release event itself was dispatched; widgets that
    /// already ended their drag ignore it.
    pub fn release_capture(&mut self) -> Option<(ObjectId, CaptureLostEvent)> {
        self.capture.take().map(|prev| (prev, CaptureLostEvent::new()))
    }

    // =========================================================================
    // Event conversion
    // =========================================================================

    /// Handle a winit cursor-moved event.
    ///
    /// `local_pos` starts equal to the window position; the dispatching
    /// container translates it while routing.
    pub fn handle_cursor_moved(
        &mut self,
        window_pos: Point,
        global_pos: Option<Point>,
    ) -> MouseMoveEvent {
        self.previous_position = self.current_position;
        self.current_position = window_pos;

        let global = global_pos.unwrap_or(window_pos);
        MouseMoveEvent::new(window_pos, window_pos, global, self.pressed_buttons, self.modifiers)
    }

    /// Handle a winit button press/release.
    pub fn handle_mouse_input(
        &mut self,
        state: ElementState,
        button: WinitMouseButton,
        global_pos: Option<Point>,
    ) -> Option<PointerEvent> {
        let button = from_winit_mouse_button(button)?;
        let global = global_pos.unwrap_or(self.current_position);

        match state {
            ElementState::Pressed => {
                self.pressed_buttons |= 1 << button as u8;
                Some(PointerEvent::Press(MousePressEvent::new(
                    button,
                    self.current_position,
                    self.current_position,
                    global,
                    self.modifiers,
                )))
            }
            ElementState::Released => {
                self.pressed_buttons &= !(1 << button as u8);
                Some(PointerEvent::Release(MouseReleaseEvent::new(
                    button,
                    self.current_position,
                    self.current_position,
                    global,
                    self.modifiers,
                )))
            }
        }
    }

    /// Reset all pointer state, dropping any capture without notification.
    pub fn reset(&mut self) {
        self.current_position = Point::ZERO;
        self.previous_position = Point::ZERO;
        self.pressed_buttons = 0;
        self.capture = None;
    }
}

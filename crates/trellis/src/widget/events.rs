//! Widget event types.
//!
//! Pointer events carry the position in three coordinate spaces: local to
//! the receiving widget, relative to the hosting window, and global. The
//! dispatching container rewrites `local_pos` as it routes an event down
//! its children.

use crate::geometry::{Point, Size};

/// Keyboard modifiers that may be held during input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct KeyboardModifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held.
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl KeyboardModifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Check if any modifier is pressed.
    pub fn any(&self) -> bool {
        self.shift || self.control || self.alt || self.meta
    }
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseButton {
    /// Primary button (usually left).
    Left = 0,
    /// Secondary button (usually right).
    Right = 1,
    /// Middle button (scroll wheel click).
    Middle = 2,
    /// Additional button 1 (e.g., browser back).
    Button4 = 3,
    /// Additional button 2 (e.g., browser forward).
    Button5 = 4,
}

/// Common data for all widget events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventBase {
    accepted: bool,
}

impl EventBase {
    /// Create a new event base.
    pub fn new() -> Self {
        Self { accepted: false }
    }

    /// Check if the event has been accepted.
    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    /// Accept the event, preventing further propagation.
    pub fn accept(&mut self) {
        self.accepted = true;
    }

    /// Ignore the event, allowing further propagation.
    pub fn ignore(&mut self) {
        self.accepted = false;
    }
}

/// Mouse press event.
#[derive(Debug, Clone, Copy)]
pub struct MousePressEvent {
    /// Base event data.
    pub base: EventBase,
    /// The button that was pressed.
    pub button: MouseButton,
    /// Position in widget-local coordinates.
    pub local_pos: Point,
    /// Position in window coordinates.
    pub window_pos: Point,
    /// Position in global screen coordinates.
    pub global_pos: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MousePressEvent {
    /// Create a new mouse press event.
    pub fn new(
        button: MouseButton,
        local_pos: Point,
        window_pos: Point,
        global_pos: Point,
        modifiers: KeyboardModifiers,
    ) -> Self {
        Self {
            base: EventBase::new(),
            button,
            local_pos,
            window_pos,
            global_pos,
            modifiers,
        }
    }
}

/// Mouse release event.
#[derive(Debug, Clone, Copy)]
pub struct MouseReleaseEvent {
    /// Base event data.
    pub base: EventBase,
    /// The button that was released.
    pub button: MouseButton,
    /// Position in widget-local coordinates.
    pub local_pos: Point,
    /// Position in window coordinates.
    pub window_pos: Point,
    /// Position in global screen coordinates.
    pub global_pos: Point,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MouseReleaseEvent {
    /// Create a new mouse release event.
    pub fn new(
        button: MouseButton,
        local_pos: Point,
        window_pos: Point,
        global_pos: Point,
        modifiers: KeyboardModifiers,
    ) -> Self {
        Self {
            base: EventBase::new(),
            button,
            local_pos,
            window_pos,
            global_pos,
            modifiers,
        }
    }
}

/// Mouse move event.
#[derive(Debug, Clone, Copy)]
pub struct MouseMoveEvent {
    /// Base event data.
    pub base: EventBase,
    /// Position in widget-local coordinates.
    pub local_pos: Point,
    /// Position in window coordinates.
    pub window_pos: Point,
    /// Position in global screen coordinates.
    pub global_pos: Point,
    /// Currently pressed buttons as a bitfield.
    pub buttons: u8,
    /// Keyboard modifiers held during the event.
    pub modifiers: KeyboardModifiers,
}

impl MouseMoveEvent {
    /// Create a new mouse move event.
    pub fn new(
        local_pos: Point,
        window_pos: Point,
        global_pos: Point,
        buttons: u8,
        modifiers: KeyboardModifiers,
    ) -> Self {
        Self {
            base: EventBase::new(),
            local_pos,
            window_pos,
            global_pos,
            buttons,
            modifiers,
        }
    }
}

/// Pointer capture lost event.
///
/// Delivered to the widget that held pointer capture when capture is
/// revoked for an external reason. A widget in the middle of a drag must
/// treat this as the end of the drag.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureLostEvent {
    /// Base event data.
    pub base: EventBase,
}

impl CaptureLostEvent {
    /// Create a new capture-lost event.
    pub fn new() -> Self {
        Self { base: EventBase::new() }
    }
}

/// Resize event, sent when a widget's size changes.
#[derive(Debug, Clone, Copy)]
pub struct ResizeEvent {
    /// Base event data.
    pub base: EventBase,
    /// The old size of the widget.
    pub old_size: Size,
    /// The new size of the widget.
    pub new_size: Size,
}

impl ResizeEvent {
    /// Create a new resize event.
    pub fn new(old_size: Size, new_size: Size) -> Self {
        Self {
            base: EventBase::new(),
            old_size,
            new_size,
        }
    }
}

/// The widget event union dispatched through `Widget::event`.
#[derive(Debug, Clone, Copy)]
pub enum WidgetEvent {
    /// Mouse button pressed.
    MousePress(MousePressEvent),
    /// Mouse button released.
    MouseRelease(MouseReleaseEvent),
    /// Mouse cursor moved.
    MouseMove(MouseMoveEvent),
    /// Pointer capture was lost.
    CaptureLost(CaptureLostEvent),
    /// Widget was resized.
    Resize(ResizeEvent),
}

impl WidgetEvent {
    /// Shared access to the event base.
    pub fn base(&self) -> &EventBase {
        match self {
            Self::MousePress(e) => &e.base,
            Self::MouseRelease(e) => &e.base,
            Self::MouseMove(e) => &e.base,
            Self::CaptureLost(e) => &e.base,
            Self::Resize(e) => &e.base,
        }
    }

    /// Mutable access to the event base.
    pub fn base_mut(&mut self) -> &mut EventBase {
        match self {
            Self::MousePress(e) => &mut e.base,
            Self::MouseRelease(e) => &mut e.base,
            Self::MouseMove(e) => &mut e.base,
            Self::CaptureLost(e) => &mut e.base,
            Self::Resize(e) => &mut e.base,
        }
    }

    /// The widget-local pointer position, for pointer events.
    pub fn local_pos(&self) -> Option<Point> {
        match self {
            Self::MousePress(e) => Some(e.local_pos),
            Self::MouseRelease(e) => Some(e.local_pos),
            Self::MouseMove(e) => Some(e.local_pos),
            _ => None,
        }
    }

    /// Shift the local position by an offset (used when a container routes
    /// the event to a child).
    pub fn translate_local(&mut self, offset: Point) {
        match self {
            Self::MousePress(e) => e.local_pos = e.local_pos - offset,
            Self::MouseRelease(e) => e.local_pos = e.local_pos - offset,
            Self::MouseMove(e) => e.local_pos = e.local_pos - offset,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_ignore() {
        let mut event = WidgetEvent::CaptureLost(CaptureLostEvent::new());
        assert!(!event.base().is_accepted());
        event.base_mut().accept();
        assert!(event.base().is_accepted());
        event.base_mut().ignore();
        assert!(!event.base().is_accepted());
    }

    #[test]
    fn test_translate_local() {
        let press = MousePressEvent::new(
            MouseButton::Left,
            Point::new(50.0, 20.0),
            Point::new(50.0, 20.0),
            Point::new(50.0, 20.0),
            KeyboardModifiers::NONE,
        );
        let mut event = WidgetEvent::MousePress(press);
        event.translate_local(Point::new(40.0, 5.0));
        assert_eq!(event.local_pos(), Some(Point::new(10.0, 15.0)));
    }
}

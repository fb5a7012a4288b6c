//! Cursor shapes exposed by kit widgets.
//!
//! Widgets report a [`CursorShape`]; the embedding converts it to the
//! platform cursor via [`CursorShape::to_cursor_icon`].

use cursor_icon::CursorIcon;

/// The cursor shapes used by the kit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    /// The default arrow cursor.
    #[default]
    Arrow,
    /// An open hand, shown over draggable grips.
    Grab,
    /// A closed hand, shown while dragging.
    Grabbing,
    /// Horizontal resize arrows.
    ResizeHorizontal,
    /// Vertical resize arrows.
    ResizeVertical,
}

impl CursorShape {
    /// Convert to the platform-independent `cursor-icon` value.
    pub fn to_cursor_icon(self) -> CursorIcon {
        match self {
            Self::Arrow => CursorIcon::Default,
            Self::Grab => CursorIcon::Grab,
            Self::Grabbing => CursorIcon::Grabbing,
            Self::ResizeHorizontal => CursorIcon::EwResize,
            Self::ResizeVertical => CursorIcon::NsResize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_icon_mapping() {
        assert_eq!(CursorShape::Grab.to_cursor_icon(), CursorIcon::Grab);
        assert_eq!(CursorShape::Grabbing.to_cursor_icon(), CursorIcon::Grabbing);
        assert_eq!(CursorShape::Arrow.to_cursor_icon(), CursorIcon::Default);
    }
}

//! Toolbar item types.
//!
//! A [`ToolItem`] is the application-owned logical object placed into a
//! toolbar's item list. The kit never takes ownership of item semantics; it
//! only asks an item for its metrics and placement policy, and realizes a
//! container widget around it (see `widget::items`).

use trellis_core::Signal;

use crate::geometry::Size;
use crate::widget::geometry::SizeHint;

/// Placement policy for a toolbar item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowMode {
    /// The item moves between the main strip and the overflow surface as
    /// space permits.
    #[default]
    AsNeeded,
    /// The item is permanently placed in the overflow surface.
    Always,
    /// The item is never allowed to overflow.
    Never,
}

/// An application object hosted by a toolbar.
pub trait ToolItem: Send + Sync {
    /// The item's layout metrics.
    fn size_hint(&self) -> SizeHint;

    /// Whether this item is a visual separator. Separators participate in
    /// the main strip but are excluded from the overflow surface.
    fn is_separator(&self) -> bool {
        false
    }

    /// The item's initial overflow placement policy.
    fn overflow_mode(&self) -> OverflowMode {
        OverflowMode::AsNeeded
    }

    /// Whether activating this item behaves like a button click.
    fn is_activation_host(&self) -> bool {
        false
    }

    /// Whether this item hosts its own selection interaction (combo-style
    /// controls). Pointer releases over such an item inside the overflow
    /// surface are not hijacked by the toolbar.
    fn is_selection_host(&self) -> bool {
        false
    }

    /// Whether the item manages its own container lifetime. Containers of
    /// self-hosting items are not cleared when the item is removed.
    fn hosts_itself(&self) -> bool {
        false
    }
}

/// A plain text item with a fixed size.
pub struct LabelItem {
    text: String,
    size: Size,
}

impl LabelItem {
    /// Create a label item with explicit metrics.
    pub fn new(text: impl Into<String>, size: Size) -> Self {
        Self { text: text.into(), size }
    }

    /// The label text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl ToolItem for LabelItem {
    fn size_hint(&self) -> SizeHint {
        SizeHint::fixed(self.size)
    }
}

/// A clickable item, the common toolbar button.
pub struct ButtonItem {
    text: String,
    size: Size,
    mode: OverflowMode,
    /// Emitted when the button is activated.
    pub clicked: Signal<()>,
}

impl ButtonItem {
    /// Create a button item.
    pub fn new(text: impl Into<String>, size: Size) -> Self {
        Self {
            text: text.into(),
            size,
            mode: OverflowMode::AsNeeded,
            clicked: Signal::new(),
        }
    }

    /// Set the placement policy using the builder pattern.
    pub fn with_overflow_mode(mut self, mode: OverflowMode) -> Self {
        self.mode = mode;
        self
    }

    /// The button text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Activate the button.
    pub fn trigger(&self) {
        self.clicked.emit(());
    }
}

impl ToolItem for ButtonItem {
    fn size_hint(&self) -> SizeHint {
        SizeHint::fixed(self.size)
    }

    fn overflow_mode(&self) -> OverflowMode {
        self.mode
    }

    fn is_activation_host(&self) -> bool {
        true
    }
}

/// A thin visual separator.
pub struct SeparatorItem {
    thickness: f32,
    cross: f32,
}

impl SeparatorItem {
    /// Create a separator with the given main-axis thickness and cross
    /// extent.
    pub fn new(thickness: f32, cross: f32) -> Self {
        Self { thickness, cross }
    }
}

impl ToolItem for SeparatorItem {
    fn size_hint(&self) -> SizeHint {
        SizeHint::fixed(Size::new(self.thickness, self.cross))
    }

    fn is_separator(&self) -> bool {
        true
    }
}

/// A combo-style item that hosts its own selection interaction.
pub struct ChoiceItem {
    options: Vec<String>,
    size: Size,
    /// Emitted with the index of the newly selected option.
    pub selection_changed: Signal<usize>,
}

impl ChoiceItem {
    /// Create a choice item.
    pub fn new(options: Vec<String>, size: Size) -> Self {
        Self {
            options,
            size,
            selection_changed: Signal::new(),
        }
    }

    /// The selectable options.
    pub fn options(&self) -> &[String] {
        &self.options
    }
}

impl ToolItem for ChoiceItem {
    fn size_hint(&self) -> SizeHint {
        SizeHint::fixed(self.size)
    }

    fn is_selection_host(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policies() {
        let label = LabelItem::new("open", Size::new(40.0, 24.0));
        assert_eq!(label.overflow_mode(), OverflowMode::AsNeeded);
        assert!(!label.is_separator());
        assert!(!label.is_selection_host());

        let sep = SeparatorItem::new(4.0, 24.0);
        assert!(sep.is_separator());

        let choice = ChoiceItem::new(vec!["a".into()], Size::new(80.0, 24.0));
        assert!(choice.is_selection_host());
    }

    #[test]
    fn test_button_mode_and_click() {
        let button =
            ButtonItem::new("save", Size::new(40.0, 24.0)).with_overflow_mode(OverflowMode::Never);
        assert_eq!(button.overflow_mode(), OverflowMode::Never);
        assert!(button.is_activation_host());

        let clicked = std::sync::Arc::new(parking_lot::Mutex::new(false));
        let recv = clicked.clone();
        button.clicked.connect(move |()| *recv.lock() = true);
        button.trigger();
        assert!(*clicked.lock());
    }
}

//! The core [`Widget`] trait.

use trellis_core::{Object, ObjectId};

use crate::widget::base::WidgetBase;
use crate::widget::events::WidgetEvent;
use crate::widget::geometry::SizeHint;

/// The interface every control in the kit implements.
///
/// Widgets embed a [`WidgetBase`] and delegate identity, geometry and
/// state to it. Layout containers query [`Widget::size_hint`] during
/// measurement and assign geometry to the base during arrangement; input
/// hosts feed [`Widget::event`] with pointer events whose `local_pos` is
/// already in the widget's coordinate space.
pub trait Widget: Object {
    /// Shared access to the widget base.
    fn widget_base(&self) -> &WidgetBase;

    /// Mutable access to the widget base.
    fn widget_base_mut(&mut self) -> &mut WidgetBase;

    /// The widget's preferred/minimum/maximum sizes.
    fn size_hint(&self) -> SizeHint;

    /// Handle an event. Returns `true` if the event was handled.
    fn event(&mut self, _event: &mut WidgetEvent) -> bool {
        false
    }
}

/// Blanket helper: the object id of any widget.
pub fn widget_id(widget: &dyn Widget) -> ObjectId {
    widget.widget_base().object_id()
}

static_assertions::assert_obj_safe!(Widget);

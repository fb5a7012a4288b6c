//! Container realization and the generated-item mirror.
//!
//! A toolbar's panel does not lay out [`ToolItem`]s directly; it lays out
//! *containers*: realized [`ItemWidget`]s in 1:1 positional
//! correspondence with the item list. [`ContainerMirror`] owns that
//! generated list and keeps it synchronized as the source list is edited:
//! insertions realize new containers through a [`ContainerFactory`],
//! removals detach and clear them, replace and move are handled as
//! remove-then-insert, and a reset tears everything down and rebuilds.
//!
//! The mirror also owns the per-container placement state: the
//! [`OverflowMode`] policy and the overflow flag the panel's measure pass
//! computes. Both are keyed by container identity so external code can
//! query them with only an [`ObjectId`].

use std::sync::Arc;

use trellis_core::{Object, ObjectId, Signal};
use trellis_core::logging::targets;

use crate::model::{OverflowMode, ToolItem, ToolItemList};
use crate::widget::base::WidgetBase;
use crate::widget::geometry::SizeHint;
use crate::widget::traits::Widget;

/// A realized control standing in for one logical item.
pub trait ItemWidget: Widget {
    /// The hosted logical item.
    fn tool_item(&self) -> &Arc<dyn ToolItem>;

    /// Whether this container renders a separator.
    fn is_separator(&self) -> bool {
        self.tool_item().is_separator()
    }

    /// Whether activating this container behaves like a button click.
    fn is_activation_host(&self) -> bool {
        self.tool_item().is_activation_host()
    }

    /// Whether this container hosts its own selection interaction.
    fn is_selection_host(&self) -> bool {
        self.tool_item().is_selection_host()
    }
}

/// Realizes containers for logical items and tracks their lifecycle.
///
/// The mirror is a pure consumer of this capability set: it asks whether a
/// fresh container is needed, creates and prepares it, is told when the
/// container's position shifts, and clears it on removal.
pub trait ContainerFactory: Send + Sync {
    /// Whether `item` needs a newly created container. Items that manage
    /// their own container lifetime answer `false`; their containers are
    /// realized but never cleared by the mirror.
    fn needs_container(&self, item: &Arc<dyn ToolItem>, _index: usize) -> bool {
        !item.hosts_itself()
    }

    /// Create the container for an item.
    fn create_container(&self, item: &Arc<dyn ToolItem>, index: usize) -> Box<dyn ItemWidget>;

    /// Prepare a freshly created container before it enters the mirror.
    fn prepare_container(
        &self,
        _container: &mut dyn ItemWidget,
        _item: &Arc<dyn ToolItem>,
        _index: usize,
    ) {
    }

    /// Notification that a prepared container is now live at `index`.
    fn container_prepared(&self, _id: ObjectId, _index: usize) {}

    /// Release resources held by a generated container.
    fn clear_container(&self, _container: &mut dyn ItemWidget) {}

    /// Notification that a container's position in the list changed.
    fn container_index_changed(
        &self,
        _container: &mut dyn ItemWidget,
        _old_index: usize,
        _new_index: usize,
    ) {
    }
}

/// The default container: a thin widget wrapping the item's metrics.
pub struct ToolItemHost {
    base: WidgetBase,
    item: Arc<dyn ToolItem>,
}

impl ToolItemHost {
    /// Wrap an item.
    pub fn new(item: Arc<dyn ToolItem>) -> Self {
        Self {
            base: WidgetBase::new::<Self>(),
            item,
        }
    }
}

impl Object for ToolItemHost {
    fn object_id(&self) -> ObjectId {
        self.base.object_id()
    }
}

impl Widget for ToolItemHost {
    fn widget_base(&self) -> &WidgetBase {
        &self.base
    }

    fn widget_base_mut(&mut self) -> &mut WidgetBase {
        &mut self.base
    }

    fn size_hint(&self) -> SizeHint {
        self.item.size_hint()
    }
}

impl ItemWidget for ToolItemHost {
    fn tool_item(&self) -> &Arc<dyn ToolItem> {
        &self.item
    }
}

/// The default [`ContainerFactory`], realizing [`ToolItemHost`]s.
#[derive(Default)]
pub struct HostFactory;

impl ContainerFactory for HostFactory {
    fn create_container(&self, item: &Arc<dyn ToolItem>, _index: usize) -> Box<dyn ItemWidget> {
        Box::new(ToolItemHost::new(item.clone()))
    }
}

/// Which surface currently hosts a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    /// Not attached to either surface yet.
    #[default]
    Detached,
    /// Hosted in the main strip.
    Main,
    /// Hosted in the overflow surface.
    Overflow,
}

/// One generated container plus its placement state.
pub struct ContainerEntry {
    pub(crate) widget: Box<dyn ItemWidget>,
    /// True when the item manages the container's lifetime itself.
    self_hosted: bool,
    pub(crate) placement: Placement,
    pub(crate) overflow_mode: OverflowMode,
    pub(crate) overflow_flag: bool,
}

impl ContainerEntry {
    /// The container's object id.
    pub fn id(&self) -> ObjectId {
        self.widget.widget_base().object_id()
    }

    /// The container widget.
    pub fn widget(&self) -> &dyn ItemWidget {
        self.widget.as_ref()
    }

    /// Current surface.
    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Current overflow flag.
    pub fn is_overflow_item(&self) -> bool {
        self.overflow_flag
    }

    /// Current overflow policy.
    pub fn overflow_mode(&self) -> OverflowMode {
        self.overflow_mode
    }
}

/// The generated list of containers mirroring a [`ToolItemList`].
pub struct ContainerMirror {
    factory: Arc<dyn ContainerFactory>,
    entries: Vec<ContainerEntry>,
    /// Emitted after any structural change to the generated list.
    pub changed: Signal<()>,
}

impl ContainerMirror {
    /// Create an empty mirror using the given factory.
    pub fn new(factory: Arc<dyn ContainerFactory>) -> Self {
        Self {
            factory,
            entries: Vec::new(),
            changed: Signal::new(),
        }
    }

    /// Number of generated containers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mirror is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in source order.
    pub fn entries(&self) -> &[ContainerEntry] {
        &self.entries
    }

    /// Mutable access to the entries, for the measuring panel.
    pub(crate) fn entries_mut(&mut self) -> &mut [ContainerEntry] {
        &mut self.entries
    }

    /// The container id at `index`.
    pub fn id_at(&self, index: usize) -> Option<ObjectId> {
        self.entries.get(index).map(ContainerEntry::id)
    }

    /// The index of a container by id.
    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Realize and insert containers for `source[first..=last]`.
    pub fn insert_from(&mut self, source: &ToolItemList, first: usize, last: usize) {
        for index in first..=last {
            let Some(item) = source.item(index) else { break };
            self.insert_container(&item, index);
        }

        // Containers after the inserted range shifted right.
        let inserted = last - first + 1;
        for index in (last + 1)..self.entries.len() {
            let entry = &mut self.entries[index];
            self.factory
                .container_index_changed(entry.widget.as_mut(), index - inserted, index);
        }

        tracing::debug!(target: targets::MIRROR, first, last, len = self.entries.len(), "inserted");
        self.changed.emit(());
    }

    fn insert_container(&mut self, item: &Arc<dyn ToolItem>, index: usize) {
        let self_hosted = !self.factory.needs_container(item, index);
        let mut widget = self.factory.create_container(item, index);
        self.factory.prepare_container(widget.as_mut(), item, index);
        let id = widget.widget_base().object_id();

        self.entries.insert(
            index,
            ContainerEntry {
                widget,
                self_hosted,
                placement: Placement::Detached,
                overflow_mode: item.overflow_mode(),
                overflow_flag: false,
            },
        );

        self.factory.container_prepared(id, index);
    }

    /// Remove `count` containers starting at `index`.
    ///
    /// Each removed container is detached from whichever surface hosts it
    /// and, unless self-hosted, cleared through the factory.
    pub fn remove_range(&mut self, index: usize, count: usize) {
        if count == 0 || index >= self.entries.len() {
            return;
        }
        let count = count.min(self.entries.len() - index);

        for mut entry in self.entries.drain(index..index + count) {
            entry.placement = Placement::Detached;
            if !entry.self_hosted {
                self.factory.clear_container(entry.widget.as_mut());
            }
        }

        // Containers after the removed range shifted left.
        for i in index..self.entries.len() {
            let entry = &mut self.entries[i];
            self.factory
                .container_index_changed(entry.widget.as_mut(), i + count, i);
        }

        tracing::debug!(target: targets::MIRROR, index, count, len = self.entries.len(), "removed");
        self.changed.emit(());
    }

    /// Handle a replace edit: remove then re-insert at the same position.
    pub fn replace_from(&mut self, source: &ToolItemList, first: usize, last: usize) {
        self.remove_range(first, last - first + 1);
        self.insert_from(source, first, last);
    }

    /// Handle a move edit: remove then insert at the destination.
    pub fn move_from(&mut self, source: &ToolItemList, first: usize, last: usize, dest: usize) {
        let count = last - first + 1;
        self.remove_range(first, count);
        self.insert_from(source, dest, dest + count - 1);
    }

    /// Full teardown followed by a rebuild from the current source list.
    pub fn reset_from(&mut self, source: &ToolItemList) {
        self.clear_all();
        if !source.is_empty() {
            self.insert_from(source, 0, source.len() - 1);
        } else {
            self.changed.emit(());
        }
    }

    /// Detach and clear every generated container.
    pub fn clear_all(&mut self) {
        for mut entry in self.entries.drain(..) {
            entry.placement = Placement::Detached;
            if !entry.self_hosted {
                self.factory.clear_container(entry.widget.as_mut());
            }
        }
        tracing::debug!(target: targets::MIRROR, "cleared");
    }

    // =========================================================================
    // Placement state
    // =========================================================================

    /// The overflow policy of a container.
    pub fn overflow_mode(&self, id: ObjectId) -> Option<OverflowMode> {
        self.index_of(id).map(|i| self.entries[i].overflow_mode)
    }

    /// Set the overflow policy of a container. Returns `true` on change.
    pub fn set_overflow_mode(&mut self, id: ObjectId, mode: OverflowMode) -> bool {
        match self.index_of(id) {
            Some(i) if self.entries[i].overflow_mode != mode => {
                self.entries[i].overflow_mode = mode;
                true
            }
            _ => false,
        }
    }

    /// Whether a container currently renders in the overflow surface.
    pub fn is_overflow_item(&self, id: ObjectId) -> bool {
        self.index_of(id).is_some_and(|i| self.entries[i].overflow_flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::model::{ButtonItem, LabelItem, SeparatorItem};
    use parking_lot::Mutex;
    use trellis_core::init_global_registry;

    fn setup() -> (Arc<ToolItemList>, ContainerMirror) {
        init_global_registry();
        (Arc::new(ToolItemList::new()), ContainerMirror::new(Arc::new(HostFactory)))
    }

    fn label(text: &str) -> Arc<dyn ToolItem> {
        Arc::new(LabelItem::new(text, Size::new(40.0, 24.0)))
    }

    fn mirror_matches(source: &ToolItemList, mirror: &ContainerMirror) -> bool {
        source.len() == mirror.len()
            && mirror.entries().iter().enumerate().all(|(i, e)| {
                let src = source.item(i).unwrap();
                Arc::ptr_eq(e.widget().tool_item(), &src)
            })
    }

    #[test]
    fn test_insert_creates_containers_in_order() {
        let (source, mut mirror) = setup();
        source.insert_many(0, vec![label("a"), label("b"), label("c")]);
        mirror.insert_from(&source, 0, 2);

        assert!(mirror_matches(&source, &mirror));
        assert!(mirror.entries().iter().all(|e| e.placement() == Placement::Detached));
    }

    #[test]
    fn test_remove_clears_containers() {
        struct CountingFactory {
            cleared: Arc<Mutex<usize>>,
        }
        impl ContainerFactory for CountingFactory {
            fn create_container(
                &self,
                item: &Arc<dyn ToolItem>,
                _index: usize,
            ) -> Box<dyn ItemWidget> {
                Box::new(ToolItemHost::new(item.clone()))
            }
            fn clear_container(&self, _container: &mut dyn ItemWidget) {
                *self.cleared.lock() += 1;
            }
        }

        init_global_registry();
        let cleared = Arc::new(Mutex::new(0));
        let source = Arc::new(ToolItemList::new());
        let mut mirror = ContainerMirror::new(Arc::new(CountingFactory { cleared: cleared.clone() }));

        source.insert_many(0, vec![label("a"), label("b"), label("c")]);
        mirror.insert_from(&source, 0, 2);

        source.remove_range(0, 2);
        mirror.remove_range(0, 2);

        assert_eq!(*cleared.lock(), 2);
        assert!(mirror_matches(&source, &mirror));
    }

    #[test]
    fn test_replace_is_remove_then_insert() {
        let (source, mut mirror) = setup();
        source.insert_many(0, vec![label("a"), label("b")]);
        mirror.insert_from(&source, 0, 1);
        let old_id = mirror.id_at(1).unwrap();

        source.replace(1, label("b2"));
        mirror.replace_from(&source, 1, 1);

        assert!(mirror_matches(&source, &mirror));
        assert_ne!(mirror.id_at(1), Some(old_id));
    }

    #[test]
    fn test_move_keeps_positional_correspondence() {
        let (source, mut mirror) = setup();
        source.insert_many(0, vec![label("a"), label("b"), label("c")]);
        mirror.insert_from(&source, 0, 2);

        source.move_item(0, 2);
        mirror.move_from(&source, 0, 0, 2);

        assert!(mirror_matches(&source, &mirror));
    }

    #[test]
    fn test_reset_rebuilds() {
        let (source, mut mirror) = setup();
        source.insert_many(0, vec![label("a"), label("b")]);
        mirror.insert_from(&source, 0, 1);

        source.set_items(vec![label("x")]);
        mirror.reset_from(&source);

        assert!(mirror_matches(&source, &mirror));

        source.clear();
        mirror.reset_from(&source);
        assert!(mirror.is_empty());
    }

    #[test]
    fn test_random_edit_sequence_stays_synchronized() {
        let (source, mut mirror) = setup();

        source.insert_many(0, vec![label("a"), label("b"), label("c"), label("d")]);
        mirror.insert_from(&source, 0, 3);

        source.insert(2, label("e"));
        mirror.insert_from(&source, 2, 2);
        assert!(mirror_matches(&source, &mirror));

        source.remove(0);
        mirror.remove_range(0, 1);
        assert!(mirror_matches(&source, &mirror));

        source.move_item(3, 1);
        mirror.move_from(&source, 3, 3, 1);
        assert!(mirror_matches(&source, &mirror));

        source.replace(2, label("f"));
        mirror.replace_from(&source, 2, 2);
        assert!(mirror_matches(&source, &mirror));

        source.set_items(vec![label("z")]);
        mirror.reset_from(&source);
        assert!(mirror_matches(&source, &mirror));
    }

    #[test]
    fn test_index_notifications() {
        struct IndexFactory {
            log: Arc<Mutex<Vec<(usize, usize)>>>,
        }
        impl ContainerFactory for IndexFactory {
            fn create_container(
                &self,
                item: &Arc<dyn ToolItem>,
                _index: usize,
            ) -> Box<dyn ItemWidget> {
                Box::new(ToolItemHost::new(item.clone()))
            }
            fn container_index_changed(
                &self,
                _container: &mut dyn ItemWidget,
                old_index: usize,
                new_index: usize,
            ) {
                self.log.lock().push((old_index, new_index));
            }
        }

        init_global_registry();
        let log = Arc::new(Mutex::new(Vec::new()));
        let source = Arc::new(ToolItemList::new());
        let mut mirror = ContainerMirror::new(Arc::new(IndexFactory { log: log.clone() }));

        source.insert_many(0, vec![label("a"), label("b"), label("c")]);
        mirror.insert_from(&source, 0, 2);

        // Insert at the front: b and c shift from 1->2 and 2->3... i.e.
        // previous indices 0,1,2 become 1,2,3 for the shifted tail.
        log.lock().clear();
        source.insert(0, label("x"));
        mirror.insert_from(&source, 0, 0);
        assert_eq!(*log.lock(), vec![(0, 1), (1, 2), (2, 3)]);

        log.lock().clear();
        source.remove(0);
        mirror.remove_range(0, 1);
        assert_eq!(*log.lock(), vec![(1, 0), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_overflow_mode_side_table() {
        let (source, mut mirror) = setup();
        source.push(Arc::new(
            ButtonItem::new("pin", Size::new(30.0, 24.0)).with_overflow_mode(OverflowMode::Never),
        ));
        source.push(label("plain"));
        mirror.insert_from(&source, 0, 1);

        let pinned = mirror.id_at(0).unwrap();
        let plain = mirror.id_at(1).unwrap();

        assert_eq!(mirror.overflow_mode(pinned), Some(OverflowMode::Never));
        assert_eq!(mirror.overflow_mode(plain), Some(OverflowMode::AsNeeded));

        assert!(mirror.set_overflow_mode(plain, OverflowMode::Always));
        assert!(!mirror.set_overflow_mode(plain, OverflowMode::Always));
        assert_eq!(mirror.overflow_mode(plain), Some(OverflowMode::Always));
        assert!(!mirror.is_overflow_item(plain));
    }

    #[test]
    fn test_separator_containers() {
        let (source, mut mirror) = setup();
        source.push(Arc::new(SeparatorItem::new(4.0, 24.0)));
        mirror.insert_from(&source, 0, 0);
        assert!(mirror.entries()[0].widget().is_separator());
    }
}

//! The observable toolbar item list.
//!
//! [`ToolItemList`] is the ordered, application-owned sequence of logical
//! items behind a toolbar. Every edit is announced through paired
//! before/after signals so the toolbar's container mirror can stay
//! positionally synchronized; the mutation itself runs between the pair,
//! inside the `emit_*` wrappers of [`ListSignals`].

use std::sync::Arc;

use parking_lot::RwLock;

use super::item::ToolItem;

/// Change-notification signals for [`ToolItemList`].
///
/// Index arguments are `(first, last)` inclusive ranges. For moves the
/// third value is the destination index measured after the removal.
pub struct ListSignals {
    /// Emitted just before items are inserted.
    pub items_about_to_be_inserted: trellis_core::Signal<(usize, usize)>,
    /// Emitted after items have been inserted.
    pub items_inserted: trellis_core::Signal<(usize, usize)>,

    /// Emitted just before items are removed.
    pub items_about_to_be_removed: trellis_core::Signal<(usize, usize)>,
    /// Emitted after items have been removed.
    pub items_removed: trellis_core::Signal<(usize, usize)>,

    /// Emitted after items in an existing range are replaced.
    pub items_replaced: trellis_core::Signal<(usize, usize)>,

    /// Emitted after items are moved. Args: (first, last, destination).
    pub items_moved: trellis_core::Signal<(usize, usize, usize)>,

    /// Emitted just before the whole list is reset.
    pub list_about_to_reset: trellis_core::Signal<()>,
    /// Emitted after the whole list has been reset.
    pub list_reset: trellis_core::Signal<()>,
}

impl ListSignals {
    /// Create a fresh signal set.
    pub fn new() -> Self {
        Self {
            items_about_to_be_inserted: trellis_core::Signal::new(),
            items_inserted: trellis_core::Signal::new(),
            items_about_to_be_removed: trellis_core::Signal::new(),
            items_removed: trellis_core::Signal::new(),
            items_replaced: trellis_core::Signal::new(),
            items_moved: trellis_core::Signal::new(),
            list_about_to_reset: trellis_core::Signal::new(),
            list_reset: trellis_core::Signal::new(),
        }
    }

    /// Run an insertion between the paired insertion signals.
    pub fn emit_items_inserted<F: FnOnce()>(&self, first: usize, last: usize, insert_fn: F) {
        self.items_about_to_be_inserted.emit((first, last));
        insert_fn();
        self.items_inserted.emit((first, last));
    }

    /// Run a removal between the paired removal signals.
    pub fn emit_items_removed<F: FnOnce()>(&self, first: usize, last: usize, remove_fn: F) {
        self.items_about_to_be_removed.emit((first, last));
        remove_fn();
        self.items_removed.emit((first, last));
    }

    /// Run a reset between the paired reset signals.
    pub fn emit_reset<F: FnOnce()>(&self, reset_fn: F) {
        self.list_about_to_reset.emit(());
        reset_fn();
        self.list_reset.emit(());
    }
}

impl Default for ListSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// An ordered, observable list of [`ToolItem`]s.
///
/// The list is shared: the application holds an `Arc` and mutates it; the
/// owning toolbar's panel holds another and reacts to the signals. All
/// mutation is synchronous.
pub struct ToolItemList {
    items: RwLock<Vec<Arc<dyn ToolItem>>>,
    signals: ListSignals,
}

impl ToolItemList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            signals: ListSignals::new(),
        }
    }

    /// Create a list with initial items.
    pub fn with_items(items: Vec<Arc<dyn ToolItem>>) -> Self {
        Self {
            items: RwLock::new(items),
            signals: ListSignals::new(),
        }
    }

    /// The list's change signals.
    pub fn signals(&self) -> &ListSignals {
        &self.signals
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// The item at `index`, if any.
    pub fn item(&self, index: usize) -> Option<Arc<dyn ToolItem>> {
        self.items.read().get(index).cloned()
    }

    /// A snapshot of all items.
    pub fn items(&self) -> Vec<Arc<dyn ToolItem>> {
        self.items.read().clone()
    }

    /// Append an item.
    pub fn push(&self, item: Arc<dyn ToolItem>) {
        let index = self.len();
        self.signals.emit_items_inserted(index, index, || {
            self.items.write().push(item);
        });
    }

    /// Insert an item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index > len()`.
    pub fn insert(&self, index: usize, item: Arc<dyn ToolItem>) {
        self.signals.emit_items_inserted(index, index, || {
            self.items.write().insert(index, item);
        });
    }

    /// Insert several items starting at `index`.
    pub fn insert_many(&self, index: usize, items: Vec<Arc<dyn ToolItem>>) {
        if items.is_empty() {
            return;
        }
        let last = index + items.len() - 1;
        self.signals.emit_items_inserted(index, last, || {
            let mut guard = self.items.write();
            for (offset, item) in items.into_iter().enumerate() {
                guard.insert(index + offset, item);
            }
        });
    }

    /// Remove and return the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn remove(&self, index: usize) -> Arc<dyn ToolItem> {
        let mut removed = None;
        self.signals.emit_items_removed(index, index, || {
            removed = Some(self.items.write().remove(index));
        });
        removed.unwrap()
    }

    /// Remove `count` items starting at `index`.
    pub fn remove_range(&self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.signals.emit_items_removed(index, index + count - 1, || {
            self.items.write().drain(index..index + count);
        });
    }

    /// Replace the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn replace(&self, index: usize, item: Arc<dyn ToolItem>) {
        {
            let mut guard = self.items.write();
            guard[index] = item;
        }
        self.signals.items_replaced.emit((index, index));
    }

    /// Move the item at `from` so it ends up at index `to` (measured after
    /// the removal).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn move_item(&self, from: usize, to: usize) {
        if from == to {
            return;
        }
        {
            let mut guard = self.items.write();
            let item = guard.remove(from);
            guard.insert(to, item);
        }
        self.signals.items_moved.emit((from, from, to));
    }

    /// Replace the whole contents.
    pub fn set_items(&self, items: Vec<Arc<dyn ToolItem>>) {
        self.signals.emit_reset(|| {
            *self.items.write() = items;
        });
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.signals.emit_reset(|| {
            self.items.write().clear();
        });
    }
}

impl Default for ToolItemList {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;
    use crate::model::item::LabelItem;
    use parking_lot::Mutex;

    fn label(text: &str) -> Arc<dyn ToolItem> {
        Arc::new(LabelItem::new(text, Size::new(40.0, 24.0)))
    }

    #[test]
    fn test_push_insert_remove() {
        let list = ToolItemList::new();
        list.push(label("a"));
        list.push(label("c"));
        list.insert(1, label("b"));
        assert_eq!(list.len(), 3);

        list.remove(0);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_insert_signals_pairing() {
        let list = ToolItemList::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let recv = log.clone();
        list.signals().items_about_to_be_inserted.connect(move |&(first, last)| {
            recv.lock().push(("before", first, last));
        });
        let recv = log.clone();
        list.signals().items_inserted.connect(move |&(first, last)| {
            recv.lock().push(("after", first, last));
        });

        list.insert_many(0, vec![label("a"), label("b")]);

        assert_eq!(*log.lock(), vec![("before", 0, 1), ("after", 0, 1)]);
    }

    #[test]
    fn test_remove_range_signal() {
        let list = ToolItemList::with_items(vec![label("a"), label("b"), label("c")]);
        let ranges = Arc::new(Mutex::new(Vec::new()));

        let recv = ranges.clone();
        list.signals().items_removed.connect(move |&(first, last)| {
            recv.lock().push((first, last));
        });

        list.remove_range(1, 2);
        assert_eq!(list.len(), 1);
        assert_eq!(*ranges.lock(), vec![(1, 2)]);
    }

    #[test]
    fn test_move_item() {
        fn sized(width: f32) -> Arc<dyn ToolItem> {
            Arc::new(LabelItem::new("i", Size::new(width, 24.0)))
        }

        let list = ToolItemList::with_items(vec![sized(10.0), sized(20.0), sized(30.0)]);
        let moved = Arc::new(Mutex::new(None));

        let recv = moved.clone();
        list.signals().items_moved.connect(move |&args| {
            *recv.lock() = Some(args);
        });

        // The destination index is measured after the removal.
        list.move_item(0, 2);
        assert_eq!(*moved.lock(), Some((0, 0, 2)));

        let widths: Vec<f32> = list
            .items()
            .iter()
            .map(|i| i.size_hint().preferred.width)
            .collect();
        assert_eq!(widths, vec![20.0, 30.0, 10.0]);
    }

    #[test]
    fn test_reset_signals() {
        let list = ToolItemList::with_items(vec![label("a")]);
        let reset = Arc::new(Mutex::new(false));

        let recv = reset.clone();
        list.signals().list_reset.connect(move |()| *recv.lock() = true);

        list.set_items(vec![label("x"), label("y")]);
        assert!(*reset.lock());
        assert_eq!(list.len(), 2);

        list.clear();
        assert!(list.is_empty());
    }
}

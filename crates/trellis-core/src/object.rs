//! Object model for Trellis.
//!
//! Every control in the kit is an *object*: it has a unique [`ObjectId`], an
//! optional name, and a place in a parent/child tree. The tree is stored in
//! a process-global [`ObjectRegistry`] rather than inside the objects
//! themselves, so identity and ancestry queries work from any component that
//! only holds an id.
//!
//! Types embed an [`ObjectBase`] (which registers on construction and
//! unregisters on drop) and implement the [`Object`] trait by delegating to
//! it.
//!
//! # Example
//!
//! ```
//! use trellis_core::{init_global_registry, Object, ObjectBase, ObjectId};
//!
//! init_global_registry();
//!
//! struct Band {
//!     base: ObjectBase,
//! }
//!
//! impl Band {
//!     fn new() -> Self {
//!         Self { base: ObjectBase::new::<Self>() }
//!     }
//! }
//!
//! impl Object for Band {
//!     fn object_id(&self) -> ObjectId {
//!         self.base.id()
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;

use parking_lot::{Mutex, RwLock};
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a registered object.
    ///
    /// Ids are never reused within the lifetime of a registry generation;
    /// looking up a destroyed object's id fails with
    /// [`ObjectError::NotFound`].
    pub struct ObjectId;
}

/// Errors raised by registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    /// The global registry has not been initialized.
    RegistryNotInitialized,
    /// The object id does not refer to a live object.
    NotFound,
    /// Re-parenting would create a cycle in the object tree.
    ParentCycle,
}

impl fmt::Display for ObjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegistryNotInitialized => {
                write!(f, "Object registry not initialized. Call init_global_registry() first")
            }
            Self::NotFound => write!(f, "Object not found in registry"),
            Self::ParentCycle => write!(f, "Setting this parent would create a cycle"),
        }
    }
}

impl std::error::Error for ObjectError {}

/// Result alias for registry operations.
pub type ObjectResult<T> = Result<T, ObjectError>;

/// Per-object record kept by the registry.
struct ObjectData {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
}

/// The object tree: id allocation, names, and parent/child links.
///
/// The registry is the single owner of tree structure. Objects themselves
/// only carry their id; all structural queries and mutations go through
/// here.
pub struct ObjectRegistry {
    objects: SlotMap<ObjectId, ObjectData>,
}

impl ObjectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    /// Register a new object of type `T` and return its id.
    pub fn register<T: Object + 'static>(&mut self) -> ObjectId {
        let id = self.objects.insert(ObjectData {
            name: String::new(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            parent: None,
            children: Vec::new(),
        });
        tracing::trace!(target: targets::OBJECT, ?id, ty = std::any::type_name::<T>(), "registered");
        id
    }

    /// Destroy an object.
    ///
    /// The object is detached from its parent and its children become
    /// roots. Child objects are not destroyed; their own `ObjectBase` drop
    /// handles that.
    pub fn destroy(&mut self, id: ObjectId) -> ObjectResult<()> {
        let data = self.objects.remove(id).ok_or(ObjectError::NotFound)?;

        if let Some(parent) = data.parent {
            if let Some(parent_data) = self.objects.get_mut(parent) {
                parent_data.children.retain(|&c| c != id);
            }
        }
        for child in data.children {
            if let Some(child_data) = self.objects.get_mut(child) {
                child_data.parent = None;
            }
        }

        tracing::trace!(target: targets::OBJECT, ?id, "destroyed");
        Ok(())
    }

    /// Check whether an id refers to a live object.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of live objects.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Re-parent an object. `None` detaches it.
    ///
    /// Fails with [`ObjectError::ParentCycle`] if `new_parent` is the
    /// object itself or one of its descendants.
    pub fn set_parent(&mut self, id: ObjectId, new_parent: Option<ObjectId>) -> ObjectResult<()> {
        if !self.objects.contains_key(id) {
            return Err(ObjectError::NotFound);
        }

        if let Some(parent) = new_parent {
            if !self.objects.contains_key(parent) {
                return Err(ObjectError::NotFound);
            }
            // Walking up from the candidate parent must not reach `id`.
            let mut current = Some(parent);
            while let Some(c) = current {
                if c == id {
                    return Err(ObjectError::ParentCycle);
                }
                current = self.objects[c].parent;
            }
        }

        let old_parent = self.objects[id].parent;
        if old_parent == new_parent {
            return Ok(());
        }

        if let Some(old) = old_parent {
            if let Some(old_data) = self.objects.get_mut(old) {
                old_data.children.retain(|&c| c != id);
            }
        }
        if let Some(new) = new_parent {
            self.objects[new].children.push(id);
        }
        self.objects[id].parent = new_parent;
        Ok(())
    }

    /// Get an object's parent id.
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.objects.get(id).map(|d| d.parent).ok_or(ObjectError::NotFound)
    }

    /// Get an object's children, in insertion order.
    pub fn children(&self, id: ObjectId) -> ObjectResult<&[ObjectId]> {
        self.objects
            .get(id)
            .map(|d| d.children.as_slice())
            .ok_or(ObjectError::NotFound)
    }

    /// Get an object's name.
    pub fn object_name(&self, id: ObjectId) -> ObjectResult<&str> {
        self.objects.get(id).map(|d| d.name.as_str()).ok_or(ObjectError::NotFound)
    }

    /// Set an object's name.
    pub fn set_object_name(&mut self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.objects.get_mut(id).map(|d| d.name = name).ok_or(ObjectError::NotFound)
    }

    /// Get an object's registered type name.
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        self.objects.get(id).map(|d| d.type_name).ok_or(ObjectError::NotFound)
    }

    /// Get an object's registered [`TypeId`].
    pub fn type_id(&self, id: ObjectId) -> ObjectResult<TypeId> {
        self.objects.get(id).map(|d| d.type_id).ok_or(ObjectError::NotFound)
    }

    /// Find a direct child by name.
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        let data = self.objects.get(id).ok_or(ObjectError::NotFound)?;
        Ok(data
            .children
            .iter()
            .copied()
            .find(|&c| self.objects.get(c).is_some_and(|d| d.name == name)))
    }

    /// All ancestors of an object, nearest first.
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        if !self.objects.contains_key(id) {
            return Err(ObjectError::NotFound);
        }
        let mut result = Vec::new();
        let mut current = self.objects[id].parent;
        while let Some(c) = current {
            result.push(c);
            current = self.objects.get(c).and_then(|d| d.parent);
        }
        Ok(result)
    }

    /// Check whether `ancestor` is on `id`'s parent chain.
    pub fn is_ancestor_of(&self, ancestor: ObjectId, id: ObjectId) -> ObjectResult<bool> {
        Ok(self.ancestors(id)?.contains(&ancestor))
    }
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe wrapper over [`ObjectRegistry`].
pub struct SharedObjectRegistry {
    inner: RwLock<ObjectRegistry>,
}

impl SharedObjectRegistry {
    /// Create an empty shared registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ObjectRegistry::new()),
        }
    }

    /// See [`ObjectRegistry::register`].
    pub fn register<T: Object + 'static>(&self) -> ObjectId {
        self.inner.write().register::<T>()
    }

    /// See [`ObjectRegistry::destroy`].
    pub fn destroy(&self, id: ObjectId) -> ObjectResult<()> {
        self.inner.write().destroy(id)
    }

    /// See [`ObjectRegistry::contains`].
    pub fn contains(&self, id: ObjectId) -> bool {
        self.inner.read().contains(id)
    }

    /// See [`ObjectRegistry::object_count`].
    pub fn object_count(&self) -> usize {
        self.inner.read().object_count()
    }

    /// See [`ObjectRegistry::set_parent`].
    pub fn set_parent(&self, id: ObjectId, parent: Option<ObjectId>) -> ObjectResult<()> {
        self.inner.write().set_parent(id, parent)
    }

    /// See [`ObjectRegistry::parent`].
    pub fn parent(&self, id: ObjectId) -> ObjectResult<Option<ObjectId>> {
        self.inner.read().parent(id)
    }

    /// See [`ObjectRegistry::children`].
    pub fn children(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().children(id).map(|c| c.to_vec())
    }

    /// See [`ObjectRegistry::object_name`].
    pub fn object_name(&self, id: ObjectId) -> ObjectResult<String> {
        self.inner.read().object_name(id).map(str::to_owned)
    }

    /// See [`ObjectRegistry::set_object_name`].
    pub fn set_object_name(&self, id: ObjectId, name: String) -> ObjectResult<()> {
        self.inner.write().set_object_name(id, name)
    }

    /// See [`ObjectRegistry::type_name`].
    pub fn type_name(&self, id: ObjectId) -> ObjectResult<&'static str> {
        self.inner.read().type_name(id)
    }

    /// See [`ObjectRegistry::find_child_by_name`].
    pub fn find_child_by_name(&self, id: ObjectId, name: &str) -> ObjectResult<Option<ObjectId>> {
        self.inner.read().find_child_by_name(id, name)
    }

    /// See [`ObjectRegistry::ancestors`].
    pub fn ancestors(&self, id: ObjectId) -> ObjectResult<Vec<ObjectId>> {
        self.inner.read().ancestors(id)
    }

    /// See [`ObjectRegistry::is_ancestor_of`].
    pub fn is_ancestor_of(&self, ancestor: ObjectId, id: ObjectId) -> ObjectResult<bool> {
        self.inner.read().is_ancestor_of(ancestor, id)
    }
}

impl Default for SharedObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global object registry (lazy initialized).
static GLOBAL_REGISTRY: Mutex<Option<SharedObjectRegistry>> = Mutex::new(None);

/// Initialize the global object registry.
///
/// Idempotent; safe to call from every test and embedding.
pub fn init_global_registry() {
    let mut guard = GLOBAL_REGISTRY.lock();
    if guard.is_none() {
        *guard = Some(SharedObjectRegistry::new());
    }
}

/// Get a reference to the global object registry.
///
/// Returns an error if the registry hasn't been initialized.
pub fn global_registry() -> ObjectResult<&'static SharedObjectRegistry> {
    let guard = GLOBAL_REGISTRY.lock();
    if guard.is_some() {
        // SAFETY: The Option is never set back to None once initialized,
        // and the static is never moved or deallocated.
        Ok(unsafe {
            let ptr = guard.as_ref().unwrap() as *const SharedObjectRegistry;
            &*ptr
        })
    } else {
        Err(ObjectError::RegistryNotInitialized)
    }
}

/// The base trait that all kit objects implement.
pub trait Object: Any + Send + Sync {
    /// Get this object's unique identifier.
    fn object_id(&self) -> ObjectId;
}

/// Helper for implementing [`Object`]: registers on construction,
/// unregisters on drop.
pub struct ObjectBase {
    id: ObjectId,
}

impl ObjectBase {
    /// Create a new `ObjectBase`, registering the object globally.
    ///
    /// # Panics
    ///
    /// Panics if the global registry is not initialized.
    pub fn new<T: Object + 'static>() -> Self {
        let registry = global_registry().expect("Object registry not initialized");
        let id = registry.register::<T>();
        Self { id }
    }

    /// The object's id.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The object's name from the registry.
    pub fn name(&self) -> String {
        global_registry()
            .and_then(|r| r.object_name(self.id))
            .unwrap_or_default()
    }

    /// Set the object's name in the registry.
    pub fn set_name(&self, name: impl Into<String>) {
        if let Ok(registry) = global_registry() {
            let _ = registry.set_object_name(self.id, name.into());
        }
    }

    /// The parent object id, if any.
    pub fn parent(&self) -> Option<ObjectId> {
        global_registry()
            .and_then(|r| r.parent(self.id))
            .ok()
            .flatten()
    }

    /// Re-parent this object.
    pub fn set_parent(&self, parent: Option<ObjectId>) -> ObjectResult<()> {
        global_registry()?.set_parent(self.id, parent)
    }

    /// Child object ids.
    pub fn children(&self) -> Vec<ObjectId> {
        global_registry()
            .and_then(|r| r.children(self.id))
            .unwrap_or_default()
    }

    /// Find a direct child by name.
    pub fn find_child_by_name(&self, name: &str) -> Option<ObjectId> {
        global_registry()
            .and_then(|r| r.find_child_by_name(self.id, name))
            .ok()
            .flatten()
    }
}

impl Object for ObjectBase {
    fn object_id(&self) -> ObjectId {
        self.id
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        if let Ok(registry) = global_registry() {
            let _ = registry.destroy(self.id);
        }
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase").field("id", &self.id).finish()
    }
}

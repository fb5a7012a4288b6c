//! Core systems for Trellis.
//!
//! This crate provides the foundational pieces of the Trellis toolbar kit:
//!
//! - **Object Model**: identity, naming and parent-child ownership for
//!   every control ([`ObjectRegistry`], [`ObjectBase`], [`Object`])
//! - **Signal/Slot System**: type-safe change notification ([`Signal`])
//! - **Property System**: values with change detection ([`Property`])
//! - **Logging**: `tracing` targets per subsystem ([`logging::targets`])
//!
//! # Signal/Property Example
//!
//! ```
//! use trellis_core::{Property, Signal};
//!
//! // A reactive counter with change notification
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn new() -> Self {
//!         Self {
//!             value: Property::new(0),
//!             value_changed: Signal::new(),
//!         }
//!     }
//!
//!     fn increment(&self) {
//!         let new_value = self.value.get() + 1;
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod logging;
pub mod object;
pub mod property;
pub mod signal;

pub use error::{CoreError, SignalError};
pub use object::{
    Object, ObjectBase, ObjectError, ObjectId, ObjectRegistry, ObjectResult,
    SharedObjectRegistry, global_registry, init_global_registry,
};
pub use property::{Property, ReadOnlyProperty};
pub use signal::{ConnectionId, Signal};

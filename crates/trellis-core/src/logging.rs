//! Logging facilities for Trellis.
//!
//! The kit is instrumented with the `tracing` crate. Install a subscriber
//! in the embedding application to see logs:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```
//!
//! All events carry one of the [`targets`] constants so subsystems can be
//! filtered individually, e.g. `RUST_LOG=trellis::tray=debug`.

/// Target names for log filtering, one per subsystem.
pub mod targets {
    /// Object model target.
    pub const OBJECT: &str = "trellis_core::object";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Generated-container mirror target.
    pub const MIRROR: &str = "trellis::mirror";
    /// Toolbar panel measurement target.
    pub const PANEL: &str = "trellis::panel";
    /// Tray band packing and layout target.
    pub const TRAY: &str = "trellis::tray";
    /// Drag processing target.
    pub const DRAG: &str = "trellis::drag";
}

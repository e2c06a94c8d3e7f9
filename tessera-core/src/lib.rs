//! # Tessera Core
//!
//! The tile-grid layout engine behind the Tessera chat-driven dashboard.
//! An AI agent manipulates panels through a REST API; a renderer draws them
//! on a resizable, draggable grid; this crate owns everything in between:
//!
//! - **geometry**: integer-grid rectangles and the half-open overlap test
//! - **grid**: the authoritative widget sequence, rebuilt from the external
//!   layout source and mutated only inside gestures
//! - **placement**: deterministic first-fit compaction and the mobile
//!   single-column stack
//! - **reflow**: the push-away resolver that keeps undisturbed widgets at
//!   their pre-gesture positions during interaction
//! - **interaction**: the drag/resize gesture state machine
//! - **persistence**: debounced, fire-and-forget submission to the backend
//! - **events**: the bus delivering rebuild triggers (agent tool calls,
//!   panel CRUD, breakpoint crossings)
//!
//! The engine is render-agnostic by design: it consumes plain descriptor
//! lists and pixel pointer coordinates, and never touches a rendering API.
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Config, interaction::GridController};
//! use tessera_panel_api::PanelDescriptor;
//!
//! let config = Config::default();
//! let mut controller = GridController::from_config(
//!     &config,
//!     &[
//!         PanelDescriptor::new("weather").with_size("3x2"),
//!         PanelDescriptor::new("hn-top").with_size("4x3"),
//!     ],
//! );
//!
//! // Drag "weather" one column right: 78 px is one cell span.
//! controller.begin_drag("weather", 0.0, 0.0)?;
//! controller.drag_to(78.0, 0.0)?;
//! controller.end_drag()?;
//! # Ok::<(), tessera_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod interaction;
pub mod persistence;
pub mod placement;
pub mod reflow;

pub use config::{Config, GridConfig, InteractionConfig, LayoutMode, PersistenceConfig};
pub use error::{Error, Result};
pub use events::EventBus;
pub use tessera_panel_api::{Event, EventType, PanelDescriptor, PositionBatch, PositionUpdate};
pub use geometry::GridRect;
pub use grid::{GridState, Widget};
pub use interaction::{DragSession, Gesture, GridController, ResizeSession};
pub use persistence::{HttpPanelStore, PanelStore, PersistenceAdapter};
pub use placement::{compact, stack};
pub use reflow::push_away;

/// Initialize tracing for the application
///
/// This sets up structured logging for the entire engine.
///
/// # Example
///
/// ```rust
/// tessera_core::init_tracing();
/// tracing::info!("Grid engine started");
/// ```
pub fn init_tracing() {
    // Try to initialize a tracing subscriber but avoid panicking if a global
    // subscriber has already been installed by another logger (for example
    // env_logger). Use `try_init()` to attempt installation and ignore the
    // error when the global subscriber is already set.
    let _ = tracing_subscriber::fmt::try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing() {
        // Should not panic
        init_tracing();
    }

    #[test]
    fn test_default_config_reexport() {
        let config = Config::default();
        assert_eq!(config.grid.cols, 12);
    }
}

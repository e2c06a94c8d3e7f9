//! # Tessera Panel API
//!
//! Boundary types for the Tessera dashboard grid engine. The engine treats
//! everything around it (the backend persistence API, the renderer, the
//! chat agent's tool calls) as external collaborators, and this crate
//! defines the vocabulary they share:
//!
//! - [`PanelDescriptor`]: one panel's entry in the layout source the grid is
//!   built from (id, `"WxH"` size token, cell position, minimum size, order)
//! - [`PositionUpdate`] / [`PositionBatch`]: the committed placements
//!   submitted back to the backend after a gesture
//! - [`Event`] / [`EventType`] / [`EventHandler`]: the signals (panel
//!   created/deleted, agent mutation, breakpoint crossing) that trigger a
//!   full grid rebuild
//!
//! Keeping these in their own crate keeps the engine free of any rendering
//! or transport dependency.
//!
//! # Example
//!
//! ```rust
//! use tessera_panel_api::{PanelDescriptor, SizeToken};
//!
//! let descriptors = vec![
//!     PanelDescriptor::new("weather").with_size("3x2").with_position(0, 0),
//!     PanelDescriptor::new("hn-top").with_size("4x3").with_position(3, 0),
//! ];
//!
//! let size = SizeToken::parse_or_default(descriptors[0].size.as_deref());
//! assert_eq!((size.w, size.h), (3, 2));
//! ```

pub mod descriptor;
pub mod event;

pub use descriptor::{
    GridPosition, PanelDescriptor, ParseSizeError, PositionBatch, PositionUpdate, SizeToken,
};
pub use event::{Event, EventHandler, EventType};

/// Result type used throughout the panel API
pub type Result<T> = std::result::Result<T, anyhow::Error>;

//! Events exchanged between the dashboard surfaces and the grid engine.
//!
//! The grid is rebuilt from the backend layout source whenever something
//! outside a gesture changes it: the agent creates or deletes a panel, a tool
//! call mutates panel content, or the viewport crosses the mobile breakpoint.
//! Those triggers travel as [`Event`]s, dispatched through the core event bus
//! and handled by registered [`EventHandler`]s.
//!
//! # Example
//!
//! ```rust
//! use tessera_panel_api::{Event, EventHandler, EventType};
//!
//! struct RebuildHandler;
//!
//! impl EventHandler for RebuildHandler {
//!     fn handle(&mut self, event: &Event) -> anyhow::Result<()> {
//!         if event.event_type.is_rebuild_trigger() {
//!             // re-fetch the layout and rebuild the grid
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Core trait for handling dashboard events.
///
/// Handlers are registered with the core event bus and called when matching
/// events are emitted. A handler error is logged but does not prevent other
/// handlers from running.
pub trait EventHandler: Send + Sync {
    /// Handle an incoming event.
    fn handle(&mut self, event: &Event) -> anyhow::Result<()>;
}

/// Something that happened on the dashboard.
///
/// Events carry a type, a short data payload (typically the panel id the
/// change concerns), and free-form metadata. Fields are plain data; there is
/// nothing to encapsulate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event instance
    pub id: Uuid,
    /// What happened
    pub event_type: EventType,
    /// Short payload, usually the affected panel id
    pub data: String,
    /// Free-form context (e.g. the tool call that caused the change)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// When the event was created
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl Event {
    /// Create an event stamped with a fresh id and the current time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_panel_api::{Event, EventType};
    ///
    /// let event = Event::new(EventType::PanelCreated, "weather");
    /// assert_eq!(event.event_type, EventType::PanelCreated);
    /// assert_eq!(event.data, "weather");
    /// ```
    pub fn new<S: Into<String>>(event_type: EventType, data: S) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            data: data.into(),
            metadata: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Attach a metadata entry, builder-style.
    ///
    /// ```rust
    /// use tessera_panel_api::{Event, EventType};
    ///
    /// let event = Event::new(EventType::PanelUpdated, "hn-top")
    ///     .with_meta("tool", "update_panel");
    /// assert_eq!(event.meta("tool"), Some("update_panel"));
    /// ```
    pub fn with_meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Look up a metadata entry.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Types of events emitted around the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    // Panel lifecycle (agent tool calls and user actions)
    /// A panel was created
    PanelCreated,
    /// A panel was deleted
    PanelDeleted,
    /// A panel's content or attributes were updated
    PanelUpdated,
    /// A panel was installed from the market
    PanelInstalled,
    /// A storage document backing one or more panels changed
    StorageUpdated,

    // Layout
    /// Panel positions or sizes changed on the grid
    LayoutChanged,
    /// The whole grid was repacked by a compact-all action
    LayoutCompacted,
    /// The viewport crossed the desktop/mobile breakpoint
    BreakpointCrossed,

    // Application
    /// Configuration was changed
    ConfigurationChanged,
    /// Custom event type for host-specific events
    Custom,
}

impl EventType {
    /// Get a human-readable description of the event type.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_panel_api::EventType;
    ///
    /// assert_eq!(EventType::PanelCreated.description(), "Panel was created");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            EventType::PanelCreated => "Panel was created",
            EventType::PanelDeleted => "Panel was deleted",
            EventType::PanelUpdated => "Panel was updated",
            EventType::PanelInstalled => "Panel was installed from the market",
            EventType::StorageUpdated => "Panel storage document changed",
            EventType::LayoutChanged => "Panel layout changed",
            EventType::LayoutCompacted => "Grid was repacked",
            EventType::BreakpointCrossed => "Viewport crossed the mobile breakpoint",
            EventType::ConfigurationChanged => "Configuration was changed",
            EventType::Custom => "Custom host event",
        }
    }

    /// Whether this event invalidates the current grid and requires a full
    /// rebuild from the layout source.
    ///
    /// Rebuilding, not incremental patching, is the only reconciliation
    /// mechanism between the grid and the backend.
    pub fn is_rebuild_trigger(&self) -> bool {
        matches!(
            self,
            EventType::PanelCreated
                | EventType::PanelDeleted
                | EventType::PanelUpdated
                | EventType::PanelInstalled
                | EventType::BreakpointCrossed
        )
    }

    /// Get all available event types.
    pub fn all() -> Vec<EventType> {
        vec![
            EventType::PanelCreated,
            EventType::PanelDeleted,
            EventType::PanelUpdated,
            EventType::PanelInstalled,
            EventType::StorageUpdated,
            EventType::LayoutChanged,
            EventType::LayoutCompacted,
            EventType::BreakpointCrossed,
            EventType::ConfigurationChanged,
            EventType::Custom,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestHandler {
        handled_events: Vec<EventType>,
    }

    impl EventHandler for TestHandler {
        fn handle(&mut self, event: &Event) -> anyhow::Result<()> {
            self.handled_events.push(event.event_type);
            Ok(())
        }
    }

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventType::PanelCreated, "weather");

        assert_eq!(event.event_type, EventType::PanelCreated);
        assert_eq!(event.data, "weather");
        assert!(event.metadata.is_empty());
        assert!(event.id != Uuid::nil());
    }

    #[test]
    fn test_event_metadata() {
        let event = Event::new(EventType::PanelUpdated, "hn-top")
            .with_meta("tool", "update_panel")
            .with_meta("source", "agent");

        assert_eq!(event.meta("tool"), Some("update_panel"));
        assert_eq!(event.meta("source"), Some("agent"));
        assert_eq!(event.meta("missing"), None);
        assert_eq!(event.metadata.len(), 2);
    }

    #[test]
    fn test_event_handler() {
        let mut handler = TestHandler {
            handled_events: Vec::new(),
        };

        handler.handle(&Event::new(EventType::PanelCreated, "a")).unwrap();
        handler.handle(&Event::new(EventType::LayoutChanged, "b")).unwrap();

        assert_eq!(
            handler.handled_events,
            vec![EventType::PanelCreated, EventType::LayoutChanged]
        );
    }

    #[test]
    fn test_rebuild_triggers() {
        assert!(EventType::PanelCreated.is_rebuild_trigger());
        assert!(EventType::PanelDeleted.is_rebuild_trigger());
        assert!(EventType::PanelInstalled.is_rebuild_trigger());
        assert!(EventType::BreakpointCrossed.is_rebuild_trigger());

        assert!(!EventType::LayoutChanged.is_rebuild_trigger());
        assert!(!EventType::ConfigurationChanged.is_rebuild_trigger());
        assert!(!EventType::Custom.is_rebuild_trigger());
    }

    #[test]
    fn test_event_type_all() {
        let types = EventType::all();
        assert_eq!(types.len(), 10);
        assert!(types.contains(&EventType::PanelCreated));
        assert!(types.contains(&EventType::BreakpointCrossed));
        assert!(types.contains(&EventType::Custom));
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::new(EventType::LayoutChanged, "drag commit");

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(event.id, deserialized.id);
        assert_eq!(event.event_type, deserialized.event_type);
        assert_eq!(event.data, deserialized.data);
        assert_eq!(event.timestamp, deserialized.timestamp);
    }
}

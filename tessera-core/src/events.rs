//! # Event system for Tessera Core
//!
//! Centralized event bus connecting the dashboard surfaces to the grid
//! engine. The chat agent's tool calls, panel CRUD, and viewport breakpoint
//! crossings all land here as [`Event`]s; a host subscribes a handler that
//! re-fetches the layout and rebuilds the grid when
//! [`EventType::is_rebuild_trigger`] says so.
//!
//! The bus is pump-driven: `emit` queues (or dispatches immediately in
//! synchronous mode) and `process_events` drains the queue, called once per
//! host loop turn. Handlers have priorities and are isolated: one handler
//! failing is logged and does not stop the rest.

use crate::{Error, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tessera_panel_api::{Event, EventHandler, EventType};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, warn};
use uuid::Uuid;

/// A registered handler and where it sits in the dispatch order.
struct Subscriber {
    id: Uuid,
    handler: Arc<Mutex<dyn EventHandler>>,
    priority: i32,
}

/// Central event bus for dashboard-wide communication.
///
/// # Example
///
/// ```rust
/// use tessera_core::events::EventBus;
/// use tessera_panel_api::{Event, EventType};
///
/// # tokio_test::block_on(async {
/// let mut event_bus = EventBus::new();
/// event_bus.initialize().await?;
///
/// event_bus.emit(Event::new(EventType::PanelCreated, "weather")).await?;
/// event_bus.process_events().await?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
pub struct EventBus {
    /// Subscribers per event type, kept sorted by descending priority
    subscribers: Arc<RwLock<HashMap<EventType, Vec<Subscriber>>>>,
    /// Events waiting for the next pump
    pending: Arc<Mutex<VecDeque<Event>>>,
    initialized: bool,
    /// Queue length at which the oldest pending event is dropped
    queue_cap: usize,
    /// Queue for the pump (default) or dispatch inline from `emit`
    async_processing: bool,
}

impl EventBus {
    /// Create a new event bus.
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            pending: Arc::new(Mutex::new(VecDeque::new())),
            initialized: false,
            queue_cap: 1000,
            async_processing: true,
        }
    }

    /// Initialize the event bus.
    pub async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            warn!("Event bus is already initialized");
            return Ok(());
        }

        debug!("Initializing event bus");
        self.initialized = true;
        Ok(())
    }

    /// Shutdown the event bus, dropping all subscribers and pending events.
    pub async fn shutdown(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        debug!("Shutting down event bus");
        self.subscribers.write().await.clear();
        self.pending.lock().await.clear();
        self.initialized = false;
        Ok(())
    }

    /// Subscribe to events of a specific type.
    ///
    /// Returns a subscription id for [`unsubscribe`](Self::unsubscribe).
    /// Higher priorities run first; equal priorities run in subscription
    /// order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::events::EventBus;
    /// use tessera_panel_api::{Event, EventHandler, EventType};
    /// use std::sync::Arc;
    /// use tokio::sync::Mutex;
    ///
    /// struct RebuildHandler;
    /// impl EventHandler for RebuildHandler {
    ///     fn handle(&mut self, _event: &Event) -> anyhow::Result<()> {
    ///         // re-fetch the layout and rebuild the grid controller
    ///         Ok(())
    ///     }
    /// }
    ///
    /// # tokio_test::block_on(async {
    /// let mut event_bus = EventBus::new();
    /// event_bus.initialize().await?;
    ///
    /// let handler = Arc::new(Mutex::new(RebuildHandler));
    /// let id = event_bus.subscribe(EventType::PanelCreated, handler, 0).await?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// # });
    /// ```
    pub async fn subscribe(
        &self,
        event_type: EventType,
        handler: Arc<Mutex<dyn EventHandler>>,
        priority: i32,
    ) -> Result<Uuid> {
        if !self.initialized {
            return Err(Error::event("Event bus not initialized"));
        }

        let id = Uuid::new_v4();
        let mut subscribers = self.subscribers.write().await;
        let list = subscribers.entry(event_type).or_default();
        let at = list.partition_point(|s| s.priority >= priority);
        list.insert(
            at,
            Subscriber {
                id,
                handler,
                priority,
            },
        );

        debug!(
            "Subscribed handler {:?} to {:?} events with priority {}",
            id, event_type, priority
        );
        Ok(id)
    }

    /// Unsubscribe a handler by subscription id.
    pub async fn unsubscribe(&self, subscription_id: Uuid) -> Result<()> {
        let mut subscribers = self.subscribers.write().await;
        for list in subscribers.values_mut() {
            list.retain(|s| s.id != subscription_id);
        }

        debug!("Unsubscribed handler {:?}", subscription_id);
        Ok(())
    }

    /// Emit an event to all subscribers.
    ///
    /// In the default queued mode the event is dispatched on the next
    /// [`process_events`](Self::process_events) pump.
    pub async fn emit(&self, event: Event) -> Result<()> {
        if !self.initialized {
            return Err(Error::event("Event bus not initialized"));
        }

        if !self.async_processing {
            self.dispatch(&event).await;
            return Ok(());
        }

        let mut pending = self.pending.lock().await;
        if pending.len() >= self.queue_cap {
            warn!("Event queue is full, dropping oldest event");
            pending.pop_front();
        }
        debug!("Queued event: {:?}", event.event_type);
        pending.push_back(event);
        Ok(())
    }

    /// Drain and dispatch all queued events.
    ///
    /// Call once per host loop turn. Events emitted by handlers during the
    /// pump land in the next turn's batch.
    pub async fn process_events(&self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }

        let drained = {
            let mut pending = self.pending.lock().await;
            std::mem::take(&mut *pending)
        };
        if drained.is_empty() {
            return Ok(());
        }

        debug!("Processing {} events", drained.len());
        for event in drained {
            self.dispatch(&event).await;
        }
        Ok(())
    }

    /// Number of events waiting to be processed.
    pub async fn queue_size(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Number of registered handlers for an event type.
    pub async fn handler_count(&self, event_type: EventType) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.get(&event_type).map_or(0, Vec::len)
    }

    /// Set the queue length at which the oldest pending event is dropped.
    pub fn set_queue_capacity(&mut self, cap: usize) {
        self.queue_cap = cap;
    }

    /// Enable or disable queued processing. When disabled, `emit` dispatches
    /// inline.
    pub fn set_async_processing(&mut self, async_mode: bool) {
        self.async_processing = async_mode;
    }

    /// Run an event through its subscribers, in priority order. Handler
    /// failures are logged and skipped.
    async fn dispatch(&self, event: &Event) {
        let subscribers = self.subscribers.read().await;
        let list = match subscribers.get(&event.event_type) {
            Some(list) if !list.is_empty() => list,
            _ => return,
        };

        debug!(
            "Dispatching {:?} event to {} handlers",
            event.event_type,
            list.len()
        );
        for subscriber in list {
            let mut handler = subscriber.handler.lock().await;
            if let Err(e) = handler.handle(event) {
                error!(
                    "Handler {:?} failed on {:?} event: {}",
                    subscriber.id, event.event_type, e
                );
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

//! # Gesture state machine for Tessera Core
//!
//! One [`GridController`] owns one rendered grid: its state, the active
//! gesture, the per-gesture stable snapshot, and the persistence hookup.
//! State is passed explicitly, never held module-level, so independent grids
//! (and tests) cannot cross-talk.
//!
//! The machine is `Idle → Dragging → Idle` and `Idle → Resizing → Idle`,
//! with an explicit cancel transition from either active state that restores
//! every widget's stable rect. Gestures cannot nest or run concurrently:
//! starting one while another is active is an error, which is the only
//! exclusivity guard the single-threaded grid needs.
//!
//! The host feeds it pointer coordinates in pixels; the controller converts
//! deltas to whole cells, clamps candidates into the column range, reflows
//! colliding widgets, and reports whether anything changed so the host knows
//! to re-render. On gesture end the committed layout goes to the persistence
//! adapter, fire-and-forget.

use crate::config::{Config, InteractionConfig, LayoutMode};
use crate::geometry::GridRect;
use crate::grid::GridState;
use crate::persistence::PersistenceAdapter;
use crate::placement::{compact, stack};
use crate::reflow::{push_away, snapshot_rects};
use crate::{Error, Result};
use std::collections::HashMap;
use tessera_panel_api::PanelDescriptor;
use tracing::debug;

/// Ephemeral record of an in-flight drag gesture.
///
/// Created on pointer-down over a drag handle, discarded on pointer-up.
/// Never persisted.
#[derive(Debug, Clone)]
pub struct DragSession {
    pub widget_id: String,
    pub start_x: i32,
    pub start_y: i32,
    pub start_w: i32,
    pub start_h: i32,
    pub pointer_start_x: f32,
    pub pointer_start_y: f32,
}

/// Ephemeral record of an in-flight resize gesture.
#[derive(Debug, Clone)]
pub struct ResizeSession {
    pub widget_id: String,
    pub start_x: i32,
    pub start_y: i32,
    pub start_w: i32,
    pub start_h: i32,
    pub pointer_start_x: f32,
    pub pointer_start_y: f32,
}

/// Current gesture phase.
#[derive(Debug, Clone)]
pub enum Gesture {
    Idle,
    Dragging(DragSession),
    Resizing(ResizeSession),
}

/// Owner of one grid's state and gestures.
pub struct GridController {
    state: GridState,
    gesture: Gesture,
    stable: HashMap<String, GridRect>,
    mode: LayoutMode,
    interaction: InteractionConfig,
    adapter: Option<PersistenceAdapter>,
}

impl GridController {
    /// Create a controller over an existing grid state.
    pub fn new(state: GridState) -> Self {
        Self {
            state,
            gesture: Gesture::Idle,
            stable: HashMap::new(),
            mode: LayoutMode::Grid,
            interaction: InteractionConfig::default(),
            adapter: None,
        }
    }

    /// Build a controller from configuration and a layout-source snapshot.
    ///
    /// When no descriptor carries an explicit position the set is compacted,
    /// which is the deterministic initial layout.
    pub fn from_config(config: &Config, descriptors: &[PanelDescriptor]) -> Self {
        let mut controller = Self::new(GridState::build(descriptors, config.grid.clone()));
        controller.interaction = config.interaction.clone();
        if !descriptors.iter().any(|d| d.position.is_some()) && !controller.state.is_empty() {
            compact(&mut controller.state, None);
        }
        controller
    }

    /// Attach a persistence adapter; committed gestures submit through it.
    pub fn with_adapter(mut self, adapter: PersistenceAdapter) -> Self {
        self.adapter = Some(adapter);
        self
    }

    /// Override the interaction settings.
    pub fn with_interaction(mut self, interaction: InteractionConfig) -> Self {
        self.interaction = interaction;
        self
    }

    /// The grid this controller owns.
    pub fn state(&self) -> &GridState {
        &self.state
    }

    /// Whether no gesture is active.
    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// The current gesture phase, including the active session if any.
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Current viewport layout mode.
    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    /// Toggle the reflow policy: push-away (default) or full repacking on
    /// every tick.
    pub fn set_auto_compact(&mut self, auto_compact: bool) {
        self.interaction.auto_compact = auto_compact;
    }

    /// Record a viewport width change.
    ///
    /// Returns true when the grid/stacked mode or the derived column count
    /// changed; the caller should then re-fetch the layout and
    /// [`rebuild`](Self::rebuild), which is how breakpoint crossings
    /// reconcile. Any active gesture is cancelled.
    pub fn set_viewport_width(&mut self, width: f32) -> bool {
        let new_mode = self.state.config().mode_for_width(width);
        let new_cols = self.state.config().columns_for_width(width);
        let cols_changed = new_mode == LayoutMode::Grid && new_cols != self.state.config().cols;

        if new_mode == self.mode && !cols_changed {
            return false;
        }

        self.cancel();
        self.mode = new_mode;
        match new_mode {
            LayoutMode::Grid => self.state.set_cols(new_cols),
            LayoutMode::Stacked => stack(&mut self.state),
        }
        true
    }

    /// Replace the grid from a fresh layout-source snapshot.
    ///
    /// This is the rebuild path for every externally-triggered change: panel
    /// created or deleted, agent tool calls, breakpoint crossing. An active
    /// gesture is discarded, since the state it referred to no longer exists.
    pub fn rebuild(&mut self, descriptors: &[PanelDescriptor]) {
        if !self.is_idle() {
            debug!("rebuild during an active gesture; discarding the gesture");
            self.gesture = Gesture::Idle;
            self.stable.clear();
        }

        let config = self.state.config().clone();
        let has_positions = descriptors.iter().any(|d| d.position.is_some());
        self.state = GridState::build(descriptors, config);

        if !has_positions && !self.state.is_empty() {
            compact(&mut self.state, None);
        }
        if self.mode == LayoutMode::Stacked {
            stack(&mut self.state);
        }
    }

    /// Start dragging a widget.
    ///
    /// # Errors
    ///
    /// Returns a gesture error if another gesture is active or the layout is
    /// in stacked (mobile) mode, and a not-found error for an unknown id.
    pub fn begin_drag(&mut self, id: &str, pointer_x: f32, pointer_y: f32) -> Result<()> {
        self.ensure_can_start()?;
        let widget = self
            .state
            .widget(id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", id)))?;

        let session = DragSession {
            widget_id: widget.id.clone(),
            start_x: widget.x,
            start_y: widget.y,
            start_w: widget.w,
            start_h: widget.h,
            pointer_start_x: pointer_x,
            pointer_start_y: pointer_y,
        };
        self.stable = snapshot_rects(&self.state);
        self.gesture = Gesture::Dragging(session);
        debug!("drag started on '{}'", id);
        Ok(())
    }

    /// Feed a pointer position to the active drag.
    ///
    /// Returns true when the dragged widget moved to a new cell (and the
    /// grid was reflowed around it), so the caller re-renders.
    pub fn drag_to(&mut self, pointer_x: f32, pointer_y: f32) -> Result<bool> {
        let session = match &self.gesture {
            Gesture::Dragging(session) => session.clone(),
            _ => return Err(Error::gesture("no drag in progress")),
        };

        let (dx, dy) = self.pointer_delta_cells(
            pointer_x - session.pointer_start_x,
            pointer_y - session.pointer_start_y,
        );
        let cols = self.state.config().cols;

        let widget = self
            .state
            .widget(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;

        let candidate_x = (session.start_x + dx).clamp(0, (cols - widget.w).max(0));
        let candidate_y = (session.start_y + dy).max(0);
        if (widget.x, widget.y) == (candidate_x, candidate_y) {
            return Ok(false);
        }

        let widget = self
            .state
            .widget_mut(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;
        widget.x = candidate_x;
        widget.y = candidate_y;

        self.reflow_around(&session.widget_id);
        Ok(true)
    }

    /// Commit the active drag.
    ///
    /// The dragged widget snaps to its last candidate cell. If it ended away
    /// from where it started, the full widget set is handed to the
    /// persistence adapter (movement may have displaced others). Returns
    /// whether anything moved.
    pub fn end_drag(&mut self) -> Result<bool> {
        let session = match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Dragging(session) => session,
            other => {
                self.gesture = other;
                return Err(Error::gesture("no drag in progress"));
            }
        };
        self.stable.clear();

        let widget = self
            .state
            .widget(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;
        let moved = (widget.x, widget.y) != (session.start_x, session.start_y);

        if moved {
            self.queue_position_save(false);
        }
        debug!("drag ended on '{}' (moved: {})", session.widget_id, moved);
        Ok(moved)
    }

    /// Start resizing a widget from its corner handle.
    pub fn begin_resize(&mut self, id: &str, pointer_x: f32, pointer_y: f32) -> Result<()> {
        self.ensure_can_start()?;
        let widget = self
            .state
            .widget(id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", id)))?;

        let session = ResizeSession {
            widget_id: widget.id.clone(),
            start_x: widget.x,
            start_y: widget.y,
            start_w: widget.w,
            start_h: widget.h,
            pointer_start_x: pointer_x,
            pointer_start_y: pointer_y,
        };
        self.stable = snapshot_rects(&self.state);
        self.gesture = Gesture::Resizing(session);
        debug!("resize started on '{}'", id);
        Ok(())
    }

    /// Feed a pointer position to the active resize.
    ///
    /// Width is clamped to `[min_w, cols - x]`, height to
    /// `[min_h, max_widget_rows]`. Returns true when the dimensions changed.
    pub fn resize_to(&mut self, pointer_x: f32, pointer_y: f32) -> Result<bool> {
        let session = match &self.gesture {
            Gesture::Resizing(session) => session.clone(),
            _ => return Err(Error::gesture("no resize in progress")),
        };

        let (dw, dh) = self.pointer_delta_cells(
            pointer_x - session.pointer_start_x,
            pointer_y - session.pointer_start_y,
        );
        let cols = self.state.config().cols;
        let max_rows = self.interaction.max_widget_rows;

        let widget = self
            .state
            .widget(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;

        let max_w = (cols - widget.x).max(widget.min_w);
        let candidate_w = (session.start_w + dw).clamp(widget.min_w, max_w);
        let candidate_h = (session.start_h + dh).clamp(widget.min_h, max_rows.max(widget.min_h));
        if (widget.w, widget.h) == (candidate_w, candidate_h) {
            return Ok(false);
        }

        let widget = self
            .state
            .widget_mut(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;
        widget.w = candidate_w;
        widget.h = candidate_h;

        self.reflow_around(&session.widget_id);
        Ok(true)
    }

    /// Commit the active resize.
    ///
    /// Persists the resized widget's size and the whole set's positions,
    /// since the resize may have displaced neighbors. Returns whether the
    /// dimensions changed.
    pub fn end_resize(&mut self) -> Result<bool> {
        let session = match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Resizing(session) => session,
            other => {
                self.gesture = other;
                return Err(Error::gesture("no resize in progress"));
            }
        };
        self.stable.clear();

        let widget = self
            .state
            .widget(&session.widget_id)
            .ok_or_else(|| Error::not_found(format!("widget '{}'", session.widget_id)))?;
        let resized = (widget.w, widget.h) != (session.start_w, session.start_h);

        if resized {
            if let Some(adapter) = &self.adapter {
                adapter.save_size(widget.id.clone(), format!("{}x{}", widget.w, widget.h));
            }
            self.queue_position_save(true);
        }
        debug!("resize ended on '{}' (resized: {})", session.widget_id, resized);
        Ok(resized)
    }

    /// Abort the active gesture, restoring every widget's stable rect.
    ///
    /// Returns false when already idle. The observed client has no cancel
    /// gesture (pointer-up always commits), but the machine supports it so
    /// hosts can wire one.
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => false,
            Gesture::Dragging(_) | Gesture::Resizing(_) => {
                for widget in self.state.widgets_mut() {
                    if let Some(rect) = self.stable.get(&widget.id) {
                        widget.x = rect.x;
                        widget.y = rect.y;
                        widget.w = rect.w;
                        widget.h = rect.h;
                    }
                }
                self.stable.clear();
                debug!("gesture cancelled, stable positions restored");
                true
            }
        }
    }

    /// Repack the whole grid deterministically and persist the result.
    ///
    /// Cancels any active gesture first; compaction and interactive reflow
    /// do not compose.
    pub fn compact_all(&mut self) {
        self.cancel();
        compact(&mut self.state, None);
        self.queue_position_save(false);
    }

    /// Convert a pixel delta into whole cells.
    fn pointer_delta_cells(&self, dx_px: f32, dy_px: f32) -> (i32, i32) {
        let span = self.state.config().cell_span();
        (
            (dx_px / span).round() as i32,
            (dy_px / span).round() as i32,
        )
    }

    fn ensure_can_start(&self) -> Result<()> {
        if self.mode == LayoutMode::Stacked {
            return Err(Error::gesture(
                "grid gestures are bypassed in stacked layout",
            ));
        }
        if !self.is_idle() {
            return Err(Error::gesture("a gesture is already active"));
        }
        Ok(())
    }

    fn reflow_around(&mut self, active_id: &str) {
        if self.interaction.auto_compact {
            compact(&mut self.state, Some(active_id));
        } else {
            push_away(&mut self.state, active_id, &self.stable);
        }
    }

    fn queue_position_save(&self, include_sizes: bool) {
        match &self.adapter {
            Some(adapter) => adapter.queue_positions(self.state.to_position_batch(include_sizes)),
            None => debug!("no persistence adapter configured, skipping save"),
        }
    }
}

//! # Grid state for Tessera Core
//!
//! The authoritative in-memory picture of one dashboard grid: an ordered
//! sequence of placed widgets plus the column configuration. A [`GridState`]
//! is *rebuilt* from the external layout source whenever that source changes
//! (initial render, panel created or deleted, breakpoint crossing) and is
//! mutated in place only inside a single gesture, after which it is frozen
//! and persisted.
//!
//! Sequence order is significant: it follows the layout source (explicit
//! `order` field, else source order) and is the tie-break for compaction.

use crate::config::GridConfig;
use crate::geometry::GridRect;
use tessera_panel_api::{GridPosition, PanelDescriptor, PositionBatch, PositionUpdate, SizeToken};
use tracing::{debug, warn};

/// A panel instance placed on the grid.
///
/// All coordinates and dimensions are in grid units. Invariants after any
/// placement operation: `x + w <= cols`, `w >= min_w`, `h >= min_h`,
/// `x >= 0`, `y >= 0` (unbounded below the fold; the grid grows downward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    /// Panel id this widget renders
    pub id: String,
    /// Leftmost column
    pub x: i32,
    /// Topmost row
    pub y: i32,
    /// Width in columns
    pub w: i32,
    /// Height in rows
    pub h: i32,
    /// Minimum width a resize may reach
    pub min_w: i32,
    /// Minimum height a resize may reach
    pub min_h: i32,
}

impl Widget {
    /// The widget's occupied rectangle.
    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    /// Build a widget from a layout-source descriptor.
    ///
    /// Malformed or missing size tokens recover to `2x2`; a missing position
    /// recovers to `(0, 0)`. The origin is clamped so the widget starts
    /// inside the column range.
    fn from_descriptor(desc: &PanelDescriptor, cols: i32) -> Self {
        let size = SizeToken::parse_or_default(desc.size.as_deref());
        let min = match desc.min_size.as_deref() {
            None => SizeToken::new(1, 1),
            some => SizeToken::parse_or_default(some),
        };

        let w = size.w.max(min.w).min(cols);
        let h = size.h.max(min.h);

        let pos = desc.position.unwrap_or(GridPosition::new(0, 0));
        let x = pos.x.clamp(0, (cols - w).max(0));
        let y = pos.y.max(0);

        Self {
            id: desc.id.clone(),
            x,
            y,
            w,
            h,
            min_w: min.w,
            min_h: min.h,
        }
    }
}

/// Ordered widget sequence plus grid configuration for one dashboard.
#[derive(Debug, Clone)]
pub struct GridState {
    config: GridConfig,
    widgets: Vec<Widget>,
}

impl GridState {
    /// Create an empty grid.
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            widgets: Vec::new(),
        }
    }

    /// Build a grid from the external layout source.
    ///
    /// Descriptors carrying an explicit `order` are sorted by it (absent
    /// orders default to the source index, so unordered entries keep their
    /// relative place). Parsing failures are recovered per descriptor, never
    /// fatal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::{config::GridConfig, grid::GridState};
    /// use tessera_panel_api::PanelDescriptor;
    ///
    /// let state = GridState::build(
    ///     &[
    ///         PanelDescriptor::new("a").with_size("3x2").with_position(0, 0),
    ///         PanelDescriptor::new("b"), // recovers to 2x2 at (0, 0)
    ///     ],
    ///     GridConfig::default(),
    /// );
    /// assert_eq!(state.len(), 2);
    /// ```
    pub fn build(descriptors: &[PanelDescriptor], config: GridConfig) -> Self {
        let mut indices: Vec<usize> = (0..descriptors.len()).collect();
        indices.sort_by_key(|&i| descriptors[i].order.unwrap_or(i as i32));

        let widgets = indices
            .into_iter()
            .map(|i| Widget::from_descriptor(&descriptors[i], config.cols))
            .collect();

        Self { config, widgets }
    }

    /// Get the grid configuration.
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Get all widgets in sequence order.
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub(crate) fn widgets_mut(&mut self) -> &mut [Widget] {
        &mut self.widgets
    }

    /// Re-derive the column count after a container width change. Widget
    /// rects are left alone; a rebuild from the layout source follows.
    pub(crate) fn set_cols(&mut self, cols: i32) {
        self.config.cols = cols;
    }

    /// Get a widget by panel id.
    pub fn widget(&self, id: &str) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    /// Get a mutable widget by panel id.
    pub fn widget_mut(&mut self, id: &str) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    /// Number of widgets on the grid.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Whether the grid has no widgets.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Remove a widget from the grid.
    ///
    /// Returns true if the widget was present.
    pub fn remove_widget(&mut self, id: &str) -> bool {
        let before = self.widgets.len();
        self.widgets.retain(|w| w.id != id);
        self.widgets.len() < before
    }

    /// Place a new widget at the first empty slot that fits it, scanning
    /// rows top-to-bottom and columns left-to-right. Existing widgets are
    /// never moved.
    ///
    /// The descriptor's own position, if any, is ignored; this is the path
    /// for panels created without one.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tessera_core::{config::GridConfig, grid::GridState};
    /// use tessera_panel_api::PanelDescriptor;
    ///
    /// let mut state = GridState::build(
    ///     &[PanelDescriptor::new("a").with_size("3x2").with_position(0, 0)],
    ///     GridConfig::default(),
    /// );
    /// let pos = state.insert_widget(&PanelDescriptor::new("b").with_size("2x2"));
    /// assert_eq!((pos.x, pos.y), (3, 0));
    /// ```
    pub fn insert_widget(&mut self, desc: &PanelDescriptor) -> GridPosition {
        let mut widget = Widget::from_descriptor(desc, self.config.cols);
        let slot = self.find_free_slot(widget.w, widget.h);
        widget.x = slot.x;
        widget.y = slot.y;
        self.push_widget(widget);
        slot
    }

    /// Place a new widget at an explicit cell, as a drop from the panel
    /// drawer does. The origin is clamped into the column range; existing
    /// widgets are never moved (callers reflow afterwards if they care).
    pub fn insert_widget_at(&mut self, desc: &PanelDescriptor, x: i32, y: i32) {
        let mut widget = Widget::from_descriptor(desc, self.config.cols);
        widget.x = x.clamp(0, (self.config.cols - widget.w).max(0));
        widget.y = y.max(0);
        self.push_widget(widget);
    }

    fn push_widget(&mut self, widget: Widget) {
        if self.remove_widget(&widget.id) {
            debug!("replacing existing widget '{}'", widget.id);
        }
        self.widgets.push(widget);
    }

    /// First row below every widget (0 for an empty grid).
    pub fn max_row(&self) -> i32 {
        self.widgets.iter().map(|w| w.rect().bottom()).max().unwrap_or(0)
    }

    /// First empty slot that fits a `w x h` rectangle, scanning row-major.
    pub fn find_free_slot(&self, w: i32, h: i32) -> GridPosition {
        let cols = self.config.cols;
        let scan_w = w.min(cols);
        let max_row = self.max_row();

        for y in 0..=max_row + h {
            for x in 0..=cols - scan_w {
                let candidate = GridRect::new(x, y, scan_w, h);
                if !self.widgets.iter().any(|o| o.rect().overlaps(&candidate)) {
                    return GridPosition::new(x, y);
                }
            }
        }

        // The row below everything is always free; this is unreachable but
        // mirrors the backend's fallback.
        warn!("no free {}x{} slot found, appending below the grid", w, h);
        GridPosition::new(0, max_row)
    }

    /// Whether any two widgets overlap.
    pub fn has_overlaps(&self) -> bool {
        for (i, a) in self.widgets.iter().enumerate() {
            for b in &self.widgets[i + 1..] {
                if a.rect().overlaps(&b.rect()) {
                    return true;
                }
            }
        }
        false
    }

    /// Collapse the grid into the batch payload submitted to the backend.
    ///
    /// Drag commits positions only; resize commits dimensions as well, so
    /// `include_sizes` selects whether `w`/`h` ride along.
    pub fn to_position_batch(&self, include_sizes: bool) -> PositionBatch {
        PositionBatch::new(
            self.widgets
                .iter()
                .map(|w| PositionUpdate {
                    id: w.id.clone(),
                    x: w.x,
                    y: w.y,
                    w: include_sizes.then_some(w.w),
                    h: include_sizes.then_some(w.h),
                })
                .collect(),
        )
    }
}

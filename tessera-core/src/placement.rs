//! # Deterministic placement and compaction
//!
//! First-fit top-left repacking of a whole widget set. Widgets are processed
//! in sequence order; each takes the first row-major cell whose rectangle
//! overlaps nothing already placed. The result is deterministic for a given
//! sequence and column count, idempotent, and overlap-free.
//!
//! This is the non-interactive half of the engine: it runs for the initial
//! layout when the source carries no explicit positions, for the explicit
//! "compact all" action, and (with a pinned widget) as the auto-compact
//! reflow policy during gestures. The interactive half, which minimizes
//! visual churn instead of maximizing density, lives in [`crate::reflow`].

use crate::geometry::GridRect;
use crate::grid::GridState;
use tracing::warn;

/// Row bound for placement scans. A scan that would pass it degrades to the
/// widget's last-known position instead of walking an unbounded grid.
pub const MAX_SCAN_ROWS: i32 = 100;

/// Repack all widgets except `pinned` using first-fit top-left scanning.
///
/// The pinned widget, if any, keeps its exact position and is placed first,
/// so everything else packs around it. A widget wider than the grid is
/// scanned at the clamped width and, since it cannot fit otherwise, has the
/// clamp persisted; widths that fit are never changed.
///
/// # Example
///
/// ```rust
/// use tessera_core::{config::GridConfig, grid::GridState, placement::compact};
/// use tessera_panel_api::PanelDescriptor;
///
/// // Three panels piled at the origin spread across row 0.
/// let mut state = GridState::build(
///     &[
///         PanelDescriptor::new("a").with_size("3x2").with_position(0, 0),
///         PanelDescriptor::new("b").with_size("4x3").with_position(0, 0),
///         PanelDescriptor::new("c").with_size("2x2").with_position(0, 0),
///     ],
///     GridConfig::default(),
/// );
/// compact(&mut state, None);
///
/// assert_eq!(state.widget("a").map(|w| (w.x, w.y)), Some((0, 0)));
/// assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((3, 0)));
/// assert_eq!(state.widget("c").map(|w| (w.x, w.y)), Some((7, 0)));
/// ```
pub fn compact(state: &mut GridState, pinned: Option<&str>) {
    let cols = state.config().cols;
    let mut placed: Vec<GridRect> = Vec::with_capacity(state.len());

    if let Some(id) = pinned {
        if let Some(widget) = state.widget(id) {
            placed.push(widget.rect());
        }
    }

    for widget in state.widgets_mut() {
        if pinned == Some(widget.id.as_str()) {
            continue;
        }

        let scan_w = widget.w.min(cols);
        match first_fit(scan_w, widget.h, cols, &placed) {
            Some((x, y)) => {
                widget.x = x;
                widget.y = y;
                if widget.w > cols {
                    // Cannot fit at its stored width; the clamp sticks.
                    widget.w = cols;
                }
            }
            None => {
                warn!(
                    "no slot for widget '{}' within {} rows, keeping its position",
                    widget.id, MAX_SCAN_ROWS
                );
            }
        }
        placed.push(widget.rect());
    }
}

/// First row-major origin where a `w x h` rectangle overlaps nothing in
/// `placed`, or `None` if the scan bound is exceeded.
fn first_fit(w: i32, h: i32, cols: i32, placed: &[GridRect]) -> Option<(i32, i32)> {
    // The row below everything already placed always fits, so this limit is
    // reached only when the grid itself has outgrown the scan bound.
    let limit = placed.iter().map(GridRect::bottom).max().unwrap_or(0);

    for y in 0..=limit.min(MAX_SCAN_ROWS) {
        for x in 0..=cols - w {
            let candidate = GridRect::new(x, y, w, h);
            if !placed.iter().any(|r| r.overlaps(&candidate)) {
                return Some((x, y));
            }
        }
    }
    None
}

/// Single-column free-flow stacking for viewports below the mobile
/// breakpoint: widgets keep sequence order, `x` collapses to 0 and rows
/// accumulate. Widths are untouched; stacked rendering ignores them.
pub fn stack(state: &mut GridState) {
    let mut y = 0;
    for widget in state.widgets_mut() {
        widget.x = 0;
        widget.y = y;
        y += widget.h;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use tessera_panel_api::PanelDescriptor;

    fn desc(id: &str, size: &str, x: i32, y: i32) -> PanelDescriptor {
        PanelDescriptor::new(id).with_size(size).with_position(x, y)
    }

    fn piled_state() -> GridState {
        GridState::build(
            &[
                desc("a", "3x2", 0, 0),
                desc("b", "4x3", 0, 0),
                desc("c", "2x2", 0, 0),
            ],
            GridConfig::default(),
        )
    }

    #[test]
    fn test_compact_first_fit_row_zero() {
        let mut state = piled_state();
        compact(&mut state, None);

        assert_eq!(
            state.widget("a").map(|w| (w.x, w.y)),
            Some((0, 0)),
            "first widget takes the origin"
        );
        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((3, 0)));
        assert_eq!(state.widget("c").map(|w| (w.x, w.y)), Some((7, 0)));
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_compact_wraps_when_row_is_full() {
        let mut state = GridState::build(
            &[
                desc("a", "8x2", 0, 0),
                desc("b", "8x2", 0, 0),
                desc("c", "4x1", 0, 0),
            ],
            GridConfig::default(),
        );
        compact(&mut state, None);

        assert_eq!(state.widget("a").map(|w| (w.x, w.y)), Some((0, 0)));
        // b (8 wide) cannot share row 0 with a, so it starts row 2...
        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((0, 2)));
        // ...but c (4 wide) still fits beside a in row 0.
        assert_eq!(state.widget("c").map(|w| (w.x, w.y)), Some((8, 0)));
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_compact_is_idempotent() {
        let mut state = piled_state();
        compact(&mut state, None);
        let first: Vec<_> = state.widgets().iter().map(|w| w.rect()).collect();

        compact(&mut state, None);
        let second: Vec<_> = state.widgets().iter().map(|w| w.rect()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_compact_is_deterministic() {
        let mut one = piled_state();
        let mut two = piled_state();
        compact(&mut one, None);
        compact(&mut two, None);

        let rects = |s: &GridState| s.widgets().iter().map(|w| w.rect()).collect::<Vec<_>>();
        assert_eq!(rects(&one), rects(&two));
    }

    #[test]
    fn test_compact_never_moves_pinned() {
        let mut state = GridState::build(
            &[
                desc("a", "3x2", 0, 0),
                desc("pinned", "4x3", 5, 2),
                desc("c", "2x2", 0, 0),
            ],
            GridConfig::default(),
        );
        compact(&mut state, Some("pinned"));

        assert_eq!(state.widget("pinned").map(|w| (w.x, w.y)), Some((5, 2)));
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_compact_packs_around_pinned() {
        let mut state = GridState::build(
            &[desc("pinned", "12x2", 0, 0), desc("b", "3x2", 0, 0)],
            GridConfig::default(),
        );
        compact(&mut state, Some("pinned"));

        // The pinned widget fills row 0, so b must land below it.
        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((0, 2)));
    }

    #[test]
    fn test_compact_respects_bounds() {
        let mut state = GridState::build(
            &[
                desc("a", "5x2", 0, 0),
                desc("b", "5x2", 0, 0),
                desc("c", "5x2", 0, 0),
            ],
            GridConfig::default(),
        );
        compact(&mut state, None);

        let cols = state.config().cols;
        for widget in state.widgets() {
            assert!(widget.x >= 0);
            assert!(widget.y >= 0);
            assert!(widget.rect().right() <= cols);
        }
    }

    #[test]
    fn test_compact_persists_clamp_for_oversized_width() {
        let mut state = GridState::new(GridConfig::default());
        state.insert_widget_at(&desc("wide", "6x2", 0, 0), 0, 0);
        // Force a width the grid cannot hold, as a stale layout might carry.
        state.widget_mut("wide").unwrap().w = 20;

        compact(&mut state, None);

        let widget = state.widget("wide").unwrap();
        assert_eq!(widget.w, 12);
        assert_eq!((widget.x, widget.y), (0, 0));
    }

    #[test]
    fn test_compact_leaves_fitting_widths_alone() {
        let mut state = piled_state();
        compact(&mut state, None);

        assert_eq!(state.widget("a").unwrap().w, 3);
        assert_eq!(state.widget("b").unwrap().w, 4);
        assert_eq!(state.widget("c").unwrap().w, 2);
    }

    #[test]
    fn test_stack_flows_single_column() {
        let mut state = piled_state();
        stack(&mut state);

        assert_eq!(state.widget("a").map(|w| (w.x, w.y)), Some((0, 0)));
        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((0, 2)));
        assert_eq!(state.widget("c").map(|w| (w.x, w.y)), Some((0, 5)));
        // Widths stay as they were; stacked rendering ignores them.
        assert_eq!(state.widget("b").unwrap().w, 4);
    }
}

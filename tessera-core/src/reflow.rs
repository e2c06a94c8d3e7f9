//! # Interactive push-away reflow
//!
//! The reflow used while a gesture is in flight. Unlike full compaction,
//! which repacks monotonically, push-away minimizes visual churn: every
//! widget the active widget does not threaten sits at its *stable*
//! (pre-gesture) position, and widgets it does threaten are displaced
//! directly below it. Because each tick resolves from the stable snapshot,
//! a displaced widget snaps back the instant the active widget moves away:
//! the resolution is reversible per tick.
//!
//! Restored widgets are never moved by the cascade; displaced widgets are
//! pushed down past them instead, which is what keeps the stability
//! guarantee exact.

use crate::geometry::GridRect;
use crate::grid::GridState;
use crate::placement::MAX_SCAN_ROWS;
use std::collections::HashMap;
use tracing::warn;

/// Resolve the grid around the active widget's proposed rectangle.
///
/// `stable` maps every widget id to its rect at gesture start. Widgets whose
/// stable rect does not overlap the active widget are restored to it
/// exactly; the rest are displaced below the active widget (keeping their
/// stable column) and pushed further down past any already-resolved widget
/// they collide with. A cascade that exceeds the safety bound falls back to
/// the stable rect rather than looping.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use tessera_core::{config::GridConfig, grid::GridState, reflow::push_away};
/// use tessera_panel_api::PanelDescriptor;
///
/// let mut state = GridState::build(
///     &[
///         PanelDescriptor::new("a").with_size("3x2").with_position(0, 0),
///         PanelDescriptor::new("b").with_size("4x3").with_position(3, 0),
///     ],
///     GridConfig::default(),
/// );
/// let stable: HashMap<String, _> = state
///     .widgets()
///     .iter()
///     .map(|w| (w.id.clone(), w.rect()))
///     .collect();
///
/// // Drag a onto b's stable cell: b yields downward.
/// let a = state.widget_mut("a").unwrap();
/// a.x = 3;
/// push_away(&mut state, "a", &stable);
///
/// assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((3, 2)));
/// ```
pub fn push_away(state: &mut GridState, active_id: &str, stable: &HashMap<String, GridRect>) {
    let active_rect = match state.widget(active_id) {
        Some(widget) => widget.rect(),
        None => {
            warn!("push-away target '{}' is not on the grid", active_id);
            return;
        }
    };

    let mut resolved: Vec<GridRect> = vec![active_rect];
    let mut displaced: Vec<usize> = Vec::new();

    // First pass: everything the active widget leaves alone goes back to its
    // stable rect.
    for i in 0..state.len() {
        let widget = &state.widgets()[i];
        if widget.id == active_id {
            continue;
        }
        let stable_rect = stable.get(&widget.id).copied().unwrap_or(widget.rect());
        if stable_rect.overlaps(&active_rect) {
            displaced.push(i);
        } else {
            let widget = &mut state.widgets_mut()[i];
            widget.x = stable_rect.x;
            widget.y = stable_rect.y;
            resolved.push(widget.rect());
        }
    }

    // Second pass: displaced widgets drop below the active widget in
    // sequence order, cascading past anything already resolved.
    for i in displaced {
        let id = state.widgets()[i].id.clone();
        let stable_rect = stable.get(&id).copied().unwrap_or(state.widgets()[i].rect());

        let mut rect = GridRect::new(
            stable_rect.x,
            active_rect.bottom(),
            stable_rect.w,
            stable_rect.h,
        );

        let mut steps = 0;
        while let Some(conflict) = resolved.iter().find(|r| r.overlaps(&rect)) {
            rect.y = rect.y.max(conflict.bottom());
            steps += 1;
            if steps > MAX_SCAN_ROWS {
                warn!(
                    "push-away cascade for '{}' exceeded {} steps, restoring stable position",
                    id, MAX_SCAN_ROWS
                );
                rect = stable_rect;
                break;
            }
        }

        let widget = &mut state.widgets_mut()[i];
        widget.x = rect.x;
        widget.y = rect.y;
        resolved.push(rect);
    }
}

/// Snapshot every widget's rect, keyed by id. This is the stable map a
/// gesture resolves against.
pub fn snapshot_rects(state: &GridState) -> HashMap<String, GridRect> {
    state
        .widgets()
        .iter()
        .map(|w| (w.id.clone(), w.rect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use tessera_panel_api::PanelDescriptor;

    fn desc(id: &str, size: &str, x: i32, y: i32) -> PanelDescriptor {
        PanelDescriptor::new(id).with_size(size).with_position(x, y)
    }

    fn build(descs: &[PanelDescriptor]) -> (GridState, HashMap<String, GridRect>) {
        let state = GridState::build(descs, GridConfig::default());
        let stable = snapshot_rects(&state);
        (state, stable)
    }

    #[test]
    fn test_no_movement_restores_everything() {
        let (mut state, stable) = build(&[
            desc("a", "3x2", 0, 0),
            desc("b", "4x3", 3, 0),
            desc("c", "2x2", 7, 0),
        ]);

        push_away(&mut state, "a", &stable);

        for widget in state.widgets() {
            assert_eq!(widget.rect(), stable[&widget.id]);
        }
    }

    #[test]
    fn test_collision_displaces_below_active() {
        let (mut state, stable) = build(&[desc("a", "3x2", 0, 0), desc("b", "4x3", 3, 0)]);

        // a's candidate covers b's stable cell
        state.widget_mut("a").unwrap().x = 3;
        push_away(&mut state, "a", &stable);

        let b = state.widget("b").unwrap();
        assert_eq!((b.x, b.y), (3, 2), "pushed just below the active widget");
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_untouched_widgets_keep_stable_exactly() {
        let (mut state, stable) = build(&[
            desc("a", "3x2", 0, 0),
            desc("b", "4x3", 3, 0),
            desc("far", "2x2", 10, 6),
        ]);

        state.widget_mut("a").unwrap().x = 3;
        push_away(&mut state, "a", &stable);

        assert_eq!(state.widget("far").unwrap().rect(), stable["far"]);
    }

    #[test]
    fn test_displaced_cascades_past_restored_widget() {
        // a drags from (0, 4) onto b; c sits just below the drop zone and is
        // not threatened, so b must cascade past c.
        let (mut state, stable) = build(&[
            desc("b", "3x2", 0, 0),
            desc("c", "3x2", 0, 2),
            desc("a", "3x2", 0, 4),
        ]);

        state.widget_mut("a").unwrap().y = 0;
        push_away(&mut state, "a", &stable);

        assert_eq!(state.widget("c").unwrap().rect(), stable["c"]);
        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((0, 4)));
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_multiple_displaced_stack_in_sequence_order() {
        let (mut state, stable) = build(&[
            desc("b", "2x2", 0, 0),
            desc("c", "2x2", 0, 2),
            desc("d", "2x4", 5, 0),
        ]);

        // d lands on top of both b and c
        state.widget_mut("d").unwrap().x = 0;
        push_away(&mut state, "d", &stable);

        assert_eq!(state.widget("b").map(|w| (w.x, w.y)), Some((0, 4)));
        assert_eq!(state.widget("c").map(|w| (w.x, w.y)), Some((0, 6)));
        assert!(!state.has_overlaps());
    }

    #[test]
    fn test_reflow_is_reversible_per_tick() {
        let (mut state, stable) = build(&[desc("a", "3x2", 0, 0), desc("b", "4x3", 3, 0)]);

        // Tick 1: a threatens b
        state.widget_mut("a").unwrap().x = 3;
        push_away(&mut state, "a", &stable);
        assert_ne!(state.widget("b").unwrap().rect(), stable["b"]);

        // Tick 2: a retreats; b snaps straight back
        state.widget_mut("a").unwrap().x = 0;
        push_away(&mut state, "a", &stable);
        assert_eq!(state.widget("b").unwrap().rect(), stable["b"]);
    }

    #[test]
    fn test_displaced_keeps_stable_column() {
        let (mut state, stable) = build(&[desc("a", "2x2", 0, 2), desc("b", "4x2", 2, 0)]);

        // a moves up into b's row
        let a = state.widget_mut("a").unwrap();
        a.x = 2;
        a.y = 0;
        push_away(&mut state, "a", &stable);

        let b = state.widget("b").unwrap();
        assert_eq!(b.x, 2, "displacement is vertical only");
        assert_eq!(b.y, 2);
    }

    #[test]
    fn test_missing_active_widget_is_a_no_op() {
        let (mut state, stable) = build(&[desc("a", "3x2", 0, 0)]);
        push_away(&mut state, "ghost", &stable);
        assert_eq!(state.widget("a").unwrap().rect(), stable["a"]);
    }

    #[test]
    fn test_snapshot_rects() {
        let (state, stable) = build(&[desc("a", "3x2", 1, 2), desc("b", "2x2", 6, 0)]);
        assert_eq!(stable.len(), 2);
        assert_eq!(stable["a"], GridRect::new(1, 2, 3, 2));
        assert_eq!(stable["b"], GridRect::new(6, 0, 2, 2));
        assert_eq!(state.len(), 2);
    }
}

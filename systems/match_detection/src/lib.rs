#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure match detection system that scans the board for line matches.
//!
//! A line match is a contiguous run of at least [`MIN_RUN_LENGTH`] tiles that
//! share a symbol along a row or column. Runs that intersect are merged into a
//! single [`MatchGroup`]: every cell added along one axis re-probes the
//! perpendicular axis until the group stops growing. Only standard and
//! wildcard tiles take part; special tiles, obstacles, pending cells and holes
//! interrupt a run.

use std::collections::{BTreeSet, HashSet};

use match_cascade_core::{Axis, CellCoord, MatchGroup, SlotView, Symbol};

/// Shortest run that qualifies as a line match.
pub const MIN_RUN_LENGTH: usize = 3;

/// Finds every match-group on the board.
///
/// Cells are visited in row-major order. A cell already claimed by a group
/// found earlier in the same call never seeds another group, so the returned
/// groups are disjoint.
#[must_use]
pub fn detect_matches(view: SlotView<'_>) -> Vec<MatchGroup> {
    let mut claimed: HashSet<CellCoord> = HashSet::new();
    let mut groups = Vec::new();

    for cell in view.cells() {
        if claimed.contains(&cell) {
            continue;
        }

        if let Some(group) = group_through(view, cell) {
            claimed.extend(group.cells().iter().copied());
            groups.push(group);
        }
    }

    groups
}

/// Returns the match-group passing through `cell`, if the cell is part of one.
#[must_use]
pub fn group_through(view: SlotView<'_>, cell: CellCoord) -> Option<MatchGroup> {
    let symbol = match_symbol(view, cell)?;
    let mut members: BTreeSet<CellCoord> = BTreeSet::new();
    let mut probed: HashSet<(CellCoord, Axis)> = HashSet::new();
    let mut frontier = vec![(cell, Axis::Vertical), (cell, Axis::Horizontal)];

    while let Some((origin, axis)) = frontier.pop() {
        if !probed.insert((origin, axis)) {
            continue;
        }

        let run = line_run(view, origin, symbol, axis);
        if run.len() < MIN_RUN_LENGTH {
            continue;
        }

        for member in run {
            if members.insert(member) {
                frontier.push((member, axis.perpendicular()));
            }
        }
    }

    if members.is_empty() {
        None
    } else {
        Some(MatchGroup::new(symbol, members.into_iter().collect()))
    }
}

/// Reports whether any line match exists on the board.
#[must_use]
pub fn has_matches(view: SlotView<'_>) -> bool {
    view.cells().any(|cell| group_through(view, cell).is_some())
}

fn match_symbol(view: SlotView<'_>, cell: CellCoord) -> Option<Symbol> {
    view.tile(cell).and_then(|tile| tile.match_symbol())
}

fn line_run(view: SlotView<'_>, origin: CellCoord, symbol: Symbol, axis: Axis) -> Vec<CellCoord> {
    let mut run = vec![origin];

    for forward in [false, true] {
        let mut cursor = origin;
        while let Some(next) = view.step(cursor, axis, forward) {
            if match_symbol(view, next) != Some(symbol) {
                break;
            }
            run.push(next);
            cursor = next;
        }
    }

    run
}

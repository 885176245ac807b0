use std::collections::HashSet;

use match_cascade_core::{BoardLayout, CellCoord, Command, Event, Slot, TileKind};
use match_cascade_world::{self as world, query, World};

fn initialized(layout: BoardLayout) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::Initialize { layout }, &mut events)
        .expect("layout is valid");
    world
}

fn neighbour_swaps(columns: u32, rows: u32) -> Vec<(CellCoord, CellCoord)> {
    let mut swaps = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            let cell = CellCoord::new(column, row);
            if column + 1 < columns {
                swaps.push((cell, CellCoord::new(column + 1, row)));
            }
            if row + 1 < rows {
                swaps.push((cell, CellCoord::new(column, row + 1)));
            }
        }
    }
    swaps
}

fn assert_board_invariants(world: &World) {
    let view = query::slot_view(world);
    let mut ids = HashSet::new();
    for cell in view.cells() {
        match view.slot(cell) {
            Some(Slot::Hole) => {}
            Some(Slot::Occupied(tile)) => {
                assert_eq!(tile.cell, cell, "tile coordinates drifted from its slot");
                assert!(!tile.removed, "removed tile left on the board at {cell}");
                assert!(ids.insert(tile.id), "tile id {:?} appears twice", tile.id);
            }
            Some(Slot::Pending) | None => panic!("cell {cell} left without a tile"),
        }
    }
    assert!(query::is_stable(world), "board left unstable");
}

fn exercise(layout: BoardLayout) -> usize {
    let (columns, rows) = layout.clamped_dimensions();
    let mut world = initialized(layout);
    assert_board_invariants(&world);

    let mut accepted = 0;
    for (first, second) in neighbour_swaps(columns, rows) {
        let mut events = Vec::new();
        world::apply(&mut world, Command::RequestSwap { first, second }, &mut events)
            .expect("neighbouring cells lie on the board");
        if !matches!(events.as_slice(), [Event::SwapRejected { .. }]) {
            accepted += 1;
        }
        assert_board_invariants(&world);
    }
    accepted
}

#[test]
fn every_swap_leaves_a_full_stable_board() {
    for seed in 0..4 {
        let _ = exercise(BoardLayout::new(8, 8).with_seed(seed));
    }
}

#[test]
fn invariants_hold_with_holes_and_obstacles() {
    let layout = BoardLayout::new(7, 6)
        .with_seed(11)
        .with_symbol_count(4)
        .with_holes([CellCoord::new(3, 2), CellCoord::new(0, 0), CellCoord::new(6, 5)])
        .with_obstacle(CellCoord::new(1, 1), 3)
        .with_obstacle(CellCoord::new(5, 4), 1);

    let accepted = exercise(layout);

    assert!(accepted > 0, "no swap was ever accepted");
}

#[test]
fn dimensions_are_clamped() {
    let world = initialized(BoardLayout::new(12, 9).with_seed(3));

    assert_eq!(query::dimensions(&world), (8, 8));
}

#[test]
fn created_tiles_are_ordinary_refills_or_promotions() {
    let mut world = initialized(BoardLayout::new(6, 6).with_seed(5).with_symbol_count(3));

    for (first, second) in neighbour_swaps(6, 6) {
        let mut events = Vec::new();
        world::apply(&mut world, Command::RequestSwap { first, second }, &mut events)
            .expect("neighbouring cells lie on the board");

        for event in &events {
            if let Event::TileCreated {
                cell, kind, symbol, ..
            } = event
            {
                match kind {
                    TileKind::Standard => assert!(
                        symbol.is_some_and(|symbol| symbol.get() < 3),
                        "refill at {cell} drew {symbol:?}"
                    ),
                    other => assert!(other.is_special(), "created {other:?} at {cell}"),
                }
            }
        }
    }
}

#[test]
fn compaction_never_leaves_gaps_below_tiles() {
    let mut world = initialized(BoardLayout::new(5, 7).with_seed(9).with_symbol_count(3));

    for (first, second) in neighbour_swaps(5, 7) {
        let mut events = Vec::new();
        world::apply(&mut world, Command::RequestSwap { first, second }, &mut events)
            .expect("neighbouring cells lie on the board");

        for event in &events {
            if let Event::TileMoved { from, to, .. } = event {
                let swap_move = (*from == first && *to == second) || (*from == second && *to == first);
                assert!(
                    swap_move || (from.column() == to.column() && from.row() < to.row()),
                    "tile moved from {from} to {to} outside gravity"
                );
            }
        }
    }
}

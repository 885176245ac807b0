#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state management for Match Cascade.
//!
//! The world owns the slot grid, the symbol source and the special-tile
//! policy. Every mutation flows through [`apply`], which runs a command to
//! completion and appends the resulting [`Event`] values in the order the
//! board changed. Read access goes through the [`query`] module.

mod grid;
mod resolver;

use match_cascade_core::{BoardError, BoardLayout, Command, Event};
use match_cascade_system_promotion::SpecialTilePolicy;
use match_cascade_system_symbol_generation::{Config, SeededSymbols, SymbolSource};

use crate::grid::Grid;

/// Upper bound on removal passes executed by a single cascade.
pub const MAX_CASCADE_PASSES: u32 = 256;

const POLICY_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Stage of the resolver state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the next command.
    Idle,
    /// Exchanging the two tiles named by a swap request.
    Swapping,
    /// Compacting columns and refilling pending cells.
    Settling,
    /// Scanning the board for match-groups.
    Matching,
    /// Removing matched and triggered tiles.
    Removing,
}

/// Represents the authoritative Match Cascade board state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    symbols: Box<dyn SymbolSource>,
    symbols_from_layout: bool,
    policy: SpecialTilePolicy,
    phase: Phase,
    next_tile: u32,
}

impl World {
    /// Creates an empty world; issue [`Command::Initialize`] to build a board.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::empty(),
            symbols: Box::new(SeededSymbols::new(Config::default())),
            symbols_from_layout: true,
            policy: SpecialTilePolicy::default(),
            phase: Phase::Idle,
            next_tile: 0,
        }
    }

    /// Creates an empty world that draws refill symbols from `symbols`.
    ///
    /// The source is kept across initializations instead of being reseeded
    /// from each layout, which lets tests script every refilled symbol.
    #[must_use]
    pub fn with_symbol_source(symbols: Box<dyn SymbolSource>) -> Self {
        Self {
            symbols,
            symbols_from_layout: false,
            ..Self::new()
        }
    }

    fn reseed(&mut self, layout: &BoardLayout) {
        if self.symbols_from_layout {
            self.symbols = Box::new(SeededSymbols::new(Config::new(
                layout.symbol_count,
                layout.seed,
            )));
        }
        self.policy = SpecialTilePolicy::new(layout.seed ^ POLICY_SEED_SALT);
        self.next_tile = 0;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Refused swaps are reported through [`Event::SwapRejected`] and leave the
/// board untouched. An error is returned only for contract violations such
/// as coordinates outside the board or an invalid layout.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), BoardError> {
    match command {
        Command::Initialize { layout } => world.initialize(&layout, out_events),
        Command::RequestSwap { first, second } => world.request_swap(first, second, out_events),
        Command::Settle => world.settle(0, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use match_cascade_core::{BoardError, CellCoord, Slot, SlotView};
    use match_cascade_system_match_detection::has_matches;

    use super::{Phase, World};

    /// Number of columns and rows on the board.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Snapshot of the slot at `cell`.
    pub fn slot(world: &World, cell: CellCoord) -> Result<Slot, BoardError> {
        world.grid.get(cell).copied()
    }

    /// Read-only view of every slot on the board.
    #[must_use]
    pub fn slot_view(world: &World) -> SlotView<'_> {
        world.grid.view()
    }

    /// Current stage of the resolver state machine.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Reports whether the board is idle, fully populated and free of matches.
    #[must_use]
    pub fn is_stable(world: &World) -> bool {
        let view = world.grid.view();
        world.phase == Phase::Idle
            && view
                .cells()
                .all(|cell| !matches!(view.slot(cell), Some(Slot::Pending)))
            && !has_matches(view)
    }
}

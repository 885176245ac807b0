#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Board engine facade that external collaborators talk to.
//!
//! The engine wraps the authoritative world and turns its command/event
//! surface into request/response calls: every call runs to completion and
//! hands back the ordered mutation events a renderer needs to replay.

use log::info;
use match_cascade_core::{
    BoardError, BoardLayout, CellCoord, Command, Event, Slot, SlotView, SwapRejection,
};
use match_cascade_system_symbol_generation::SymbolSource;
use match_cascade_world::{self as world, query, World};

/// Result of a swap request that named cells on the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapOutcome {
    /// The swap was refused and the board is unchanged.
    Rejected(SwapRejection),
    /// The swap was accepted and the cascade ran to quiescence.
    Resolved(Vec<Event>),
}

impl SwapOutcome {
    /// Reports whether the swap was accepted.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Converts the outcome into a result, mapping refusals to [`BoardError::InvalidSwap`].
    pub fn into_result(self) -> Result<Vec<Event>, BoardError> {
        match self {
            Self::Rejected(reason) => Err(BoardError::InvalidSwap(reason)),
            Self::Resolved(events) => Ok(events),
        }
    }
}

/// Facade over the match-cascade world.
#[derive(Debug, Default)]
pub struct BoardEngine {
    world: World,
}

impl BoardEngine {
    /// Creates an engine whose refills are seeded from each layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine that draws every generated symbol from `symbols`.
    #[must_use]
    pub fn with_symbol_source(symbols: Box<dyn SymbolSource>) -> Self {
        Self {
            world: World::with_symbol_source(symbols),
        }
    }

    /// Builds a fresh board from `layout` and settles it.
    ///
    /// Returns the creation events followed by any cascade the opening board
    /// triggered.
    pub fn initialize(&mut self, layout: BoardLayout) -> Result<Vec<Event>, BoardError> {
        let events = self.execute(Command::Initialize { layout })?;
        let (columns, rows) = self.dimensions();
        info!("board ready: {columns}x{rows}, {} events", events.len());
        Ok(events)
    }

    /// Requests that the tiles at `first` and `second` trade places.
    ///
    /// Fails only when a coordinate lies outside the board.
    pub fn request_swap(
        &mut self,
        first: CellCoord,
        second: CellCoord,
    ) -> Result<SwapOutcome, BoardError> {
        let events = self.execute(Command::RequestSwap { first, second })?;
        match events.as_slice() {
            [Event::SwapRejected { reason, .. }] => Ok(SwapOutcome::Rejected(*reason)),
            _ => Ok(SwapOutcome::Resolved(events)),
        }
    }

    /// Runs the cascade loop without a preceding swap.
    pub fn settle(&mut self) -> Result<Vec<Event>, BoardError> {
        self.execute(Command::Settle)
    }

    /// Reports whether the board is idle, fully populated and free of matches.
    #[must_use]
    pub fn is_stable(&self) -> bool {
        query::is_stable(&self.world)
    }

    /// Snapshot of the slot at `cell`.
    pub fn inspect(&self, cell: CellCoord) -> Result<Slot, BoardError> {
        query::slot(&self.world, cell)
    }

    /// Number of columns and rows on the board.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        query::dimensions(&self.world)
    }

    /// Read-only view of every slot on the board.
    #[must_use]
    pub fn view(&self) -> SlotView<'_> {
        query::slot_view(&self.world)
    }

    fn execute(&mut self, command: Command) -> Result<Vec<Event>, BoardError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)?;
        Ok(events)
    }
}

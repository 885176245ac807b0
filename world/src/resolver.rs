//! Swap validation, removal, gravity and the cascade loop.

use log::{debug, trace, warn};
use match_cascade_core::{
    BoardError, BoardLayout, CellCoord, CellPlan, Event, MatchGroup, RemovalCause, Slot,
    SwapContext, SwapRejection, Symbol, Tile, TileId, TileKind,
};
use match_cascade_system_match_detection::{detect_matches, group_through};
use match_cascade_system_promotion::PromotedTile;

use crate::{grid::Grid, Phase, World, MAX_CASCADE_PASSES};

impl World {
    pub(crate) fn initialize(
        &mut self,
        layout: &BoardLayout,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        let plan = layout.plan()?;
        let (columns, rows) = layout.clamped_dimensions();
        debug!(
            "initializing {columns}x{rows} board (seed {}, {} symbols)",
            layout.seed, layout.symbol_count
        );

        self.grid = Grid::from_plan(columns, rows, &plan);
        self.reseed(layout);
        self.phase = Phase::Settling;
        out_events.push(Event::BoardInitialized { columns, rows });

        let cells: Vec<CellCoord> = self.grid.view().cells().collect();
        for (cell, cell_plan) in cells.into_iter().zip(plan) {
            match cell_plan {
                CellPlan::Hole => {}
                CellPlan::Generated => {
                    let symbol = self.symbols.next_symbol();
                    self.spawn(cell, TileKind::Standard, Some(symbol), out_events)?;
                }
                CellPlan::Preset { kind, symbol } => self.spawn(cell, kind, symbol, out_events)?,
            }
        }

        self.settle(0, out_events)
    }

    pub(crate) fn request_swap(
        &mut self,
        first: CellCoord,
        second: CellCoord,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        let slots = [*self.grid.get(first)?, *self.grid.get(second)?];
        let (from_first, from_second) = match self.validate_swap(first, second, slots) {
            Ok(tiles) => tiles,
            Err(reason) => {
                debug!("rejected swap {first} <-> {second}: {reason}");
                out_events.push(Event::SwapRejected {
                    first,
                    second,
                    reason,
                });
                return Ok(());
            }
        };

        self.phase = Phase::Swapping;
        self.grid.swap(first, second)?;

        let view = self.grid.view();
        let forms_match =
            group_through(view, first).is_some() || group_through(view, second).is_some();
        if !forms_match && !from_first.kind.is_special() && !from_second.kind.is_special() {
            self.grid.swap(first, second)?;
            self.phase = Phase::Idle;
            debug!("rejected swap {first} <-> {second}: no match");
            out_events.push(Event::SwapRejected {
                first,
                second,
                reason: SwapRejection::NoMatch,
            });
            return Ok(());
        }

        debug!("accepted swap {first} <-> {second}");
        out_events.push(Event::TileMoved {
            tile: from_first.id,
            from: first,
            to: second,
        });
        out_events.push(Event::TileMoved {
            tile: from_second.id,
            from: second,
            to: first,
        });

        let swap = SwapContext::new(first, second);
        self.phase = Phase::Matching;
        let groups = detect_matches(self.grid.view());

        self.phase = Phase::Removing;
        self.fire_swapped_specials(swap, out_events);
        self.remove_groups(&groups, Some(swap), out_events)?;
        self.collapse(out_events)?;

        self.settle(1, out_events)
    }

    /// Repeats detection, removal, compaction and refill until no group remains.
    pub(crate) fn settle(
        &mut self,
        mut passes: u32,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        loop {
            self.phase = Phase::Matching;
            let groups = detect_matches(self.grid.view());
            if groups.is_empty() {
                break;
            }
            if passes >= MAX_CASCADE_PASSES {
                warn!(
                    "cascade stopped after {passes} passes with {} groups unresolved",
                    groups.len()
                );
                break;
            }

            passes += 1;
            debug!("cascade pass {passes}: {} match-groups", groups.len());
            self.phase = Phase::Removing;
            self.remove_groups(&groups, None, out_events)?;
            self.collapse(out_events)?;
        }

        self.phase = Phase::Idle;
        out_events.push(Event::BoardSettled { passes });
        Ok(())
    }

    /// Checks that a swap between `first` and `second` may start.
    ///
    /// The `Busy` branches only guard re-entrant requests: every command runs
    /// to completion and leaves the world `Idle` with no removed tiles.
    fn validate_swap(
        &self,
        first: CellCoord,
        second: CellCoord,
        slots: [Slot; 2],
    ) -> Result<(Tile, Tile), SwapRejection> {
        if !first.is_adjacent(second) {
            return Err(SwapRejection::NotAdjacent);
        }
        if self.phase != Phase::Idle {
            return Err(SwapRejection::Busy);
        }

        let [a, b] = slots.map(|slot| match slot {
            Slot::Hole => Err(SwapRejection::Hole),
            Slot::Pending => Err(SwapRejection::Pending),
            Slot::Occupied(tile) if tile.removed => Err(SwapRejection::Busy),
            Slot::Occupied(tile) if tile.kind.is_obstacle() => Err(SwapRejection::Obstacle),
            Slot::Occupied(tile) => Ok(tile),
        });
        Ok((a?, b?))
    }

    /// Applies wildcard adoption and fires every special tile the swap moved.
    fn fire_swapped_specials(&mut self, swap: SwapContext, out_events: &mut Vec<Event>) {
        let landed: Vec<Tile> = [swap.first, swap.second]
            .into_iter()
            .filter_map(|cell| self.grid.tile(cell).copied())
            .collect();

        let wildcard = landed.iter().find(|tile| tile.kind == TileKind::Wildcard);
        let partner = landed.iter().find(|tile| tile.kind != TileKind::Wildcard);
        if let (Some(wildcard), Some(partner)) = (wildcard, partner) {
            if let (Some(symbol), Some(tile)) = (partner.symbol, self.grid.tile_mut(wildcard.cell)) {
                trace!("wildcard {} adopts symbol {}", tile.id.get(), symbol.get());
                tile.symbol = Some(symbol);
            }
        }

        for tile in &landed {
            if tile.kind.is_special() {
                self.remove_at(tile.cell, RemovalCause::Swapped, out_events);
            }
        }
    }

    /// Removes every group, then places the special tiles the policy chose.
    fn remove_groups(
        &mut self,
        groups: &[MatchGroup],
        swap: Option<SwapContext>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        let promotions: Vec<PromotedTile> = groups
            .iter()
            .filter_map(|group| self.policy.promote(group, swap))
            .collect();

        for group in groups {
            for &cell in group.cells() {
                self.remove_at(cell, RemovalCause::Matched, out_events);
            }
        }

        for promoted in promotions {
            debug!("promoting {:?} at {}", promoted.kind, promoted.cell);
            self.spawn(
                promoted.cell,
                promoted.kind,
                Some(promoted.symbol),
                out_events,
            )?;
        }
        Ok(())
    }

    /// Removes the tile at `cell` and recursively fires its special effect.
    ///
    /// Each tile is removed at most once per pass, so recursion depth never
    /// exceeds the number of tiles on the board.
    fn remove_at(&mut self, cell: CellCoord, cause: RemovalCause, out_events: &mut Vec<Event>) {
        let Some(tile) = self.grid.tile_mut(cell) else {
            return;
        };
        if tile.removed {
            return;
        }
        if let TileKind::Obstacle { stage } = tile.kind {
            if stage > 1 {
                tile.kind = TileKind::Obstacle { stage: stage - 1 };
                out_events.push(Event::ObstacleDamaged {
                    tile: tile.id,
                    cell,
                    stage: stage - 1,
                });
                return;
            }
        }

        tile.removed = true;
        let tile = *tile;
        trace!("removed tile {} at {cell} ({cause:?})", tile.id.get());
        out_events.push(Event::TileRemoved {
            tile: tile.id,
            cell,
            cause,
        });

        if !tile.kind.is_special() {
            return;
        }

        let affected = self.effect_area(&tile);
        out_events.push(Event::SpecialTriggered {
            tile: tile.id,
            kind: tile.kind,
            origin: cell,
            affected: affected.clone(),
        });
        for target in affected {
            self.remove_at(target, RemovalCause::Triggered { by: tile.id }, out_events);
        }
    }

    /// Cells holding live tiles caught by the effect of `special`.
    fn effect_area(&self, special: &Tile) -> Vec<CellCoord> {
        let view = self.grid.view();
        let origin = special.cell;
        let live = |cell: &CellCoord| view.tile(*cell).is_some_and(|tile| !tile.removed);

        match special.kind {
            TileKind::RowClear => view
                .cells()
                .filter(|cell| cell.row() == origin.row())
                .filter(live)
                .collect(),
            TileKind::ColumnClear => view
                .cells()
                .filter(|cell| cell.column() == origin.column())
                .filter(live)
                .collect(),
            TileKind::Bomb => view
                .cells()
                .filter(|cell| {
                    cell.column().abs_diff(origin.column()) <= 1
                        && cell.row().abs_diff(origin.row()) <= 1
                })
                .filter(live)
                .collect(),
            TileKind::Wildcard => {
                let target = special.symbol.filter(|symbol| *symbol != Symbol::WILDCARD);
                view.cells()
                    .filter(live)
                    .filter(|cell| {
                        target.is_none() || view.tile(*cell).and_then(|tile| tile.symbol) == target
                    })
                    .collect()
            }
            TileKind::Standard | TileKind::Obstacle { .. } => Vec::new(),
        }
    }

    /// Drops surviving tiles to the bottom of each column and refills the top.
    fn collapse(&mut self, out_events: &mut Vec<Event>) -> Result<(), BoardError> {
        self.phase = Phase::Settling;
        self.grid.clear_removed();

        let (columns, _) = self.grid.dimensions();
        let mut vacancies = Vec::new();
        for column in 0..columns {
            let cells = self.grid.column_cells(column);
            let mut survivors = Vec::with_capacity(cells.len());
            for &cell in &cells {
                if let Some(tile) = self.grid.take(cell)? {
                    survivors.push(tile);
                }
            }

            let gap = cells.len() - survivors.len();
            for (mut tile, &to) in survivors.into_iter().zip(&cells[gap..]).rev() {
                let from = tile.cell;
                tile.cell = to;
                self.grid.place(tile)?;
                if from != to {
                    out_events.push(Event::TileMoved {
                        tile: tile.id,
                        from,
                        to,
                    });
                }
            }
            vacancies.extend(cells[..gap].iter().rev().copied());
        }

        for cell in vacancies {
            let symbol = self.symbols.next_symbol();
            self.spawn(cell, TileKind::Standard, Some(symbol), out_events)?;
        }
        Ok(())
    }

    fn spawn(
        &mut self,
        cell: CellCoord,
        kind: TileKind,
        symbol: Option<Symbol>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), BoardError> {
        let id = TileId::new(self.next_tile);
        self.next_tile = self.next_tile.wrapping_add(1);
        self.grid.place(Tile {
            id,
            kind,
            symbol,
            cell,
            removed: false,
        })?;
        out_events.push(Event::TileCreated {
            tile: id,
            cell,
            kind,
            symbol,
        });
        Ok(())
    }
}

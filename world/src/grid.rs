use match_cascade_core::{BoardError, CellCoord, CellPlan, Slot, SlotView, Tile};

/// Dense row-major storage of every slot on the board.
#[derive(Clone, Debug)]
pub(crate) struct Grid {
    columns: u32,
    rows: u32,
    slots: Vec<Slot>,
}

impl Grid {
    /// Board with no cells, used before the first initialization.
    pub(crate) fn empty() -> Self {
        Self {
            columns: 0,
            rows: 0,
            slots: Vec::new(),
        }
    }

    /// Allocates a board whose active cells start pending and whose holes follow `plan`.
    pub(crate) fn from_plan(columns: u32, rows: u32, plan: &[CellPlan]) -> Self {
        let slots = plan
            .iter()
            .map(|cell| match cell {
                CellPlan::Hole => Slot::Hole,
                CellPlan::Generated | CellPlan::Preset { .. } => Slot::Pending,
            })
            .collect();
        Self {
            columns,
            rows,
            slots,
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn view(&self) -> SlotView<'_> {
        SlotView::new(&self.slots, self.columns, self.rows)
    }

    /// Reads the slot at `cell`; holes are reported, never an error.
    pub(crate) fn get(&self, cell: CellCoord) -> Result<&Slot, BoardError> {
        let index = self.index(cell)?;
        Ok(&self.slots[index])
    }

    pub(crate) fn tile(&self, cell: CellCoord) -> Option<&Tile> {
        self.index(cell).ok().and_then(|index| self.slots[index].tile())
    }

    pub(crate) fn tile_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        let index = self.index(cell).ok()?;
        match &mut self.slots[index] {
            Slot::Occupied(tile) => Some(tile),
            Slot::Hole | Slot::Pending => None,
        }
    }

    /// Stores `tile` in the slot named by its own cell, replacing any previous content.
    pub(crate) fn place(&mut self, tile: Tile) -> Result<(), BoardError> {
        let index = self.writable_index(tile.cell)?;
        self.slots[index] = Slot::Occupied(tile);
        Ok(())
    }

    /// Empties the slot at `cell`, returning the tile it held.
    pub(crate) fn take(&mut self, cell: CellCoord) -> Result<Option<Tile>, BoardError> {
        let index = self.writable_index(cell)?;
        match std::mem::replace(&mut self.slots[index], Slot::Pending) {
            Slot::Occupied(tile) => Ok(Some(tile)),
            Slot::Pending | Slot::Hole => Ok(None),
        }
    }

    /// Exchanges the contents of two active slots and updates the tiles' cells.
    pub(crate) fn swap(&mut self, first: CellCoord, second: CellCoord) -> Result<(), BoardError> {
        let a = self.writable_index(first)?;
        let b = self.writable_index(second)?;
        self.slots.swap(a, b);
        if let Slot::Occupied(tile) = &mut self.slots[a] {
            tile.cell = first;
        }
        if let Slot::Occupied(tile) = &mut self.slots[b] {
            tile.cell = second;
        }
        Ok(())
    }

    /// Active cells of `column`, top to bottom.
    pub(crate) fn column_cells(&self, column: u32) -> Vec<CellCoord> {
        (0..self.rows)
            .map(|row| CellCoord::new(column, row))
            .filter(|cell| !matches!(self.get(*cell), Ok(Slot::Hole) | Err(_)))
            .collect()
    }

    /// Turns every slot holding a removed tile back into a pending slot.
    pub(crate) fn clear_removed(&mut self) {
        for slot in &mut self.slots {
            if matches!(slot, Slot::Occupied(tile) if tile.removed) {
                *slot = Slot::Pending;
            }
        }
    }

    fn writable_index(&self, cell: CellCoord) -> Result<usize, BoardError> {
        let index = self.index(cell)?;
        if self.slots[index].is_hole() {
            return Err(self.out_of_bounds(cell));
        }
        Ok(index)
    }

    fn index(&self, cell: CellCoord) -> Result<usize, BoardError> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return Err(self.out_of_bounds(cell));
        }
        Ok(cell.row() as usize * self.columns as usize + cell.column() as usize)
    }

    fn out_of_bounds(&self, cell: CellCoord) -> BoardError {
        BoardError::OutOfBounds {
            cell,
            columns: self.columns,
            rows: self.rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use match_cascade_core::{Symbol, TileId, TileKind};

    fn tile(id: u32, cell: CellCoord) -> Tile {
        Tile {
            id: TileId::new(id),
            kind: TileKind::Standard,
            symbol: Some(Symbol::ordinary(0)),
            cell,
            removed: false,
        }
    }

    fn grid_with_hole() -> Grid {
        let mut plan = vec![CellPlan::Generated; 4];
        plan[1] = CellPlan::Hole;
        Grid::from_plan(2, 2, &plan)
    }

    #[test]
    fn out_of_range_reads_fail() {
        let grid = grid_with_hole();
        assert_eq!(
            grid.get(CellCoord::new(2, 0)),
            Err(BoardError::OutOfBounds {
                cell: CellCoord::new(2, 0),
                columns: 2,
                rows: 2,
            })
        );
    }

    #[test]
    fn holes_read_as_holes_but_reject_writes() {
        let mut grid = grid_with_hole();
        let hole = CellCoord::new(1, 0);
        assert_eq!(grid.get(hole), Ok(&Slot::Hole));
        assert!(grid.place(tile(0, hole)).is_err());
        assert!(grid.take(hole).is_err());
    }

    #[test]
    fn swap_updates_tile_cells() {
        let mut grid = grid_with_hole();
        let a = CellCoord::new(0, 0);
        let b = CellCoord::new(0, 1);
        grid.place(tile(1, a)).expect("place");
        grid.place(tile(2, b)).expect("place");
        grid.swap(a, b).expect("swap");
        assert_eq!(grid.tile(a).map(|tile| (tile.id, tile.cell)), Some((TileId::new(2), a)));
        assert_eq!(grid.tile(b).map(|tile| (tile.id, tile.cell)), Some((TileId::new(1), b)));
    }

    #[test]
    fn column_cells_skip_holes() {
        let grid = grid_with_hole();
        assert_eq!(grid.column_cells(1), vec![CellCoord::new(1, 1)]);
        assert_eq!(grid.column_cells(0).len(), 2);
    }

    #[test]
    fn clear_removed_leaves_pending_slots() {
        let mut grid = grid_with_hole();
        let cell = CellCoord::new(0, 0);
        let mut removed = tile(3, cell);
        removed.removed = true;
        grid.place(removed).expect("place");
        grid.clear_removed();
        assert_eq!(grid.get(cell), Ok(&Slot::Pending));
    }
}

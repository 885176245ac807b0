#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Match Cascade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then emits [`Event`] values in the exact order the
//! board was mutated so renderers can replay them. Systems only ever observe
//! the board through a read-only [`SlotView`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard upper bound applied to both board dimensions at construction.
pub const MAX_BOARD_DIMENSION: u32 = 8;

/// Number of ordinary symbols used when a layout does not specify one.
pub const DEFAULT_SYMBOL_COUNT: u8 = 6;

/// Largest number of ordinary symbols a layout may request.
pub const MAX_SYMBOL_COUNT: u8 = 26;

/// Highest stage an obstacle may start at.
pub const MAX_OBSTACLE_STAGE: u8 = 3;

/// Commands that express all permissible board mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Builds a fresh board from the provided layout and settles it.
    Initialize {
        /// Shape, obstacles and optional preset tiles of the new board.
        layout: BoardLayout,
    },
    /// Requests that the tiles occupying two cells trade places.
    RequestSwap {
        /// Cell the gesture started on.
        first: CellCoord,
        /// Cell the gesture ended on.
        second: CellCoord,
    },
    /// Runs the cascade loop on the current board without a preceding swap.
    Settle,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new board replaced any previous one.
    BoardInitialized {
        /// Number of columns in the clamped board.
        columns: u32,
        /// Number of rows in the clamped board.
        rows: u32,
    },
    /// Confirms that a tile was placed into a previously empty cell.
    TileCreated {
        /// Identifier assigned to the new tile.
        tile: TileId,
        /// Cell the tile occupies.
        cell: CellCoord,
        /// Kind of the new tile.
        kind: TileKind,
        /// Symbol carried by the new tile, if any.
        symbol: Option<Symbol>,
    },
    /// Confirms that a tile moved between two cells, by swap or by gravity.
    TileMoved {
        /// Identifier of the tile that moved.
        tile: TileId,
        /// Cell the tile occupied before moving.
        from: CellCoord,
        /// Cell the tile occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a tile left the board.
    TileRemoved {
        /// Identifier of the removed tile.
        tile: TileId,
        /// Cell the tile occupied when it was removed.
        cell: CellCoord,
        /// Reason the tile was removed.
        cause: RemovalCause,
    },
    /// Reports that a special tile unleashed its effect.
    SpecialTriggered {
        /// Identifier of the special tile.
        tile: TileId,
        /// Kind of the special tile.
        kind: TileKind,
        /// Cell the special tile occupied when it fired.
        origin: CellCoord,
        /// Cells covered by the effect, in board scan order.
        affected: Vec<CellCoord>,
    },
    /// Reports that an obstacle absorbed a hit and dropped one stage.
    ObstacleDamaged {
        /// Identifier of the obstacle tile.
        tile: TileId,
        /// Cell the obstacle occupies.
        cell: CellCoord,
        /// Stage remaining after the hit.
        stage: u8,
    },
    /// Reports that a swap request was refused without mutating the board.
    SwapRejected {
        /// First cell named by the request.
        first: CellCoord,
        /// Second cell named by the request.
        second: CellCoord,
        /// Specific reason the swap was refused.
        reason: SwapRejection,
    },
    /// Announces that the cascade loop finished and the board is idle.
    BoardSettled {
        /// Number of removal passes executed before the board became stable.
        passes: u32,
    },
}

/// Location of a single board cell expressed as column and row coordinates.
///
/// Row zero is the top of the board; gravity pulls towards larger rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new board cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Axis along which two adjacent cells are aligned.
    #[must_use]
    pub fn axis_to(self, other: CellCoord) -> Option<Axis> {
        if !self.is_adjacent(other) {
            return None;
        }

        if self.row == other.row {
            Some(Axis::Horizontal)
        } else {
            Some(Axis::Vertical)
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Board axis used for line scans and swap orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Along a row, varying the column.
    Horizontal,
    /// Along a column, varying the row.
    Vertical,
}

impl Axis {
    /// The axis perpendicular to this one.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }
}

/// Unique identifier assigned to a tile when it is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Colour or picture carried by a tile and compared during line matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(u8);

impl Symbol {
    /// Sentinel carried by wildcard tiles; it never equals an ordinary symbol.
    pub const WILDCARD: Symbol = Symbol(0xfe);

    /// Sentinel carried by bomb tiles.
    pub const BOMB: Symbol = Symbol(0xff);

    /// Creates the ordinary symbol with the provided zero-based index.
    #[must_use]
    pub const fn ordinary(index: u8) -> Self {
        Self(index)
    }

    /// Retrieves the raw symbol value.
    #[must_use]
    pub const fn get(&self) -> u8 {
        self.0
    }

    /// Reports whether the symbol is one drawn by the symbol generator.
    #[must_use]
    pub const fn is_ordinary(&self) -> bool {
        self.0 < MAX_SYMBOL_COUNT
    }
}

/// Behavioural category of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Plain tile that participates in line matches.
    Standard,
    /// Clears its entire row when removed.
    RowClear,
    /// Clears its entire column when removed.
    ColumnClear,
    /// Clears its 3x3 neighbourhood when removed.
    Bomb,
    /// Clears every tile sharing a symbol when removed.
    Wildcard,
    /// Blocker that cannot be matched or swapped and absorbs `stage` hits.
    Obstacle {
        /// Remaining hits before the obstacle is removed.
        stage: u8,
    },
}

impl TileKind {
    /// Reports whether removing the tile fires an effect beyond itself.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(
            self,
            Self::RowClear | Self::ColumnClear | Self::Bomb | Self::Wildcard
        )
    }

    /// Reports whether the tile may seed or extend a line match.
    #[must_use]
    pub const fn is_line_matchable(self) -> bool {
        matches!(self, Self::Standard | Self::Wildcard)
    }

    /// Reports whether the tile is an obstacle.
    #[must_use]
    pub const fn is_obstacle(self) -> bool {
        matches!(self, Self::Obstacle { .. })
    }
}

/// A tile occupying an active cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    /// Identifier assigned when the tile was created.
    pub id: TileId,
    /// Behavioural category of the tile.
    pub kind: TileKind,
    /// Symbol used for matching, decals and wildcard removal.
    pub symbol: Option<Symbol>,
    /// Cell that currently references the tile.
    pub cell: CellCoord,
    /// Set once the tile has been processed by the current removal pass.
    pub removed: bool,
}

impl Tile {
    /// Symbol the tile contributes to line matching, if it participates at all.
    #[must_use]
    pub fn match_symbol(&self) -> Option<Symbol> {
        if self.removed || !self.kind.is_line_matchable() {
            return None;
        }
        self.symbol
    }
}

/// Contents of a single board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// Permanently excluded from play.
    Hole,
    /// Active cell awaiting gravity or refill.
    Pending,
    /// Active cell holding a tile.
    Occupied(Tile),
}

impl Slot {
    /// Tile held by the slot, if any.
    #[must_use]
    pub const fn tile(&self) -> Option<&Tile> {
        match self {
            Self::Occupied(tile) => Some(tile),
            Self::Hole | Self::Pending => None,
        }
    }

    /// Reports whether the slot is a hole.
    #[must_use]
    pub const fn is_hole(&self) -> bool {
        matches!(self, Self::Hole)
    }

    /// Reports whether the slot awaits gravity or refill.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Read-only view into the dense, row-major slot grid.
#[derive(Clone, Copy, Debug)]
pub struct SlotView<'a> {
    slots: &'a [Slot],
    columns: u32,
    rows: u32,
}

impl<'a> SlotView<'a> {
    /// Captures a new slot view backed by the provided row-major slice.
    #[must_use]
    pub fn new(slots: &'a [Slot], columns: u32, rows: u32) -> Self {
        Self {
            slots,
            columns,
            rows,
        }
    }

    /// Returns the slot at the provided cell, or `None` outside the board.
    #[must_use]
    pub fn slot(&self, cell: CellCoord) -> Option<&'a Slot> {
        self.index(cell).and_then(|index| self.slots.get(index))
    }

    /// Returns the tile at the provided cell, if one is present.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<&'a Tile> {
        self.slot(cell).and_then(Slot::tile)
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Iterates every cell coordinate in row-major scan order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let columns = self.columns;
        (0..self.rows).flat_map(move |row| (0..columns).map(move |column| CellCoord::new(column, row)))
    }

    /// Returns the neighbouring cell one step along `axis`, if it lies on the board.
    #[must_use]
    pub fn step(&self, cell: CellCoord, axis: Axis, forward: bool) -> Option<CellCoord> {
        let (column, row) = match (axis, forward) {
            (Axis::Horizontal, true) => (cell.column().checked_add(1)?, cell.row()),
            (Axis::Horizontal, false) => (cell.column().checked_sub(1)?, cell.row()),
            (Axis::Vertical, true) => (cell.column(), cell.row().checked_add(1)?),
            (Axis::Vertical, false) => (cell.column(), cell.row().checked_sub(1)?),
        };
        let next = CellCoord::new(column, row);
        self.index(next).map(|_| next)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Connected set of at least three cells sharing one symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchGroup {
    symbol: Symbol,
    cells: Vec<CellCoord>,
}

impl MatchGroup {
    /// Creates a match group; cells are stored in row-major order.
    #[must_use]
    pub fn new(symbol: Symbol, mut cells: Vec<CellCoord>) -> Self {
        cells.sort_by_key(|cell| (cell.row(), cell.column()));
        cells.dedup();
        Self { symbol, cells }
    }

    /// Symbol shared by every member.
    #[must_use]
    pub const fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Members in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of distinct cells in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reports whether the group contains the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }
}

/// Pair of cells exchanged by the player swap that started a resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SwapContext {
    /// Cell the gesture started on.
    pub first: CellCoord,
    /// Cell the gesture ended on.
    pub second: CellCoord,
}

impl SwapContext {
    /// Creates a swap context for two cells.
    #[must_use]
    pub const fn new(first: CellCoord, second: CellCoord) -> Self {
        Self { first, second }
    }

    /// Orientation of the swap; cells on the same row swap horizontally.
    #[must_use]
    pub fn axis(&self) -> Axis {
        if self.first.row() == self.second.row() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }
}

/// Reason a tile left the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalCause {
    /// The tile belonged to a line match-group.
    Matched,
    /// The special tile fired because the player swapped it into a new cell.
    Swapped,
    /// The tile was caught in a special tile's effect.
    Triggered {
        /// Special tile whose effect removed this tile.
        by: TileId,
    },
}

/// Reasons a swap request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum SwapRejection {
    /// The two cells do not share an edge.
    #[error("cells are not adjacent")]
    NotAdjacent,
    /// One of the cells is a hole.
    #[error("a hole cannot be swapped")]
    Hole,
    /// One of the cells has no tile yet.
    #[error("a pending cell cannot be swapped")]
    Pending,
    /// One of the cells holds an obstacle.
    #[error("an obstacle cannot be swapped")]
    Obstacle,
    /// The board is still resolving a previous request.
    #[error("the board is still resolving")]
    Busy,
    /// The swap neither formed a line match nor moved a special tile.
    #[error("the swap does not form a match")]
    NoMatch,
}

/// Errors reported by board operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// A coordinate lies outside the board extents.
    #[error("cell {cell} lies outside the {columns}x{rows} board")]
    OutOfBounds {
        /// Offending coordinate.
        cell: CellCoord,
        /// Number of columns on the board.
        columns: u32,
        /// Number of rows on the board.
        rows: u32,
    },
    /// A swap request was refused.
    #[error("swap rejected: {0}")]
    InvalidSwap(#[from] SwapRejection),
    /// The supplied layout cannot describe a board.
    #[error("invalid board layout: {0}")]
    InvalidLayout(String),
}

/// Placement of an obstacle supplied at initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    /// Cell occupied by the obstacle.
    pub cell: CellCoord,
    /// Hits the obstacle absorbs before it is removed.
    pub stage: u8,
}

/// Initial contents requested for a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellPlan {
    /// The cell is a hole.
    Hole,
    /// The cell receives a tile from the symbol generator.
    Generated,
    /// The cell receives the described tile.
    Preset {
        /// Kind of the preset tile.
        kind: TileKind,
        /// Symbol of the preset tile.
        symbol: Option<Symbol>,
    },
}

/// Board shape, obstacles and optional preset tiles supplied at initialization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Requested number of columns; clamped to [`MAX_BOARD_DIMENSION`].
    pub columns: u32,
    /// Requested number of rows; clamped to [`MAX_BOARD_DIMENSION`].
    pub rows: u32,
    /// Cells permanently excluded from play.
    #[serde(default)]
    pub holes: Vec<CellCoord>,
    /// Obstacles placed on the board.
    #[serde(default)]
    pub obstacles: Vec<ObstaclePlacement>,
    /// Number of ordinary symbols the generator draws from.
    #[serde(default = "default_symbol_count")]
    pub symbol_count: u8,
    /// Seed for the symbol generator and the special-tile policy.
    #[serde(default)]
    pub seed: u64,
    /// Optional rows of glyphs describing preset tiles, top row first.
    ///
    /// `a`-`z` ordinary symbol, `W` wildcard, `B` bomb, `R` row clear,
    /// `C` column clear, `1`-`3` obstacle stage, `#` hole, `.` generated.
    /// Line-clear glyphs carry the decal symbol `a`.
    #[serde(default)]
    pub preset: Vec<String>,
}

fn default_symbol_count() -> u8 {
    DEFAULT_SYMBOL_COUNT
}

impl BoardLayout {
    /// Creates a rectangular layout without holes, obstacles or presets.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            holes: Vec::new(),
            obstacles: Vec::new(),
            symbol_count: DEFAULT_SYMBOL_COUNT,
            seed: 0,
            preset: Vec::new(),
        }
    }

    /// Creates a layout whose dimensions and contents come from preset rows.
    #[must_use]
    pub fn from_preset<S>(rows: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let preset: Vec<String> = rows.iter().map(|row| row.as_ref().to_owned()).collect();
        let columns = preset
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0);
        let mut layout = Self::new(
            u32::try_from(columns).unwrap_or(u32::MAX),
            u32::try_from(preset.len()).unwrap_or(u32::MAX),
        );
        layout.preset = preset;
        layout
    }

    /// Overrides the generator seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Overrides the number of ordinary symbols.
    #[must_use]
    pub fn with_symbol_count(mut self, symbol_count: u8) -> Self {
        self.symbol_count = symbol_count;
        self
    }

    /// Adds holes to the layout.
    #[must_use]
    pub fn with_holes<I>(mut self, holes: I) -> Self
    where
        I: IntoIterator<Item = CellCoord>,
    {
        self.holes.extend(holes);
        self
    }

    /// Adds an obstacle to the layout.
    #[must_use]
    pub fn with_obstacle(mut self, cell: CellCoord, stage: u8) -> Self {
        self.obstacles.push(ObstaclePlacement { cell, stage });
        self
    }

    /// Dimensions after clamping to [`MAX_BOARD_DIMENSION`].
    #[must_use]
    pub fn clamped_dimensions(&self) -> (u32, u32) {
        (
            self.columns.min(MAX_BOARD_DIMENSION),
            self.rows.min(MAX_BOARD_DIMENSION),
        )
    }

    /// Validates the layout and expands it into a row-major plan per cell.
    pub fn plan(&self) -> Result<Vec<CellPlan>, BoardError> {
        let (columns, rows) = self.clamped_dimensions();
        if columns == 0 || rows == 0 {
            return Err(BoardError::InvalidLayout(format!(
                "board must have at least one column and one row (received {}x{})",
                self.columns, self.rows
            )));
        }
        if self.symbol_count == 0 || self.symbol_count > MAX_SYMBOL_COUNT {
            return Err(BoardError::InvalidLayout(format!(
                "symbol_count must lie in 1..={MAX_SYMBOL_COUNT} (received {})",
                self.symbol_count
            )));
        }

        let width = columns as usize;
        let mut plan = vec![CellPlan::Generated; width * rows as usize];
        let index = |cell: CellCoord| -> Result<usize, BoardError> {
            if cell.column() < columns && cell.row() < rows {
                Ok(cell.row() as usize * width + cell.column() as usize)
            } else {
                Err(BoardError::OutOfBounds {
                    cell,
                    columns,
                    rows,
                })
            }
        };

        for (row, glyphs) in self.preset.iter().enumerate() {
            for (column, glyph) in glyphs.chars().enumerate() {
                let cell = CellCoord::new(
                    u32::try_from(column).unwrap_or(u32::MAX),
                    u32::try_from(row).unwrap_or(u32::MAX),
                );
                plan[index(cell)?] = parse_glyph(glyph, cell)?;
            }
        }

        for obstacle in &self.obstacles {
            if obstacle.stage == 0 || obstacle.stage > MAX_OBSTACLE_STAGE {
                return Err(BoardError::InvalidLayout(format!(
                    "obstacle at {} has stage {} outside 1..={MAX_OBSTACLE_STAGE}",
                    obstacle.cell, obstacle.stage
                )));
            }
            plan[index(obstacle.cell)?] = CellPlan::Preset {
                kind: TileKind::Obstacle {
                    stage: obstacle.stage,
                },
                symbol: None,
            };
        }

        for hole in &self.holes {
            plan[index(*hole)?] = CellPlan::Hole;
        }

        Ok(plan)
    }
}

/// Decal of preset line-clear tiles, which have no match to inherit one from.
const LINE_CLEAR_DECAL: Symbol = Symbol::ordinary(0);

fn parse_glyph(glyph: char, cell: CellCoord) -> Result<CellPlan, BoardError> {
    let preset = |kind, symbol| CellPlan::Preset { kind, symbol };
    let plan = match glyph {
        'a'..='z' => preset(
            TileKind::Standard,
            Some(Symbol::ordinary(glyph as u8 - b'a')),
        ),
        'W' => preset(TileKind::Wildcard, Some(Symbol::WILDCARD)),
        'B' => preset(TileKind::Bomb, Some(Symbol::BOMB)),
        'R' => preset(TileKind::RowClear, Some(LINE_CLEAR_DECAL)),
        'C' => preset(TileKind::ColumnClear, Some(LINE_CLEAR_DECAL)),
        '1'..='3' => preset(
            TileKind::Obstacle {
                stage: glyph as u8 - b'0',
            },
            None,
        ),
        '#' => CellPlan::Hole,
        '.' => CellPlan::Generated,
        other => {
            return Err(BoardError::InvalidLayout(format!(
                "unknown preset glyph '{other}' at {cell}"
            )))
        }
    };
    Ok(plan)
}

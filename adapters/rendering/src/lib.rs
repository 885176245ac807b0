#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Match Cascade adapters.
//!
//! Renderers never read the world directly. They keep a [`BoardScene`] that is
//! rebuilt purely by replaying the ordered events returned by the engine, and
//! look up colours and glyphs through a [`SymbolPalette`].

use anyhow::Result as AnyResult;
use match_cascade_core::{CellCoord, Event, Slot, SlotView, Symbol, TileId, TileKind};
use std::{collections::BTreeMap, ops::ControlFlow};
use thiserror::Error;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts the color channels back into bytes, ignoring alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> (u8, u8, u8) {
        (
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue),
        )
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

const BASE_COLORS: [Color; 8] = [
    Color::from_rgb_u8(220, 50, 47),
    Color::from_rgb_u8(38, 139, 210),
    Color::from_rgb_u8(133, 153, 0),
    Color::from_rgb_u8(181, 137, 0),
    Color::from_rgb_u8(108, 113, 196),
    Color::from_rgb_u8(42, 161, 152),
    Color::from_rgb_u8(211, 54, 130),
    Color::from_rgb_u8(203, 75, 22),
];

const WILDCARD_COLOR: Color = Color::from_rgb_u8(253, 246, 227);
const BOMB_COLOR: Color = Color::from_rgb_u8(88, 110, 117);
const OBSTACLE_COLOR: Color = Color::from_rgb_u8(120, 78, 40);

/// Plain mapping from symbols and tile kinds to colours and glyphs.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolPalette {
    colors: Vec<Color>,
}

impl SymbolPalette {
    /// Creates a palette with one distinct colour per ordinary symbol.
    ///
    /// Symbols beyond the base colours reuse them, lightened per wrap.
    #[must_use]
    pub fn new(symbol_count: u8) -> Self {
        let colors = (0..usize::from(symbol_count.max(1)))
            .map(|index| {
                let wraps = index / BASE_COLORS.len();
                BASE_COLORS[index % BASE_COLORS.len()].lighten(0.25 * wraps as f32)
            })
            .collect();
        Self { colors }
    }

    /// Colour used to draw `tile`.
    #[must_use]
    pub fn color(&self, tile: &SceneTile) -> Color {
        match tile.kind {
            TileKind::Standard => self.symbol_color(tile.symbol),
            TileKind::RowClear | TileKind::ColumnClear => {
                self.symbol_color(tile.symbol).lighten(0.4)
            }
            TileKind::Bomb => BOMB_COLOR,
            TileKind::Wildcard => WILDCARD_COLOR,
            TileKind::Obstacle { stage } => OBSTACLE_COLOR.lighten(0.2 * f32::from(3 - stage.min(3))),
        }
    }

    /// Single-character glyph used by text backends to draw `tile`.
    #[must_use]
    pub fn glyph(&self, tile: &SceneTile) -> char {
        match tile.kind {
            TileKind::Standard => tile
                .symbol
                .filter(Symbol::is_ordinary)
                .map_or('?', |symbol| char::from(b'a' + symbol.get())),
            TileKind::RowClear => 'R',
            TileKind::ColumnClear => 'C',
            TileKind::Bomb => 'B',
            TileKind::Wildcard => 'W',
            TileKind::Obstacle { stage } => char::from(b'0' + stage.min(9)),
        }
    }

    fn symbol_color(&self, symbol: Option<Symbol>) -> Color {
        symbol
            .filter(Symbol::is_ordinary)
            .and_then(|symbol| self.colors.get(usize::from(symbol.get()) % self.colors.len()))
            .copied()
            .unwrap_or(WILDCARD_COLOR)
    }
}

impl Default for SymbolPalette {
    fn default() -> Self {
        Self::new(match_cascade_core::DEFAULT_SYMBOL_COUNT)
    }
}

/// Tile as known to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneTile {
    /// Identifier allocated to the tile by the world.
    pub id: TileId,
    /// Cell the tile currently occupies.
    pub cell: CellCoord,
    /// Kind of the tile.
    pub kind: TileKind,
    /// Symbol carried by the tile.
    pub symbol: Option<Symbol>,
}

/// Special effect replayed by the scene since the last drain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneEffect {
    /// Kind of the special tile that fired.
    pub kind: TileKind,
    /// Cell the special tile occupied.
    pub origin: CellCoord,
    /// Cells covered by the effect.
    pub affected: Vec<CellCoord>,
}

/// Renderer-side board reconstructed purely from engine events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoardScene {
    columns: u32,
    rows: u32,
    tiles: BTreeMap<TileId, SceneTile>,
    effects: Vec<SceneEffect>,
    settled: bool,
}

impl BoardScene {
    /// Creates an empty scene awaiting a [`Event::BoardInitialized`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the tiles currently visible through `view`.
    #[must_use]
    pub fn from_view(view: SlotView<'_>) -> Self {
        let (columns, rows) = view.dimensions();
        let tiles = view
            .cells()
            .filter_map(|cell| match view.slot(cell) {
                Some(Slot::Occupied(tile)) if !tile.removed => Some((
                    tile.id,
                    SceneTile {
                        id: tile.id,
                        cell,
                        kind: tile.kind,
                        symbol: tile.symbol,
                    },
                )),
                _ => None,
            })
            .collect();
        Self {
            columns,
            rows,
            tiles,
            effects: Vec::new(),
            settled: true,
        }
    }

    /// Replays every event in order.
    pub fn apply_all<'a, I>(&mut self, events: I) -> Result<(), RenderingError>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    /// Replays a single event.
    pub fn apply(&mut self, event: &Event) -> Result<(), RenderingError> {
        match event {
            Event::BoardInitialized { columns, rows } => {
                *self = Self {
                    columns: *columns,
                    rows: *rows,
                    ..Self::default()
                };
            }
            Event::TileCreated {
                tile,
                cell,
                kind,
                symbol,
            } => {
                self.check_cell(*cell)?;
                self.settled = false;
                let _ = self.tiles.insert(
                    *tile,
                    SceneTile {
                        id: *tile,
                        cell: *cell,
                        kind: *kind,
                        symbol: *symbol,
                    },
                );
            }
            Event::TileMoved { tile, to, .. } => {
                self.check_cell(*to)?;
                self.settled = false;
                self.tile_mut(*tile)?.cell = *to;
            }
            Event::TileRemoved { tile, .. } => {
                self.settled = false;
                if self.tiles.remove(tile).is_none() {
                    return Err(RenderingError::UnknownTile { tile: *tile });
                }
            }
            Event::SpecialTriggered {
                kind,
                origin,
                affected,
                ..
            } => self.effects.push(SceneEffect {
                kind: *kind,
                origin: *origin,
                affected: affected.clone(),
            }),
            Event::ObstacleDamaged { tile, stage, .. } => {
                self.tile_mut(*tile)?.kind = TileKind::Obstacle { stage: *stage };
            }
            Event::SwapRejected { .. } => {}
            Event::BoardSettled { .. } => self.settled = true,
        }
        Ok(())
    }

    /// Number of columns and rows in the scene.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Tile drawn at `cell`, if any.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<&SceneTile> {
        self.tiles.values().find(|tile| tile.cell == cell)
    }

    /// Every tile in the scene ordered by identifier.
    pub fn tiles(&self) -> impl Iterator<Item = &SceneTile> {
        self.tiles.values()
    }

    /// Reports whether the last replayed event settled the board.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled
    }

    /// Removes and returns the special effects replayed since the last drain.
    pub fn drain_effects(&mut self) -> Vec<SceneEffect> {
        std::mem::take(&mut self.effects)
    }

    fn tile_mut(&mut self, tile: TileId) -> Result<&mut SceneTile, RenderingError> {
        self.tiles
            .get_mut(&tile)
            .ok_or(RenderingError::UnknownTile { tile })
    }

    fn check_cell(&self, cell: CellCoord) -> Result<(), RenderingError> {
        if cell.column() < self.columns && cell.row() < self.rows {
            Ok(())
        } else {
            Err(RenderingError::CellOutsideScene {
                cell,
                columns: self.columns,
                rows: self.rows,
            })
        }
    }
}

/// Descriptor of what a backend should present.
#[derive(Clone, Debug)]
pub struct Presentation {
    /// Title shown above the board.
    pub title: String,
    /// Mapping from symbols to colours and glyphs.
    pub palette: SymbolPalette,
    /// Scene content that should be displayed.
    pub scene: BoardScene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, palette: SymbolPalette, scene: BoardScene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            palette,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Match Cascade scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until `update_scene` asks it to stop.
    ///
    /// The closure is called once per frame before drawing and may replay new
    /// engine events into the scene. Returning [`ControlFlow::Break`] draws
    /// the final frame and ends the loop.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(&mut BoardScene) -> AnyResult<ControlFlow<()>>;
}

/// Errors raised while replaying events into a scene.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderingError {
    /// An event referenced a tile the scene never saw created.
    #[error("event references unknown tile {}", .tile.get())]
    UnknownTile {
        /// Identifier carried by the offending event.
        tile: TileId,
    },
    /// An event referenced a cell outside the scene.
    #[error("cell {cell} lies outside the {columns}x{rows} scene")]
    CellOutsideScene {
        /// Offending coordinate.
        cell: CellCoord,
        /// Number of columns in the scene.
        columns: u32,
        /// Number of rows in the scene.
        rows: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard(id: u32, cell: CellCoord, symbol: u8) -> Event {
        Event::TileCreated {
            tile: TileId::new(id),
            cell,
            kind: TileKind::Standard,
            symbol: Some(Symbol::ordinary(symbol)),
        }
    }

    fn two_by_one() -> BoardScene {
        let mut scene = BoardScene::new();
        scene
            .apply_all(&[
                Event::BoardInitialized {
                    columns: 2,
                    rows: 1,
                },
                standard(0, CellCoord::new(0, 0), 0),
                standard(1, CellCoord::new(1, 0), 1),
                Event::BoardSettled { passes: 0 },
            ])
            .expect("events replay");
        scene
    }

    #[test]
    fn lighten_moves_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 255).lighten(0.5);

        assert_eq!(color.to_rgb_u8(), (128, 128, 255));
    }

    #[test]
    fn palette_wraps_and_lightens_beyond_base_colors() {
        let palette = SymbolPalette::new(9);
        let first = SceneTile {
            id: TileId::new(0),
            cell: CellCoord::new(0, 0),
            kind: TileKind::Standard,
            symbol: Some(Symbol::ordinary(0)),
        };
        let wrapped = SceneTile {
            symbol: Some(Symbol::ordinary(8)),
            ..first
        };

        assert_eq!(palette.color(&wrapped), palette.color(&first).lighten(0.25));
        assert_eq!(palette.glyph(&wrapped), 'i');
    }

    #[test]
    fn palette_glyphs_for_specials() {
        let palette = SymbolPalette::default();
        let tile = |kind| SceneTile {
            id: TileId::new(0),
            cell: CellCoord::new(0, 0),
            kind,
            symbol: None,
        };

        assert_eq!(palette.glyph(&tile(TileKind::RowClear)), 'R');
        assert_eq!(palette.glyph(&tile(TileKind::Wildcard)), 'W');
        assert_eq!(palette.glyph(&tile(TileKind::Obstacle { stage: 2 })), '2');
        assert_eq!(palette.color(&tile(TileKind::Bomb)), BOMB_COLOR);
    }

    #[test]
    fn swap_moves_are_replayed_by_identifier() {
        let mut scene = two_by_one();

        scene
            .apply_all(&[
                Event::TileMoved {
                    tile: TileId::new(0),
                    from: CellCoord::new(0, 0),
                    to: CellCoord::new(1, 0),
                },
                Event::TileMoved {
                    tile: TileId::new(1),
                    from: CellCoord::new(1, 0),
                    to: CellCoord::new(0, 0),
                },
            ])
            .expect("events replay");

        assert_eq!(
            scene.tile_at(CellCoord::new(0, 0)).map(|tile| tile.id),
            Some(TileId::new(1))
        );
        assert_eq!(
            scene.tile_at(CellCoord::new(1, 0)).map(|tile| tile.id),
            Some(TileId::new(0))
        );
        assert!(!scene.is_settled());
    }

    #[test]
    fn unknown_tiles_are_reported() {
        let mut scene = two_by_one();

        let error = scene
            .apply(&Event::TileRemoved {
                tile: TileId::new(7),
                cell: CellCoord::new(0, 0),
                cause: match_cascade_core::RemovalCause::Matched,
            })
            .expect_err("tile 7 was never created");

        assert_eq!(error, RenderingError::UnknownTile { tile: TileId::new(7) });
        assert_eq!(error.to_string(), "event references unknown tile 7");
    }

    #[test]
    fn creation_outside_scene_is_rejected() {
        let mut scene = two_by_one();

        let error = scene
            .apply(&standard(2, CellCoord::new(0, 1), 0))
            .expect_err("row 1 is outside a one-row scene");

        assert!(matches!(error, RenderingError::CellOutsideScene { .. }));
        assert_eq!(error.to_string(), "cell (0, 1) lies outside the 2x1 scene");
    }

    #[test]
    fn effects_are_drained_once() {
        let mut scene = two_by_one();
        scene
            .apply(&Event::SpecialTriggered {
                tile: TileId::new(0),
                kind: TileKind::RowClear,
                origin: CellCoord::new(0, 0),
                affected: vec![CellCoord::new(1, 0)],
            })
            .expect("events replay");

        assert_eq!(scene.drain_effects().len(), 1);
        assert!(scene.drain_effects().is_empty());
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Special-tile policy that promotes long match-groups into special tiles.
//!
//! | group size | swap context | result |
//! |---|---|---|
//! | 3 | any | none |
//! | 4 | horizontal swap | row clear |
//! | 4 | vertical swap | column clear |
//! | 4 | none | row or column clear, uniformly |
//! | 5 | any | wildcard |
//! | 6+ | any | bomb |

use match_cascade_core::{Axis, CellCoord, MatchGroup, SwapContext, Symbol, TileKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Special tile chosen for a match-group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PromotedTile {
    /// Kind of the special tile.
    pub kind: TileKind,
    /// Decal symbol carried by the special tile.
    pub symbol: Symbol,
    /// Cell of the group that receives the special tile.
    pub cell: CellCoord,
}

/// Seeded policy deciding which special tile a match-group produces.
#[derive(Clone, Debug)]
pub struct SpecialTilePolicy {
    rng: ChaCha8Rng,
}

impl SpecialTilePolicy {
    /// Creates a policy whose random choices derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Decides the special tile produced by `group`, if any.
    ///
    /// `swap` is present only for the removal pass that directly follows a
    /// player swap; cascade passes call this with `None`.
    pub fn promote(
        &mut self,
        group: &MatchGroup,
        swap: Option<SwapContext>,
    ) -> Option<PromotedTile> {
        let kind = match group.len() {
            0..=3 => return None,
            4 => match swap.map(|swap| swap.axis()) {
                Some(Axis::Horizontal) => TileKind::RowClear,
                Some(Axis::Vertical) => TileKind::ColumnClear,
                None if self.rng.gen_bool(0.5) => TileKind::RowClear,
                None => TileKind::ColumnClear,
            },
            5 => TileKind::Wildcard,
            _ => TileKind::Bomb,
        };

        let symbol = match kind {
            TileKind::Wildcard => Symbol::WILDCARD,
            TileKind::Bomb => Symbol::BOMB,
            _ => group.symbol(),
        };

        Some(PromotedTile {
            kind,
            symbol,
            cell: self.placement(group, swap),
        })
    }

    fn placement(&mut self, group: &MatchGroup, swap: Option<SwapContext>) -> CellCoord {
        if let Some(swap) = swap {
            for cell in [swap.first, swap.second] {
                if group.contains(cell) {
                    return cell;
                }
            }
        }

        let index = self.rng.gen_range(0..group.len());
        group.cells()[index]
    }
}

impl Default for SpecialTilePolicy {
    fn default() -> Self {
        Self::new(0)
    }
}

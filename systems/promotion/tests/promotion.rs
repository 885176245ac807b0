use std::collections::HashSet;

use match_cascade_core::{CellCoord, MatchGroup, SwapContext, Symbol, TileKind};
use match_cascade_system_promotion::{PromotedTile, SpecialTilePolicy};

fn row_group(length: u32) -> MatchGroup {
    MatchGroup::new(
        Symbol::ordinary(2),
        (0..length).map(|column| CellCoord::new(column, 3)).collect(),
    )
}

fn vertical_swap() -> SwapContext {
    SwapContext::new(CellCoord::new(1, 3), CellCoord::new(1, 2))
}

#[test]
fn group_of_three_is_plain_removal() {
    let mut policy = SpecialTilePolicy::new(1);
    assert_eq!(policy.promote(&row_group(3), Some(vertical_swap())), None);
    assert_eq!(policy.promote(&row_group(3), None), None);
}

#[test]
fn vertical_swap_of_four_yields_row_clear_at_swapped_cell() {
    let mut policy = SpecialTilePolicy::new(1);
    let swap = SwapContext::new(CellCoord::new(2, 3), CellCoord::new(3, 3));

    let promoted = policy.promote(&row_group(4), Some(swap));

    assert_eq!(
        promoted,
        Some(PromotedTile {
            kind: TileKind::RowClear,
            symbol: Symbol::ordinary(2),
            cell: CellCoord::new(2, 3),
        })
    );
}

#[test]
fn vertical_swap_of_four_yields_column_clear_at_member_cell() {
    let mut policy = SpecialTilePolicy::new(1);

    let promoted = policy
        .promote(&row_group(4), Some(vertical_swap()))
        .expect("four cells promote");

    assert_eq!(promoted.kind, TileKind::ColumnClear);
    assert_eq!(promoted.cell, CellCoord::new(1, 3));
}

#[test]
fn cascade_four_chooses_both_line_clears() {
    let mut policy = SpecialTilePolicy::new(42);
    let kinds: HashSet<TileKind> = (0..64)
        .filter_map(|_| policy.promote(&row_group(4), None))
        .map(|promoted| promoted.kind)
        .collect();

    assert_eq!(
        kinds,
        HashSet::from([TileKind::RowClear, TileKind::ColumnClear]),
        "cascade promotions must not be biased towards a single kind",
    );
}

#[test]
fn cascade_placement_stays_within_group() {
    let mut policy = SpecialTilePolicy::new(7);
    let group = row_group(5);

    for _ in 0..32 {
        let promoted = policy.promote(&group, None).expect("five cells promote");
        assert!(group.contains(promoted.cell));
    }
}

#[test]
fn group_of_five_yields_wildcard_with_sentinel() {
    let mut policy = SpecialTilePolicy::new(3);
    let promoted = policy
        .promote(&row_group(5), Some(vertical_swap()))
        .expect("five cells promote");

    assert_eq!(promoted.kind, TileKind::Wildcard);
    assert_eq!(promoted.symbol, Symbol::WILDCARD);
}

#[test]
fn group_of_six_or_more_yields_bomb() {
    let mut policy = SpecialTilePolicy::new(3);

    for length in [6, 7, 8] {
        let promoted = policy.promote(&row_group(length), None).expect("promotes");
        assert_eq!(promoted.kind, TileKind::Bomb);
        assert_eq!(promoted.symbol, Symbol::BOMB);
    }
}

#[test]
fn same_seed_makes_same_choices() {
    let mut first = SpecialTilePolicy::new(11);
    let mut second = SpecialTilePolicy::new(11);

    for _ in 0..16 {
        assert_eq!(
            first.promote(&row_group(4), None),
            second.promote(&row_group(4), None)
        );
    }
}

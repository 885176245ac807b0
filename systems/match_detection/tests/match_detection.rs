use match_cascade_core::{BoardLayout, CellCoord, CellPlan, Slot, SlotView, Symbol, Tile, TileId};
use match_cascade_system_match_detection::{detect_matches, group_through, has_matches};

struct Board {
    slots: Vec<Slot>,
    columns: u32,
    rows: u32,
}

impl Board {
    fn parse(rows: &[&str]) -> Self {
        let layout = BoardLayout::from_preset(rows);
        let (columns, row_count) = layout.clamped_dimensions();
        let slots = layout
            .plan()
            .expect("valid preset")
            .into_iter()
            .enumerate()
            .map(|(index, plan)| {
                let index = u32::try_from(index).expect("small board");
                let cell = CellCoord::new(index % columns, index / columns);
                match plan {
                    CellPlan::Hole => Slot::Hole,
                    CellPlan::Generated => Slot::Pending,
                    CellPlan::Preset { kind, symbol } => Slot::Occupied(Tile {
                        id: TileId::new(index),
                        kind,
                        symbol,
                        cell,
                        removed: false,
                    }),
                }
            })
            .collect();
        Self {
            slots,
            columns,
            rows: row_count,
        }
    }

    fn view(&self) -> SlotView<'_> {
        SlotView::new(&self.slots, self.columns, self.rows)
    }
}

fn cells(coords: &[(u32, u32)]) -> Vec<CellCoord> {
    let mut cells: Vec<CellCoord> = coords
        .iter()
        .map(|&(column, row)| CellCoord::new(column, row))
        .collect();
    cells.sort_by_key(|cell| (cell.row(), cell.column()));
    cells
}

#[test]
fn horizontal_run_of_three_is_one_group() {
    let board = Board::parse(&["bcdb", "aaab", "cdcd"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].symbol(), Symbol::ordinary(0));
    assert_eq!(groups[0].cells(), cells(&[(0, 1), (1, 1), (2, 1)]).as_slice());
}

#[test]
fn vertical_run_of_four_is_one_group() {
    let board = Board::parse(&["ab", "ac", "ab", "ac"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 4);
}

#[test]
fn pairs_do_not_match() {
    let board = Board::parse(&["aabb", "bbaa", "aabb"]);
    assert!(detect_matches(board.view()).is_empty());
    assert!(!has_matches(board.view()));
}

#[test]
fn crossing_runs_merge_into_one_group() {
    let board = Board::parse(&["bab", "aaa", "bab"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1, "cross must be reported once");
    assert_eq!(
        groups[0].cells(),
        cells(&[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)]).as_slice()
    );
}

#[test]
fn l_shape_merges_through_corner() {
    let board = Board::parse(&["acc", "acb", "aaa"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 5);
}

#[test]
fn extension_reprobes_perpendicular_axis_from_new_cells() {
    // Seed row 0 reaches column 2, whose column run reaches row 2, whose row run
    // adds two more cells: a zig-zag of seven.
    let board = Board::parse(&["aaab", "bcac", "caaa"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 7);
}

#[test]
fn separate_runs_are_disjoint_groups() {
    let board = Board::parse(&["aaab", "cdcd", "bbba"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].symbol(), Symbol::ordinary(0));
    assert_eq!(groups[1].symbol(), Symbol::ordinary(1));
    assert!(groups[0]
        .cells()
        .iter()
        .all(|cell| !groups[1].contains(*cell)));
}

#[test]
fn every_group_has_three_members_sharing_one_symbol() {
    let board = Board::parse(&["aaabbb", "cacbcb", "dadddd", "cacbcb"]);
    let groups = detect_matches(board.view());

    assert!(!groups.is_empty());
    for group in &groups {
        assert!(group.len() >= 3);
        for cell in group.cells() {
            let tile = board.view().tile(*cell).expect("group member holds a tile");
            assert_eq!(tile.symbol, Some(group.symbol()));
        }
    }
}

#[test]
fn special_tiles_break_runs() {
    let board = Board::parse(&["aaRaa", "bbBbb", "aaCaa"]);
    assert!(detect_matches(board.view()).is_empty());
}

#[test]
fn obstacles_holes_and_pending_cells_break_runs() {
    let board = Board::parse(&["aa1aa", "bb#bb", "cc.cc"]);
    assert!(detect_matches(board.view()).is_empty());
}

#[test]
fn wildcards_match_only_each_other() {
    let board = Board::parse(&["aWa", "WWW", "aWa"]);
    let groups = detect_matches(board.view());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].symbol(), Symbol::WILDCARD);
    assert_eq!(groups[0].len(), 5);
}

#[test]
fn wildcard_does_not_complete_standard_run() {
    let board = Board::parse(&["aWa"]);
    assert!(detect_matches(board.view()).is_empty());
}

#[test]
fn group_through_reports_cell_membership() {
    let board = Board::parse(&["abc", "abc", "acb"]);

    let group = group_through(board.view(), CellCoord::new(0, 2)).expect("column match");
    assert_eq!(group.len(), 3);
    assert!(group_through(board.view(), CellCoord::new(1, 0)).is_none());
}

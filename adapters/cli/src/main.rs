#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Match Cascade boards in the terminal.

mod layout_transfer;
mod text_backend;

use std::{fs, io, ops::ControlFlow, path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use flexi_logger::Logger;
use log::{debug, info, warn};
use match_cascade_core::{BoardLayout, CellCoord, Event};
use match_cascade_engine::{BoardEngine, SwapOutcome};
use match_cascade_rendering::{BoardScene, Presentation, RenderingBackend, SymbolPalette};

use crate::text_backend::TextBackend;

#[derive(Parser, Debug)]
#[command(name = "match-cascade", about = "Plays a match-three board in the terminal")]
struct Config {
    /// TOML file describing the board layout
    #[arg(short, long, conflicts_with = "transfer")]
    layout: Option<PathBuf>,

    /// Layout transfer string (`match:v1:<cols>x<rows>:<payload>`)
    #[arg(short, long)]
    transfer: Option<String>,

    /// Columns of the generated board when no layout is given
    #[arg(long, default_value_t = 8)]
    columns: u32,

    /// Rows of the generated board when no layout is given
    #[arg(long, default_value_t = 8)]
    rows: u32,

    /// Number of ordinary symbols when no layout is given
    #[arg(long, default_value_t = match_cascade_core::DEFAULT_SYMBOL_COUNT)]
    symbols: u8,

    /// Overrides the layout seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Swap to play, written `c,r:c,r`; may be repeated
    #[arg(long = "swap")]
    swaps: Vec<SwapArg>,

    /// Number of moves to find and play automatically after scripted swaps
    #[arg(long, default_value_t = 0)]
    auto: u32,

    /// Prints the transfer string of the effective layout and exits
    #[arg(long, default_value_t = false)]
    export: bool,

    /// Draws the board without ANSI colours
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Log level filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Pair of neighbouring cells parsed from `c,r:c,r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SwapArg {
    first: CellCoord,
    second: CellCoord,
}

impl FromStr for SwapArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (first, second) = value
            .split_once(':')
            .ok_or_else(|| format!("swap '{value}' must look like c,r:c,r"))?;
        Ok(Self {
            first: parse_cell(first)?,
            second: parse_cell(second)?,
        })
    }
}

fn parse_cell(value: &str) -> Result<CellCoord, String> {
    let (column, row) = value
        .split_once(',')
        .ok_or_else(|| format!("cell '{value}' must look like c,r"))?;
    let column = column
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid column in '{value}': {error}"))?;
    let row = row
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid row in '{value}': {error}"))?;
    Ok(CellCoord::new(column, row))
}

/// Entry point for the Match Cascade command-line interface.
fn main() -> Result<()> {
    let config = Config::parse();

    let _logger = Logger::try_with_env_or_str(&config.log_level)?
        .format(flexi_logger::colored_default_format)
        .start()?;

    let layout = resolve_layout(&config)?;
    if config.export {
        println!("{}", layout_transfer::encode(&layout)?);
        return Ok(());
    }

    let palette = SymbolPalette::new(layout.symbol_count);
    let mut engine = BoardEngine::new();
    let opening = engine
        .initialize(layout)
        .context("failed to initialise board")?;
    let mut scene = BoardScene::new();
    scene.apply_all(&opening)?;

    let mut moves = MovePlan::new(config.swaps, config.auto);
    let backend = TextBackend::new(io::stdout().lock(), !config.no_color);
    backend.run(
        Presentation::new("match-cascade", palette, scene),
        move |scene| moves.advance(&mut engine, scene),
    )
}

fn resolve_layout(config: &Config) -> Result<BoardLayout> {
    let mut layout = if let Some(path) = &config.layout {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout file {}", path.display()))?;
        parse_layout_toml(&contents)
            .with_context(|| format!("failed to load layout from {}", path.display()))?
    } else if let Some(transfer) = &config.transfer {
        layout_transfer::decode(transfer).context("failed to decode layout string")?
    } else {
        BoardLayout::new(config.columns, config.rows).with_symbol_count(config.symbols)
    };

    if let Some(seed) = config.seed {
        layout.seed = seed;
    }
    Ok(layout)
}

fn parse_layout_toml(contents: &str) -> Result<BoardLayout> {
    let mut layout: BoardLayout =
        toml::from_str(contents).context("failed to parse layout toml contents")?;

    if !layout.preset.is_empty() {
        let preset = BoardLayout::from_preset(&layout.preset);
        if layout.columns == 0 && layout.rows == 0 {
            layout.columns = preset.columns;
            layout.rows = preset.rows;
        }
    }
    if layout.columns == 0 || layout.rows == 0 {
        bail!("layout must specify columns and rows or a preset");
    }
    Ok(layout)
}

/// Scripted swaps followed by automatically discovered moves.
#[derive(Debug)]
struct MovePlan {
    scripted: std::vec::IntoIter<SwapArg>,
    auto_remaining: u32,
    opened: bool,
}

impl MovePlan {
    fn new(scripted: Vec<SwapArg>, auto: u32) -> Self {
        Self {
            scripted: scripted.into_iter(),
            auto_remaining: auto,
            opened: false,
        }
    }

    /// Plays the next move and replays its events into `scene`.
    ///
    /// The first call leaves the opening board untouched.
    fn advance(
        &mut self,
        engine: &mut BoardEngine,
        scene: &mut BoardScene,
    ) -> Result<ControlFlow<()>> {
        if !self.opened {
            self.opened = true;
            return Ok(self.flow_after_move());
        }

        if let Some(swap) = self.scripted.next() {
            match engine.request_swap(swap.first, swap.second)? {
                SwapOutcome::Resolved(events) => {
                    info!("swap {:?} resolved with {} events", swap, events.len());
                    scene.apply_all(&events)?;
                }
                SwapOutcome::Rejected(reason) => {
                    warn!("swap {:?} rejected: {reason}", swap);
                }
            }
        } else if self.auto_remaining > 0 {
            self.auto_remaining -= 1;
            match find_and_play(engine)? {
                Some(events) => scene.apply_all(&events)?,
                None => {
                    warn!("no legal move left on the board");
                    self.auto_remaining = 0;
                }
            }
        }

        Ok(self.flow_after_move())
    }

    fn flow_after_move(&self) -> ControlFlow<()> {
        if self.scripted.as_slice().is_empty() && self.auto_remaining == 0 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Tries every neighbouring pair in row-major order and keeps the first accepted swap.
fn find_and_play(engine: &mut BoardEngine) -> Result<Option<Vec<Event>>> {
    let (columns, rows) = engine.dimensions();
    for row in 0..rows {
        for column in 0..columns {
            let first = CellCoord::new(column, row);
            let neighbours = [
                (column + 1 < columns).then(|| CellCoord::new(column + 1, row)),
                (row + 1 < rows).then(|| CellCoord::new(column, row + 1)),
            ];
            for second in neighbours.into_iter().flatten() {
                if let SwapOutcome::Resolved(events) = engine.request_swap(first, second)? {
                    debug!("auto move {first:?} <-> {second:?}");
                    return Ok(Some(events));
                }
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_arguments_parse_cell_pairs() {
        let swap: SwapArg = "2,1: 2,2".parse().expect("swap parses");

        assert_eq!(swap.first, CellCoord::new(2, 1));
        assert_eq!(swap.second, CellCoord::new(2, 2));
        assert!("2,1".parse::<SwapArg>().is_err());
        assert!("a,1:2,2".parse::<SwapArg>().is_err());
    }

    #[test]
    fn toml_layout_reads_preset_rows() {
        let layout = parse_layout_toml(
            r#"
            columns = 0
            rows = 0
            seed = 5
            preset = ["abca", "bcab", "aacd"]
            "#,
        )
        .expect("layout parses");

        assert_eq!((layout.columns, layout.rows), (4, 3));
        assert_eq!(layout.seed, 5);
    }

    #[test]
    fn toml_layout_reads_holes_and_obstacles() {
        let layout = parse_layout_toml(
            r#"
            columns = 6
            rows = 5
            symbol_count = 4
            holes = [{ column = 0, row = 0 }]
            obstacles = [{ cell = { column = 2, row = 3 }, stage = 2 }]
            "#,
        )
        .expect("layout parses");

        assert_eq!(layout.holes, vec![CellCoord::new(0, 0)]);
        assert_eq!(layout.obstacles[0].stage, 2);
        assert_eq!(layout.symbol_count, 4);
    }

    #[test]
    fn toml_layout_without_shape_is_rejected() {
        let error = parse_layout_toml("columns = 0\nrows = 0\n").expect_err("shape is required");

        assert!(error.to_string().contains("columns and rows"));
    }

    #[test]
    fn auto_moves_stop_when_exhausted() {
        let mut engine = BoardEngine::new();
        let opening = engine
            .initialize(BoardLayout::new(8, 8).with_seed(8))
            .expect("layout is valid");
        let mut scene = BoardScene::new();
        scene.apply_all(&opening).expect("opening replays");
        let mut plan = MovePlan::new(Vec::new(), 2);

        assert_eq!(
            plan.advance(&mut engine, &mut scene).expect("opening frame"),
            ControlFlow::Continue(())
        );
        assert_eq!(
            plan.advance(&mut engine, &mut scene).expect("first move"),
            ControlFlow::Continue(())
        );
        assert_eq!(
            plan.advance(&mut engine, &mut scene).expect("second move"),
            ControlFlow::Break(())
        );
        assert_eq!(
            BoardScene::from_view(engine.view()).tiles().collect::<Vec<_>>(),
            scene.tiles().collect::<Vec<_>>()
        );
    }
}

use std::{io::Write, ops::ControlFlow};

use anyhow::{Context, Result};
use match_cascade_core::CellCoord;
use match_cascade_rendering::{BoardScene, Presentation, RenderingBackend, SymbolPalette};

const EMPTY_CELL: char = '.';

/// Backend that prints each frame of the board as text.
#[derive(Debug)]
pub(crate) struct TextBackend<W> {
    out: W,
    color: bool,
}

impl<W: Write> TextBackend<W> {
    /// Creates a backend that writes frames to `out`, optionally with ANSI colours.
    pub(crate) fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    fn draw(
        &mut self,
        title: &str,
        frame: u32,
        palette: &SymbolPalette,
        scene: &mut BoardScene,
    ) -> Result<()> {
        writeln!(self.out, "== {title} :: frame {frame} ==").context("failed to write frame")?;
        for line in render_rows(scene, palette, self.color) {
            writeln!(self.out, "{line}").context("failed to write frame")?;
        }
        for effect in scene.drain_effects() {
            writeln!(
                self.out,
                "  {:?} fired at ({}, {}) clearing {} cells",
                effect.kind,
                effect.origin.column(),
                effect.origin.row(),
                effect.affected.len()
            )
            .context("failed to write frame")?;
        }
        Ok(())
    }
}

impl<W: Write> RenderingBackend for TextBackend<W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(&mut BoardScene) -> Result<ControlFlow<()>>,
    {
        let Presentation {
            title,
            palette,
            mut scene,
        } = presentation;

        let mut frame = 0;
        loop {
            let flow = update_scene(&mut scene)?;
            self.draw(&title, frame, &palette, &mut scene)?;
            if flow.is_break() {
                break;
            }
            frame += 1;
        }

        self.out.flush().context("failed to flush output")
    }
}

/// Renders the scene as one string per board row, top row first.
pub(crate) fn render_rows(scene: &BoardScene, palette: &SymbolPalette, color: bool) -> Vec<String> {
    let (columns, rows) = scene.dimensions();
    (0..rows)
        .map(|row| {
            let mut line = String::new();
            for column in 0..columns {
                match scene.tile_at(CellCoord::new(column, row)) {
                    Some(tile) if color => {
                        let (r, g, b) = palette.color(tile).to_rgb_u8();
                        line.push_str(&format!(
                            "\x1b[38;2;{r};{g};{b}m{}\x1b[0m",
                            palette.glyph(tile)
                        ));
                    }
                    Some(tile) => line.push(palette.glyph(tile)),
                    None => line.push(EMPTY_CELL),
                }
            }
            line
        })
        .collect()
}

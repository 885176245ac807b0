#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Symbol generation system that feeds ordinary symbols into refilled cells.
//!
//! The world never draws randomness on its own: every refill asks a
//! [`SymbolSource`], so tests can substitute a scripted sequence and replay a
//! cascade exactly.

use std::fmt;

use match_cascade_core::{Symbol, DEFAULT_SYMBOL_COUNT, MAX_SYMBOL_COUNT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of ordinary symbols consumed once per refilled cell.
pub trait SymbolSource: fmt::Debug {
    /// Produces the next symbol, advancing the internal state exactly once.
    fn next_symbol(&mut self) -> Symbol;
}

impl<S> SymbolSource for Box<S>
where
    S: SymbolSource + ?Sized,
{
    fn next_symbol(&mut self) -> Symbol {
        (**self).next_symbol()
    }
}

/// Configuration parameters required to construct a seeded generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    symbol_count: u8,
    seed: u64,
}

impl Config {
    /// Creates a configuration drawing from `symbol_count` ordinary symbols.
    ///
    /// The count is clamped into `1..=MAX_SYMBOL_COUNT`.
    #[must_use]
    pub fn new(symbol_count: u8, seed: u64) -> Self {
        Self {
            symbol_count: symbol_count.clamp(1, MAX_SYMBOL_COUNT),
            seed,
        }
    }

    /// Number of ordinary symbols the generator draws from.
    #[must_use]
    pub const fn symbol_count(&self) -> u8 {
        self.symbol_count
    }

    /// Seed applied to the generator's random stream.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SYMBOL_COUNT, 0)
    }
}

/// Uniform generator backed by a seeded ChaCha stream.
#[derive(Clone, Debug)]
pub struct SeededSymbols {
    rng: ChaCha8Rng,
    symbol_count: u8,
}

impl SeededSymbols {
    /// Creates a new generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            symbol_count: config.symbol_count(),
        }
    }
}

impl SymbolSource for SeededSymbols {
    fn next_symbol(&mut self) -> Symbol {
        Symbol::ordinary(self.rng.gen_range(0..self.symbol_count))
    }
}

/// Deterministic generator that replays a fixed script, wrapping at the end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptedSymbols {
    script: Vec<Symbol>,
    cursor: usize,
}

impl ScriptedSymbols {
    /// Creates a generator replaying the provided symbols in order.
    ///
    /// An empty script yields the first ordinary symbol forever.
    #[must_use]
    pub fn new(script: Vec<Symbol>) -> Self {
        Self { script, cursor: 0 }
    }

    /// Creates a generator from ordinary symbol indices.
    #[must_use]
    pub fn from_indices(indices: &[u8]) -> Self {
        Self::new(indices.iter().copied().map(Symbol::ordinary).collect())
    }

    /// Number of symbols handed out so far.
    #[must_use]
    pub const fn drawn(&self) -> usize {
        self.cursor
    }
}

impl SymbolSource for ScriptedSymbols {
    fn next_symbol(&mut self) -> Symbol {
        if self.script.is_empty() {
            return Symbol::ordinary(0);
        }

        let symbol = self.script[self.cursor % self.script.len()];
        self.cursor = self.cursor.wrapping_add(1);
        symbol
    }
}

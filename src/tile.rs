//! Numbered tiles and the 2048-style merge pass

use crate::board::Cell;
use rand::Rng;
use tracing::debug;

/// Default chance that a freshly spawned tile shows 4 instead of 2
pub const DEFAULT_FOUR_CHANCE: f64 = 0.1;

/// A numbered tile. Values are powers of two starting at 2
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tile {
    value: u32,
}

impl Tile {
    /// Create a tile. `value` should be a power of two of at least 2;
    /// other values are kept as given and only merge with their equal.
    pub fn new(value: u32) -> Self {
        Self { value }
    }

    /// Create a tile, None unless `value` is a power of two of at least 2
    pub fn try_new(value: u32) -> Option<Self> {
        (value >= 2 && value.is_power_of_two()).then_some(Self { value })
    }

    /// Draw a 2 or a 4, the 4 with probability `four_chance`
    pub fn random<R: Rng + ?Sized>(rng: &mut R, four_chance: f64) -> Self {
        if rng.gen_bool(four_chance.clamp(0.0, 1.0)) {
            Self::new(4)
        } else {
            Self::new(2)
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn can_merge(&self, other: &Tile) -> bool {
        self.value == other.value
    }

    /// Absorb an equal tile, returning the new value (the points gained)
    fn absorb(&mut self, other: Tile) -> u32 {
        self.value = self.value.saturating_add(other.value);
        self.value
    }
}

/// Merge stacked tiles of equal value and return the updated score.
///
/// Only vertical neighbours merge. A sweep walks columns left to right and,
/// inside a column, rows bottom to top. When a tile rests directly on an
/// equal tile the lower one absorbs it, the column above slides down one
/// row, and the merged tile is not compared again until the next sweep.
/// Sweeps repeat until one makes no merge. Each merge removes a tile, so a
/// call performs at most `tiles - 1` merges and always terminates.
///
/// With three equal tiles stacked, the bottom pair merges first.
pub fn merge_tiles(grid: &mut [Vec<Cell>], score: u64) -> u64 {
    let mut score = score;
    loop {
        let gained = merge_sweep(grid);
        if gained == 0 {
            return score;
        }
        debug!(gained, "merge sweep");
        score += gained;
    }
}

/// One bottom-up sweep over every column. Returns the points gained
fn merge_sweep(grid: &mut [Vec<Cell>]) -> u64 {
    let height = grid.len();
    let width = grid.first().map_or(0, Vec::len);
    let mut gained = 0;

    for col in 0..width {
        for row in 0..height.saturating_sub(1) {
            let mergeable = match (&grid[row][col], &grid[row + 1][col]) {
                (Cell::Filled(lower), Cell::Filled(upper)) => lower.can_merge(upper),
                _ => false,
            };
            if !mergeable {
                continue;
            }

            if let Cell::Filled(upper) = std::mem::take(&mut grid[row + 1][col]) {
                if let Cell::Filled(lower) = &mut grid[row][col] {
                    gained += u64::from(lower.absorb(upper));
                }
            }
            settle_column(grid, col, row + 1);
        }
    }

    gained
}

/// Slide every cell of `col` above `gap_row` down by one row
fn settle_column(grid: &mut [Vec<Cell>], col: usize, gap_row: usize) {
    for row in gap_row..grid.len() - 1 {
        grid[row][col] = std::mem::take(&mut grid[row + 1][col]);
    }
}

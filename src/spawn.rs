//! Random tile insertion behind an injectable source of choices.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::{Board, Tile};

/// Probability that a spawned tile is a 2 (otherwise 4).
pub const TWO_PROBABILITY: f64 = 0.7;

/// The two random decisions a spawn needs.
pub trait TileSpawner {
    /// Pick an index in `0..count`. `count` is always non-zero.
    fn choose_cell(&mut self, count: usize) -> usize;

    /// Pick the value of the new tile: 2 or 4.
    fn choose_value(&mut self) -> Tile;
}

/// `TileSpawner` backed by any `rand` RNG: uniform cell, 2 with probability 0.7.
#[derive(Debug, Clone)]
pub struct RngSpawner<R> {
    rng: R,
}

impl<R: Rng> RngSpawner<R> {
    pub fn new(rng: R) -> Self {
        RngSpawner { rng }
    }
}

impl RngSpawner<StdRng> {
    /// Deterministic spawner for reproducible games.
    pub fn seeded(seed: u64) -> Self {
        RngSpawner::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        RngSpawner::new(StdRng::from_entropy())
    }
}

impl<R: Rng> TileSpawner for RngSpawner<R> {
    fn choose_cell(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count)
    }

    fn choose_value(&mut self) -> Tile {
        if self.rng.gen_bool(TWO_PROBABILITY) { 2 } else { 4 }
    }
}

/// Insert a 2 or 4 into a uniformly chosen empty cell. Returns the cell filled,
/// or `None` (board untouched) when the board is full.
///
/// ```
/// use merge_2048::engine::Board;
/// use merge_2048::spawn::{spawn_random_tile, RngSpawner};
/// let mut spawner = RngSpawner::seeded(123);
/// let mut b = Board::EMPTY;
/// spawn_random_tile(&mut b, &mut spawner);
/// spawn_random_tile(&mut b, &mut spawner);
/// assert_eq!(b.count_empty(), 14);
/// ```
pub fn spawn_random_tile<S: TileSpawner + ?Sized>(board: &mut Board, spawner: &mut S) -> Option<(usize, usize)> {
    let empty = board.empty_cells();
    if empty.is_empty() {
        return None;
    }
    let (row, col) = empty[spawner.choose_cell(empty.len())];
    board.set(row, col, spawner.choose_value());
    Some((row, col))
}

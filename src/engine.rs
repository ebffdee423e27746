use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Side length of the square board.
pub const SIZE: usize = 4;

pub type Tile = u64;
pub type Score = u64;
pub type Row = [Tile; SIZE];

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown direction: {0:?}")]
pub struct ParseMoveError(pub String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Move::Up),
            "down" => Ok(Move::Down),
            "left" => Ok(Move::Left),
            "right" => Ok(Move::Right),
            _ => Err(ParseMoveError(s.to_string())),
        }
    }
}

/// A 4x4 grid of tile values, row-major. 0 is an empty cell, anything else a power of two.
///
/// `Board` is `Copy`: every snapshot taken from it is an independent value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board([Row; SIZE]);

/// Result of sliding a board in one direction (no random insert).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shifted {
    pub board: Board,
    /// Sum of every tile created by a merge during this shift.
    pub score_gain: Score,
    /// True iff at least one cell differs from the input board.
    pub changed: bool,
}

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board([[0; SIZE]; SIZE]);

    #[inline]
    pub fn from_rows(rows: [Row; SIZE]) -> Self {
        Board(rows)
    }

    #[inline]
    pub fn rows(&self) -> &[Row; SIZE] {
        &self.0
    }

    #[inline]
    pub fn into_rows(self) -> [Row; SIZE] {
        self.0
    }

    /// Panics if `row` or `col` is outside `0..SIZE`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Tile {
        self.0[row][col]
    }

    /// Panics if `row` or `col` is outside `0..SIZE`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: Tile) {
        debug_assert!(value == 0 || value.is_power_of_two(), "tile {value} is not a power of two");
        self.0[row][col] = value;
    }

    /// All empty cells as `(row, col)`, in row-major order.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells().filter(|&(_, _, v)| v == 0).map(|(r, c, _)| (r, c)).collect()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count_empty() == 0
    }

    pub fn count_empty(&self) -> usize {
        self.cells().filter(|&(_, _, v)| v == 0).count()
    }

    /// Number of occupied cells.
    pub fn count_tiles(&self) -> usize {
        SIZE * SIZE - self.count_empty()
    }

    /// Sum of all tile values on the board.
    pub fn tile_sum(&self) -> Tile {
        self.cells().map(|(_, _, v)| v).sum()
    }

    /// Return the highest tile value (e.g., 2048) present on the board, 0 if empty.
    pub fn highest_tile(&self) -> Tile {
        self.cells().map(|(_, _, v)| v).max().unwrap_or(0)
    }

    /// Slide/merge tiles in `dir`. See [`shift`].
    #[inline]
    pub fn shift(self, dir: Move) -> Shifted {
        shift(self, dir)
    }

    /// True iff the board is full and no two row- or column-neighbours are equal.
    ///
    /// ```
    /// use merge_2048::engine::Board;
    /// assert!(!Board::EMPTY.is_game_over());
    /// let stuck = Board::from_rows([[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
    /// assert!(stuck.is_game_over());
    /// ```
    #[inline]
    pub fn is_game_over(&self) -> bool {
        is_game_over(self)
    }

    fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.0
            .iter()
            .enumerate()
            .flat_map(|(r, row)| row.iter().enumerate().map(move |(c, &v)| (r, c, v)))
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:?})", self.0)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(SIZE * CELL_WIDTH + SIZE - 1);
        for (idx, row) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f, "{rule}")?;
            }
            let cells: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

impl From<[Row; SIZE]> for Board {
    fn from(rows: [Row; SIZE]) -> Self {
        Board::from_rows(rows)
    }
}

impl From<Board> for [Row; SIZE] {
    fn from(b: Board) -> Self {
        b.into_rows()
    }
}

/// Merge one row toward the left.
///
/// Non-zero tiles are compacted left in order, then scanned once: an adjacent equal pair
/// becomes a single tile of twice the value and the scan resumes after it, so a freshly
/// merged tile never merges again in the same pass. Returns the new row and the sum of
/// the merged tiles.
///
/// ```
/// use merge_2048::engine::merge_row_left;
/// assert_eq!(merge_row_left([2, 2, 2, 2]), ([4, 4, 0, 0], 8));
/// assert_eq!(merge_row_left([4, 4, 4, 0]), ([8, 4, 0, 0], 8));
/// ```
pub fn merge_row_left(row: Row) -> (Row, Score) {
    let mut merged = [0; SIZE];
    let mut len = 0;
    let mut gain = 0;
    let mut pending: Option<Tile> = None;
    for tile in row.into_iter().filter(|&t| t != 0) {
        match pending {
            Some(prev) if prev == tile => {
                merged[len] = prev + tile;
                gain += prev + tile;
                len += 1;
                pending = None;
            }
            Some(prev) => {
                merged[len] = prev;
                len += 1;
                pending = Some(tile);
            }
            None => pending = Some(tile),
        }
    }
    if let Some(prev) = pending {
        merged[len] = prev;
    }
    (merged, gain)
}

/// Mirror of [`merge_row_left`]: reverse, merge left, reverse back.
pub fn merge_row_right(mut row: Row) -> (Row, Score) {
    row.reverse();
    let (mut merged, gain) = merge_row_left(row);
    merged.reverse();
    (merged, gain)
}

/// Slide/merge tiles in the given direction. No randomness.
///
/// Left and Right merge each row; Up and Down transpose, merge rows, transpose back.
///
/// ```
/// use merge_2048::engine::{shift, Board, Move};
/// let b = Board::from_rows([[0, 2, 0, 2], [0; 4], [0; 4], [0; 4]]);
/// let out = shift(b, Move::Left);
/// assert_eq!(out.board.rows()[0], [4, 0, 0, 0]);
/// assert_eq!(out.score_gain, 4);
/// assert!(out.changed);
/// ```
pub fn shift(board: Board, direction: Move) -> Shifted {
    let (moved, score_gain) = match direction {
        Move::Left | Move::Right => shift_rows(board, direction),
        Move::Up | Move::Down => shift_cols(board, direction),
    };
    Shifted { board: moved, score_gain, changed: moved != board }
}

/// True if the board has no empty cell and no adjacent equal pair.
pub fn is_game_over(board: &Board) -> bool {
    if !board.is_full() {
        return false;
    }
    for r in 0..SIZE {
        for c in 0..SIZE {
            let v = board.get(r, c);
            if c + 1 < SIZE && v == board.get(r, c + 1) {
                return false;
            }
            if r + 1 < SIZE && v == board.get(r + 1, c) {
                return false;
            }
        }
    }
    true
}

pub(crate) fn transpose(board: Board) -> Board {
    let mut out = [[0; SIZE]; SIZE];
    for (r, row) in board.0.iter().enumerate() {
        for (c, &v) in row.iter().enumerate() {
            out[c][r] = v;
        }
    }
    Board(out)
}

fn shift_rows(board: Board, move_dir: Move) -> (Board, Score) {
    let merge: fn(Row) -> (Row, Score) = match move_dir {
        Move::Left => merge_row_left,
        Move::Right => merge_row_right,
        _ => unreachable!("shift_rows only handles left/right"),
    };
    let mut rows = board.0;
    let mut gain = 0;
    for row in rows.iter_mut() {
        let (merged, g) = merge(*row);
        *row = merged;
        gain += g;
    }
    (Board(rows), gain)
}

fn shift_cols(board: Board, move_dir: Move) -> (Board, Score) {
    let row_dir = match move_dir {
        Move::Up => Move::Left,
        Move::Down => Move::Right,
        _ => unreachable!("shift_cols only handles up/down"),
    };
    let (moved, gain) = shift_rows(transpose(board), row_dir);
    (transpose(moved), gain)
}

const CELL_WIDTH: usize = 7;

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(CELL_WIDTH),
        x => format!("{:^width$}", x, width = CELL_WIDTH),
    }
}

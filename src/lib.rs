//! merge-2048: the board engine and game session behind a 4x4 sliding-tile merge game
//!
//! This crate provides:
//! - A `Board` value type with the merge primitive (`engine::merge_row_left`) and
//!   directional shifts built on it (`engine::shift`)
//! - Random tile insertion behind an injectable `TileSpawner` (`spawn` module)
//! - A `GameSession` with score, session best, one-step undo and game-over detection
//! - Input `Command`s that a front end parses and hands to the session
//!
//! Quick start:
//! ```
//! use merge_2048::engine::{Board, Move};
//! use merge_2048::session::{GameSession, MoveOutcome};
//!
//! // Deterministic session with a seeded RNG
//! let mut game = GameSession::seeded(42);
//! assert_eq!(game.board().count_tiles(), 2);
//!
//! let before = game.snapshot();
//! if let MoveOutcome::Moved { .. } = game.apply_move(Move::Left) {
//!     assert!(game.undo());
//!     assert_eq!(game.snapshot(), before);
//! }
//!
//! // Engine ops are pure and need no session
//! let b = Board::from_rows([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
//! let out = b.shift(Move::Left);
//! assert_eq!(out.board.rows()[0], [4, 4, 0, 0]);
//! assert_eq!(out.score_gain, 8);
//! ```
//!
pub mod command;
pub mod engine;
pub mod session;
pub mod spawn;

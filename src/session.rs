//! Game session: score, session best, one-step undo and the Playing/GameOver state machine.
//!
//! The session is the single source of truth for the game. Front ends read [`SessionView`]
//! after every command and never hold state of their own.

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::engine::{Board, Move, Row, Score, SIZE};
use crate::spawn::{spawn_random_tile, RngSpawner, TileSpawner};

/// Number of tiles placed on a fresh board.
pub const START_TILES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    GameOver,
}

/// One undo is allowed per accepted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoState {
    CanUndo,
    UndoConsumed,
}

/// Immutable board + score pair recorded in the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Board,
    pub score: Score,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The board changed; a tile was spawned and the state recorded.
    Moved { score_gain: Score, spawned: Option<(usize, usize)>, game_over: bool },
    /// The move left every cell as it was. Nothing happened.
    Unchanged,
    /// The game is over; moves are not accepted until restart.
    Refused,
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// What a renderer needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub grid: [Row; SIZE],
    pub score: Score,
    pub high_score: Score,
    pub game_over: bool,
}

#[derive(Debug)]
pub struct GameSession<S = RngSpawner<StdRng>> {
    board: Board,
    score: Score,
    high_score: Score,
    // history[0] is the opening position; the last entry always equals the live state
    history: Vec<Snapshot>,
    undo: UndoState,
    status: Status,
    spawner: S,
}

impl GameSession<RngSpawner<StdRng>> {
    /// Session with reproducible tile spawns.
    ///
    /// ```
    /// use merge_2048::engine::Move;
    /// use merge_2048::session::{GameSession, Status};
    ///
    /// let mut game = GameSession::seeded(42);
    /// assert_eq!(game.board().count_tiles(), 2);
    /// for dir in [Move::Left, Move::Up, Move::Right, Move::Down] {
    ///     game.apply_move(dir);
    /// }
    /// assert_eq!(game.status(), Status::Playing);
    /// assert!(game.high_score() >= game.score());
    /// ```
    pub fn seeded(seed: u64) -> Self {
        GameSession::new(RngSpawner::seeded(seed))
    }

    pub fn from_entropy() -> Self {
        GameSession::new(RngSpawner::from_entropy())
    }
}

impl<S: TileSpawner> GameSession<S> {
    /// Start a fresh game: empty board plus two random tiles.
    pub fn new(spawner: S) -> Self {
        let mut session = GameSession {
            board: Board::EMPTY,
            score: 0,
            high_score: 0,
            history: Vec::new(),
            undo: UndoState::CanUndo,
            status: Status::Playing,
            spawner,
        };
        session.start();
        session
    }

    /// Resume play from an arbitrary position with score 0. No tiles are spawned.
    pub fn from_board(board: Board, spawner: S) -> Self {
        let status = if board.is_game_over() { Status::GameOver } else { Status::Playing };
        GameSession {
            board,
            score: 0,
            high_score: 0,
            history: vec![Snapshot { board, score: 0 }],
            undo: UndoState::CanUndo,
            status,
            spawner,
        }
    }

    /// Fresh game in place. The session best carries over.
    pub fn restart(&mut self) {
        info!(score = self.score, high_score = self.high_score, "restart");
        self.start();
    }

    fn start(&mut self) {
        self.history.clear();
        self.board = Board::EMPTY;
        self.score = 0;
        for _ in 0..START_TILES {
            spawn_random_tile(&mut self.board, &mut self.spawner);
        }
        self.history.push(self.snapshot());
        self.undo = UndoState::CanUndo;
        self.status = Status::Playing;
    }

    /// Slide the board in `dir`.
    ///
    /// A move that changes nothing has no side effects: no spawn, no history entry,
    /// and the undo state is left alone.
    pub fn apply_move(&mut self, dir: Move) -> MoveOutcome {
        if self.status == Status::GameOver {
            trace!(%dir, "move refused: game over");
            return MoveOutcome::Refused;
        }
        let shifted = self.board.shift(dir);
        if !shifted.changed {
            trace!(%dir, "move left board unchanged");
            return MoveOutcome::Unchanged;
        }

        self.board = shifted.board;
        self.score += shifted.score_gain;
        let spawned = spawn_random_tile(&mut self.board, &mut self.spawner);
        self.history.push(self.snapshot());
        self.undo = UndoState::CanUndo;
        self.high_score = self.high_score.max(self.score);
        debug!(%dir, gain = shifted.score_gain, score = self.score, ?spawned, "move");

        let game_over = self.board.is_game_over();
        if game_over {
            self.status = Status::GameOver;
            info!(score = self.score, highest_tile = self.board.highest_tile(), "game over");
        }
        MoveOutcome::Moved { score_gain: shifted.score_gain, spawned, game_over }
    }

    /// Step back to the state before the last accepted move. Returns false (no-op) if
    /// there is nothing to undo or an undo was already used since the last move.
    ///
    /// Undo does not leave `GameOver`.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            trace!(history = self.history.len(), undo = ?self.undo, "undo refused");
            return false;
        }
        self.history.pop();
        let Some(&Snapshot { board, score }) = self.history.last() else {
            return false;
        };
        self.board = board;
        self.score = score;
        self.undo = UndoState::UndoConsumed;
        debug!(score, "undo");
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() > 1 && self.undo == UndoState::CanUndo
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Best score since the session was created, across restarts.
    pub fn high_score(&self) -> Score {
        self.high_score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == Status::GameOver
    }

    pub fn undo_state(&self) -> UndoState {
        self.undo
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot { board: self.board, score: self.score }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            grid: self.board.into_rows(),
            score: self.score,
            high_score: self.high_score,
            game_over: self.is_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::tests::Scripted;

    const CHECKER: [Row; SIZE] = [[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]];

    fn scripted(board: [Row; SIZE]) -> GameSession<Scripted> {
        GameSession::from_board(Board::from_rows(board), Scripted::default())
    }

    #[test]
    fn new_session_has_two_tiles() {
        let game = GameSession::new(Scripted::new(&[0, 3], &[2, 4]));
        assert_eq!(game.board().rows()[0], [2, 0, 0, 0]);
        assert_eq!(game.board().rows()[1], [4, 0, 0, 0]);
        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), 0);
        assert_eq!(game.history_len(), 1);
        assert_eq!(game.status(), Status::Playing);
        assert!(!game.can_undo());
    }

    #[test]
    fn undo_needs_history() {
        let mut game = GameSession::seeded(3);
        let before = game.snapshot();
        assert!(!game.undo());
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn unchanged_move_has_no_side_effects() {
        let mut rows = CHECKER;
        rows[3][3] = 0;
        let mut game = scripted(rows);
        let before = game.snapshot();
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Unchanged);
        assert_eq!(game.apply_move(Move::Up), MoveOutcome::Unchanged);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.board().count_empty(), 1);
        assert_eq!(game.history_len(), 1);
        assert_eq!(game.undo_state(), UndoState::CanUndo);
    }

    #[test]
    fn move_then_undo_restores_previous_state() {
        let mut game = scripted([[2, 2, 0, 0], [4, 0, 0, 4], [0; SIZE], [0; SIZE]]);
        assert!(game.apply_move(Move::Left).is_moved());
        let mid = game.snapshot();
        assert_eq!(mid.score, 12);

        game.apply_move(Move::Down);
        assert_eq!(game.history_len(), 3);
        assert!(game.undo());
        assert_eq!(game.snapshot(), mid);
        assert_eq!(game.history_len(), 2);

        // second undo in a row is refused
        assert!(!game.undo());
        assert_eq!(game.snapshot(), mid);
        assert_eq!(game.undo_state(), UndoState::UndoConsumed);
    }

    #[test]
    fn undo_is_restored_by_accepted_move_only() {
        let mut game = scripted([[2, 4, 8, 16], [0; SIZE], [0; SIZE], [0; SIZE]]);
        assert!(game.apply_move(Move::Down).is_moved());
        let after_first = game.snapshot();
        assert_eq!(after_first.board.rows()[0], [2, 0, 0, 0]);
        assert!(game.apply_move(Move::Down).is_moved());
        assert!(game.undo());
        assert_eq!(game.snapshot(), after_first);
        assert_eq!(game.history_len(), 2);

        // left is a no-op here; it must not re-enable undo
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Unchanged);
        assert!(!game.can_undo());
        assert!(!game.undo());
        assert_eq!(game.history_len(), 2);

        assert!(game.apply_move(Move::Up).is_moved());
        assert!(game.can_undo());
        assert!(game.undo());
        assert_eq!(game.snapshot(), after_first);
    }

    #[test]
    fn move_spawns_exactly_one_tile() {
        let mut game = GameSession::from_board(
            Board::from_rows([[2, 2, 0, 0], [0; SIZE], [0; SIZE], [0; SIZE]]),
            Scripted::new(&[0], &[4]),
        );
        let outcome = game.apply_move(Move::Right);
        assert_eq!(outcome, MoveOutcome::Moved { score_gain: 4, spawned: Some((0, 0)), game_over: false });
        assert_eq!(game.board().rows()[0], [4, 0, 0, 4]);
        assert_eq!(game.board().count_tiles(), 2);
        assert_eq!(game.score(), 4);
        assert_eq!(game.high_score(), 4);
    }

    #[test]
    fn restart_keeps_session_best() {
        let mut game = scripted([[32, 32, 0, 0], [16, 16, 0, 0], [8, 8, 0, 0], [4, 4, 0, 0]]);
        game.apply_move(Move::Left);
        assert_eq!(game.score(), 120);
        assert_eq!(game.high_score(), 120);

        game.restart();
        assert_eq!(game.score(), 0);
        assert_eq!(game.high_score(), 120);
        assert_eq!(game.history_len(), 1);
        assert_eq!(game.board().count_tiles(), START_TILES);
        assert_eq!(game.status(), Status::Playing);

        // a lower score in the next game doesn't lower the best
        let view = game.view();
        assert_eq!(view.score, 0);
        assert_eq!(view.high_score, 120);
        assert!(!view.game_over);
    }

    #[test]
    fn reaching_stuck_board_ends_game() {
        let mut rows = CHECKER;
        rows[3] = [0, 4, 2, 4];
        let mut game = GameSession::from_board(Board::from_rows(rows), Scripted::new(&[0], &[2]));
        assert_eq!(game.status(), Status::Playing);

        let outcome = game.apply_move(Move::Left);
        assert_eq!(outcome, MoveOutcome::Moved { score_gain: 0, spawned: Some((3, 3)), game_over: true });
        assert_eq!(game.board(), &Board::from_rows(CHECKER));
        assert!(game.is_over());
        assert!(game.view().game_over);

        assert_eq!(game.apply_move(Move::Right), MoveOutcome::Refused);
        assert_eq!(game.history_len(), 2);

        // undo is still allowed but the game stays over
        assert!(game.undo());
        assert_eq!(game.board(), &Board::from_rows(rows));
        assert_eq!(game.status(), Status::GameOver);
        assert_eq!(game.apply_move(Move::Left), MoveOutcome::Refused);

        game.restart();
        assert_eq!(game.status(), Status::Playing);
    }

    #[test]
    fn history_is_independent_of_live_board() {
        let mut game = scripted([[2, 2, 0, 0], [0; SIZE], [0; SIZE], [0; SIZE]]);
        let opening = game.history()[0];
        game.apply_move(Move::Left);
        game.apply_move(Move::Right);
        assert_eq!(game.history()[0], opening);
        assert_eq!(game.history().last(), Some(&game.snapshot()));
    }

    #[test]
    fn random_play_keeps_invariants() {
        let mut game = GameSession::seeded(2024);
        let dirs = [Move::Left, Move::Down, Move::Right, Move::Up];
        let mut prev = game.snapshot();
        for i in 0..500 {
            if game.is_over() {
                break;
            }
            match game.apply_move(dirs[i % dirs.len()]) {
                MoveOutcome::Moved { score_gain, spawned, .. } => {
                    let (r, c) = spawned.expect("a changed move always frees a cell");
                    let new_tile = game.board().get(r, c);
                    assert!(new_tile == 2 || new_tile == 4);
                    assert_eq!(game.board().tile_sum(), prev.board.tile_sum() + new_tile);
                    assert_eq!(game.score(), prev.score + score_gain);
                    assert_eq!(game.history().last(), Some(&game.snapshot()));
                }
                MoveOutcome::Unchanged => assert_eq!(game.snapshot(), prev),
                MoveOutcome::Refused => unreachable!(),
            }
            assert!(game.score() >= prev.score);
            assert!(game.high_score() >= game.score());
            assert!(game.board().rows().iter().flatten().all(|&v| v == 0 || v.is_power_of_two()));
            prev = game.snapshot();
        }
    }

    #[test]
    fn view_serializes_to_json() {
        let game = scripted([[2, 0, 0, 0], [0; SIZE], [0; SIZE], [0, 0, 0, 4]]);
        let json = serde_json::to_value(game.view()).unwrap();
        assert_eq!(json["grid"][0][0], 2);
        assert_eq!(json["grid"][3][3], 4);
        assert_eq!(json["score"], 0);
        assert_eq!(json["game_over"], false);
    }
}

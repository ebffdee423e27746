//! Player input: the commands a front end can send to a [`GameSession`].

use std::str::FromStr;

use crate::engine::Move;
use crate::session::{GameSession, MoveOutcome};
use crate::spawn::TileSpawner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Undo,
    Restart,
    Quit,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0:?}")]
    Unknown(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Accepts direction names, WASD, vi keys (hjkl), `u`/`undo`/`back`,
    /// `r`/`restart`/`new` and `q`/`quit`/`exit`. Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        let cmd = match word.as_str() {
            "" => return Err(ParseCommandError::Empty),
            "w" | "k" => Command::Move(Move::Up),
            "s" | "j" => Command::Move(Move::Down),
            "a" | "h" => Command::Move(Move::Left),
            "d" | "l" => Command::Move(Move::Right),
            "u" | "undo" | "back" => Command::Undo,
            "r" | "restart" | "new" => Command::Restart,
            "q" | "quit" | "exit" => Command::Quit,
            other => other
                .parse::<Move>()
                .map(Command::Move)
                .map_err(|_| ParseCommandError::Unknown(s.trim().to_string()))?,
        };
        Ok(cmd)
    }
}

/// What a command did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// Session state changed; the front end should redraw.
    Updated,
    /// Policy no-op (unchanged move, refused undo, move after game over).
    Ignored,
    Quit,
}

impl<S: TileSpawner> GameSession<S> {
    /// Dispatch one input command to the session.
    ///
    /// ```
    /// use merge_2048::command::{Command, Handled};
    /// use merge_2048::session::GameSession;
    ///
    /// let mut game = GameSession::seeded(1);
    /// assert_eq!(game.handle(Command::Undo), Handled::Ignored);
    /// assert_eq!(game.handle(Command::Restart), Handled::Updated);
    /// assert_eq!(game.handle("q".parse().unwrap()), Handled::Quit);
    /// ```
    pub fn handle(&mut self, cmd: Command) -> Handled {
        let updated = match cmd {
            Command::Move(dir) => matches!(self.apply_move(dir), MoveOutcome::Moved { .. }),
            Command::Undo => self.undo(),
            Command::Restart => {
                self.restart();
                true
            }
            Command::Quit => return Handled::Quit,
        };
        if updated { Handled::Updated } else { Handled::Ignored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Board, SIZE};
    use crate::spawn::tests::Scripted;

    #[test]
    fn it_parse_command() {
        assert_eq!("w".parse::<Command>(), Ok(Command::Move(Move::Up)));
        assert_eq!("J".parse::<Command>(), Ok(Command::Move(Move::Down)));
        assert_eq!("left".parse::<Command>(), Ok(Command::Move(Move::Left)));
        assert_eq!(" D\n".parse::<Command>(), Ok(Command::Move(Move::Right)));
        assert_eq!("back".parse::<Command>(), Ok(Command::Undo));
        assert_eq!("r".parse::<Command>(), Ok(Command::Restart));
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
        assert_eq!("  ".parse::<Command>(), Err(ParseCommandError::Empty));
        assert_eq!("jump".parse::<Command>(), Err(ParseCommandError::Unknown("jump".into())));
    }

    #[test]
    fn handle_reports_no_ops() {
        let board = Board::from_rows([[2, 4, 8, 16], [0; SIZE], [0; SIZE], [0; SIZE]]);
        let mut game = GameSession::from_board(board, Scripted::default());
        assert_eq!(game.handle(Command::Move(Move::Left)), Handled::Ignored);
        assert_eq!(game.handle(Command::Undo), Handled::Ignored);
        assert_eq!(game.handle(Command::Move(Move::Down)), Handled::Updated);
        assert_eq!(game.handle(Command::Undo), Handled::Updated);
        assert_eq!(game.handle(Command::Undo), Handled::Ignored);
        assert_eq!(game.board(), &board);
    }
}

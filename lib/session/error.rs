use crate::chess::{Color, InvalidMove};
use crate::session::{GameId, StoreError};
use derive_more::{Display, Error, From};

/// A command that breaks the rules of the game.
///
/// Rule violations never change the state of a game.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum RuleViolation {
    #[display(fmt = "the game is over")]
    #[from(ignore)]
    GameOver,

    #[display(fmt = "it is not your turn")]
    #[from(ignore)]
    NotYourTurn,

    #[display(fmt = "you are not playing {}", _0)]
    #[from(ignore)]
    NotSeated(#[error(not(source))] Color),

    #[display(fmt = "that piece is not yours")]
    #[from(ignore)]
    WrongPiece,

    #[display(fmt = "you cannot resign as an observer")]
    #[from(ignore)]
    CannotResign,

    #[display(fmt = "invalid move: {}", _0)]
    InvalidMove(InvalidMove),
}

/// The reason why a command failed.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    #[display(fmt = "unauthorized")]
    #[from(ignore)]
    Unauthorized,

    #[display(fmt = "game {} not found", _0)]
    #[from(ignore)]
    NotFound(#[error(not(source))] GameId),

    #[display(fmt = "{}", _0)]
    Rule(RuleViolation),

    #[display(fmt = "{}", _0)]
    Store(StoreError),

    #[display(fmt = "malformed command: {}", _0)]
    Protocol(serde_json::Error),
}

impl From<InvalidMove> for SessionError {
    fn from(e: InvalidMove) -> Self {
        SessionError::Rule(e.into())
    }
}

impl SessionError {
    /// Whether the failure is the server's fault rather than the client's.
    pub fn is_fault(&self) -> bool {
        matches!(self, SessionError::Store(_))
    }
}

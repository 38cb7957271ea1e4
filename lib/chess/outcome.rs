use crate::chess::{Color, Game};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// One of the possible outcomes of a chess game.
#[derive(Debug, Display, Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(tag = "reason", content = "color", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    #[display(fmt = "checkmate by the {} player", _0)]
    Checkmate(Color),

    #[display(fmt = "{} player resigned", _0)]
    Resignation(Color),

    #[display(fmt = "stalemate")]
    Stalemate,
}

impl Outcome {
    /// How the game ends if the side to move has no legal moves left.
    pub fn of(game: &Game) -> Option<Self> {
        let side = game.turn();
        if game.is_checkmate(side) {
            Some(Outcome::Checkmate(!side))
        } else if game.is_stalemate(side) {
            Some(Outcome::Stalemate)
        } else {
            None
        }
    }

    /// Whether the outcome is a [draw] and neither side has won.
    ///
    /// [draw]: https://www.chessprogramming.org/Draw
    pub fn is_draw(&self) -> bool {
        !self.is_decisive()
    }

    /// Whether the outcome is a decisive and one of the sides has won.
    pub fn is_decisive(&self) -> bool {
        matches!(self, Outcome::Checkmate(_) | Outcome::Resignation(_))
    }

    /// The winning side, if the outcome is [decisive](`Self::is_decisive`).
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate(c) => Some(c),
            Outcome::Resignation(c) => Some(!c),
            Outcome::Stalemate => None,
        }
    }
}

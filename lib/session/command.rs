use crate::chess::{Color, Move};
use crate::session::GameId;
use serde::{Deserialize, Serialize};

/// An inbound frame.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub auth_token: String,
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(flatten)]
    pub command: Command,
}

/// What a [`Request`] asks for.
///
/// A missing color means the user acts as an observer, except for
/// [`Command::MakeMove`], where it defaults to the side to move.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Connect {
        #[serde(default)]
        color: Option<Color>,
    },

    MakeMove {
        #[serde(rename = "move")]
        action: Move,
        #[serde(default)]
        color: Option<Color>,
    },

    Leave {
        #[serde(default)]
        color: Option<Color>,
    },

    Resign {
        #[serde(default)]
        color: Option<Color>,
    },
}

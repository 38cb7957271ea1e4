use crate::session::GameRecord;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// An outbound frame.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// The full state of the game.
    LoadGame { game: GameRecord },

    /// Something happened in the game.
    Notification { message: String },

    /// The last command failed.
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl Message {
    pub fn load_game(record: &GameRecord) -> Self {
        Message::LoadGame {
            game: record.clone(),
        }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Message::Notification {
            message: message.into(),
        }
    }

    /// An error, prefixed the way clients expect.
    pub fn error(reason: impl Display) -> Self {
        Message::Error {
            error_message: format!("Error: {reason}"),
        }
    }
}

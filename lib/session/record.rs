use crate::chess::{Color, Game, Outcome};
use crate::session::RuleViolation;
use serde::{Deserialize, Serialize};

/// The identifier of a [`GameRecord`].
pub type GameId = u32;

/// The authoritative state of a game, as kept by the [`Store`][`crate::session::Store`].
///
/// Once concluded, a record stays concluded.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(from = "Snapshot", into = "Snapshot")]
pub struct GameRecord {
    id: GameId,
    name: String,
    seats: [Option<String>; 2],
    game: Game,
    outcome: Option<Outcome>,
}

impl GameRecord {
    /// A fresh game in the opening position with both seats free.
    pub fn new(id: GameId, name: impl Into<String>) -> Self {
        GameRecord {
            id,
            name: name.into(),
            seats: Default::default(),
            game: Game::default(),
            outcome: None,
        }
    }

    /// Seats a user, replacing whoever held the seat before.
    pub fn with_seat(mut self, side: Color, username: impl Into<String>) -> Self {
        self.seats[side as usize] = Some(username.into());
        self
    }

    /// Replaces the [`Game`].
    pub fn with_game(mut self, game: Game) -> Self {
        self.game = game;
        self
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The username seated on the given side, if any.
    pub fn seat(&self, side: Color) -> Option<&str> {
        self.seats[side as usize].as_deref()
    }

    /// The sides the given user is seated on.
    pub fn seats_of<'a>(&'a self, username: &'a str) -> impl Iterator<Item = Color> + 'a {
        Color::ALL
            .into_iter()
            .filter(move |&c| self.seat(c) == Some(username))
    }

    /// Frees the seat on the given side.
    pub fn vacate(&mut self, side: Color) -> Option<String> {
        self.seats[side as usize].take()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// How the game ended, if it has.
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether moves may still be played.
    pub fn is_active(&self) -> bool {
        self.outcome.is_none()
    }

    /// Ends the game, unless it has ended already.
    pub fn conclude(&mut self, outcome: Outcome) -> Result<(), RuleViolation> {
        match self.outcome {
            Some(_) => Err(RuleViolation::GameOver),
            None => {
                self.outcome = Some(outcome);
                Ok(())
            }
        }
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(rename = "gameID")]
    game_id: GameId,
    #[serde(default)]
    white_username: Option<String>,
    #[serde(default)]
    black_username: Option<String>,
    game_name: String,
    game: Game,
    #[serde(default)]
    outcome: Option<Outcome>,
    #[serde(skip_deserializing)]
    active: bool,
}

impl From<Snapshot> for GameRecord {
    fn from(s: Snapshot) -> Self {
        GameRecord {
            id: s.game_id,
            name: s.game_name,
            seats: [s.white_username, s.black_username],
            game: s.game,
            outcome: s.outcome,
        }
    }
}

impl From<GameRecord> for Snapshot {
    fn from(r: GameRecord) -> Self {
        let active = r.is_active();
        let [white_username, black_username] = r.seats;

        Snapshot {
            game_id: r.id,
            white_username,
            black_username,
            game_name: r.name,
            game: r.game,
            outcome: r.outcome,
            active,
        }
    }
}

use crate::chess::Color;
use crate::session::{GameId, GameRecord, MemoryStore, Tokens};
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::{fmt, str::FromStr};

/// The reason why parsing the server configuration failed.
#[derive(Debug, Display, Eq, PartialEq, Error, From)]
#[display(fmt = "failed to parse server configuration")]
pub struct ParseConfigError(ron::de::SpannedError);

/// A game available from the start.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Seed {
    pub id: GameId,
    pub name: String,
    #[serde(default)]
    pub white: Option<String>,
    #[serde(default)]
    pub black: Option<String>,
}

impl From<Seed> for GameRecord {
    fn from(s: Seed) -> Self {
        let mut record = GameRecord::new(s.id, s.name);

        for (side, username) in [(Color::White, s.white), (Color::Black, s.black)] {
            if let Some(username) = username {
                record = record.with_seat(side, username);
            }
        }

        record
    }
}

/// Runtime configuration for the [`Server`][`crate::server::Server`].
///
/// Accounts and games are managed elsewhere; the tokens and games listed here seed
/// the server so it can be exercised on its own.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub bind: SocketAddr,
    pub tokens: BTreeMap<String, String>,
    pub games: Vec<Seed>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: (Ipv4Addr::LOCALHOST, 8080).into(),
            tokens: BTreeMap::new(),
            games: Vec::new(),
        }
    }
}

impl Config {
    /// The identity collaborator seeded by this configuration.
    pub fn identity(&self) -> Tokens {
        self.tokens.clone().into_iter().collect()
    }

    /// The persistence collaborator seeded by this configuration.
    pub fn store(&self) -> MemoryStore {
        MemoryStore::new(self.games.iter().cloned().map(GameRecord::from))
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ron::ser::to_string(self).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for Config {
    type Err = ParseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ron::de::from_str(s)?)
    }
}

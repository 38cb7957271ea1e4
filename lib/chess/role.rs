use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Formatter, Write};
use std::str::FromStr;

const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const OMNIDIRECTIONAL: [(i8, i8); 8] = [
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];
const L_SHAPED: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// The type of a chess [`Piece`][`crate::chess::Piece`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Role {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Role::Pawn,
        Role::Knight,
        Role::Bishop,
        Role::Rook,
        Role::Queen,
        Role::King,
    ];

    /// The lowercase letter naming this role in FEN.
    pub fn letter(&self) -> char {
        match self {
            Role::Pawn => 'p',
            Role::Knight => 'n',
            Role::Bishop => 'b',
            Role::Rook => 'r',
            Role::Queen => 'q',
            Role::King => 'k',
        }
    }

    /// The directions this role moves along, as (row, col) increments.
    ///
    /// Pawns move depending on their color, so they have none.
    pub fn rays(&self) -> &'static [(i8, i8)] {
        match self {
            Role::Pawn => &[],
            Role::Knight => &L_SHAPED,
            Role::Bishop => &DIAGONAL,
            Role::Rook => &ORTHOGONAL,
            Role::Queen | Role::King => &OMNIDIRECTIONAL,
        }
    }

    /// How many squares this role may travel along each of its [rays](`Self::rays`).
    pub fn reach(&self) -> i8 {
        match self {
            Role::Bishop | Role::Rook | Role::Queen => 7,
            Role::Pawn | Role::Knight | Role::King => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_char(self.letter())
    }
}

/// The reason why parsing [`Role`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse piece type")]
pub struct ParseRoleError;

impl TryFrom<char> for Role {
    type Error = ParseRoleError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Role::ALL
            .into_iter()
            .find(|r| r.letter() == c)
            .ok_or(ParseRoleError)
    }
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.try_into(),
            _ => Err(ParseRoleError),
        }
    }
}

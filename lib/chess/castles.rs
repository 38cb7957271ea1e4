use crate::chess::{Color, Square};
use bitflags::bitflags;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

bitflags! {
    /// The castling rights in a chess [`Game`][`crate::chess::Game`].
    ///
    /// A right is forfeited for good once the king or the corresponding rook leaves its
    /// original square.
    #[derive(Default, Deserialize, Serialize)]
    #[serde(try_from = "String", into = "String")]
    pub struct Castles: u8 {
        const WHITE_SHORT = 0b0001;
        const WHITE_LONG = 0b0010;
        const BLACK_SHORT = 0b0100;
        const BLACK_LONG = 0b1000;
    }
}

impl Castles {
    /// The kingside right of the given side.
    pub fn short(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_SHORT,
            Color::Black => Castles::BLACK_SHORT,
        }
    }

    /// The queenside right of the given side.
    pub fn long(side: Color) -> Self {
        match side {
            Color::White => Castles::WHITE_LONG,
            Color::Black => Castles::BLACK_LONG,
        }
    }

    /// Both rights of the given side.
    pub fn side(side: Color) -> Self {
        Castles::short(side) | Castles::long(side)
    }

    /// The rights that depend on a piece staying put on the given [`Square`].
    pub fn anchored_at(sq: Square) -> Self {
        match sq {
            Square::E1 => Castles::side(Color::White),
            Square::H1 => Castles::WHITE_SHORT,
            Square::A1 => Castles::WHITE_LONG,
            Square::E8 => Castles::side(Color::Black),
            Square::H8 => Castles::BLACK_SHORT,
            Square::A8 => Castles::BLACK_LONG,
            _ => Castles::empty(),
        }
    }
}

/// Formats as the castling field of a FEN string.
impl fmt::Display for Castles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }

        for (right, c) in [
            (Castles::WHITE_SHORT, "K"),
            (Castles::WHITE_LONG, "Q"),
            (Castles::BLACK_SHORT, "k"),
            (Castles::BLACK_LONG, "q"),
        ] {
            if self.contains(right) {
                f.write_str(c)?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing [`Castles`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse castling rights")]
pub struct ParseCastlesError;

impl FromStr for Castles {
    type Err = ParseCastlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(Castles::empty());
        }

        let mut castles = Castles::empty();
        for c in s.chars() {
            let right = match c {
                'K' => Castles::WHITE_SHORT,
                'Q' => Castles::WHITE_LONG,
                'k' => Castles::BLACK_SHORT,
                'q' => Castles::BLACK_LONG,
                _ => return Err(ParseCastlesError),
            };

            if castles.contains(right) {
                return Err(ParseCastlesError);
            }

            castles |= right;
        }

        if castles.is_empty() {
            Err(ParseCastlesError)
        } else {
            Ok(castles)
        }
    }
}

impl TryFrom<String> for Castles {
    type Error = ParseCastlesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Castles> for String {
    fn from(c: Castles) -> Self {
        c.to_string()
    }
}

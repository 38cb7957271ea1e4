use crate::chess::{Color, ParseRoleError, Role};
use std::fmt::{self, Display, Formatter, Write};
use std::str::FromStr;

/// A chess [piece][`Role`] of a certain [`Color`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
pub struct Piece(pub Color, pub Role);

impl Piece {
    /// This piece's [`Color`].
    pub fn color(&self) -> Color {
        self.0
    }

    /// This piece's [`Role`].
    pub fn role(&self) -> Role {
        self.1
    }
}

/// Formats as in the piece placement field of a FEN string.
impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.color() {
            Color::White => f.write_char(self.role().letter().to_ascii_uppercase()),
            Color::Black => f.write_char(self.role().letter()),
        }
    }
}

impl TryFrom<char> for Piece {
    type Error = ParseRoleError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        let role = c.to_ascii_lowercase().try_into()?;
        if c.is_ascii_uppercase() {
            Ok(Piece(Color::White, role))
        } else {
            Ok(Piece(Color::Black, role))
        }
    }
}

impl FromStr for Piece {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => c.try_into(),
            _ => Err(ParseRoleError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn piece_has_a_color(c: Color, r: Role) {
        assert_eq!(Piece(c, r).color(), c);
    }

    #[proptest]
    fn piece_has_a_role(c: Color, r: Role) {
        assert_eq!(Piece(c, r).role(), r);
    }

    #[proptest]
    fn parsing_printed_piece_is_an_identity(p: Piece) {
        assert_eq!(p.to_string().parse(), Ok(p));
    }

    #[test]
    fn white_pieces_are_printed_in_upper_case() {
        assert_eq!(Piece(Color::White, Role::Knight).to_string(), "N");
        assert_eq!(Piece(Color::Black, Role::Knight).to_string(), "n");
    }

    #[proptest]
    fn parsing_piece_fails_if_length_not_one(#[filter(#s.chars().count() != 1)] s: String) {
        assert_eq!(s.parse::<Piece>(), Err(ParseRoleError));
    }
}

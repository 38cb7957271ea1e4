use crate::chess::{Color, Piece, Role, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// The chess board.
///
/// A flat array of squares, cheap to copy when simulating moves.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Board([Option<Piece>; 64]);

impl Default for Board {
    /// The standard opening layout.
    fn default() -> Self {
        use {Color::*, Role::*};
        let back = [Rook, Knight, Bishop, Queen, King, Bishop, Knight, Rook];

        let mut board = Board::empty();
        for sq in Square::iter() {
            let col = usize::from(sq.col() - 1);
            board[sq] = match sq.row() {
                1 => Some(Piece(White, back[col])),
                2 => Some(Piece(White, Pawn)),
                7 => Some(Piece(Black, Pawn)),
                8 => Some(Piece(Black, back[col])),
                _ => None,
            };
        }

        board
    }
}

impl Board {
    /// A board without any pieces.
    pub fn empty() -> Self {
        Board([None; 64])
    }

    /// The [`Square`] occupied by the king of a [`Color`], if any.
    pub fn king(&self, side: Color) -> Option<Square> {
        let king = Piece(side, Role::King);
        Square::iter().find(|&sq| self[sq] == Some(king))
    }

    /// An iterator over all pieces on the board.
    pub fn iter(&self) -> impl Iterator<Item = (Piece, Square)> + '_ {
        Square::iter().filter_map(|sq| Some((self[sq]?, sq)))
    }

    /// [`Square`]s occupied by pieces of a [`Color`].
    pub fn by_color(&self, side: Color) -> impl Iterator<Item = Square> + '_ {
        self.iter()
            .filter(move |(p, _)| p.color() == side)
            .map(|(_, sq)| sq)
    }

    /// The [`Color`] of the piece on the given [`Square`], if any.
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self[sq].map(|p| p.color())
    }

    /// The [`Role`] of the piece on the given [`Square`], if any.
    pub fn role_on(&self, sq: Square) -> Option<Role> {
        self[sq].map(|p| p.role())
    }
}

/// Retrieves the [`Piece`] at a given [`Square`], if any.
impl Index<Square> for Board {
    type Output = Option<Piece>;

    fn index(&self, sq: Square) -> &Self::Output {
        &self.0[sq.index()]
    }
}

impl IndexMut<Square> for Board {
    fn index_mut(&mut self, sq: Square) -> &mut Self::Output {
        &mut self.0[sq.index()]
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({self})")
    }
}

/// Formats as the piece placement field of a FEN string.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in Square::ALL.chunks(8).rev().enumerate() {
            if i > 0 {
                f.write_char('/')?;
            }

            let mut skip = 0;
            for &sq in row {
                match self[sq] {
                    None => skip += 1,
                    Some(p) => {
                        if skip > 0 {
                            write!(f, "{skip}")?;
                            skip = 0;
                        }

                        write!(f, "{p}")?;
                    }
                }
            }

            if skip > 0 {
                write!(f, "{skip}")?;
            }
        }

        Ok(())
    }
}

/// The reason why parsing the piece placement failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum ParseBoardError {
    #[display(fmt = "expected exactly 8 rows")]
    InvalidRowCount,
    #[display(fmt = "row {} does not describe exactly 8 squares", _0)]
    InvalidRow(#[error(not(source))] u8),
    #[display(fmt = "unexpected character `{}`", _0)]
    InvalidPiece(#[error(not(source))] char),
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<_> = s.split('/').collect();
        if rows.len() != 8 {
            return Err(ParseBoardError::InvalidRowCount);
        }

        let mut board = Board::empty();
        for (row, segment) in (1..=8).rev().zip(rows) {
            let mut col = 1;
            for c in segment.chars() {
                if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    col += skip as u8;
                } else {
                    let p = Piece::try_from(c).map_err(|_| ParseBoardError::InvalidPiece(c))?;

                    let sq = Square::new(row, col).ok_or(ParseBoardError::InvalidRow(row))?;
                    board[sq] = Some(p);
                    col += 1;
                }

                if col > 9 {
                    return Err(ParseBoardError::InvalidRow(row));
                }
            }

            if col != 9 {
                return Err(ParseBoardError::InvalidRow(row));
            }
        }

        Ok(board)
    }
}

impl TryFrom<String> for Board {
    type Error = ParseBoardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Board> for String {
    fn from(b: Board) -> Self {
        b.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    const OPENING: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

    #[test]
    fn default_board_has_the_standard_opening_layout() {
        assert_eq!(Board::default().to_string(), OPENING);
        assert_eq!(Board::default()[Square::E1], Some(Piece(Color::White, Role::King)));
        assert_eq!(Board::default()[Square::D8], Some(Piece(Color::Black, Role::Queen)));
        assert_eq!(Board::default()[Square::A7], Some(Piece(Color::Black, Role::Pawn)));
        assert_eq!(Board::default()[Square::E4], None);
    }

    #[test]
    fn default_board_has_sixteen_pieces_per_side() {
        let b = Board::default();
        assert_eq!(b.by_color(Color::White).count(), 16);
        assert_eq!(b.by_color(Color::Black).count(), 16);
    }

    #[proptest]
    fn king_returns_square_occupied_by_a_king(c: Color) {
        let b = Board::default();
        assert_eq!(b.king(c).and_then(|sq| b[sq]), Some(Piece(c, Role::King)));
    }

    #[proptest]
    fn empty_board_has_no_kings(c: Color) {
        assert_eq!(Board::empty().king(c), None);
    }

    #[proptest]
    fn iter_returns_pieces_and_squares(sq: Square, p: Piece) {
        let mut b = Board::empty();
        b[sq] = Some(p);
        assert_eq!(b.iter().collect::<Vec<_>>(), vec![(p, sq)]);
        assert_eq!(b.color_on(sq), Some(p.color()));
        assert_eq!(b.role_on(sq), Some(p.role()));
    }

    #[proptest]
    fn parsing_printed_board_is_an_identity(sq: Square, p: Piece) {
        let mut b = Board::default();
        b[sq] = Some(p);
        assert_eq!(b.to_string().parse(), Ok(b));
    }

    #[test]
    fn parsing_board_fails_for_invalid_placement() {
        assert_eq!("8/8/8".parse::<Board>(), Err(ParseBoardError::InvalidRowCount));

        assert_eq!(
            "9/8/8/8/8/8/8/8".parse::<Board>(),
            Err(ParseBoardError::InvalidPiece('9'))
        );

        assert_eq!(
            "7/8/8/8/8/8/8/8".parse::<Board>(),
            Err(ParseBoardError::InvalidRow(8))
        );

        assert_eq!(
            "8/8/8/8/8/8/8/ppppppppp".parse::<Board>(),
            Err(ParseBoardError::InvalidRow(1))
        );

        assert_eq!(
            "8/8/8/8/8/8/8/x7".parse::<Board>(),
            Err(ParseBoardError::InvalidPiece('x'))
        );
    }

    #[proptest]
    fn parsing_board_never_panics(s: String) {
        let _ = s.parse::<Board>();
    }

    #[test]
    fn board_is_serialized_as_its_piece_placement() {
        let json = serde_json::to_string(&Board::default()).unwrap();
        assert_eq!(json, format!("\"{OPENING}\""));
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), Board::default());
    }
}

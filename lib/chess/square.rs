use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A square on the chess board.
///
/// Squares are addressed by 1-indexed `(row, col)` pairs, row 1 being white's
/// back rank and column 1 being the a-file.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[cfg_attr(test, derive(test_strategy::Arbitrary))]
#[serde(try_from = "Coordinates", into = "Coordinates")]
#[repr(u8)]
#[rustfmt::skip]
pub enum Square {
    A1, B1, C1, D1, E1, F1, G1, H1,
    A2, B2, C2, D2, E2, F2, G2, H2,
    A3, B3, C3, D3, E3, F3, G3, H3,
    A4, B4, C4, D4, E4, F4, G4, H4,
    A5, B5, C5, D5, E5, F5, G5, H5,
    A6, B6, C6, D6, E6, F6, G6, H6,
    A7, B7, C7, D7, E7, F7, G7, H7,
    A8, B8, C8, D8, E8, F8, G8, H8,
}

impl Square {
    /// All squares, ordered by row then column.
    #[rustfmt::skip]
    pub const ALL: [Square; 64] = {
        use Square::*;
        [
            A1, B1, C1, D1, E1, F1, G1, H1,
            A2, B2, C2, D2, E2, F2, G2, H2,
            A3, B3, C3, D3, E3, F3, G3, H3,
            A4, B4, C4, D4, E4, F4, G4, H4,
            A5, B5, C5, D5, E5, F5, G5, H5,
            A6, B6, C6, D6, E6, F6, G6, H6,
            A7, B7, C7, D7, E7, F7, G7, H7,
            A8, B8, C8, D8, E8, F8, G8, H8,
        ]
    };

    /// Constructs [`Square`] from a 1-indexed pair of row and column.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (1..=8).contains(&row) && (1..=8).contains(&col) {
            Some(Square::ALL[usize::from((row - 1) * 8 + col - 1)])
        } else {
            None
        }
    }

    /// This square's row, in the range `1..=8`.
    pub fn row(&self) -> u8 {
        *self as u8 / 8 + 1
    }

    /// This square's column, in the range `1..=8`.
    pub fn col(&self) -> u8 {
        *self as u8 % 8 + 1
    }

    /// This square's index in the range `0..64`.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The square displaced by the given number of rows and columns, if still on the board.
    pub fn offset(&self, rows: i8, cols: i8) -> Option<Self> {
        let row = (self.row() as i8).checked_add(rows)?;
        let col = (self.col() as i8).checked_add(cols)?;
        Square::new(u8::try_from(row).ok()?, u8::try_from(col).ok()?)
    }

    /// An iterator over all squares.
    pub fn iter() -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        Square::ALL.into_iter()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col() - 1);
        write!(f, "{}{}", file, self.row())
    }
}

/// The reason why parsing [`Square`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "failed to parse square")]
pub struct ParseSquareError;

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.as_bytes() {
            &[file @ b'a'..=b'h', rank @ b'1'..=b'8'] => {
                Square::new(rank - b'0', file - b'a' + 1).ok_or(ParseSquareError)
            }

            _ => Err(ParseSquareError),
        }
    }
}

/// The reason why a pair of coordinates does not address a [`Square`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
#[display(fmt = "({row}, {col}) is off the board")]
pub struct OffBoard {
    pub row: u8,
    pub col: u8,
}

/// The wire representation of a [`Square`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct Coordinates {
    row: u8,
    col: u8,
}

impl TryFrom<Coordinates> for Square {
    type Error = OffBoard;

    fn try_from(Coordinates { row, col }: Coordinates) -> Result<Self, Self::Error> {
        Square::new(row, col).ok_or(OffBoard { row, col })
    }
}

impl From<Square> for Coordinates {
    fn from(sq: Square) -> Self {
        Coordinates {
            row: sq.row(),
            col: sq.col(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;
    use test_strategy::proptest;

    #[test]
    fn square_guarantees_zero_value_optimization() {
        assert_eq!(size_of::<Option<Square>>(), size_of::<Square>());
    }

    #[proptest]
    fn new_constructs_square_from_pair_of_row_and_col(sq: Square) {
        assert_eq!(Square::new(sq.row(), sq.col()), Some(sq));
    }

    #[proptest]
    fn row_and_col_are_in_range(sq: Square) {
        assert!((1..=8).contains(&sq.row()));
        assert!((1..=8).contains(&sq.col()));
    }

    #[proptest]
    fn new_fails_if_off_board(
        row: u8,
        #[filter(!(1..=8).contains(&#row) || !(1..=8).contains(&#col))] col: u8,
    ) {
        assert_eq!(Square::new(row, col), None);
    }

    #[proptest]
    fn offset_never_leaves_the_board(sq: Square, rows: i8, cols: i8) {
        if let Some(s) = sq.offset(rows, cols) {
            assert_eq!(s.row() as i16, sq.row() as i16 + rows as i16);
            assert_eq!(s.col() as i16, sq.col() as i16 + cols as i16);
        }
    }

    #[proptest]
    fn index_matches_position_in_iteration_order(sq: Square) {
        assert_eq!(Square::iter().nth(sq.index()), Some(sq));
    }

    #[proptest]
    fn parsing_printed_square_is_an_identity(sq: Square) {
        assert_eq!(sq.to_string().parse(), Ok(sq));
    }

    #[proptest]
    fn parsing_square_fails_if_length_not_two(#[filter(#s.len() != 2)] s: String) {
        assert_eq!(s.parse::<Square>(), Err(ParseSquareError));
    }

    #[test]
    fn square_is_displayed_as_file_letter_and_rank_digit() {
        assert_eq!(Square::E2.to_string(), "e2");
        assert_eq!(Square::new(2, 5), Some(Square::E2));
    }

    #[proptest]
    fn deserializing_serialized_square_is_an_identity(sq: Square) {
        let json = serde_json::to_string(&sq)?;
        assert_eq!(serde_json::from_str::<Square>(&json)?, sq);
    }

    #[test]
    fn deserializing_off_board_coordinates_fails() {
        assert!(serde_json::from_str::<Square>(r#"{"row":9,"col":1}"#).is_err());
        assert!(serde_json::from_str::<Square>(r#"{"row":0,"col":1}"#).is_err());
    }
}

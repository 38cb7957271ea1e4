use crate::chess::{movegen, Board, Castles, Color, Move, Moves, Piece, Promotion, Role, Square};
use crate::chess::{ParseBoardError, ParseCastlesError};
use arrayvec::ArrayVec;
use derive_more::{DebugCustom, Display, Error, From};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The reason why a [`Move`] cannot be played in a given [`Game`].
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum InvalidMove {
    #[display(fmt = "there is no piece on {}", _0)]
    NoPiece(#[error(not(source))] Square),
    #[display(fmt = "it is not the turn of the piece on {}", "_0.whence()")]
    WrongTurn(#[error(not(source))] Move),
    #[display(fmt = "move `{}` would capture a friendly piece", _0)]
    FriendlyCapture(#[error(not(source))] Move),
    #[display(fmt = "move `{}` is illegal", _0)]
    Illegal(#[error(not(source))] Move),
    #[display(fmt = "move `{}` would leave the king in check", _0)]
    SelfCheck(#[error(not(source))] Move),
}

/// The reason why a [`Game`] cannot be set up from its parts.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error)]
pub enum IllegalSetup {
    #[display(fmt = "the {} side has no king", _0)]
    MissingKing(#[error(not(source))] Color),
    #[display(fmt = "the {} side has more than one king", _0)]
    TooManyKings(#[error(not(source))] Color),
    #[display(fmt = "castling rights `{}` are not backed by kings and rooks on their squares", _0)]
    InvalidCastlingRights(#[error(not(source))] Castles),
}

/// Rook column, squares that must be empty, and the king's path, per wing.
const WINGS: [(u8, &[u8], [u8; 2]); 2] = [(8, &[6, 7], [6, 7]), (1, &[2, 3, 4], [4, 3])];

/// The state of a chess game.
///
/// This type guarantees that each side has exactly one king on the board.
#[derive(DebugCustom, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[debug(fmt = "Game({self})")]
#[serde(try_from = "Snapshot", into = "Snapshot")]
pub struct Game {
    board: Board,
    turn: Color,
    castles: Castles,
    last_move: Option<Move>,
}

impl Default for Game {
    /// The standard opening position, white to move.
    fn default() -> Self {
        Game {
            board: Board::default(),
            turn: Color::White,
            castles: Castles::all(),
            last_move: None,
        }
    }
}

impl Game {
    /// Sets up a game from an arbitrary [`Board`].
    ///
    /// Castling rights are granted wherever the king and rook still stand on their original
    /// squares.
    pub fn new(board: Board, turn: Color) -> Result<Self, IllegalSetup> {
        let castles = Self::castles_on(&board);
        Self::from_parts(board, turn, castles, None)
    }

    fn from_parts(
        board: Board,
        turn: Color,
        castles: Castles,
        last_move: Option<Move>,
    ) -> Result<Self, IllegalSetup> {
        for side in Color::ALL {
            let king = Piece(side, Role::King);
            match board.iter().filter(|(p, _)| *p == king).count() {
                0 => return Err(IllegalSetup::MissingKing(side)),
                1 => {}
                _ => return Err(IllegalSetup::TooManyKings(side)),
            }
        }

        if !Self::castles_on(&board).contains(castles) {
            return Err(IllegalSetup::InvalidCastlingRights(castles));
        }

        Ok(Game {
            board,
            turn,
            castles,
            last_move,
        })
    }

    /// The castling rights a [`Board`] could possibly support.
    fn castles_on(board: &Board) -> Castles {
        let mut castles = Castles::empty();

        for side in Color::ALL {
            let home = |col| Square::new(side.home_row(), col).and_then(|sq| board[sq]);

            if home(5) != Some(Piece(side, Role::King)) {
                continue;
            }

            if home(8) == Some(Piece(side, Role::Rook)) {
                castles |= Castles::short(side);
            }

            if home(1) == Some(Piece(side, Role::Rook)) {
                castles |= Castles::long(side);
            }
        }

        castles
    }

    /// The current [`Board`].
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// The side to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// The castling rights still available.
    pub fn castles(&self) -> Castles {
        self.castles
    }

    /// The move played last, if any.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    /// The legal moves of the piece on the given [`Square`], regardless of whose turn it is.
    ///
    /// The result is empty if the square is empty.
    pub fn valid_moves(&self, whence: Square) -> Moves {
        let Some(Piece(side, _)) = self.board[whence] else {
            return Moves::new();
        };

        let mut moves = self.candidates(whence);
        moves.retain(|m| !self.exposes_king(side, *m));
        moves
    }

    /// An iterator over all legal moves of the side to move.
    pub fn legal_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.board
            .by_color(self.turn)
            .flat_map(|sq| self.valid_moves(sq))
    }

    /// Play a [`Move`] if legal in this game.
    pub fn play(&mut self, m: Move) -> Result<(), InvalidMove> {
        let Some(Piece(side, _)) = self.board[m.whence()] else {
            return Err(InvalidMove::NoPiece(m.whence()));
        };

        if side != self.turn {
            return Err(InvalidMove::WrongTurn(m));
        }

        if self.board.color_on(m.whither()) == Some(side) {
            return Err(InvalidMove::FriendlyCapture(m));
        }

        if !self.candidates(m.whence()).contains(&m) {
            return Err(InvalidMove::Illegal(m));
        }

        if self.exposes_king(side, m) {
            return Err(InvalidMove::SelfCheck(m));
        }

        self.apply(m);
        Ok(())
    }

    /// Whether the king of the given side is under attack.
    ///
    /// A side without a king is never in check.
    pub fn is_check(&self, side: Color) -> bool {
        in_check(&self.board, side)
    }

    /// Whether the given side is in check and has no legal moves.
    pub fn is_checkmate(&self, side: Color) -> bool {
        self.is_check(side) && !self.can_move(side)
    }

    /// Whether the given side is not in check yet has no legal moves.
    pub fn is_stalemate(&self, side: Color) -> bool {
        !self.is_check(side) && !self.can_move(side)
    }

    fn can_move(&self, side: Color) -> bool {
        self.board
            .by_color(side)
            .any(|sq| !self.valid_moves(sq).is_empty())
    }

    /// Pseudo-legal moves plus the special moves that depend on the game history.
    fn candidates(&self, whence: Square) -> Moves {
        let mut moves = movegen::pseudo_legal(&self.board, whence);
        moves.extend(self.en_passant(whence));
        moves.extend(self.castling(whence));
        moves
    }

    fn exposes_king(&self, side: Color, m: Move) -> bool {
        let mut next = self.clone();
        next.apply(m);
        next.is_check(side)
    }

    /// The en passant capture available to the pawn on `whence`, if any.
    fn en_passant(&self, whence: Square) -> Option<Move> {
        let Some(Piece(side, Role::Pawn)) = self.board[whence] else {
            return None;
        };

        let last = self.last_move?;
        let passed = last.whither();

        if self.board[passed] != Some(Piece(!side, Role::Pawn))
            || last.whence().col() != passed.col()
            || last.whence().row().abs_diff(passed.row()) != 2
            || passed.row() != whence.row()
            || passed.col().abs_diff(whence.col()) != 1
        {
            return None;
        }

        let whither = passed.offset(side.forward(), 0)?;
        Some(Move::new(whence, whither, Promotion::None))
    }

    /// The castling moves available to the king on `whence`.
    fn castling(&self, whence: Square) -> ArrayVec<Move, 2> {
        let mut moves = ArrayVec::new();

        let Some(Piece(side, Role::King)) = self.board[whence] else {
            return moves;
        };

        let row = side.home_row();
        if Square::new(row, 5) != Some(whence) || self.is_check(side) {
            return moves;
        }

        let rights = [Castles::short(side), Castles::long(side)];
        for (right, (corner, between, path)) in rights.into_iter().zip(WINGS) {
            if !self.castles.contains(right) {
                continue;
            }

            let square = |col| Square::new(row, col);
            let (Some(corner), Some(via), Some(to)) = (square(corner), square(path[0]), square(path[1])) else {
                continue;
            };

            if self.board[corner] != Some(Piece(side, Role::Rook))
                || between.iter().filter_map(|&c| square(c)).any(|sq| self.board[sq].is_some())
            {
                continue;
            }

            let mut board = self.board;
            let king = board[whence].take();

            board[via] = king;
            if in_check(&board, side) {
                continue;
            }

            board[via] = board[corner].take();
            board[to] = king;
            if in_check(&board, side) {
                continue;
            }

            moves.push(Move::new(whence, to, Promotion::None));
        }

        moves
    }

    /// Plays a [`Move`] without checking whether it's legal.
    pub(super) fn apply(&mut self, m: Move) {
        let (whence, whither) = (m.whence(), m.whither());

        let Some(piece @ Piece(side, role)) = self.board[whence] else {
            return;
        };

        if role == Role::Pawn && whence.col() != whither.col() && self.board[whither].is_none() {
            if let Some(passed) = Square::new(whence.row(), whither.col()) {
                self.board[passed] = None;
            }
        }

        if role == Role::King && whence.col().abs_diff(whither.col()) == 2 {
            let (corner, via) = if whither.col() > whence.col() { (8, 6) } else { (1, 4) };
            if let (Some(corner), Some(via)) =
                (Square::new(whence.row(), corner), Square::new(whence.row(), via))
            {
                self.board[via] = self.board[corner].take();
            }
        }

        self.board[whence] = None;
        self.board[whither] = match Option::<Role>::from(m.promotion()) {
            Some(r) => Some(Piece(side, r)),
            None => Some(piece),
        };

        self.castles
            .remove(Castles::anchored_at(whence) | Castles::anchored_at(whither));

        self.turn = !self.turn;
        self.last_move = Some(m);
    }
}

/// Whether any piece of the opponent can reach the king of the given side.
fn in_check(board: &Board, side: Color) -> bool {
    let Some(king) = board.king(side) else {
        return false;
    };

    board
        .by_color(!side)
        .any(|sq| movegen::pseudo_legal(board, sq).iter().any(|m| m.whither() == king))
}

/// Formats as the first three fields of a FEN string.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let turn = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };

        write!(f, "{} {} {}", self.board, turn, self.castles)
    }
}

/// The reason why parsing a [`Game`] failed.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum ParseGameError {
    #[display(fmt = "expected piece placement, side to move and castling rights")]
    #[from(ignore)]
    InvalidSyntax,
    #[display(fmt = "syntax error at the side to move field")]
    #[from(ignore)]
    InvalidTurn,
    InvalidPlacement(ParseBoardError),
    InvalidCastles(ParseCastlesError),
    IllegalSetup(IllegalSetup),
}

impl FromStr for Game {
    type Err = ParseGameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<_> = s.split_ascii_whitespace().collect();
        let [board, turn, castles] = fields[..] else {
            return Err(ParseGameError::InvalidSyntax);
        };

        let turn = match turn {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(ParseGameError::InvalidTurn),
        };

        Ok(Game::from_parts(board.parse()?, turn, castles.parse()?, None)?)
    }
}

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Snapshot {
    board: Board,
    turn: Color,
    castles: Castles,
    #[serde(default)]
    last_move: Option<Move>,
}

impl TryFrom<Snapshot> for Game {
    type Error = IllegalSetup;

    fn try_from(s: Snapshot) -> Result<Self, Self::Error> {
        Game::from_parts(s.board, s.turn, s.castles, s.last_move)
    }
}

impl From<Game> for Snapshot {
    fn from(g: Game) -> Self {
        Snapshot {
            board: g.board,
            turn: g.turn,
            castles: g.castles,
            last_move: g.last_move,
        }
    }
}

#[cfg(test)]
impl proptest::arbitrary::Arbitrary for Game {
    type Parameters = ();
    type Strategy = proptest::strategy::Map<
        (std::ops::Range<usize>, proptest::sample::SelectorStrategy),
        fn((usize, proptest::sample::Selector)) -> Game,
    >;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        (0..64usize, any::<proptest::sample::Selector>()).prop_map(|(moves, selector)| {
            let mut game = Game::default();

            for _ in 0..moves {
                let legal: Vec<_> = game.legal_moves().collect();
                match selector.try_select(legal) {
                    None => break,
                    Some(m) => game.apply(m),
                }
            }

            game
        })
    }
}

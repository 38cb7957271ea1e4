use crate::chess::{Board, Color, Move, Piece, Promotion, Role, Square};
use arrayvec::ArrayVec;

/// The candidate moves of a single piece.
///
/// No piece has more than 27 targets, and a pawn never has more than 12 moves
/// counting every promotion, so this never spills to the heap.
pub type Moves = ArrayVec<Move, 32>;

/// The pseudo-legal moves of the piece on `whence`.
///
/// Whether the move exposes the mover's own king is not taken into account, neither are
/// castling nor en passant, which depend on the history of the game.
pub fn pseudo_legal(board: &Board, whence: Square) -> Moves {
    let mut moves = Moves::new();

    let Some(Piece(side, role)) = board[whence] else {
        return moves;
    };

    match role {
        Role::Pawn => pawn(board, whence, side, &mut moves),
        _ => slide(board, whence, side, role.rays(), role.reach(), &mut moves),
    }

    moves
}

/// Casts a ray in each direction up to `reach` squares, stopping at the edge or at the
/// first piece in the way.
fn slide(
    board: &Board,
    whence: Square,
    side: Color,
    directions: &[(i8, i8)],
    reach: i8,
    moves: &mut Moves,
) {
    for &(dr, dc) in directions {
        for n in 1..=reach {
            let Some(whither) = whence.offset(dr * n, dc * n) else {
                break;
            };

            match board.color_on(whither) {
                None => moves.push(Move::new(whence, whither, Promotion::None)),
                Some(c) if c != side => {
                    moves.push(Move::new(whence, whither, Promotion::None));
                    break;
                }
                Some(_) => break,
            }
        }
    }
}

fn pawn(board: &Board, whence: Square, side: Color, moves: &mut Moves) {
    let forward = side.forward();
    let start = (side.home_row() as i8 + forward) as u8;

    if let Some(one) = whence.offset(forward, 0).filter(|&sq| board[sq].is_none()) {
        advance(whence, one, moves);

        if whence.row() == start {
            if let Some(two) = whence.offset(2 * forward, 0).filter(|&sq| board[sq].is_none()) {
                advance(whence, two, moves);
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(whither) = whence.offset(forward, dc) {
            if board.color_on(whither) == Some(!side) {
                advance(whence, whither, moves);
            }
        }
    }
}

/// Pushes a pawn move, expanding it into every promotion on the far rank.
fn advance(whence: Square, whither: Square, moves: &mut Moves) {
    if whither.row() == 1 || whither.row() == 8 {
        for p in Promotion::CHOICES {
            moves.push(Move::new(whence, whither, p));
        }
    } else {
        moves.push(Move::new(whence, whither, Promotion::None));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_strategy::proptest;

    fn targets(board: &str, whence: Square) -> HashSet<Square> {
        let board: Board = board.parse().unwrap();
        pseudo_legal(&board, whence)
            .into_iter()
            .map(|m| m.whither())
            .collect()
    }

    #[proptest]
    fn empty_squares_have_no_moves(sq: Square) {
        assert!(pseudo_legal(&Board::empty(), sq).is_empty());
    }

    #[proptest]
    fn moves_start_on_the_piece_and_end_elsewhere(sq: Square, p: Piece) {
        let mut board = Board::default();
        board[sq] = Some(p);

        for m in pseudo_legal(&board, sq) {
            assert_eq!(m.whence(), sq);
            assert_ne!(m.whither(), sq);
            assert!((1..=8).contains(&m.whither().row()));
            assert!((1..=8).contains(&m.whither().col()));
        }
    }

    #[proptest]
    fn moves_never_capture_friendly_pieces(sq: Square, p: Piece) {
        let mut board = Board::default();
        board[sq] = Some(p);

        for m in pseudo_legal(&board, sq) {
            assert_ne!(board.color_on(m.whither()), Some(p.color()));
        }
    }

    #[proptest]
    fn lone_queen_reaches_the_union_of_rook_and_bishop(sq: Square, c: Color) {
        let moves = |r: Role| {
            let mut board = Board::empty();
            board[sq] = Some(Piece(c, r));
            pseudo_legal(&board, sq)
                .into_iter()
                .map(|m| m.whither())
                .collect::<HashSet<_>>()
        };

        let rook = moves(Role::Rook);
        let bishop = moves(Role::Bishop);
        let queen = moves(Role::Queen);

        assert_eq!(rook.len(), 14);
        assert_eq!(queen, &rook | &bishop);
    }

    #[test]
    fn knight_jumps_over_pieces() {
        let board = "8/8/8/8/8/8/PPPPPPPP/RNBQKBNR";
        assert_eq!(targets(board, Square::B1), HashSet::from([Square::A3, Square::C3]));
    }

    #[test]
    fn knight_in_the_corner_has_two_moves() {
        assert_eq!(
            targets("8/8/8/8/8/8/8/N7", Square::A1),
            HashSet::from([Square::B3, Square::C2])
        );
    }

    #[test]
    fn sliders_stop_at_the_first_piece_capturing_enemies() {
        // rook on d4, friendly pawn on d6, enemy pawn on f4
        let board = "8/8/3P4/8/3R1p2/8/8/8";
        assert_eq!(
            targets(board, Square::D4),
            HashSet::from([
                Square::D5,
                Square::E4,
                Square::F4,
                Square::C4,
                Square::B4,
                Square::A4,
                Square::D3,
                Square::D2,
                Square::D1,
            ])
        );
    }

    #[test]
    fn king_moves_one_square_in_every_direction() {
        assert_eq!(targets("8/8/8/8/4K3/8/8/8", Square::E4).len(), 8);
        assert_eq!(targets("8/8/8/8/8/8/8/K7", Square::A1).len(), 3);
    }

    #[test]
    fn pawn_advances_two_squares_only_from_its_starting_row() {
        let board = Board::default();
        assert_eq!(pseudo_legal(&board, Square::E2).len(), 2);
        assert_eq!(pseudo_legal(&board, Square::E7).len(), 2);
        assert_eq!(targets("8/8/8/8/8/4P3/8/8", Square::E3), HashSet::from([Square::E4]));
    }

    #[test]
    fn pawn_cannot_advance_through_pieces() {
        assert!(targets("8/8/8/8/8/4n3/4P3/8", Square::E2).is_empty());
        assert_eq!(targets("8/8/8/8/4n3/8/4P3/8", Square::E2), HashSet::from([Square::E3]));
    }

    #[test]
    fn pawn_captures_diagonally_only_onto_enemies() {
        let board = "8/8/8/3p1P2/4P3/8/8/8";
        assert_eq!(targets(board, Square::E4), HashSet::from([Square::E5, Square::D5]));
    }

    #[test]
    fn black_pawns_advance_downwards() {
        assert_eq!(
            targets("8/8/8/8/4p3/3P4/8/8", Square::E4),
            HashSet::from([Square::E3, Square::D3])
        );
    }

    #[test]
    fn pawn_reaching_the_far_rank_expands_into_four_promotions() {
        let board: Board = "3n4/4P3/8/8/8/8/8/8".parse().unwrap();
        let moves: HashSet<_> = pseudo_legal(&board, Square::E7).into_iter().collect();

        let mut expected = HashSet::new();
        for whither in [Square::E8, Square::D8] {
            for p in Promotion::CHOICES {
                expected.insert(Move::new(Square::E7, whither, p));
            }
        }

        assert_eq!(moves, expected);
    }
}

use crate::chess::Game;
use rayon::prelude::*;

/// Counts the leaf nodes of the legal move tree down to `depth`.
///
/// See [perft](https://www.chessprogramming.org/Perft).
pub fn perft(game: &Game, depth: u8) -> usize {
    match depth {
        0 => 1,
        1 => game.legal_moves().count(),
        d => game
            .legal_moves()
            .par_bridge()
            .map(|m| {
                let mut next = game.clone();
                next.apply(m);
                perft(&next, d - 1)
            })
            .sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[proptest]
    fn perft_at_depth_zero_is_one(game: Game) {
        assert_eq!(perft(&game, 0), 1);
    }

    #[proptest]
    fn perft_at_depth_one_counts_legal_moves(game: Game) {
        assert_eq!(perft(&game, 1), game.legal_moves().count());
    }

    #[test]
    fn perft_counts_nodes_from_the_opening() {
        assert_eq!(perft(&Game::default(), 2), 400);
    }
}

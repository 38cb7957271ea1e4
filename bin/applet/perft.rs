use anyhow::Error as Anyhow;
use clap::Parser;
use lib::chess::{perft, Game};
use std::time::Instant;
use tracing::{info, instrument};

/// Counts the leaf nodes of the legal move tree.
#[derive(Debug, Parser)]
#[clap(disable_help_flag = true, disable_version_flag = true)]
pub struct Perft {
    /// The depth to search.
    depth: u8,

    /// The starting position as piece placement, side to move and castling rights.
    #[clap(long)]
    game: Option<Game>,
}

impl Perft {
    #[instrument(level = "trace", skip(self), err)]
    pub async fn execute(self) -> Result<(), Anyhow> {
        let game = self.game.unwrap_or_default();
        let timer = Instant::now();
        let nodes = perft(&game, self.depth);
        let elapsed = timer.elapsed();

        info!(%game, depth = self.depth, nodes, ?elapsed);
        println!("{nodes}");

        Ok(())
    }
}

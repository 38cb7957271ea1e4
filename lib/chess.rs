mod board;
mod castles;
mod color;
mod game;
mod r#move;
mod movegen;
mod outcome;
mod perft;
mod piece;
mod promotion;
mod role;
mod square;

pub use board::*;
pub use castles::*;
pub use color::*;
pub use game::*;
pub use movegen::Moves;
pub use outcome::*;
pub use perft::*;
pub use piece::*;
pub use promotion::*;
pub use r#move::*;
pub use role::*;
pub use square::*;

/// Chess domain types and rules.
pub mod chess;
/// Live game sessions shared by players and observers.
pub mod session;
/// Line-delimited JSON transport over TCP.
pub mod server;

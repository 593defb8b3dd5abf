//! Parsing of chess game notation

pub mod pgn;

pub use pgn::{first_moves, game_moves};

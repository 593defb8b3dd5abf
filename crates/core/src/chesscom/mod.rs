//! Chess.com published-data API integration

pub mod client;
pub mod types;

pub use client::{ChessComClient, DEFAULT_RECENT_GAMES};
pub use types::{Accuracies, ApiGame, ApiPlayer, MonthlyArchive, PlayerProfile};

//! Chess.com Game Statistics Core Library
//!
//! Fetches a player's archived games from the Chess.com published-data
//! API, normalizes them into per-player records, and computes win/loss,
//! rating, accuracy, opening, and time-control statistics, optionally
//! persisted to SQLite for longitudinal tracking.

pub mod analysis;
pub mod chesscom;
pub mod error;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod storage;

pub use analysis::{
    aggregate_openings, aggregate_time_controls, aggregate_user, classify_opening, normalize,
    GameOutcome, GameRecord, OpeningAggregate, PerformanceStats, PlayerColor,
    TimeControlAggregate, UserAggregate,
};
pub use chesscom::{ChessComClient, PlayerProfile, DEFAULT_RECENT_GAMES};
pub use error::{Error, Result};
pub use filter::DateTimeRange;
pub use pipeline::{analyze_user, Analysis, AnalysisOptions, SkippedGame};
pub use storage::Database;

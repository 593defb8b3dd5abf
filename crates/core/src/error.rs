//! Error types for chesscom-stats-core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Chess.com API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("rate limited while fetching games for {username} ({year}-{month:02})")]
    RateLimited {
        username: String,
        year: i32,
        month: u32,
    },

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("range start {start} is after range end {end}")]
    InvalidRange { start: String, end: String },

    #[error("{username} is not a player in game {url}")]
    PlayerNotInGame { username: String, url: String },

    #[error("game {url} carries an unrepresentable end time")]
    InvalidTimestamp { url: String },
}

pub type Result<T> = std::result::Result<T, Error>;

//! Normalization of raw archived games into per-user records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::openings;
use crate::chesscom::ApiGame;
use crate::error::{Error, Result};
use crate::parser;

/// How many full move pairs a record keeps for opening classification.
pub const FIRST_MOVE_PAIRS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerColor::White => "white",
            PlayerColor::Black => "black",
        }
    }
}

/// Game outcome from the analyzed player's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameOutcome {
    Win,
    Loss,
    Draw,
    Unknown,
}

impl GameOutcome {
    /// Map a platform result code for the player's own side. Codes that
    /// are not recognized stay `Unknown` rather than guessing.
    pub fn from_result_code(code: &str) -> Self {
        match code {
            "win" => GameOutcome::Win,
            "checkmated" | "timeout" | "resigned" | "lose" | "abandoned" => GameOutcome::Loss,
            "agreed" | "repetition" | "stalemate" | "insufficient" | "50move"
            | "timevsinsufficient" => GameOutcome::Draw,
            _ => GameOutcome::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameOutcome::Win => "win",
            GameOutcome::Loss => "loss",
            GameOutcome::Draw => "draw",
            GameOutcome::Unknown => "unknown",
        }
    }
}

/// One archived game seen from the analyzed player's side. Fields the
/// platform did not provide stay `None`; statistics skip them instead
/// of seeing made-up zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_url: String,
    pub played_at: DateTime<Utc>,
    pub color: PlayerColor,
    pub outcome: GameOutcome,
    pub rating: Option<u32>,
    pub opponent_rating: Option<u32>,
    pub opponent: Option<String>,
    pub accuracy: Option<f64>,
    pub time_control: String,
    pub opening: String,
    pub first_moves: String,
}

/// Normalize one archived game from `username`'s perspective.
///
/// The username match against either side is case-insensitive, which is
/// how the platform treats usernames. A game `username` did not play in
/// is an error so callers can report it instead of silently guessing a
/// side.
pub fn normalize(game: &ApiGame, username: &str) -> Result<GameRecord> {
    let color = if game.white.username.eq_ignore_ascii_case(username) {
        PlayerColor::White
    } else if game.black.username.eq_ignore_ascii_case(username) {
        PlayerColor::Black
    } else {
        return Err(Error::PlayerNotInGame {
            username: username.to_string(),
            url: game.url.clone(),
        });
    };

    let (own, opponent) = match color {
        PlayerColor::White => (&game.white, &game.black),
        PlayerColor::Black => (&game.black, &game.white),
    };

    let played_at = DateTime::from_timestamp(game.end_time, 0).ok_or_else(|| {
        Error::InvalidTimestamp {
            url: game.url.clone(),
        }
    })?;

    let outcome = own
        .result
        .as_deref()
        .map(GameOutcome::from_result_code)
        .unwrap_or(GameOutcome::Unknown);

    let accuracy = game.accuracies.as_ref().and_then(|a| match color {
        PlayerColor::White => a.white,
        PlayerColor::Black => a.black,
    });

    let first_moves = game
        .pgn
        .as_deref()
        .map(|pgn| parser::first_moves(pgn, FIRST_MOVE_PAIRS))
        .unwrap_or_default();
    let opening = openings::classify_opening(&first_moves).to_string();

    Ok(GameRecord {
        game_url: game.url.clone(),
        played_at,
        color,
        outcome,
        rating: own.rating,
        opponent_rating: opponent.rating,
        opponent: Some(opponent.username.clone()),
        accuracy,
        time_control: game.time_control.clone(),
        opening,
        first_moves,
    })
}

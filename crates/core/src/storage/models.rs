//! Database models

use serde::{Deserialize, Serialize};

/// A game row exactly as stored, one per game URL per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredGame {
    pub id: i64,
    pub game_url: String,
    pub username: String,
    pub played_at: i64,
    pub color: String,
    pub result: String,
    pub rating: Option<u32>,
    pub opponent_rating: Option<u32>,
    pub opponent: Option<String>,
    pub accuracy: Option<f64>,
    pub time_control: String,
    pub opening: String,
    pub first_moves: String,
    pub created_at: i64,
    pub updated_at: i64,
}

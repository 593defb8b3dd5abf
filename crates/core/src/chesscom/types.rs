//! Types for the Chess.com published-data API

use serde::{Deserialize, Serialize};

/// One month of a player's archived games, as served by
/// `/pub/player/{username}/games/{year}/{month}`.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyArchive {
    #[serde(default)]
    pub games: Vec<ApiGame>,
}

/// A raw archived game. Fields the platform may omit stay optional so
/// downstream code can check presence explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGame {
    pub url: String,
    #[serde(default)]
    pub pgn: Option<String>,
    #[serde(default)]
    pub time_control: String,
    pub end_time: i64,
    #[serde(default)]
    pub rated: bool,
    #[serde(default)]
    pub accuracies: Option<Accuracies>,
    pub white: ApiPlayer,
    pub black: ApiPlayer,
}

/// One side of an archived game.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPlayer {
    pub username: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub result: Option<String>,
}

/// Engine accuracy scores, present only on games reviewed by the
/// platform.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Accuracies {
    #[serde(default)]
    pub white: Option<f64>,
    #[serde(default)]
    pub black: Option<f64>,
}

/// Public player profile from `/pub/player/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub followers: Option<u32>,
    #[serde(default)]
    pub joined: Option<i64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl PlayerProfile {
    /// Country code from the profile's country URL, e.g.
    /// `https://api.chess.com/pub/country/US` becomes `US`.
    pub fn country_code(&self) -> Option<&str> {
        self.country
            .as_deref()
            .and_then(|url| url.rsplit('/').next())
            .filter(|code| !code.is_empty())
    }
}

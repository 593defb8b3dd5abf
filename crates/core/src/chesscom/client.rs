//! Chess.com API client for fetching archived games and profiles

use chrono::{DateTime, Datelike, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::types::*;
use crate::error::{Error, Result};
use crate::filter::{months_back, DEFAULT_LOOKBACK_MONTHS};

const CHESSCOM_API_BASE: &str = "https://api.chess.com/pub";

/// How many games an open-ended analysis keeps by default.
pub const DEFAULT_RECENT_GAMES: usize = 50;

pub struct ChessComClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl ChessComClient {
    /// The published-data API asks for a way to reach the caller, so
    /// `contact` ends up in the User-Agent header of every request.
    pub fn new(contact: &str) -> Result<Self> {
        Self::with_base_url(contact, CHESSCOM_API_BASE)
    }

    pub fn with_base_url(contact: &str, base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            user_agent: format!("chesscom-stats/0.1 (contact: {})", contact),
        })
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Ok(value) = HeaderValue::from_str(&self.user_agent) {
            headers.insert(USER_AGENT, value);
        }

        headers
    }

    /// Fetch one month of a player's archived games.
    ///
    /// The archive endpoint can answer 404 for months a player has no
    /// games in, so a `UserNotFound` from here only proves the user
    /// unknown when [`profile`](Self::profile) fails too.
    pub async fn monthly_games(
        &self,
        username: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ApiGame>> {
        let url = format!(
            "{}/player/{}/games/{}/{:02}",
            self.base_url, username, year, month
        );

        let response = self.client.get(&url).headers(self.headers()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::UserNotFound(username.to_string())),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited {
                username: username.to_string(),
                year,
                month,
            }),
            status if !status.is_success() => Err(Error::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => {
                let archive: MonthlyArchive = response.json().await?;
                Ok(archive.games)
            }
        }
    }

    /// Fetch a player's public profile.
    pub async fn profile(&self, username: &str) -> Result<PlayerProfile> {
        let url = format!("{}/player/{}", self.base_url, username);

        let response = self.client.get(&url).headers(self.headers()).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::UserNotFound(username.to_string())),
            status if !status.is_success() => Err(Error::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => {
                let profile: PlayerProfile = response.json().await?;
                Ok(profile)
            }
        }
    }

    /// The player's most recent `max_games` games in chronological
    /// order, walking monthly archives backwards from `now` until
    /// enough games are collected or [`DEFAULT_LOOKBACK_MONTHS`] is
    /// exhausted. Months with no archive count as empty.
    pub async fn recent_games(
        &self,
        username: &str,
        max_games: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<ApiGame>> {
        let mut months: Vec<Vec<ApiGame>> = Vec::new();
        let mut collected = 0;

        for offset in 0..DEFAULT_LOOKBACK_MONTHS {
            if collected >= max_games {
                break;
            }
            let archive_month = months_back(now.date_naive(), offset);
            let games = match self
                .monthly_games(username, archive_month.year(), archive_month.month())
                .await
            {
                Ok(games) => games,
                Err(Error::UserNotFound(_)) => Vec::new(),
                Err(e) => return Err(e),
            };
            collected += games.len();
            months.push(games);
        }

        let mut games: Vec<ApiGame> = months.into_iter().rev().flatten().collect();
        let cutoff = games.len().saturating_sub(max_games);
        Ok(games.split_off(cutoff))
    }
}

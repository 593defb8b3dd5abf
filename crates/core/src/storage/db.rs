//! Database operations

use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use super::models::StoredGame;
use crate::analysis::{
    GameRecord, OpeningAggregate, PerformanceStats, TimeControlAggregate, UserAggregate,
};
use crate::error::Result;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_url TEXT UNIQUE NOT NULL,
                username TEXT NOT NULL,
                played_at INTEGER NOT NULL,
                color TEXT NOT NULL,
                result TEXT NOT NULL,
                rating INTEGER,
                opponent_rating INTEGER,
                opponent TEXT,
                accuracy REAL,
                time_control TEXT NOT NULL,
                opening TEXT NOT NULL,
                first_moves TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT UNIQUE NOT NULL,
                games_analyzed INTEGER NOT NULL,
                total_games INTEGER NOT NULL,
                wins INTEGER NOT NULL,
                losses INTEGER NOT NULL,
                draws INTEGER NOT NULL,
                win_rate REAL NOT NULL,
                current_rating INTEGER,
                highest_rating INTEGER,
                lowest_rating INTEGER,
                avg_rating REAL,
                first_rating INTEGER,
                rating_change INTEGER,
                avg_accuracy REAL,
                best_accuracy REAL,
                worst_accuracy REAL,
                games_with_accuracy INTEGER NOT NULL,
                analysis_start INTEGER,
                analysis_end INTEGER,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS opening_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                opening TEXT NOT NULL,
                games_analyzed INTEGER NOT NULL,
                total_games INTEGER NOT NULL,
                wins INTEGER NOT NULL,
                losses INTEGER NOT NULL,
                draws INTEGER NOT NULL,
                win_rate REAL NOT NULL,
                current_rating INTEGER,
                highest_rating INTEGER,
                lowest_rating INTEGER,
                avg_rating REAL,
                first_rating INTEGER,
                rating_change INTEGER,
                avg_accuracy REAL,
                best_accuracy REAL,
                worst_accuracy REAL,
                games_with_accuracy INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(username, opening)
            );

            CREATE TABLE IF NOT EXISTS time_control_stats (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                time_control TEXT NOT NULL,
                games_analyzed INTEGER NOT NULL,
                total_games INTEGER NOT NULL,
                wins INTEGER NOT NULL,
                losses INTEGER NOT NULL,
                draws INTEGER NOT NULL,
                win_rate REAL NOT NULL,
                current_rating INTEGER,
                highest_rating INTEGER,
                lowest_rating INTEGER,
                avg_rating REAL,
                first_rating INTEGER,
                rating_change INTEGER,
                avg_accuracy REAL,
                best_accuracy REAL,
                worst_accuracy REAL,
                games_with_accuracy INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL,
                UNIQUE(username, time_control)
            );

            CREATE INDEX IF NOT EXISTS idx_games_username ON games(username);
            CREATE INDEX IF NOT EXISTS idx_games_played_at ON games(played_at);
            CREATE INDEX IF NOT EXISTS idx_opening_stats_username ON opening_stats(username);
            CREATE INDEX IF NOT EXISTS idx_time_control_stats_username ON time_control_stats(username);
            "#,
        )?;
        Ok(())
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    /// Insert or update one game row. The game URL is the identity:
    /// refetching a game overwrites its row, never duplicates it, and
    /// `created_at` keeps the first-seen time.
    pub fn upsert_game(&self, username: &str, record: &GameRecord) -> Result<()> {
        let now = Self::now();
        self.conn.execute(
            r#"
            INSERT INTO games
            (game_url, username, played_at, color, result, rating, opponent_rating,
             opponent, accuracy, time_control, opening, first_moves, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            ON CONFLICT(game_url) DO UPDATE SET
                username = excluded.username,
                played_at = excluded.played_at,
                color = excluded.color,
                result = excluded.result,
                rating = excluded.rating,
                opponent_rating = excluded.opponent_rating,
                opponent = excluded.opponent,
                accuracy = excluded.accuracy,
                time_control = excluded.time_control,
                opening = excluded.opening,
                first_moves = excluded.first_moves,
                updated_at = excluded.updated_at
            "#,
            params![
                record.game_url,
                username,
                record.played_at.timestamp(),
                record.color.as_str(),
                record.outcome.as_str(),
                record.rating,
                record.opponent_rating,
                record.opponent,
                record.accuracy,
                record.time_control,
                record.opening,
                record.first_moves,
                now,
                now,
            ],
        )?;
        Ok(())
    }

    pub fn upsert_games(&self, username: &str, records: &[GameRecord]) -> Result<u32> {
        for record in records {
            self.upsert_game(username, record)?;
        }
        Ok(records.len() as u32)
    }

    pub fn get_game(&self, game_url: &str) -> Result<Option<StoredGame>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, game_url, username, played_at, color, result, rating,
                   opponent_rating, opponent, accuracy, time_control, opening,
                   first_moves, created_at, updated_at
            FROM games WHERE game_url = ?1
            "#,
        )?;

        let game = stmt
            .query_row(params![game_url], stored_game_from_row)
            .optional()?;
        Ok(game)
    }

    pub fn games_for_user(&self, username: &str) -> Result<Vec<StoredGame>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, game_url, username, played_at, color, result, rating,
                   opponent_rating, opponent, accuracy, time_control, opening,
                   first_moves, created_at, updated_at
            FROM games WHERE username = ?1 ORDER BY played_at ASC, game_url ASC
            "#,
        )?;

        let games = stmt
            .query_map(params![username], stored_game_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(games)
    }

    pub fn count_games_for_user(&self, username: &str) -> Result<u32> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM games WHERE username = ?1",
            params![username],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert or replace the overall stats row for a user. Merge
    /// decisions (earliest window start, preserved rating baseline)
    /// are made by the caller before this runs; the row itself is
    /// replaced wholesale apart from `created_at`.
    pub fn save_user_stats(&self, aggregate: &UserAggregate) -> Result<()> {
        let s = &aggregate.stats;
        self.conn.execute(
            r#"
            INSERT INTO user_stats
            (username, games_analyzed, total_games, wins, losses, draws, win_rate,
             current_rating, highest_rating, lowest_rating, avg_rating, first_rating,
             rating_change, avg_accuracy, best_accuracy, worst_accuracy,
             games_with_accuracy, analysis_start, analysis_end, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                    ?16, ?17, ?18, ?19, ?20, ?21)
            ON CONFLICT(username) DO UPDATE SET
                games_analyzed = excluded.games_analyzed,
                total_games = excluded.total_games,
                wins = excluded.wins,
                losses = excluded.losses,
                draws = excluded.draws,
                win_rate = excluded.win_rate,
                current_rating = excluded.current_rating,
                highest_rating = excluded.highest_rating,
                lowest_rating = excluded.lowest_rating,
                avg_rating = excluded.avg_rating,
                first_rating = excluded.first_rating,
                rating_change = excluded.rating_change,
                avg_accuracy = excluded.avg_accuracy,
                best_accuracy = excluded.best_accuracy,
                worst_accuracy = excluded.worst_accuracy,
                games_with_accuracy = excluded.games_with_accuracy,
                analysis_start = excluded.analysis_start,
                analysis_end = excluded.analysis_end,
                updated_at = excluded.updated_at
            "#,
            params![
                aggregate.username,
                s.games_analyzed,
                s.total_games,
                s.wins,
                s.losses,
                s.draws,
                s.win_rate,
                s.current_rating,
                s.highest_rating,
                s.lowest_rating,
                s.avg_rating,
                s.first_rating,
                s.rating_change,
                s.avg_accuracy,
                s.best_accuracy,
                s.worst_accuracy,
                s.games_with_accuracy,
                aggregate.analysis_start.map(|t| t.timestamp()),
                aggregate.analysis_end.map(|t| t.timestamp()),
                Self::now(),
                aggregate.last_updated.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn load_user_stats(&self, username: &str) -> Result<Option<UserAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT games_analyzed, total_games, wins, losses, draws, win_rate,
                   current_rating, highest_rating, lowest_rating, avg_rating,
                   first_rating, rating_change, avg_accuracy, best_accuracy,
                   worst_accuracy, games_with_accuracy, analysis_start,
                   analysis_end, updated_at
            FROM user_stats WHERE username = ?1
            "#,
        )?;

        let aggregate = stmt
            .query_row(params![username], |row| {
                Ok(UserAggregate {
                    username: username.to_string(),
                    stats: stats_from_row(row, 0)?,
                    analysis_start: timestamp_from_row(row, 16)?,
                    analysis_end: timestamp_from_row(row, 17)?,
                    last_updated: DateTime::from_timestamp(row.get(18)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })
            .optional()?;
        Ok(aggregate)
    }

    pub fn save_opening_stats(&self, aggregate: &OpeningAggregate) -> Result<()> {
        let s = &aggregate.stats;
        self.conn.execute(
            r#"
            INSERT INTO opening_stats
            (username, opening, games_analyzed, total_games, wins, losses, draws,
             win_rate, current_rating, highest_rating, lowest_rating, avg_rating,
             first_rating, rating_change, avg_accuracy, best_accuracy,
             worst_accuracy, games_with_accuracy, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(username, opening) DO UPDATE SET
                games_analyzed = excluded.games_analyzed,
                total_games = excluded.total_games,
                wins = excluded.wins,
                losses = excluded.losses,
                draws = excluded.draws,
                win_rate = excluded.win_rate,
                current_rating = excluded.current_rating,
                highest_rating = excluded.highest_rating,
                lowest_rating = excluded.lowest_rating,
                avg_rating = excluded.avg_rating,
                first_rating = excluded.first_rating,
                rating_change = excluded.rating_change,
                avg_accuracy = excluded.avg_accuracy,
                best_accuracy = excluded.best_accuracy,
                worst_accuracy = excluded.worst_accuracy,
                games_with_accuracy = excluded.games_with_accuracy,
                updated_at = excluded.updated_at
            "#,
            params![
                aggregate.username,
                aggregate.opening,
                s.games_analyzed,
                s.total_games,
                s.wins,
                s.losses,
                s.draws,
                s.win_rate,
                s.current_rating,
                s.highest_rating,
                s.lowest_rating,
                s.avg_rating,
                s.first_rating,
                s.rating_change,
                s.avg_accuracy,
                s.best_accuracy,
                s.worst_accuracy,
                s.games_with_accuracy,
                Self::now(),
                aggregate.last_updated.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn load_opening_stats(
        &self,
        username: &str,
        opening: &str,
    ) -> Result<Option<OpeningAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT games_analyzed, total_games, wins, losses, draws, win_rate,
                   current_rating, highest_rating, lowest_rating, avg_rating,
                   first_rating, rating_change, avg_accuracy, best_accuracy,
                   worst_accuracy, games_with_accuracy, updated_at
            FROM opening_stats WHERE username = ?1 AND opening = ?2
            "#,
        )?;

        let aggregate = stmt
            .query_row(params![username, opening], |row| {
                Ok(OpeningAggregate {
                    username: username.to_string(),
                    opening: opening.to_string(),
                    stats: stats_from_row(row, 0)?,
                    last_updated: DateTime::from_timestamp(row.get(16)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })
            .optional()?;
        Ok(aggregate)
    }

    pub fn opening_stats_for_user(&self, username: &str) -> Result<Vec<OpeningAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT opening, games_analyzed, total_games, wins, losses, draws,
                   win_rate, current_rating, highest_rating, lowest_rating,
                   avg_rating, first_rating, rating_change, avg_accuracy,
                   best_accuracy, worst_accuracy, games_with_accuracy, updated_at
            FROM opening_stats WHERE username = ?1
            ORDER BY games_analyzed DESC, opening ASC
            "#,
        )?;

        let aggregates = stmt
            .query_map(params![username], |row| {
                Ok(OpeningAggregate {
                    username: username.to_string(),
                    opening: row.get(0)?,
                    stats: stats_from_row(row, 1)?,
                    last_updated: DateTime::from_timestamp(row.get(17)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(aggregates)
    }

    pub fn save_time_control_stats(&self, aggregate: &TimeControlAggregate) -> Result<()> {
        let s = &aggregate.stats;
        self.conn.execute(
            r#"
            INSERT INTO time_control_stats
            (username, time_control, games_analyzed, total_games, wins, losses,
             draws, win_rate, current_rating, highest_rating, lowest_rating,
             avg_rating, first_rating, rating_change, avg_accuracy, best_accuracy,
             worst_accuracy, games_with_accuracy, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20)
            ON CONFLICT(username, time_control) DO UPDATE SET
                games_analyzed = excluded.games_analyzed,
                total_games = excluded.total_games,
                wins = excluded.wins,
                losses = excluded.losses,
                draws = excluded.draws,
                win_rate = excluded.win_rate,
                current_rating = excluded.current_rating,
                highest_rating = excluded.highest_rating,
                lowest_rating = excluded.lowest_rating,
                avg_rating = excluded.avg_rating,
                first_rating = excluded.first_rating,
                rating_change = excluded.rating_change,
                avg_accuracy = excluded.avg_accuracy,
                best_accuracy = excluded.best_accuracy,
                worst_accuracy = excluded.worst_accuracy,
                games_with_accuracy = excluded.games_with_accuracy,
                updated_at = excluded.updated_at
            "#,
            params![
                aggregate.username,
                aggregate.time_control,
                s.games_analyzed,
                s.total_games,
                s.wins,
                s.losses,
                s.draws,
                s.win_rate,
                s.current_rating,
                s.highest_rating,
                s.lowest_rating,
                s.avg_rating,
                s.first_rating,
                s.rating_change,
                s.avg_accuracy,
                s.best_accuracy,
                s.worst_accuracy,
                s.games_with_accuracy,
                Self::now(),
                aggregate.last_updated.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn load_time_control_stats(
        &self,
        username: &str,
        time_control: &str,
    ) -> Result<Option<TimeControlAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT games_analyzed, total_games, wins, losses, draws, win_rate,
                   current_rating, highest_rating, lowest_rating, avg_rating,
                   first_rating, rating_change, avg_accuracy, best_accuracy,
                   worst_accuracy, games_with_accuracy, updated_at
            FROM time_control_stats WHERE username = ?1 AND time_control = ?2
            "#,
        )?;

        let aggregate = stmt
            .query_row(params![username, time_control], |row| {
                Ok(TimeControlAggregate {
                    username: username.to_string(),
                    time_control: time_control.to_string(),
                    stats: stats_from_row(row, 0)?,
                    last_updated: DateTime::from_timestamp(row.get(16)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })
            .optional()?;
        Ok(aggregate)
    }

    pub fn time_control_stats_for_user(
        &self,
        username: &str,
    ) -> Result<Vec<TimeControlAggregate>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT time_control, games_analyzed, total_games, wins, losses, draws,
                   win_rate, current_rating, highest_rating, lowest_rating,
                   avg_rating, first_rating, rating_change, avg_accuracy,
                   best_accuracy, worst_accuracy, games_with_accuracy, updated_at
            FROM time_control_stats WHERE username = ?1
            ORDER BY games_analyzed DESC, time_control ASC
            "#,
        )?;

        let aggregates = stmt
            .query_map(params![username], |row| {
                Ok(TimeControlAggregate {
                    username: username.to_string(),
                    time_control: row.get(0)?,
                    stats: stats_from_row(row, 1)?,
                    last_updated: DateTime::from_timestamp(row.get(17)?, 0)
                        .unwrap_or(DateTime::UNIX_EPOCH),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(aggregates)
    }
}

fn stored_game_from_row(row: &Row<'_>) -> rusqlite::Result<StoredGame> {
    Ok(StoredGame {
        id: row.get(0)?,
        game_url: row.get(1)?,
        username: row.get(2)?,
        played_at: row.get(3)?,
        color: row.get(4)?,
        result: row.get(5)?,
        rating: row.get(6)?,
        opponent_rating: row.get(7)?,
        opponent: row.get(8)?,
        accuracy: row.get(9)?,
        time_control: row.get(10)?,
        opening: row.get(11)?,
        first_moves: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn stats_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<PerformanceStats> {
    Ok(PerformanceStats {
        games_analyzed: row.get(offset)?,
        total_games: row.get(offset + 1)?,
        wins: row.get(offset + 2)?,
        losses: row.get(offset + 3)?,
        draws: row.get(offset + 4)?,
        win_rate: row.get(offset + 5)?,
        current_rating: row.get(offset + 6)?,
        highest_rating: row.get(offset + 7)?,
        lowest_rating: row.get(offset + 8)?,
        avg_rating: row.get(offset + 9)?,
        first_rating: row.get(offset + 10)?,
        rating_change: row.get(offset + 11)?,
        avg_accuracy: row.get(offset + 12)?,
        best_accuracy: row.get(offset + 13)?,
        worst_accuracy: row.get(offset + 14)?,
        games_with_accuracy: row.get(offset + 15)?,
    })
}

fn timestamp_from_row(
    row: &Row<'_>,
    idx: usize,
) -> rusqlite::Result<Option<chrono::DateTime<chrono::Utc>>> {
    let secs: Option<i64> = row.get(idx)?;
    Ok(secs.and_then(|s| DateTime::from_timestamp(s, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{
        aggregate_openings, aggregate_time_controls, aggregate_user, GameOutcome, PlayerColor,
    };

    fn make_record(url: &str, timestamp: i64, outcome: GameOutcome) -> GameRecord {
        GameRecord {
            game_url: url.to_string(),
            played_at: DateTime::from_timestamp(timestamp, 0).unwrap(),
            color: PlayerColor::White,
            outcome,
            rating: Some(1500),
            opponent_rating: Some(1480),
            opponent: Some("rival".to_string()),
            accuracy: Some(88.8),
            time_control: "600".to_string(),
            opening: "Sicilian Defense".to_string(),
            first_moves: "1. e4 c5 2. Nf3 d6 3. d4 cxd4".to_string(),
        }
    }

    #[test]
    fn test_upsert_game_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record("https://www.chess.com/game/live/1", 1000, GameOutcome::Win);

        db.upsert_game("alice", &record).unwrap();

        let stored = db
            .get_game("https://www.chess.com/game/live/1")
            .unwrap()
            .unwrap();
        assert_eq!(stored.username, "alice");
        assert_eq!(stored.played_at, 1000);
        assert_eq!(stored.color, "white");
        assert_eq!(stored.result, "win");
        assert_eq!(stored.rating, Some(1500));
        assert_eq!(stored.accuracy, Some(88.8));
        assert_eq!(stored.opening, "Sicilian Defense");
    }

    #[test]
    fn test_upsert_game_overwrites_not_duplicates() {
        let db = Database::open_in_memory().unwrap();
        let mut record = make_record("https://www.chess.com/game/live/1", 1000, GameOutcome::Win);
        db.upsert_game("alice", &record).unwrap();
        let created_at = db
            .get_game(&record.game_url)
            .unwrap()
            .unwrap()
            .created_at;

        record.rating = Some(1600);
        record.outcome = GameOutcome::Loss;
        db.upsert_game("alice", &record).unwrap();

        assert_eq!(db.count_games_for_user("alice").unwrap(), 1);
        let stored = db.get_game(&record.game_url).unwrap().unwrap();
        assert_eq!(stored.rating, Some(1600));
        assert_eq!(stored.result, "loss");
        assert_eq!(stored.created_at, created_at);
    }

    #[test]
    fn test_games_for_user_chronological() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_games(
            "alice",
            &[
                make_record("u3", 3000, GameOutcome::Win),
                make_record("u1", 1000, GameOutcome::Loss),
                make_record("u2", 2000, GameOutcome::Draw),
            ],
        )
        .unwrap();
        db.upsert_game("bob", &make_record("b1", 1500, GameOutcome::Win))
            .unwrap();

        let games = db.games_for_user("alice").unwrap();
        assert_eq!(games.len(), 3);
        assert_eq!(
            games.iter().map(|g| g.played_at).collect::<Vec<_>>(),
            vec![1000, 2000, 3000]
        );
        assert_eq!(db.count_games_for_user("bob").unwrap(), 1);
    }

    #[test]
    fn test_missing_game_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_game("nope").unwrap().is_none());
    }

    #[test]
    fn test_user_stats_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let records = vec![
            make_record("u1", 1000, GameOutcome::Win),
            make_record("u2", 2000, GameOutcome::Loss),
        ];
        let aggregate = aggregate_user("alice", &records);

        db.save_user_stats(&aggregate).unwrap();

        let loaded = db.load_user_stats("alice").unwrap().unwrap();
        assert_eq!(loaded.stats, aggregate.stats);
        assert_eq!(loaded.analysis_start, aggregate.analysis_start);
        assert_eq!(loaded.analysis_end, aggregate.analysis_end);
        assert!(db.load_user_stats("bob").unwrap().is_none());
    }

    #[test]
    fn test_user_stats_absent_fields_roundtrip_as_null() {
        let db = Database::open_in_memory().unwrap();
        let mut record = make_record("u1", 1000, GameOutcome::Win);
        record.rating = None;
        record.opponent_rating = None;
        record.accuracy = None;
        let aggregate = aggregate_user("alice", &[record]);

        db.save_user_stats(&aggregate).unwrap();

        let loaded = db.load_user_stats("alice").unwrap().unwrap();
        assert_eq!(loaded.stats.current_rating, None);
        assert_eq!(loaded.stats.rating_change, None);
        assert_eq!(loaded.stats.avg_accuracy, None);
        assert_eq!(loaded.stats, aggregate.stats);
    }

    #[test]
    fn test_user_stats_upsert_replaces_counts() {
        let db = Database::open_in_memory().unwrap();
        let first = aggregate_user("alice", &[make_record("u1", 1000, GameOutcome::Win)]);
        db.save_user_stats(&first).unwrap();

        let second = aggregate_user(
            "alice",
            &[
                make_record("u2", 2000, GameOutcome::Loss),
                make_record("u3", 3000, GameOutcome::Loss),
            ],
        );
        db.save_user_stats(&second).unwrap();

        let loaded = db.load_user_stats("alice").unwrap().unwrap();
        assert_eq!(loaded.stats.games_analyzed, 2);
        assert_eq!(loaded.stats.wins, 0);
        assert_eq!(loaded.stats.losses, 2);
    }

    #[test]
    fn test_opening_stats_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let mut caro = make_record("u3", 3000, GameOutcome::Loss);
        caro.opening = "Caro-Kann Defense".to_string();
        let records = vec![
            make_record("u1", 1000, GameOutcome::Win),
            make_record("u2", 2000, GameOutcome::Win),
            caro,
        ];

        for aggregate in aggregate_openings("alice", &records) {
            db.save_opening_stats(&aggregate).unwrap();
        }

        let sicilian = db
            .load_opening_stats("alice", "Sicilian Defense")
            .unwrap()
            .unwrap();
        assert_eq!(sicilian.stats.games_analyzed, 2);
        assert_eq!(sicilian.stats.wins, 2);

        let all = db.opening_stats_for_user("alice").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].opening, "Sicilian Defense");
        assert_eq!(all[1].opening, "Caro-Kann Defense");
    }

    #[test]
    fn test_time_control_stats_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let mut blitz = make_record("u2", 2000, GameOutcome::Win);
        blitz.time_control = "180+2".to_string();
        let records = vec![make_record("u1", 1000, GameOutcome::Draw), blitz];

        for aggregate in aggregate_time_controls("alice", &records) {
            db.save_time_control_stats(&aggregate).unwrap();
        }

        let rapid = db
            .load_time_control_stats("alice", "600")
            .unwrap()
            .unwrap();
        assert_eq!(rapid.stats.draws, 1);

        let all = db.time_control_stats_for_user("alice").unwrap();
        assert_eq!(all.len(), 2);
    }
}

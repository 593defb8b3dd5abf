//! SQLite storage for games and aggregate statistics

mod db;
mod models;

pub use db::Database;
pub use models::StoredGame;

//! Command line interface for Chess.com game statistics

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chesscom_stats_core::{
    analyze_user, AnalysisOptions, ChessComClient, Database, DateTimeRange, Error,
    DEFAULT_RECENT_GAMES,
};

mod report;

#[derive(Parser)]
#[command(name = "chesscom-stats")]
#[command(about = "Game statistics for Chess.com players")]
#[command(version)]
struct Cli {
    /// Contact string for the User-Agent header; the published-data API
    /// asks callers to be reachable
    #[arg(long, global = true, default_value = "github.com/yourusername/chesscom-stats")]
    contact: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and analyze games for one or more players
    Analyze {
        /// Player usernames, analyzed in order
        #[arg(required = true)]
        usernames: Vec<String>,

        /// Earliest game date to include (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// Time of day for --start (HH:MM, defaults to 00:00)
        #[arg(long, requires = "start")]
        start_time: Option<String>,

        /// Latest game date to include (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Time of day for --end (HH:MM, defaults to 23:59)
        #[arg(long, requires = "end")]
        end_time: Option<String>,

        /// Keep only the most recent N games (50 when no range is given)
        #[arg(long)]
        last: Option<usize>,

        /// SQLite database for longitudinal tracking; omit to skip
        /// persistence
        #[arg(long)]
        db: Option<PathBuf>,

        /// Seconds to wait between players
        #[arg(long, default_value_t = 1.0)]
        delay: f64,

        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a player's public profile
    Profile { username: String },

    /// Show stored statistics for a player without fetching anything
    Stats {
        username: String,

        /// SQLite database to read
        #[arg(long)]
        db: PathBuf,

        /// Output format: table or json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("chesscom_stats_core=info".parse()?)
                .add_directive("chesscom_stats=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            usernames,
            start,
            start_time,
            end,
            end_time,
            last,
            db,
            delay,
            format,
        } => {
            run_analyze(AnalyzeParams {
                contact: cli.contact,
                usernames,
                start,
                start_time,
                end,
                end_time,
                last,
                db,
                delay,
                format: parse_format(&format)?,
            })
            .await
        }
        Commands::Profile { username } => run_profile(&cli.contact, &username).await,
        Commands::Stats {
            username,
            db,
            format,
        } => run_stats(&username, &db, parse_format(&format)?),
    }
}

#[derive(Clone, Copy, PartialEq)]
enum OutputFormat {
    Table,
    Json,
}

fn parse_format(format: &str) -> Result<OutputFormat> {
    match format {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => bail!("unknown output format '{}', expected table or json", other),
    }
}

struct AnalyzeParams {
    contact: String,
    usernames: Vec<String>,
    start: Option<String>,
    start_time: Option<String>,
    end: Option<String>,
    end_time: Option<String>,
    last: Option<usize>,
    db: Option<PathBuf>,
    delay: f64,
    format: OutputFormat,
}

async fn run_analyze(params: AnalyzeParams) -> Result<()> {
    // range problems are configuration errors; fail before any fetch
    let range = DateTimeRange::parse(
        params.start.as_deref(),
        params.start_time.as_deref(),
        params.end.as_deref(),
        params.end_time.as_deref(),
    )?;
    let max_games = match params.last {
        Some(n) => Some(n),
        None if range.is_unbounded() => Some(DEFAULT_RECENT_GAMES),
        None => None,
    };
    let options = AnalysisOptions { range, max_games };

    let client = ChessComClient::new(&params.contact)?;
    let db = match &params.db {
        Some(path) => match Database::open(path) {
            Ok(db) => Some(db),
            Err(e) => {
                eprintln!(
                    "warning: cannot open database {}: {}; continuing without persistence",
                    path.display(),
                    e
                );
                None
            }
        },
        None => None,
    };

    let mut failures = 0;
    for (i, username) in params.usernames.iter().enumerate() {
        if i > 0 && params.delay > 0.0 {
            tokio::time::sleep(Duration::from_secs_f64(params.delay)).await;
        }
        info!("analyzing {}", username);

        match analyze_user(&client, db.as_ref(), username, &options).await {
            Ok(analysis) => match params.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
                OutputFormat::Table => report::print_analysis(&analysis),
            },
            Err(Error::UserNotFound(user)) => {
                failures += 1;
                eprintln!("skipping {}: user not found", user);
            }
            Err(e) => {
                failures += 1;
                eprintln!("analysis failed for {}: {}", username, e);
            }
        }
    }

    if failures == params.usernames.len() {
        bail!("no user could be analyzed");
    }
    Ok(())
}

async fn run_profile(contact: &str, username: &str) -> Result<()> {
    let client = ChessComClient::new(contact)?;
    let profile = client.profile(username).await?;
    report::print_profile(&profile);
    Ok(())
}

fn run_stats(username: &str, path: &Path, format: OutputFormat) -> Result<()> {
    let db = Database::open(path)?;

    let Some(user) = db.load_user_stats(username)? else {
        println!("no stored statistics for {}", username);
        return Ok(());
    };
    let openings = db.opening_stats_for_user(username)?;
    let time_controls = db.time_control_stats_for_user(username)?;
    let games = db.games_for_user(username)?;

    match format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "user": user,
                "openings": openings,
                "time_controls": time_controls,
                "stored_games": games.len(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Table => report::print_stored(&user, &openings, &time_controls, &games),
    }
    Ok(())
}

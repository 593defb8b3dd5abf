//! Console report formatting

use chesscom_stats_core::storage::StoredGame;
use chesscom_stats_core::{
    Analysis, OpeningAggregate, PerformanceStats, PlayerProfile, TimeControlAggregate,
    UserAggregate,
};
use chrono::DateTime;

pub fn print_analysis(analysis: &Analysis) {
    let divider = "=".repeat(64);
    println!("{}", divider);
    println!(
        "Statistics for {}{}",
        analysis.username,
        profile_descriptor(&analysis.profile)
    );
    println!("{}", divider);

    let excluded = analysis.total_fetched - analysis.records.len() - analysis.skipped.len();
    println!(
        "fetched {} games: {} analyzed, {} skipped, {} excluded by filters",
        analysis.total_fetched,
        analysis.records.len(),
        analysis.skipped.len(),
        excluded
    );

    if !analysis.records.is_empty() {
        println!();
        println!(
            "{:<4} {:<16} {:<6} {:<8} {:>5} {:>5} {:>6}  {}",
            "#", "date", "color", "result", "elo", "opp", "acc", "opening"
        );
        for (i, record) in analysis.records.iter().enumerate() {
            println!(
                "{:<4} {:<16} {:<6} {:<8} {:>5} {:>5} {:>6}  {}",
                i + 1,
                record.played_at.format("%Y-%m-%d %H:%M").to_string(),
                record.color.as_str(),
                record.outcome.as_str(),
                display_rating(record.rating),
                display_rating(record.opponent_rating),
                display_accuracy(record.accuracy),
                record.opening,
            );
        }
    }

    print_performance(&analysis.user.stats);
    print_openings(&analysis.openings);
    print_time_controls(&analysis.time_controls);

    if !analysis.skipped.is_empty() {
        println!();
        println!("Skipped games");
        for skip in &analysis.skipped {
            println!("  {}: {}", skip.url, skip.reason);
        }
    }

    if let Some(err) = &analysis.persistence_error {
        println!();
        println!("warning: results were not persisted: {}", err);
    }
    println!();
}

pub fn print_profile(profile: &PlayerProfile) {
    println!("username:  {}", profile.username);
    if let Some(name) = &profile.name {
        println!("name:      {}", name);
    }
    if let Some(title) = &profile.title {
        println!("title:     {}", title);
    }
    if let Some(code) = profile.country_code() {
        println!("country:   {}", code);
    }
    if let Some(followers) = profile.followers {
        println!("followers: {}", followers);
    }
    if let Some(joined) = profile.joined.and_then(|t| DateTime::from_timestamp(t, 0)) {
        println!("joined:    {}", joined.format("%Y-%m-%d"));
    }
    if let Some(status) = &profile.status {
        println!("status:    {}", status);
    }
}

pub fn print_stored(
    user: &UserAggregate,
    openings: &[OpeningAggregate],
    time_controls: &[TimeControlAggregate],
    games: &[StoredGame],
) {
    let divider = "=".repeat(64);
    println!("{}", divider);
    println!("Stored statistics for {}", user.username);
    println!("{}", divider);
    println!("stored games: {}", games.len());
    if let (Some(start), Some(end)) = (user.analysis_start, user.analysis_end) {
        println!(
            "analysis window: {} to {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );
    }
    println!(
        "last updated: {}",
        user.last_updated.format("%Y-%m-%d %H:%M")
    );

    print_performance(&user.stats);
    print_openings(openings);
    print_time_controls(time_controls);

    let recent: Vec<&StoredGame> = games.iter().rev().take(10).collect();
    if !recent.is_empty() {
        println!();
        println!("Most recent stored games");
        for game in recent {
            let date = DateTime::from_timestamp(game.played_at, 0)
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<12} {:<6} {:<8} {}",
                date, game.color, game.result, game.opening
            );
        }
    }
    println!();
}

fn print_performance(stats: &PerformanceStats) {
    println!();
    println!("Overall performance");
    println!(
        "  games analyzed: {} ({} decided)",
        stats.games_analyzed, stats.total_games
    );
    println!(
        "  record: {}W / {}L / {}D",
        stats.wins, stats.losses, stats.draws
    );
    println!("  win rate: {:.1}%", stats.win_rate);

    if let Some(current) = stats.current_rating {
        println!();
        println!("Rating");
        println!("  current: {}", current);
        if let Some(change) = stats.rating_change {
            println!("  change: {:+}", change);
        }
        if let Some(highest) = stats.highest_rating {
            println!("  highest: {}", highest);
        }
        if let Some(lowest) = stats.lowest_rating {
            println!("  lowest: {}", lowest);
        }
        if let Some(avg) = stats.avg_rating {
            println!("  average: {:.1}", avg);
        }
    }

    println!();
    if let Some(avg) = stats.avg_accuracy {
        println!(
            "Accuracy ({} of {} games reviewed)",
            stats.games_with_accuracy, stats.games_analyzed
        );
        println!("  average: {:.1}", avg);
        if let (Some(best), Some(worst)) = (stats.best_accuracy, stats.worst_accuracy) {
            println!("  best: {:.1}, worst: {:.1}", best, worst);
        }
    } else {
        println!("Accuracy: no reviewed games");
    }
}

fn print_openings(openings: &[OpeningAggregate]) {
    if openings.is_empty() {
        return;
    }
    println!();
    println!("Openings");
    for aggregate in openings.iter().take(10) {
        println!(
            "  {:<36} {:>3} games  {:>5.1}% wins",
            aggregate.opening, aggregate.stats.games_analyzed, aggregate.stats.win_rate
        );
    }
}

fn print_time_controls(time_controls: &[TimeControlAggregate]) {
    if time_controls.is_empty() {
        return;
    }
    println!();
    println!("Time controls");
    for aggregate in time_controls {
        println!(
            "  {:<12} {:>3} games  {:>5.1}% wins",
            aggregate.time_control, aggregate.stats.games_analyzed, aggregate.stats.win_rate
        );
    }
}

fn profile_descriptor(profile: &PlayerProfile) -> String {
    match (&profile.name, &profile.title) {
        (Some(name), Some(title)) => format!(" ({}, {})", name, title),
        (Some(name), None) => format!(" ({})", name),
        (None, Some(title)) => format!(" ({})", title),
        (None, None) => String::new(),
    }
}

fn display_rating(rating: Option<u32>) -> String {
    rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string())
}

fn display_accuracy(accuracy: Option<f64>) -> String {
    accuracy
        .map(|a| format!("{:.1}", a))
        .unwrap_or_else(|| "-".to_string())
}

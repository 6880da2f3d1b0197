/// Output formatting: terminal table, JSON and submission messages.
use scoreboard_core::{LeaderboardSummary, RankedEntry, Standing};
use serde::Serialize;

/// English ordinal for a rank: 1st, 2nd, 3rd, 4th, 11th, 21st, ...
pub fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Message returned to a player after submitting a score.
pub fn congratulations(name: &str, percentile: f64, rank: usize) -> String {
    format!(
        "Congrats {name}, you are in the top {percentile:.2}%, on the {} position.",
        ordinal(rank)
    )
}

/// Render ranked entries as a fixed-width table.
pub fn format_table(entries: &[RankedEntry]) -> String {
    if entries.is_empty() {
        return "(no entries)\n".to_string();
    }

    // Widest name for padding
    let name_width = entries
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(4)
        .max(4); // at least "Name"

    let mut out = String::new();
    out.push_str(&format!("Rank | {:<name_width$} |    Score | Time\n", "Name"));
    out.push_str(&format!("-----|-{}-|----------|-----\n", "-".repeat(name_width)));
    for e in entries {
        out.push_str(&format!(
            "{:>4} | {:<name_width$} | {:>8} | {}\n",
            e.rank,
            e.name,
            e.score,
            e.submitted_at.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn print_table(entries: &[RankedEntry]) {
    print!("{}", format_table(entries));
}

pub fn print_standing(standing: &Standing) {
    println!(
        "{} is {} of {} with {} points (top {:.2}%)",
        standing.name,
        ordinal(standing.rank),
        standing.total_count,
        standing.score,
        standing.percentile,
    );
}

pub fn print_summary(summary: &LeaderboardSummary) {
    println!("Entries:          {}", summary.total_entries);
    println!("Distinct players: {}", summary.distinct_players);
    let fmt = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |s| s.to_string());
    println!("Top score:        {}", fmt(summary.top_score));
    println!("Bottom score:     {}", fmt(summary.bottom_score));
    match summary.mean_score {
        Some(mean) => println!("Mean score:       {mean:.2}"),
        None => println!("Mean score:       -"),
    }
}

/// Print any serializable result as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => crate::bail(format!("Failed to encode JSON output: {e}")),
    }
}

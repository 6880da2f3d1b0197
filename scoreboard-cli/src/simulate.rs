/// Simulate command: drives an in-process engine with random submissions
/// and reports throughput and per-operation latency.
///
/// No server or network involved; this measures the ranking engine itself.
use rand::Rng;
use rand::seq::IndexedRandom;
use scoreboard_core::{Leaderboard, LeaderboardConfig, RankedEntry};
use std::time::Instant;

pub struct SimulationOptions {
    pub entries: usize,
    pub players: usize,
    pub max_score: i64,
    pub page_size: usize,
    pub removals: usize,
}

pub struct SimulationReport {
    pub submissions: usize,
    pub removed: usize,
    pub final_size: usize,
    pub wall_clock_secs: f64,
    /// Sorted ascending, in seconds.
    pub submit_latencies: Vec<f64>,
    pub page_latencies: Vec<f64>,
    pub top_page: Vec<RankedEntry>,
}

/// Nearest-rank percentile of an ascending slice. 0.0 for an empty slice.
pub fn latency_percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

pub fn run_simulation<R: Rng>(options: &SimulationOptions, rng: &mut R) -> SimulationReport {
    let players: Vec<String> = (0..options.players.max(1)).map(|i| format!("player{i:04}")).collect();
    let mut board = Leaderboard::new(LeaderboardConfig::default());

    let mut submit_latencies = Vec::with_capacity(options.entries);
    let mut page_latencies = Vec::with_capacity(options.entries);

    let wall_clock_start = Instant::now();
    for i in 0..options.entries {
        let name = players.choose(rng).cloned().unwrap_or_default();
        let score = rng.random_range(0..=options.max_score.max(0));

        let start = Instant::now();
        // Default config never rejects a submission.
        let _ = board.submit(name, score, Some(format!("t{i}")));
        submit_latencies.push(start.elapsed().as_secs_f64());

        // Interleave a page read the way a live client would after submitting.
        let page_number = rng.random_range(1..=(board.len() / options.page_size.max(1)).max(1)) as i64;
        let start = Instant::now();
        std::hint::black_box(board.page(page_number, options.page_size));
        page_latencies.push(start.elapsed().as_secs_f64());
    }

    let mut removed = 0;
    for _ in 0..options.removals {
        if let Some(name) = players.choose(rng) {
            removed += board.remove_by_name(name);
        }
    }
    let wall_clock_secs = wall_clock_start.elapsed().as_secs_f64();

    submit_latencies.sort_by(f64::total_cmp);
    page_latencies.sort_by(f64::total_cmp);

    SimulationReport {
        submissions: options.entries,
        removed,
        final_size: board.len(),
        wall_clock_secs,
        submit_latencies,
        page_latencies,
        top_page: board.top(options.page_size),
    }
}

pub fn print_report(report: &SimulationReport) {
    println!("── Throughput ──────────────────────────────────");
    println!("Submissions:           {}", report.submissions);
    println!("Removed by name:       {}", report.removed);
    println!("Final board size:      {}", report.final_size);
    if report.wall_clock_secs > 0.0 {
        println!("Submissions/sec:       {:.0}", report.submissions as f64 / report.wall_clock_secs);
    }

    for (label, latencies) in [("submit", &report.submit_latencies), ("page", &report.page_latencies)] {
        println!();
        println!("── Latency ({label}) ─────────────────────────────");
        if latencies.is_empty() {
            println!("(No operations)");
            continue;
        }
        let micros = |v: f64| v * 1_000_000.0;
        println!("P50:    {:.1}µs", micros(latency_percentile(latencies, 0.50)));
        println!("P95:    {:.1}µs", micros(latency_percentile(latencies, 0.95)));
        println!("P99:    {:.1}µs", micros(latency_percentile(latencies, 0.99)));
    }

    println!();
    println!("── Top of the board ────────────────────────────");
    crate::output::print_table(&report.top_page);
}

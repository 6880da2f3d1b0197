/// scoreboard-core: Pure-computation leaderboard engine.
///
/// Score submissions → sorted board → dense competition ranks, percentiles
/// and stable pages. No IO, no HTTP, no filesystem. Bring your own transport.
///
/// # Quick start
///
/// ```rust
/// use scoreboard_core::{Leaderboard, LeaderboardConfig};
///
/// let mut board = Leaderboard::new(LeaderboardConfig::default());
/// board.submit("alice", 50, None).unwrap();
/// board.submit("bob", 50, None).unwrap();
/// let result = board.submit("carol", 40, Some("2024-05-01T12:00:00Z".into())).unwrap();
///
/// assert_eq!(result.rank, 3); // ties share rank 1, the next rank skips to 3
/// assert_eq!(result.total_count, 3);
///
/// for entry in board.page(1, 5) {
///     println!("#{} {} {}", entry.rank, entry.name, entry.score);
/// }
/// ```

pub mod constants;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod sync;
pub mod types;

// Re-export primary public API at crate root.
pub use engine::Leaderboard;
pub use error::{parse_score, LeaderboardError};
pub use ranking::{competition_ranks, page_bounds, percentile};
pub use sync::SharedLeaderboard;
pub use types::{
    Entry, LeaderboardConfig, LeaderboardSummary, RankedEntry, Standing, SubmissionResult,
};

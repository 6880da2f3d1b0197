/// Leaderboard engine.
///
/// Pure in-memory computation: no IO, no locking. Wrap it in
/// `SharedLeaderboard` when several threads need it.
///
/// The entry vector is kept sorted by score descending at all times, with
/// equal scores in insertion order. Ranks are never stored: every read
/// derives them from the current member set, so a removal can't leave stale
/// ranks behind.
use std::collections::HashSet;
use std::ops::Range;

use tracing::debug;

use crate::error::LeaderboardError;
use crate::ranking::{competition_ranks, page_bounds, percentile};
use crate::types::{
    Entry, LeaderboardConfig, LeaderboardSummary, RankedEntry, Standing, SubmissionResult,
};

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    /// Sorted by score descending; ties in insertion order.
    entries: Vec<Entry>,
    config: LeaderboardConfig,
}

impl Leaderboard {
    pub fn new(config: LeaderboardConfig) -> Self {
        Leaderboard {
            entries: Vec::new(),
            config,
        }
    }

    /// Build a leaderboard from entries given in insertion order.
    ///
    /// Produces exactly the order that submitting them one by one would.
    /// Used to hydrate the engine from a store at startup; the empty-name
    /// policy is not re-applied to already-accepted entries.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>, config: LeaderboardConfig) -> Self {
        let mut entries: Vec<Entry> = entries.into_iter().collect();
        // `sort_by` is stable, which keeps insertion order among ties.
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Leaderboard { entries, config }
    }

    pub fn config(&self) -> &LeaderboardConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ranked order, without ranks.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Record a score and report where it landed.
    ///
    /// The new entry goes after every existing entry with an equal or higher
    /// score, which is where a stable re-sort of the appended sequence would
    /// put it. It's tracked by that index, so identical duplicate
    /// submissions can't be confused with one another.
    pub fn submit(
        &mut self,
        name: impl Into<String>,
        score: i64,
        submitted_at: Option<String>,
    ) -> Result<SubmissionResult, LeaderboardError> {
        let name = name.into();
        if self.config.reject_empty_names && name.is_empty() {
            return Err(LeaderboardError::EmptyName);
        }

        let index = self.entries.partition_point(|e| e.score >= score);
        self.entries.insert(index, Entry { name, score, submitted_at });

        let rank = self.rank_at(index);
        let total_count = self.entries.len();
        let result = SubmissionResult {
            rank,
            percentile: percentile(rank, total_count),
            total_count,
        };

        debug!(
            name = %self.entries[index].name,
            score,
            rank,
            total_count,
            "score submitted"
        );
        Ok(result)
    }

    /// One page of the ranking. Pages are 1-based; page numbers below 1 are
    /// treated as 1, and pages past the end come back empty.
    pub fn page(&self, page_number: i64, page_size: usize) -> Vec<RankedEntry> {
        match page_bounds(page_number, page_size, self.entries.len()) {
            Some(range) => self.ranked_window(range),
            None => Vec::new(),
        }
    }

    /// The first `limit` entries of the ranking (fewer if the board is smaller).
    pub fn top(&self, limit: usize) -> Vec<RankedEntry> {
        self.page(1, limit)
    }

    /// The whole ranking.
    pub fn ranked(&self) -> Vec<RankedEntry> {
        self.ranked_window(0..self.entries.len())
    }

    /// Remove every entry whose name matches exactly (case-sensitive).
    /// Returns how many were removed; zero is not an error.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        let removed = before - self.entries.len();
        debug!(name, removed, remaining = self.entries.len(), "entries removed");
        removed
    }

    /// Rank and percentile of the best-placed entry with this name.
    pub fn standing(&self, name: &str) -> Option<Standing> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        let entry = &self.entries[index];
        let rank = self.rank_at(index);
        let total_count = self.entries.len();
        Some(Standing {
            name: entry.name.clone(),
            score: entry.score,
            rank,
            percentile: percentile(rank, total_count),
            total_count,
        })
    }

    pub fn summary(&self) -> LeaderboardSummary {
        let total_entries = self.entries.len();
        if total_entries == 0 {
            return LeaderboardSummary::default();
        }

        let distinct_players = self
            .entries
            .iter()
            .map(|e| e.name.as_str())
            .collect::<HashSet<_>>()
            .len();
        let sum: f64 = self.entries.iter().map(|e| e.score as f64).sum();

        LeaderboardSummary {
            total_entries,
            distinct_players,
            top_score: self.entries.first().map(|e| e.score),
            bottom_score: self.entries.last().map(|e| e.score),
            mean_score: Some(sum / total_entries as f64),
        }
    }

    /// Rank of the entry at `index`: one plus the number of strictly higher scores.
    fn rank_at(&self, index: usize) -> usize {
        let score = self.entries[index].score;
        self.entries.partition_point(|e| e.score > score) + 1
    }

    fn ranked_window(&self, range: Range<usize>) -> Vec<RankedEntry> {
        if range.is_empty() {
            return Vec::new();
        }
        let window = &self.entries[range.clone()];
        let ranks = competition_ranks(
            window.iter().map(|e| e.score),
            range.start + 1,
            self.rank_at(range.start),
        );
        window
            .iter()
            .zip(ranks)
            .map(|(entry, rank)| RankedEntry::from_entry(rank, entry))
            .collect()
    }
}

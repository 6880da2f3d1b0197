/// Thread-safe handle around a `Leaderboard`.
///
/// One reader-writer lock guards the whole collection: `submit` and
/// `remove_by_name` take it exclusively, every query takes it shared, so no
/// reader ever sees a half-applied mutation. Cloning the handle is cheap and
/// every clone points at the same board.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::engine::Leaderboard;
use crate::error::LeaderboardError;
use crate::types::{Entry, LeaderboardSummary, RankedEntry, Standing, SubmissionResult};

#[derive(Debug, Clone, Default)]
pub struct SharedLeaderboard {
    inner: Arc<RwLock<Leaderboard>>,
}

impl SharedLeaderboard {
    pub fn new(leaderboard: Leaderboard) -> Self {
        SharedLeaderboard {
            inner: Arc::new(RwLock::new(leaderboard)),
        }
    }

    pub fn submit(
        &self,
        name: impl Into<String>,
        score: i64,
        submitted_at: Option<String>,
    ) -> Result<SubmissionResult, LeaderboardError> {
        self.write().submit(name, score, submitted_at)
    }

    /// Like `submit`, but runs `on_applied` with the accepted entry before
    /// the write lock is released. Hooks therefore observe submissions in
    /// exactly the order the board applied them. Not called on rejection.
    pub fn submit_with<F>(
        &self,
        name: impl Into<String>,
        score: i64,
        submitted_at: Option<String>,
        on_applied: F,
    ) -> Result<SubmissionResult, LeaderboardError>
    where
        F: FnOnce(&Entry),
    {
        let entry = Entry::new(name, score, submitted_at);
        let mut board = self.write();
        let result = board.submit(entry.name.clone(), entry.score, entry.submitted_at.clone())?;
        on_applied(&entry);
        Ok(result)
    }

    pub fn remove_by_name(&self, name: &str) -> usize {
        self.write().remove_by_name(name)
    }

    /// Like `remove_by_name`, but runs `on_applied` with the removal count
    /// while the write lock is still held.
    pub fn remove_by_name_with<F>(&self, name: &str, on_applied: F) -> usize
    where
        F: FnOnce(usize),
    {
        let mut board = self.write();
        let removed = board.remove_by_name(name);
        on_applied(removed);
        removed
    }

    pub fn page(&self, page_number: i64, page_size: usize) -> Vec<RankedEntry> {
        self.read().page(page_number, page_size)
    }

    pub fn top(&self, limit: usize) -> Vec<RankedEntry> {
        self.read().top(limit)
    }

    pub fn ranked(&self) -> Vec<RankedEntry> {
        self.read().ranked()
    }

    pub fn standing(&self, name: &str) -> Option<Standing> {
        self.read().standing(name)
    }

    pub fn summary(&self) -> LeaderboardSummary {
        self.read().summary()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Every mutation is a single `Vec::insert` or `Vec::retain`, so a panic
    // in another holder can't leave the board half-sorted. Poison is ignored.
    fn read(&self) -> RwLockReadGuard<'_, Leaderboard> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Leaderboard> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

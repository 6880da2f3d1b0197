/// Ranking arithmetic: dense competition ranks, percentiles, page windows.
///
/// Pure functions over already-sorted data. The engine owns the ordering;
/// everything here assumes scores arrive in descending order.
use std::ops::Range;

/// Assign dense competition ranks ("1224") to a run of descending scores.
///
/// Single linear scan: whenever the score changes, the rank jumps to the
/// 1-based position of that score's first occurrence; equal scores repeat
/// the previous rank.
///
/// `first_position` is the 1-based position of the first score in the
/// collection and `first_rank` is the rank already known for it. For a full
/// collection both are 1. For a window in the middle of a collection, pass
/// the window's start position and the rank of its first entry so ties that
/// straddle the window boundary keep the rank they have globally.
pub fn competition_ranks<I>(scores: I, first_position: usize, first_rank: usize) -> Vec<usize>
where
    I: IntoIterator<Item = i64>,
{
    let scores = scores.into_iter();
    let mut ranks = Vec::with_capacity(scores.size_hint().0);
    let mut last: Option<(i64, usize)> = None;

    for (offset, score) in scores.enumerate() {
        let rank = match last {
            Some((last_score, last_rank)) if last_score == score => last_rank,
            Some(_) => first_position + offset,
            None => first_rank,
        };
        ranks.push(rank);
        last = Some((score, rank));
    }

    ranks
}

/// Percentile standing of rank `rank` among `total` entries:
/// `(1 - (rank - 1) / total) * 100`.
///
/// Rank 1 is always 100.0. Returns 0.0 for an empty collection.
pub fn percentile(rank: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let ahead = rank.saturating_sub(1) as f64;
    (1.0 - ahead / total as f64) * 100.0
}

/// Index range covered by a page, or `None` when the page is past the end.
///
/// Pages are 1-based; anything below 1 is treated as page 1. A zero page
/// size never covers anything.
pub fn page_bounds(page_number: i64, page_size: usize, total: usize) -> Option<Range<usize>> {
    if page_size == 0 {
        return None;
    }
    let page_index = usize::try_from(page_number.max(1) - 1).unwrap_or(usize::MAX);
    let start = page_index.saturating_mul(page_size);
    if start >= total {
        return None;
    }
    let end = start.saturating_add(page_size).min(total);
    Some(start..end)
}

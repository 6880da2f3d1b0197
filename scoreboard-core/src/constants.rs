/// Entries per page when the caller doesn't ask for a size.
/// Matches the page size the leaderboard endpoint has always served.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Entries returned by a top-N query when no limit is given.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Upper bound on caller-supplied page sizes and top limits.
/// The engine accepts any size; the HTTP layer clamps to this.
pub const MAX_PAGE_SIZE: usize = 100;

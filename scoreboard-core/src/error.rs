/// Errors surfaced by the ranking engine and its input boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardError {
    /// Score text that doesn't parse as a signed integer.
    #[error("invalid score {raw:?}: expected an integer")]
    InvalidScore { raw: String },
    /// Empty name under `LeaderboardConfig::reject_empty_names`.
    #[error("name must not be empty")]
    EmptyName,
}

/// Parse a raw score string at the input boundary.
///
/// Surrounding whitespace is ignored and a leading `+` is accepted, so
/// `" 42"` and `"+42"` both parse. Anything else that isn't a base-10
/// `i64` is rejected.
pub fn parse_score(raw: &str) -> Result<i64, LeaderboardError> {
    raw.trim().parse::<i64>().map_err(|_| LeaderboardError::InvalidScore {
        raw: raw.to_string(),
    })
}

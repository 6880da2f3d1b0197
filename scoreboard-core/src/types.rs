/// A single score submission as stored by the engine.
///
/// Entries have no identity beyond their fields. `submitted_at` is an opaque
/// display token supplied by the caller and never takes part in ordering.
/// On the wire it travels as `time`, the name game clients send and read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry {
    pub name: String,
    pub score: i64,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "time", default, skip_serializing_if = "Option::is_none")
    )]
    pub submitted_at: Option<String>,
}

impl Entry {
    pub fn new(name: impl Into<String>, score: i64, submitted_at: Option<String>) -> Self {
        Entry {
            name: name.into(),
            score,
            submitted_at,
        }
    }
}

/// An entry together with its dense competition rank in the current collection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankedEntry {
    /// 1-based rank. Tied scores share a rank ("1224" ranking).
    pub rank: usize,
    pub name: String,
    pub score: i64,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "time", default, skip_serializing_if = "Option::is_none")
    )]
    pub submitted_at: Option<String>,
}

impl RankedEntry {
    pub(crate) fn from_entry(rank: usize, entry: &Entry) -> Self {
        RankedEntry {
            rank,
            name: entry.name.clone(),
            score: entry.score,
            submitted_at: entry.submitted_at.clone(),
        }
    }
}

/// Outcome of `Leaderboard::submit()`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubmissionResult {
    /// Rank of the freshly inserted entry.
    pub rank: usize,
    /// `(1 - (rank - 1) / total_count) * 100`, evaluated right after insertion.
    pub percentile: f64,
    /// Collection size including the new entry.
    pub total_count: usize,
}

/// Where the best-placed entry of a given name currently stands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Standing {
    pub name: String,
    pub score: i64,
    pub rank: usize,
    pub percentile: f64,
    pub total_count: usize,
}

/// Aggregate view over the whole collection.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeaderboardSummary {
    pub total_entries: usize,
    /// Number of distinct names. A player may hold several entries.
    pub distinct_players: usize,
    pub top_score: Option<i64>,
    pub bottom_score: Option<i64>,
    pub mean_score: Option<f64>,
}

/// Engine policy knobs.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LeaderboardConfig {
    /// Reject submissions whose name is the empty string.
    /// Off by default: empty names have always been accepted.
    pub reject_empty_names: bool,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn test_ranked_entry_wire_shape() {
        let entry = RankedEntry {
            rank: 2,
            name: "alice".to_string(),
            score: 40,
            submitted_at: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "rank": 2, "name": "alice", "score": 40 }));

        let with_time: RankedEntry = serde_json::from_str(
            r#"{"rank":1,"name":"bob","score":90,"time":"01:23"}"#,
        ).unwrap();
        assert_eq!(with_time.submitted_at.as_deref(), Some("01:23"));
        assert_eq!(serde_json::to_value(&with_time).unwrap()["time"], "01:23");

        let entry = Entry::new("carol", 7, Some("02:00".to_string()));
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            serde_json::json!({ "name": "carol", "score": 7, "time": "02:00" })
        );
    }

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: LeaderboardConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.reject_empty_names);

        let strict: LeaderboardConfig = serde_json::from_str(r#"{"reject_empty_names":true}"#).unwrap();
        assert!(strict.reject_empty_names);
    }
}
